//! ANSI-aware width, wrapping and hyperlink helpers.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 3;

/// Byte length of the escape sequence starting at `pos`, if one does.
fn ansi_len(input: &str, pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&0x1b) {
        return None;
    }
    match bytes.get(pos + 1)? {
        b'[' => {
            let end = bytes[pos + 2..]
                .iter()
                .position(|b| (0x40..=0x7e).contains(b))?;
            Some(end + 3)
        }
        b']' => {
            // OSC ends at BEL or ST (ESC \).
            let mut idx = pos + 2;
            while idx < bytes.len() {
                match bytes[idx] {
                    0x07 => return Some(idx + 1 - pos),
                    0x1b if bytes.get(idx + 1) == Some(&b'\\') => return Some(idx + 2 - pos),
                    _ => idx += 1,
                }
            }
            None
        }
        _ => None,
    }
}

/// Removes CSI and OSC sequences.
#[must_use]
pub fn strip_ansi(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(len) = ansi_len(input, idx) {
            idx += len;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        clean.push(ch);
        idx += ch.len_utf8();
    }
    clean
}

fn grapheme_width(grapheme: &str) -> usize {
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    if emojis::get(grapheme).is_some() {
        return 2;
    }
    grapheme
        .chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

/// Display columns of `input`, ignoring escape sequences.
#[must_use]
pub fn visible_width(input: &str) -> usize {
    strip_ansi(input).graphemes(true).map(grapheme_width).sum()
}

/// Breaks plain text into rows of at most `width` columns without regard for words.
/// A zero width disables wrapping.
#[must_use]
pub fn hard_wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for line in text.split('\n') {
        if width == 0 {
            rows.push(line.to_string());
            continue;
        }
        let mut row = String::new();
        let mut row_width = 0;
        for grapheme in line.graphemes(true) {
            let w = grapheme_width(grapheme);
            if row_width + w > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row.push_str(grapheme);
            row_width += w;
        }
        rows.push(row);
    }
    rows
}

/// OSC 8 hyperlink around already-styled `text`.
#[must_use]
pub fn hyperlink(url: &str, text: &str) -> String {
    format!("\x1b]8;;{url}\x1b\\{text}\x1b]8;;\x1b\\")
}
