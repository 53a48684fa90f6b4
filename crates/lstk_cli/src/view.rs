use std::time::Instant;

use lstk::output::{format_user_input_request, ErrorEvent, Severity};
use lstk_terminal::{hard_wrap, hyperlink, Color, Style};

use crate::app::{App, Line, LineKind};

const INDENT: &str = "  ";

const NIMBO_DARK: Color = Color::Rgb(0x3F, 0x51, 0xC7);
const NIMBO_MID: Color = Color::Rgb(0x5E, 0x6A, 0xD2);
const NIMBO_LIGHT: Color = Color::Rgb(0x7E, 0x88, 0xEC);

const TITLE: Style = Style::new().fg(Color::Indexed(69)).bold();
const VERSION: Style = Style::new().fg(Color::Indexed(241));
const HIGHLIGHT: Style = Style::new().fg(NIMBO_LIGHT);
const LINK: Style = Style::new().fg(NIMBO_LIGHT).underline();
const SECONDARY: Style = Style::new().fg(Color::Indexed(245));
const SUCCESS: Style = Style::new().fg(Color::Indexed(42)).bold();
const NOTE: Style = Style::new().fg(Color::Indexed(69)).bold();
const WARNING: Style = Style::new().fg(Color::Indexed(214)).bold();
const ERROR: Style = Style::new().fg(Color::Indexed(196)).bold();
const SPINNER: Style = Style::new().fg(Color::Indexed(69));

/// Renders the whole inline view at `width` columns.
#[must_use]
pub fn render(app: &App, width: usize, now: Instant) -> Vec<String> {
    let wrap_width = width.saturating_sub(INDENT.len());
    let mut out = header(app.version());
    out.push(String::new());

    let lines: Vec<&Line> = app.lines().collect();
    let copy_target = app.copy_target();
    for (idx, line) in lines.iter().enumerate() {
        let hint = lines
            .get(idx + 1)
            .filter(|next| next.is_url() && Some(next.text.as_str()) == copy_target)
            .filter(|_| !line.is_url())
            .map(|_| {
                if app.copied_recently(now) {
                    " (copied!)"
                } else {
                    " (c to copy)"
                }
            });
        push_line(&mut out, line, hint, wrap_width);
    }

    if let Some(spinner) = app.spinner() {
        let text = format!("{} {}", SPINNER.paint(spinner.frame_at(now)), spinner.text());
        out.push(format!("{INDENT}{text}"));
    }

    if let Some(error) = app.error() {
        out.push(String::new());
        push_error(&mut out, error, wrap_width);
    }

    if let Some(request) = app.pending() {
        for row in format_user_input_request(request).split('\n') {
            push_wrapped(&mut out, row, wrap_width, |text| text.to_string());
        }
    }

    out
}

fn header(version: &str) -> Vec<String> {
    let nimbo = [
        format!(
            "    {}{}   ",
            Style::new().fg(NIMBO_DARK).paint("▟"),
            Style::new().fg(NIMBO_LIGHT).paint("████▖")
        ),
        format!(
            "   {}{}{}  ",
            Style::new().fg(NIMBO_MID).paint("▟"),
            Style::new().fg(NIMBO_LIGHT).paint("██▙█▙█"),
            Style::new().fg(NIMBO_MID).paint("▟")
        ),
        format!("     {}   ", Style::new().fg(NIMBO_DARK).paint("▀▛▀▛▀")),
    ];
    let [first, second, third] = nimbo;
    vec![
        String::new(),
        format!("{first} {}", TITLE.paint("LocalStack (lstk)")),
        format!("{second} {}", VERSION.paint(version)),
        third,
    ]
}

fn push_line(out: &mut Vec<String>, line: &Line, hint: Option<&str>, width: usize) {
    let (label, style) = match line.kind {
        LineKind::Highlight if line.is_url() => {
            let url = line.text.as_str();
            push_wrapped(out, url, width, |row| hyperlink(url, &LINK.paint(row)));
            return;
        }
        LineKind::Highlight => {
            push_wrapped(out, &line.text, width, |row| HIGHLIGHT.paint(row));
            return;
        }
        LineKind::Secondary => {
            push_wrapped(out, &line.text, width, |row| SECONDARY.paint(row));
            return;
        }
        LineKind::Message(Severity::Success) => ("Success:", SUCCESS),
        LineKind::Message(Severity::Note) => ("Note:", NOTE),
        LineKind::Message(Severity::Warning) => ("Warning:", WARNING),
        LineKind::Plain | LineKind::Message(Severity::Info) => {
            let Some(hint) = hint else {
                push_wrapped(out, &line.text, width, str::to_string);
                return;
            };
            let rows = hard_wrap(&format!("{}{hint}", line.text), width);
            let last = rows.len().saturating_sub(1);
            for (idx, row) in rows.into_iter().enumerate() {
                let styled = match row.strip_suffix(hint) {
                    Some(head) if idx == last => format!("{head}{}", SECONDARY.paint(hint)),
                    _ => row.clone(),
                };
                out.push(format!("{INDENT}{styled}"));
            }
            return;
        }
    };

    let prefix = format!("> {label}");
    for (idx, row) in hard_wrap(&format!("{prefix} {}", line.text), width)
        .into_iter()
        .enumerate()
    {
        let styled = match row.strip_prefix(&prefix) {
            Some(rest) if idx == 0 => format!("> {}{rest}", style.paint(label)),
            _ => row.clone(),
        };
        out.push(format!("{INDENT}{styled}"));
    }
}

fn push_error(out: &mut Vec<String>, error: &ErrorEvent, width: usize) {
    out.push(format!("{INDENT}{} {}", ERROR.paint("✗"), ERROR.paint(&error.title)));
    if let Some(summary) = error.summary.as_deref().filter(|s| !s.is_empty()) {
        push_wrapped(out, &format!("> {summary}"), width, str::to_string);
    }
    if let Some(detail) = error.detail.as_deref().filter(|d| !d.is_empty()) {
        for row in detail.lines() {
            push_wrapped(out, &format!("  {row}"), width, |row| SECONDARY.paint(row));
        }
    }
    if !error.actions.is_empty() {
        out.push(String::new());
        for action in &error.actions {
            let text = format!("⇒ {} {}", action.label, action.value);
            push_wrapped(out, &text, width, str::to_string);
        }
    }
}

fn push_wrapped(
    out: &mut Vec<String>,
    text: &str,
    width: usize,
    style: impl Fn(&str) -> String,
) {
    for row in hard_wrap(text, width) {
        out.push(format!("{INDENT}{}", style(&row)));
    }
}
