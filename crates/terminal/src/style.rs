use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// 256-color palette index.
    Indexed(u8),
    Rgb(u8, u8, u8),
}

/// SGR attributes applied per line, so wrapped text never bleeds styling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    fg: Option<Color>,
    bold: bool,
    dim: bool,
    underline: bool,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bold: false,
            dim: false,
            underline: false,
        }
    }

    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    pub const fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    fn sgr(&self) -> Option<String> {
        let mut codes = Vec::new();
        if self.bold {
            codes.push("1".to_string());
        }
        if self.dim {
            codes.push("2".to_string());
        }
        if self.underline {
            codes.push("4".to_string());
        }
        match self.fg {
            Some(Color::Indexed(idx)) => codes.push(format!("38;5;{idx}")),
            Some(Color::Rgb(r, g, b)) => codes.push(format!("38;2;{r};{g};{b}")),
            None => {}
        }
        (!codes.is_empty()).then(|| codes.join(";"))
    }

    #[must_use]
    pub fn paint(&self, text: &str) -> String {
        let Some(sgr) = self.sgr() else {
            return text.to_string();
        };
        let mut out = String::with_capacity(text.len() + 16);
        for (idx, line) in text.split('\n').enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            if !line.is_empty() {
                let _ = write!(out, "\x1b[{sgr}m{line}\x1b[0m");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, Style};

    #[test]
    fn plain_style_leaves_text_untouched() {
        assert_eq!(Style::new().paint("hello"), "hello");
    }

    #[test]
    fn attributes_combine_and_reset_per_line() {
        let style = Style::new().bold().fg(Color::Indexed(141));
        assert_eq!(
            style.paint("a\nb"),
            "\x1b[1;38;5;141ma\x1b[0m\n\x1b[1;38;5;141mb\x1b[0m"
        );
    }
}
