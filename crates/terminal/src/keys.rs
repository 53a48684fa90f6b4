/// A decoded key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    CtrlC,
    Char(char),
    /// Escape sequences and control bytes the UI does not act on.
    Other(String),
}

impl Key {
    /// Name used to match prompt option keys (`"enter"`, `"y"`, ...).
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Enter => "enter".to_string(),
            Self::CtrlC => "ctrl+c".to_string(),
            Self::Char(ch) => ch.to_string(),
            Self::Other(sequence) => sequence.clone(),
        }
    }
}

/// Splits one raw input chunk into keys. An escape starts a sequence that runs to the end
/// of the chunk, since terminals deliver each sequence in a single read.
#[must_use]
pub fn parse_keys(data: &str) -> Vec<Key> {
    let mut keys = Vec::new();
    let mut chars = data.char_indices();
    while let Some((idx, ch)) = chars.next() {
        let key = match ch {
            '\r' | '\n' => Key::Enter,
            '\x03' => Key::CtrlC,
            '\x1b' => {
                keys.push(Key::Other(data[idx..].to_string()));
                break;
            }
            ch if ch.is_control() => Key::Other(ch.to_string()),
            ch => Key::Char(ch),
        };
        keys.push(key);
    }
    keys
}
