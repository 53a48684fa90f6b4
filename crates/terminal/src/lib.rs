//! Terminal primitives for the interactive `lstk` UI.
//!
//! Raw-mode process terminal, key decoding, ANSI-aware width and wrapping, styling, and the
//! spinner animation. Rendering policy lives in the binary.

pub mod keys;
pub mod spinner;
pub mod style;
pub mod terminal;
pub mod text;

#[cfg(unix)]
pub mod process_terminal;

pub use keys::{parse_keys, Key};
pub use spinner::{Spinner, SPINNER_FRAMES, SPINNER_INTERVAL};
pub use style::{Color, Style};
pub use terminal::{is_interactive, Terminal, TerminalGuard};
pub use text::{hard_wrap, hyperlink, strip_ansi, visible_width};

#[cfg(unix)]
pub use process_terminal::ProcessTerminal;
