//! Inline interactive UI: redraws the rendered view in place below the shell prompt while a
//! task runs, forwarding its events and answering its prompts from key presses.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Instant;

use lstk::output::{is_silent, Event, SilentError, Sink, TuiSink};
use lstk_terminal::{parse_keys, ProcessTerminal, Terminal, TerminalGuard, SPINNER_INTERVAL};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::app::{App, KeyOutcome};
use crate::clipboard;
use crate::view;

#[derive(Debug)]
pub enum UiMessage {
    Event(Event),
    Input(String),
    Resize,
    Copied(bool),
}

#[derive(Debug, Clone)]
pub struct UiSender(UnboundedSender<UiMessage>);

impl lstk::output::Sender for UiSender {
    fn send(&self, event: Event) {
        let _ = self.0.send(UiMessage::Event(event));
    }
}

/// Tracks what is on screen so each frame replaces the previous one.
#[derive(Debug, Default)]
pub struct InlineScreen {
    previous: Vec<String>,
    stale: bool,
}

impl InlineScreen {
    /// Escape sequence that replaces the last frame with `lines`, or `None` if unchanged.
    pub fn frame(&mut self, mut lines: Vec<String>, rows: usize) -> Option<String> {
        if rows > 0 && lines.len() > rows {
            lines.drain(..lines.len() - rows);
        }
        if lines == self.previous && !self.stale {
            return None;
        }

        let mut out = String::from("\r");
        if self.previous.len() > 1 {
            out.push_str(&format!("\x1b[{}A", self.previous.len() - 1));
        }
        out.push_str("\x1b[J");
        out.push_str(&lines.join("\r\n"));
        self.previous = lines;
        self.stale = false;
        Some(out)
    }

    /// Forces the next frame to be written even if unchanged.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }
}

/// Runs `task` behind the inline UI and returns its result.
///
/// Errors already shown in the UI come back wrapped in [`SilentError`]; cancellations are
/// returned untouched so the caller can recognise them.
pub async fn run<T, F, Fut>(
    version: &str,
    cancel: CancellationToken,
    is_cancelled: fn(&anyhow::Error) -> bool,
    task: F,
) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce(Arc<dyn Sink>) -> Fut,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sink: Arc<dyn Sink> = Arc::new(TuiSink::new(UiSender(tx.clone())));

    let mut guard = TerminalGuard::new(ProcessTerminal::new());
    let input_tx = tx.clone();
    let resize_tx = tx.clone();
    guard.terminal_mut().start(
        Box::new(move |chunk| {
            let _ = input_tx.send(UiMessage::Input(chunk));
        }),
        Box::new(move || {
            let _ = resize_tx.send(UiMessage::Resize);
        }),
    )?;

    let mut app = App::new(version, cancel);
    let mut screen = InlineScreen::default();
    let mut task = tokio::spawn(task(sink));
    let mut ticker = tokio::time::interval(SPINNER_INTERVAL);

    let joined = loop {
        draw(guard.terminal_mut(), &mut screen, &app)?;
        tokio::select! {
            joined = &mut task => break joined,
            Some(message) = rx.recv() => handle_message(&mut app, &mut screen, &tx, message),
            _ = ticker.tick(), if app.is_animating(Instant::now()) => {}
        }
    };

    drain(&mut app, &mut rx);
    app.clear_prompt();
    let result = match joined {
        Ok(result) => result,
        Err(join_error) => Err(anyhow::Error::new(join_error)),
    };
    let result = result.map_err(|error| {
        if is_cancelled(&error) || error.chain().any(|cause| is_silent(cause)) {
            return error;
        }
        app.show_failure(error.to_string());
        anyhow::Error::new(SilentError::new(error.to_string()))
    });

    draw(guard.terminal_mut(), &mut screen, &app)?;
    guard.terminal_mut().write("\r\n")?;
    guard.finish()?;
    result
}

fn handle_message(
    app: &mut App,
    screen: &mut InlineScreen,
    tx: &UnboundedSender<UiMessage>,
    message: UiMessage,
) {
    match message {
        UiMessage::Event(event) => app.handle_event(event),
        UiMessage::Input(chunk) => {
            for key in parse_keys(&chunk) {
                if let KeyOutcome::Copy(url) = app.handle_key(&key) {
                    spawn_copy(url, tx.clone());
                }
            }
        }
        UiMessage::Resize => screen.invalidate(),
        UiMessage::Copied(true) => app.mark_copied(Instant::now()),
        UiMessage::Copied(false) => {}
    }
}

fn spawn_copy(url: String, tx: UnboundedSender<UiMessage>) {
    tokio::spawn(async move {
        let copied = match tokio::task::spawn_blocking(move || clipboard::copy(&url)).await {
            Ok(Ok(())) => true,
            Ok(Err(error)) => {
                tracing::debug!(%error, "clipboard copy failed");
                false
            }
            Err(_) => false,
        };
        let _ = tx.send(UiMessage::Copied(copied));
    });
}

fn drain(app: &mut App, rx: &mut UnboundedReceiver<UiMessage>) {
    while let Ok(message) = rx.try_recv() {
        if let UiMessage::Event(event) = message {
            app.handle_event(event);
        }
    }
}

fn draw(terminal: &mut ProcessTerminal, screen: &mut InlineScreen, app: &App) -> io::Result<()> {
    let lines = view::render(app, usize::from(terminal.columns()), Instant::now());
    match screen.frame(lines, usize::from(terminal.rows())) {
        Some(frame) => terminal.write(&frame),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::InlineScreen;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn first_frame_clears_from_cursor() {
        let mut screen = InlineScreen::default();
        assert_eq!(
            screen.frame(lines(&["a", "b"]), 24).as_deref(),
            Some("\r\x1b[Ja\r\nb")
        );
    }

    #[test]
    fn next_frame_moves_up_over_previous_lines() {
        let mut screen = InlineScreen::default();
        screen.frame(lines(&["a", "b", "c"]), 24);
        assert_eq!(
            screen.frame(lines(&["a", "b", "c", "d"]), 24).as_deref(),
            Some("\r\x1b[2A\x1b[Ja\r\nb\r\nc\r\nd")
        );
    }

    #[test]
    fn unchanged_frame_is_skipped_until_invalidated() {
        let mut screen = InlineScreen::default();
        screen.frame(lines(&["a"]), 24);
        assert_eq!(screen.frame(lines(&["a"]), 24), None);
        screen.invalidate();
        assert!(screen.frame(lines(&["a"]), 24).is_some());
    }

    #[test]
    fn frame_keeps_only_the_rows_that_fit() {
        let mut screen = InlineScreen::default();
        assert_eq!(
            screen.frame(lines(&["a", "b", "c"]), 2).as_deref(),
            Some("\r\x1b[Jb\r\nc")
        );
    }
}
