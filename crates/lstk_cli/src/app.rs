use std::collections::VecDeque;
use std::time::{Duration, Instant};

use lstk::output::{
    format_event_line, format_user_input_request, ErrorEvent, Event, InputResponse, Severity,
    UserInputRequest,
};
use lstk_terminal::{Key, Spinner};
use tokio_util::sync::CancellationToken;

/// Oldest lines are dropped past this many.
pub const MAX_LINES: usize = 200;
pub const COPIED_FLASH: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Plain,
    Message(Severity),
    Highlight,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub text: String,
}

impl Line {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn is_url(&self) -> bool {
        self.kind == LineKind::Highlight && is_url(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Answered,
    /// Copy this URL to the clipboard, then call [`App::mark_copied`].
    Copy(String),
    Exit,
}

/// State of the inline UI. Events and keys mutate it; [`crate::view`] renders it.
#[derive(Debug)]
pub struct App {
    version: String,
    lines: VecDeque<Line>,
    pending: Option<UserInputRequest>,
    spinner: Option<Spinner>,
    error: Option<ErrorEvent>,
    copied_at: Option<Instant>,
    cancel: CancellationToken,
    should_exit: bool,
}

impl App {
    pub fn new(version: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            version: version.into(),
            lines: VecDeque::new(),
            pending: None,
            spinner: None,
            error: None,
            copied_at: None,
            cancel,
            should_exit: false,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    pub fn pending(&self) -> Option<&UserInputRequest> {
        self.pending.as_ref()
    }

    pub fn spinner(&self) -> Option<&Spinner> {
        self.spinner.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorEvent> {
        self.error.as_ref()
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Message { severity, text } => {
                self.push(Line::new(LineKind::Message(severity), text));
            }
            Event::Highlight(text) => self.push(Line::new(LineKind::Highlight, text)),
            Event::Secondary(text) => self.push(Line::new(LineKind::Secondary, text)),
            Event::SpinnerStart(text) => self.spinner = Some(Spinner::start(text)),
            Event::SpinnerStop => self.spinner = None,
            Event::Error(error) => {
                self.spinner = None;
                self.error = Some(error);
            }
            Event::UserInputRequest(request) => {
                // A superseded prompt can no longer be answered.
                if let Some(previous) = self.pending.replace(request) {
                    previous.respond(InputResponse::cancelled());
                }
            }
            other => {
                if let Some(text) = format_event_line(&other) {
                    self.push(Line::new(LineKind::Plain, text));
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: &Key) -> KeyOutcome {
        if matches!(key, Key::CtrlC | Key::Char('q')) {
            if let Some(request) = self.pending.take() {
                request.respond(InputResponse::cancelled());
            }
            self.spinner = None;
            self.cancel.cancel();
            self.should_exit = true;
            return KeyOutcome::Exit;
        }

        if self.pending.is_some() {
            let name = key.name();
            let matched = self
                .pending
                .as_ref()
                .is_some_and(|request| request.options.iter().any(|option| option.key == name));
            if matched {
                self.answer(&name);
                return KeyOutcome::Answered;
            }
            if matches!(key, Key::Enter) {
                return KeyOutcome::Ignored;
            }
        }

        match key {
            Key::Char('c') => self
                .copy_target()
                .map(|url| KeyOutcome::Copy(url.to_string()))
                .unwrap_or(KeyOutcome::Ignored),
            _ => KeyOutcome::Ignored,
        }
    }

    /// Shows a failure that was not already reported as an error event.
    pub fn show_failure(&mut self, message: impl Into<String>) {
        self.spinner = None;
        if self.error.is_none() {
            self.error = Some(ErrorEvent::new(message));
        }
    }

    /// Answers an outstanding prompt with `cancelled` once the task behind it is gone.
    pub fn clear_prompt(&mut self) {
        if let Some(request) = self.pending.take() {
            request.respond(InputResponse::cancelled());
        }
        self.spinner = None;
    }

    pub fn mark_copied(&mut self, now: Instant) {
        self.copied_at = Some(now);
    }

    pub fn copied_recently(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < COPIED_FLASH)
    }

    /// Whether the view changes with time alone.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.spinner.is_some() || self.copied_recently(now)
    }

    /// Last highlighted URL, the one `c` copies.
    pub fn copy_target(&self) -> Option<&str> {
        self.lines
            .iter()
            .rev()
            .find(|line| line.is_url())
            .map(|line| line.text.as_str())
    }

    fn answer(&mut self, key: &str) {
        let Some(request) = self.pending.take() else {
            return;
        };
        let resolved = format_resolved_input(&request, key);
        request.respond(InputResponse::selected(key));
        self.push(Line::new(LineKind::Plain, resolved));
    }

    fn push(&mut self, line: Line) {
        self.lines.push_back(line);
        while self.lines.len() > MAX_LINES {
            self.lines.pop_front();
        }
    }
}

/// Prompt line kept in history after an answer: the first prompt line, followed by the
/// chosen label when it adds information.
#[must_use]
pub fn format_resolved_input(request: &UserInputRequest, selected_key: &str) -> String {
    let formatted = format_user_input_request(request);
    let first = formatted.split('\n').next().unwrap_or_default().to_string();

    let selected = request
        .options
        .iter()
        .find(|option| option.key == selected_key)
        .map(|option| option.label.as_str())
        .unwrap_or_default();
    let labels: Vec<&str> = request
        .options
        .iter()
        .map(|option| option.label.as_str())
        .filter(|label| !label.is_empty())
        .collect();

    if selected.is_empty() || labels.is_empty() || labels == [selected] {
        return first;
    }
    format!("{first} {selected}")
}

pub fn is_url(text: &str) -> bool {
    text.starts_with("https://") || text.starts_with("http://")
}
