//! Typed event reporting shared by every orchestration stage.
//!
//! Stages emit [`Event`]s through a [`Sink`]; the caller picks [`PlainSink`] for
//! line output or [`TuiSink`] to feed an interactive UI before starting work.

mod errors;
mod events;
mod format;
mod plain;
mod tui;

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;

pub use errors::{is_silent, SilentError};
pub use events::{
    ContainerStatus, ErrorAction, ErrorEvent, Event, InputOption, InputResponse, Phase, Progress,
    Severity, UserInputRequest,
};
pub use format::{format_event_line, format_message, format_user_input_request};
pub use plain::PlainSink;
pub use tui::{Sender, TuiSink};

pub trait Sink: Send + Sync {
    fn emit(&self, event: Event);
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn emit(&self, event: Event) {
        (**self).emit(event);
    }
}

impl<S: Sink + ?Sized> Sink for &S {
    fn emit(&self, event: Event) {
        (**self).emit(event);
    }
}

/// Convenience emitters available on every sink, trait objects included.
pub trait SinkExt: Sink {
    fn message(&self, severity: Severity, text: impl Into<String>) {
        self.emit(Event::Message {
            severity,
            text: text.into(),
        });
    }

    fn info(&self, text: impl Into<String>) {
        self.message(Severity::Info, text);
    }

    fn success(&self, text: impl Into<String>) {
        self.message(Severity::Success, text);
    }

    fn note(&self, text: impl Into<String>) {
        self.message(Severity::Note, text);
    }

    fn warning(&self, text: impl Into<String>) {
        self.message(Severity::Warning, text);
    }

    fn highlight(&self, text: impl Into<String>) {
        self.emit(Event::Highlight(text.into()));
    }

    fn secondary(&self, text: impl Into<String>) {
        self.emit(Event::Secondary(text.into()));
    }

    fn status(&self, phase: Phase, container: &str, detail: Option<String>) {
        self.emit(Event::ContainerStatus(ContainerStatus {
            phase,
            container: container.to_string(),
            detail,
        }));
    }

    fn progress(&self, progress: Progress) {
        self.emit(Event::Progress(progress));
    }

    fn spinner_start(&self, text: impl Into<String>) {
        self.emit(Event::SpinnerStart(text.into()));
    }

    fn spinner_stop(&self) {
        self.emit(Event::SpinnerStop);
    }

    fn error(&self, error: ErrorEvent) {
        self.emit(Event::Error(error));
    }

    fn log_line(&self, line: impl Into<String>) {
        self.emit(Event::ContainerLogLine(line.into()));
    }

    /// Emits a prompt and returns the receiving end of its reply channel.
    fn request_input(
        &self,
        prompt: impl Into<String>,
        options: Vec<InputOption>,
    ) -> oneshot::Receiver<InputResponse> {
        let (reply, response) = oneshot::channel();
        self.emit(Event::UserInputRequest(UserInputRequest {
            prompt: prompt.into(),
            options,
            reply,
        }));
        response
    }
}

impl<S: Sink + ?Sized> SinkExt for S {}

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
