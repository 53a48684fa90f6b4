use std::io::{self, Write};
use std::sync::Mutex;

use super::events::Event;
use super::format::format_event_line;
use super::{lock_unpoisoned, Sink};

/// Line-oriented sink for non-interactive runs.
///
/// Input requests are printed and their reply channel dropped, which the waiting side
/// observes as a cancellation.
#[derive(Debug)]
pub struct PlainSink<W: Write + Send> {
    out: Mutex<W>,
    error: Mutex<Option<io::Error>>,
}

impl<W: Write + Send> PlainSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            error: Mutex::new(None),
        }
    }

    /// First write error encountered, if any.
    pub fn take_error(&self) -> Option<io::Error> {
        lock_unpoisoned(&self.error).take()
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<W: Write + Send> Sink for PlainSink<W> {
    fn emit(&self, event: Event) {
        let Some(line) = format_event_line(&event) else {
            return;
        };
        let result = {
            let mut out = lock_unpoisoned(&self.out);
            writeln!(out, "{line}").and_then(|()| out.flush())
        };
        if let Err(error) = result {
            let mut slot = lock_unpoisoned(&self.error);
            if slot.is_none() {
                *slot = Some(error);
            }
        }
    }
}
