use std::time::{Duration, Instant};

pub const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];
pub const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

/// Time-driven spinner; the frame depends only on how long it has been running.
#[derive(Debug, Clone)]
pub struct Spinner {
    text: String,
    started: Instant,
}

impl Spinner {
    pub fn start(text: impl Into<String>) -> Self {
        Self::started_at(text, Instant::now())
    }

    pub fn started_at(text: impl Into<String>, started: Instant) -> Self {
        Self {
            text: text.into(),
            started,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn frame_at(&self, now: Instant) -> &'static str {
        let ticks = now.saturating_duration_since(self.started).as_millis()
            / SPINNER_INTERVAL.as_millis();
        SPINNER_FRAMES[(ticks % SPINNER_FRAMES.len() as u128) as usize]
    }
}
