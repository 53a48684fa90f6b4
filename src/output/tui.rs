use super::events::Event;
use super::Sink;

/// Delivery half of an interactive UI's event loop.
pub trait Sender: Send + Sync {
    fn send(&self, event: Event);
}

impl Sender for std::sync::mpsc::Sender<Event> {
    fn send(&self, event: Event) {
        // The UI only stops listening when it is tearing down.
        let _ = std::sync::mpsc::Sender::send(self, event);
    }
}

impl Sender for tokio::sync::mpsc::UnboundedSender<Event> {
    fn send(&self, event: Event) {
        let _ = tokio::sync::mpsc::UnboundedSender::send(self, event);
    }
}

/// Forwards every event, input requests included, to an interactive UI.
#[derive(Debug, Clone)]
pub struct TuiSink<S> {
    sender: S,
}

impl<S: Sender> TuiSink<S> {
    pub fn new(sender: S) -> Self {
        Self { sender }
    }
}

impl<S: Sender> Sink for TuiSink<S> {
    fn emit(&self, event: Event) {
        self.sender.send(event);
    }
}
