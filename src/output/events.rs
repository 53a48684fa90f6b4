use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Transient status ("Checking if auth request is confirmed...").
    Info,
    Success,
    /// Informational outcome ("Not currently logged in.").
    Note,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Pulling,
    Starting,
    Waiting,
    Ready,
    Other(String),
}

impl Phase {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pulling => "pulling",
            Self::Starting => "starting",
            Self::Waiting => "waiting",
            Self::Ready => "ready",
            Self::Other(phase) => phase,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    pub phase: Phase,
    pub container: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub container: String,
    pub layer_id: String,
    pub status: String,
    pub current: i64,
    pub total: i64,
}

/// A labelled recovery step shown under an error, e.g. `⇒ Run: lstk login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorAction {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorEvent {
    pub title: String,
    pub summary: Option<String>,
    pub detail: Option<String>,
    pub actions: Vec<ErrorAction>,
}

impl ErrorEvent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_action(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.actions.push(ErrorAction {
            label: label.into(),
            value: value.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputOption {
    pub key: String,
    pub label: String,
}

impl InputOption {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputResponse {
    pub selected_key: String,
    pub cancelled: bool,
}

impl InputResponse {
    pub fn selected(key: impl Into<String>) -> Self {
        Self {
            selected_key: key.into(),
            cancelled: false,
        }
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self {
            selected_key: String::new(),
            cancelled: true,
        }
    }
}

/// Prompt awaiting exactly one answer on `reply`.
#[derive(Debug)]
pub struct UserInputRequest {
    pub prompt: String,
    pub options: Vec<InputOption>,
    pub reply: oneshot::Sender<InputResponse>,
}

impl UserInputRequest {
    /// Sends `response`, consuming the request. Returns `false` if nobody is waiting.
    pub fn respond(self, response: InputResponse) -> bool {
        self.reply.send(response).is_ok()
    }
}

/// Everything orchestration code reports to the user.
#[derive(Debug)]
pub enum Event {
    Message { severity: Severity, text: String },
    /// Emphasized line, typically a URL the user should open.
    Highlight(String),
    Secondary(String),
    ContainerStatus(ContainerStatus),
    Progress(Progress),
    SpinnerStart(String),
    SpinnerStop,
    Error(ErrorEvent),
    ContainerLogLine(String),
    UserInputRequest(UserInputRequest),
}
