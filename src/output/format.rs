use super::events::{ContainerStatus, Event, Phase, Progress, Severity, UserInputRequest};

/// Converts an event into one display line; `None` marks events with no line form.
#[must_use]
pub fn format_event_line(event: &Event) -> Option<String> {
    match event {
        Event::Message { severity, text } => Some(format_message(*severity, text)),
        Event::Highlight(text) | Event::Secondary(text) | Event::ContainerLogLine(text) => {
            Some(text.clone())
        }
        Event::ContainerStatus(status) => Some(format_status_line(status)),
        Event::Progress(progress) => format_progress_line(progress),
        Event::SpinnerStart(text) => Some(text.clone()),
        Event::SpinnerStop => None,
        Event::Error(error) => Some(match &error.summary {
            Some(summary) if !summary.is_empty() => format!("Error: {}: {summary}", error.title),
            _ => format!("Error: {}", error.title),
        }),
        Event::UserInputRequest(request) => Some(format_user_input_request(request)),
    }
}

#[must_use]
pub fn format_message(severity: Severity, text: &str) -> String {
    match severity {
        Severity::Info => text.to_string(),
        Severity::Success => format!("Success: {text}"),
        Severity::Note => format!("Note: {text}"),
        Severity::Warning => format!("Warning: {text}"),
    }
}

fn format_status_line(status: &ContainerStatus) -> String {
    let name = &status.container;
    let detail = status.detail.as_deref().filter(|detail| !detail.is_empty());
    match (&status.phase, detail) {
        (Phase::Pulling, _) => format!("Pulling {name}..."),
        (Phase::Starting, _) => format!("Starting {name}..."),
        (Phase::Waiting, _) => format!("Waiting for {name} to be ready..."),
        (Phase::Ready, Some(detail)) => format!("{name} ready ({detail})"),
        (Phase::Ready, None) => format!("{name} ready"),
        (phase, Some(detail)) => format!("{name}: {} ({detail})", phase.as_str()),
        (phase, None) => format!("{name}: {}", phase.as_str()),
    }
}

fn format_progress_line(progress: &Progress) -> Option<String> {
    if progress.total > 0 {
        let pct = progress.current as f64 / progress.total as f64 * 100.0;
        return Some(format!(
            "  {}: {} {pct:.1}%",
            progress.layer_id, progress.status
        ));
    }
    if progress.status.is_empty() {
        return None;
    }
    Some(format!("  {}: {}", progress.layer_id, progress.status))
}

/// First prompt line gets the option labels: ` (label)` for one, ` [a/b]` for several.
#[must_use]
pub fn format_user_input_request(request: &UserInputRequest) -> String {
    format_prompt(&request.prompt, request.options.iter().map(|o| o.label.as_str()))
}

fn format_prompt<'a>(prompt: &str, labels: impl Iterator<Item = &'a str>) -> String {
    let labels: Vec<&str> = labels.filter(|label| !label.is_empty()).collect();
    let mut lines = prompt.split('\n');
    let first = lines.next().unwrap_or_default();
    let first = match labels.as_slice() {
        [] => first.to_string(),
        [label] => format!("{first} ({label})"),
        labels => format!("{first} [{}]", labels.join("/")),
    };

    std::iter::once(first)
        .chain(lines.map(str::to_string))
        .collect::<Vec<_>>()
        .join("\n")
}
