use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

const COPY_TIMEOUT: Duration = Duration::from_secs(2);

fn candidates() -> Vec<&'static [&'static str]> {
    if cfg!(target_os = "macos") {
        vec![&["pbcopy"]]
    } else if cfg!(target_os = "windows") {
        vec![&["cmd", "/c", "clip"]]
    } else {
        let mut list: Vec<&'static [&'static str]> = vec![
            &["xclip", "-selection", "clipboard"],
            &["xsel", "--clipboard", "--input"],
        ];
        let wayland = std::env::var("XDG_SESSION_TYPE")
            .is_ok_and(|session| session.eq_ignore_ascii_case("wayland"))
            || std::env::var_os("WAYLAND_DISPLAY").is_some();
        if wayland {
            list.insert(0, &["wl-copy"]);
        }
        list
    }
}

/// Copies `text` with the first clipboard tool that succeeds.
pub fn copy(text: &str) -> io::Result<()> {
    let mut failures = Vec::new();
    for candidate in candidates() {
        match run(candidate, text) {
            Ok(()) => return Ok(()),
            Err(error) => failures.push(format!("{}: {error}", candidate.join(" "))),
        }
    }
    Err(io::Error::other(format!(
        "copy to clipboard failed: {}",
        failures.join("; ")
    )))
}

fn run(argv: &[&str], text: &str) -> io::Result<()> {
    let mut child = Command::new(argv[0])
        .args(&argv[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }

    match child.wait_timeout(COPY_TIMEOUT)? {
        Some(status) if status.success() => Ok(()),
        Some(status) => Err(io::Error::other(format!("exited with {status}"))),
        None => {
            let _ = child.kill();
            let _ = child.wait();
            Err(io::Error::new(io::ErrorKind::TimedOut, "timed out"))
        }
    }
}
