use std::io;
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

const LAUNCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Opens URLs for the user.
pub trait BrowserOpener: Send + Sync {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Launches the platform's default browser handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        let mut child = launcher(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        match child.wait_timeout(LAUNCH_TIMEOUT)? {
            Some(status) if status.success() => Ok(()),
            Some(status) => Err(io::Error::other(format!(
                "browser launcher exited with {status}"
            ))),
            // Some launchers stay attached to the browser they started.
            None => Ok(()),
        }
    }
}

#[cfg(target_os = "macos")]
fn launcher(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(target_os = "windows")]
fn launcher(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn launcher(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}
