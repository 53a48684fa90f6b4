use std::io;

/// Minimal terminal interface for the inline UI.
pub trait Terminal {
    /// Enters raw mode and starts delivering input chunks and resize notifications.
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> io::Result<()>;

    /// Stops the handlers and restores the original terminal state.
    fn stop(&mut self) -> io::Result<()>;

    fn write(&mut self, data: &str) -> io::Result<()>;

    fn columns(&self) -> u16;
    fn rows(&self) -> u16;
}

/// Stops the wrapped terminal on drop, so panics and early returns leave a usable shell.
pub struct TerminalGuard<T: Terminal> {
    terminal: T,
    stopped: bool,
}

impl<T: Terminal> TerminalGuard<T> {
    pub fn new(terminal: T) -> Self {
        Self {
            terminal,
            stopped: false,
        }
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    /// Stops the terminal now and reports the restore result.
    pub fn finish(mut self) -> io::Result<()> {
        self.stopped = true;
        self.terminal.stop()
    }
}

impl<T: Terminal> Drop for TerminalGuard<T> {
    fn drop(&mut self) {
        if !self.stopped {
            let _ = self.terminal.stop();
        }
    }
}

/// Whether both stdin and stdout are attached to a terminal.
#[must_use]
pub fn is_interactive() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: `isatty` only inspects the descriptor.
        unsafe { libc::isatty(libc::STDIN_FILENO) == 1 && libc::isatty(libc::STDOUT_FILENO) == 1 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
