//! Raw-mode terminal over the process's stdin and stdout.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use libc::c_int;
use signal_hook::iterator::Signals;

use crate::terminal::Terminal;

const INPUT_POLL_MS: c_int = 50;
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

fn poll_readable(fd: c_int, timeout_ms: c_int) -> bool {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    // SAFETY: `fds` is a single valid pollfd.
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    result > 0 && (fds.revents & libc::POLLIN) != 0
}

fn wait_writable(fd: c_int) -> io::Result<()> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        // SAFETY: `fds` is a single valid pollfd.
        let result = unsafe { libc::poll(&mut fds, 1, -1) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if (fds.revents & libc::POLLOUT) != 0 {
            return Ok(());
        }
        if result > 0 {
            return Err(io::Error::other(format!(
                "poll(POLLOUT) returned revents=0x{:x}",
                fds.revents
            )));
        }
    }
}

/// Writes every byte, retrying on `EINTR` and waiting out `EAGAIN`.
fn write_all_fd_with<FWrite, FWait>(
    fd: c_int,
    bytes: &[u8],
    mut write_once: FWrite,
    mut wait: FWait,
) -> io::Result<()>
where
    FWrite: FnMut(c_int, &[u8]) -> io::Result<usize>,
    FWait: FnMut(c_int) -> io::Result<()>,
{
    let mut written = 0;
    while written < bytes.len() {
        match write_once(fd, &bytes[written..]) {
            Ok(0) => return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0")),
            Ok(count) => written += count.min(bytes.len() - written),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => wait(fd)?,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

fn write_fd(fd: c_int, data: &str) -> io::Result<()> {
    write_all_fd_with(
        fd,
        data.as_bytes(),
        |fd, buf| {
            // SAFETY: `buf` is valid for `buf.len()` bytes.
            let result = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };
            if result < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(result as usize)
            }
        },
        wait_writable,
    )
}

fn read_winsize(fd: c_int) -> Option<(u16, u16)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    // SAFETY: TIOCGWINSZ fills the winsize struct.
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    (result == 0 && size.ws_col > 0 && size.ws_row > 0).then_some((size.ws_col, size.ws_row))
}

fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    // SAFETY: termios is plain data; tcgetattr initialises it.
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    if unsafe { libc::tcgetattr(fd, &mut termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    // SAFETY: `termios` came from tcgetattr.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: Option<libc::termios>,
    stop_flag: Arc<AtomicBool>,
    input_thread: Option<JoinHandle<()>>,
    resize_signal_handle: Option<signal_hook::iterator::Handle>,
    resize_thread: Option<JoinHandle<()>>,
}

impl ProcessTerminal {
    pub fn new() -> Self {
        Self {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            original_termios: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            input_thread: None,
            resize_signal_handle: None,
            resize_thread: None,
        }
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        let original = match self.original_termios {
            Some(original) => original,
            None => {
                let original = get_termios(self.stdin_fd)?;
                self.original_termios = Some(original);
                original
            }
        };
        let mut raw = original;
        // SAFETY: `raw` is a valid termios copy.
        unsafe { libc::cfmakeraw(&mut raw) };
        set_termios(self.stdin_fd, &raw)
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        match self.original_termios.as_ref() {
            Some(original) => set_termios(self.stdin_fd, original),
            None => Ok(()),
        }
    }

    fn start_input_thread(&mut self, mut on_input: Box<dyn FnMut(String) + Send>) {
        let stdin_fd = self.stdin_fd;
        let stop_flag = Arc::clone(&self.stop_flag);

        self.input_thread = Some(thread::spawn(move || {
            let mut buffer = [0u8; 4096];
            while !stop_flag.load(Ordering::SeqCst) {
                if !poll_readable(stdin_fd, INPUT_POLL_MS) {
                    continue;
                }
                // SAFETY: `buffer` is valid for `buffer.len()` bytes.
                let read_len =
                    unsafe { libc::read(stdin_fd, buffer.as_mut_ptr().cast(), buffer.len()) };
                if read_len <= 0 {
                    continue;
                }
                on_input(String::from_utf8_lossy(&buffer[..read_len as usize]).into_owned());
            }
        }));
    }

    fn start_resize_thread(&mut self, mut on_resize: Box<dyn FnMut() + Send>) -> io::Result<()> {
        let mut signals = Signals::new([libc::SIGWINCH])?;
        self.resize_signal_handle = Some(signals.handle());
        self.resize_thread = Some(thread::spawn(move || {
            for _ in signals.forever() {
                on_resize();
            }
        }));
        Ok(())
    }

    fn stop_threads(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.input_thread.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.resize_signal_handle.take() {
            handle.close();
        }
        if let Some(thread) = self.resize_thread.take() {
            let _ = thread.join();
        }
    }
}

impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for ProcessTerminal {
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> io::Result<()> {
        self.stop_flag.store(false, Ordering::SeqCst);
        self.enable_raw_mode()?;
        if let Err(err) = self.start_resize_thread(on_resize) {
            let _ = self.restore_mode();
            return Err(err);
        }
        self.start_input_thread(on_input);
        write_fd(self.stdout_fd, HIDE_CURSOR)
    }

    fn stop(&mut self) -> io::Result<()> {
        self.stop_threads();
        // Flush input before leaving raw mode so buffered keys do not leak to the shell.
        // SAFETY: plain syscall on our own descriptor.
        let _ = unsafe { libc::tcflush(self.stdin_fd, libc::TCIFLUSH) };
        let shown = write_fd(self.stdout_fd, SHOW_CURSOR);
        self.restore_mode()?;
        shown
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        write_fd(self.stdout_fd, data)
    }

    fn columns(&self) -> u16 {
        read_winsize(self.stdout_fd).map_or(80, |(cols, _)| cols)
    }

    fn rows(&self) -> u16 {
        read_winsize(self.stdout_fd).map_or(24, |(_, rows)| rows)
    }
}
