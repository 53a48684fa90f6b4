//! Host fingerprint submitted with license requests.

use platform_api::MachineInfo;

#[must_use]
pub fn current() -> MachineInfo {
    MachineInfo {
        hostname: hostname().unwrap_or_default(),
        platform: std::env::consts::OS.to_string(),
        platform_release: release().unwrap_or_default(),
    }
}

#[cfg(unix)]
fn hostname() -> Option<String> {
    let mut buf = [0 as libc::c_char; 256];
    // SAFETY: `buf` is valid for `buf.len()` bytes and the last byte is never written.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr(), buf.len() - 1) };
    if rc != 0 {
        return None;
    }
    // SAFETY: the buffer was zero-initialised, so it is NUL-terminated.
    let name = unsafe { std::ffi::CStr::from_ptr(buf.as_ptr()) };
    Some(name.to_string_lossy().into_owned()).filter(|name| !name.is_empty())
}

#[cfg(unix)]
fn release() -> Option<String> {
    let mut uts = std::mem::MaybeUninit::<libc::utsname>::zeroed();
    // SAFETY: `uname` fills the struct it is handed.
    if unsafe { libc::uname(uts.as_mut_ptr()) } != 0 {
        return None;
    }
    // SAFETY: `uname` returned 0, so every field of the struct is initialised.
    let uts = unsafe { uts.assume_init() };
    // SAFETY: `uname` NUL-terminates `release` within the array, which outlives the borrow.
    let release = unsafe { std::ffi::CStr::from_ptr(uts.release.as_ptr()) };
    Some(release.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
fn hostname() -> Option<String> {
    std::env::var("COMPUTERNAME").ok()
}

#[cfg(not(unix))]
fn release() -> Option<String> {
    None
}
