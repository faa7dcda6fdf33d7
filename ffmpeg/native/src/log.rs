/*!
    Bridge from the native FFmpeg log to `tracing`.

    Once [`install`] has been called, messages the native libraries log are
    formatted by `av_log_format_line` and emitted under the `ffmpeg` target.
    The callback may run on FFmpeg worker threads.
*/

use std::ffi::{CStr, c_char, c_int, c_void};
use std::fmt;

use ffmpeg_next::ffi;

const LINE_SIZE: usize = 1024;

#[cfg(all(target_arch = "x86_64", not(target_os = "windows")))]
type VaList = *mut ffi::__va_list_tag;
#[cfg(not(all(target_arch = "x86_64", not(target_os = "windows"))))]
type VaList = ffi::va_list;

/**
    Native log levels, ordered from least to most verbose.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Quiet,
    Panic,
    Fatal,
    Error,
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Quiet => -8,
            Self::Panic => 0,
            Self::Fatal => 8,
            Self::Error => 16,
            Self::Warning => 24,
            Self::Info => 32,
            Self::Verbose => 40,
            Self::Debug => 48,
            Self::Trace => 56,
        }
    }

    /**
        Map a raw level to the closest level at or below it in verbosity.
    */
    pub const fn from_raw(level: i32) -> Self {
        match level {
            i32::MIN..=-1 => Self::Quiet,
            0..=7 => Self::Panic,
            8..=15 => Self::Fatal,
            16..=23 => Self::Error,
            24..=31 => Self::Warning,
            32..=39 => Self::Info,
            40..=47 => Self::Verbose,
            48..=55 => Self::Debug,
            _ => Self::Trace,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Panic => "panic",
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Verbose => "verbose",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/**
    The `tracing` level a raw native level is forwarded at.
*/
pub fn tracing_level(level: i32) -> tracing::Level {
    match level {
        i32::MIN..=16 => tracing::Level::ERROR,
        17..=24 => tracing::Level::WARN,
        25..=32 => tracing::Level::INFO,
        33..=40 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

pub fn set_level(level: LogLevel) {
    unsafe { ffi::av_log_set_level(level.as_raw()) }
}

pub fn level() -> LogLevel {
    LogLevel::from_raw(unsafe { ffi::av_log_get_level() })
}

/**
    Set the native log level and route native log output into `tracing`.
*/
pub fn install(level: LogLevel) {
    set_level(level);
    unsafe { ffi::av_log_set_callback(Some(log_callback)) }
    tracing::debug!(%level, "forwarding native log output");
}

/**
    Restore the native default callback, which prints to stderr.
*/
pub fn uninstall() {
    unsafe { ffi::av_log_set_callback(Some(ffi::av_log_default_callback)) }
}

unsafe extern "C" fn log_callback(
    avcl: *mut c_void,
    level: c_int,
    fmt: *const c_char,
    vl: VaList,
) {
    if level > unsafe { ffi::av_log_get_level() } {
        return;
    }

    let mut line = [0 as c_char; LINE_SIZE];
    let mut print_prefix: c_int = 1;
    // SAFETY: the buffer is LINE_SIZE bytes and always nul-terminated by the callee.
    unsafe {
        ffi::av_log_format_line(
            avcl,
            level,
            fmt,
            vl,
            line.as_mut_ptr(),
            LINE_SIZE as c_int,
            &mut print_prefix,
        );
    }

    let line = unsafe { CStr::from_ptr(line.as_ptr()) }.to_string_lossy();
    let message = line.trim_end();
    if message.is_empty() {
        return;
    }

    match tracing_level(level) {
        tracing::Level::ERROR => tracing::error!(target: "ffmpeg", "{message}"),
        tracing::Level::WARN => tracing::warn!(target: "ffmpeg", "{message}"),
        tracing::Level::INFO => tracing::info!(target: "ffmpeg", "{message}"),
        tracing::Level::DEBUG => tracing::debug!(target: "ffmpeg", "{message}"),
        _ => tracing::trace!(target: "ffmpeg", "{message}"),
    }
}
