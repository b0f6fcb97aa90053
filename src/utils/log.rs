//! Leveled logging to stderr.
//!
//! Use the `debug!`, `info!`, `warn!` and `error!` macros. Messages below
//! the minimum level are never formatted, and all of them are compiled out
//! of unit tests. The minimum level defaults to [`Level::Info`]; change it
//! with [`set_level`] or through the `RAM_LOG` environment variable
//! (see [`init_from_env`]).

use ram_derive::Error;
use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Environment variable holding the minimum log level.
pub const ENV_VAR: &str = "RAM_LOG";

/// Log level for filtering messages.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            _ => Level::Error,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Debug => write!(f, "DEBUG"),
            Level::Info => write!(f, "INFO"),
            Level::Warn => write!(f, "WARN"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

/// Errors raised while configuring the logger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogError {
    #[error("unknown log level `{0}` (expected debug, info, warn or error)")]
    UnknownLevel(String),
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(LogError::UnknownLevel(s.to_string())),
        }
    }
}

static MIN_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// Sets the minimum level that gets written.
pub fn set_level(level: Level) {
    MIN_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Returns the current minimum level.
pub fn level() -> Level {
    Level::from_u8(MIN_LEVEL.load(Ordering::Relaxed))
}

/// Whether messages at `level` are currently written.
pub fn enabled(level: Level) -> bool {
    level >= self::level()
}

/// Reads the minimum level from `RAM_LOG`, if set.
///
/// Leaves the level unchanged when the variable is absent and returns
/// [`LogError::UnknownLevel`] when it holds something unrecognized.
pub fn init_from_env() -> Result<(), LogError> {
    if let Ok(value) = std::env::var(ENV_VAR) {
        set_level(value.parse()?);
    }
    Ok(())
}

/// Internal logging function. Use the `debug!`, `info!`, `warn!`, or `error!` macros instead.
#[doc(hidden)]
pub fn log(level: Level, message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let mut color = ColorSpec::new();
    match level {
        Level::Debug => {
            color.set_fg(Some(Color::Cyan)).set_dimmed(true);
        }
        Level::Info => {
            color.clear();
        }
        Level::Warn => {
            color.set_fg(Some(Color::Yellow)).set_bold(true);
        }
        Level::Error => {
            color.set_fg(Some(Color::Red)).set_bold(true);
        }
    }
    let _ = stderr.set_color(&color);
    let _ = write!(stderr, "[{:5}] ", level);
    let _ = stderr.reset();
    let _ = writeln!(stderr, "{}", message);
}

/// Logs a debug-level message.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) && $crate::utils::log::enabled($crate::utils::log::Level::Debug) {
            $crate::utils::log::log($crate::utils::log::Level::Debug, &format!($($arg)*));
        }
    }};
}

/// Logs an info-level message.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) && $crate::utils::log::enabled($crate::utils::log::Level::Info) {
            $crate::utils::log::log($crate::utils::log::Level::Info, &format!($($arg)*));
        }
    }};
}

/// Logs a warning-level message.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) && $crate::utils::log::enabled($crate::utils::log::Level::Warn) {
            $crate::utils::log::log($crate::utils::log::Level::Warn, &format!($($arg)*));
        }
    }};
}

/// Logs an error-level message.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) && $crate::utils::log::enabled($crate::utils::log::Level::Error) {
            $crate::utils::log::log($crate::utils::log::Level::Error, &format!($($arg)*));
        }
    }};
}
