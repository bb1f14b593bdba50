//! FFmpeg setup.
//!
//! FFmpeg keeps its own logging separate from the [`log`] facade and prints
//! warnings straight to stderr. [`set_ffmpeg_log_level`] tunes that output;
//! Rust-side messages are still controlled by whatever `log` backend the
//! application installs.

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

use crate::error::FlipbookError;

/// FFmpeg's own console verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Only conditions that abort the process.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging output.
    Debug,
    /// Everything.
    Trace,
}

impl From<FfmpegLogLevel> for Level {
    fn from(level: FfmpegLogLevel) -> Self {
        match level {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = FlipbookError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let level = match value.to_ascii_lowercase().as_str() {
            "quiet" => FfmpegLogLevel::Quiet,
            "panic" => FfmpegLogLevel::Panic,
            "fatal" => FfmpegLogLevel::Fatal,
            "error" => FfmpegLogLevel::Error,
            "warning" | "warn" => FfmpegLogLevel::Warning,
            "info" => FfmpegLogLevel::Info,
            "verbose" => FfmpegLogLevel::Verbose,
            "debug" => FfmpegLogLevel::Debug,
            "trace" => FfmpegLogLevel::Trace,
            other => {
                return Err(FlipbookError::InvalidParameter(format!(
                    "unknown FFmpeg log level '{other}'"
                )));
            }
        };
        Ok(level)
    }
}

/// Set FFmpeg's stderr verbosity. Does not affect the `log` crate.
///
/// ```no_run
/// flipbook::set_ffmpeg_log_level(flipbook::FfmpegLogLevel::Error);
/// ```
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}

/// Initialise the FFmpeg libraries. Safe to call repeatedly.
pub(crate) fn initialize() -> Result<(), FlipbookError> {
    ffmpeg_next::init().map_err(FlipbookError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("WARN".parse::<FfmpegLogLevel>().unwrap(), FfmpegLogLevel::Warning);
        assert_eq!("quiet".parse::<FfmpegLogLevel>().unwrap(), FfmpegLogLevel::Quiet);
        assert!("loud".parse::<FfmpegLogLevel>().is_err());
    }
}
