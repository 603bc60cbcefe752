/*!
    Log level handling and subscriber setup.

    One [`LogLevel`] drives both `tracing` output and FFmpeg's own
    logger, so `-l quiet` silences everything.
*/

use std::fmt;
use std::str::FromStr;

use ffmpeg_next::util::log::Level as FfmpegLevel;
use tracing_subscriber::EnvFilter;

use crate::settings::SettingsError;

/**
    How much to print, from nothing to everything.
*/
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Quiet,
    Error,
    /// Errors plus the running frame counters.
    #[default]
    Progress,
    Warn,
    Info,
    Verbose,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        Self::Quiet,
        Self::Error,
        Self::Progress,
        Self::Warn,
        Self::Info,
        Self::Verbose,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Error => "error",
            Self::Progress => "progress",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Verbose => "verbose",
        }
    }

    /**
        `tracing` filter directive for this level.
    */
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "off",
            Self::Error | Self::Progress => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Verbose => "trace",
        }
    }

    pub const fn ffmpeg_level(self) -> FfmpegLevel {
        match self {
            Self::Quiet => FfmpegLevel::Quiet,
            Self::Error | Self::Progress => FfmpegLevel::Error,
            Self::Warn => FfmpegLevel::Warning,
            Self::Info => FfmpegLevel::Info,
            Self::Verbose => FfmpegLevel::Verbose,
        }
    }

    /**
        Whether the progress line is printed.
    */
    pub fn shows_progress(self) -> bool {
        self >= Self::Progress
    }
}

impl FromStr for LogLevel {
    type Err = SettingsError;

    /**
        Accepts a level name, case insensitive, or its index `0..=5`.
    */
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Self::ALL
                .get(index)
                .copied()
                .ok_or_else(|| SettingsError::InvalidLogLevel(s.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SettingsError::InvalidLogLevel(s.to_string()))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
    Install the global subscriber and set FFmpeg's log level.

    `RUST_LOG` takes precedence over `level` for `tracing` output. Calling
    this more than once keeps the first subscriber.
*/
pub fn init(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    ffmpeg_next::util::log::set_level(level.ffmpeg_level());
}
