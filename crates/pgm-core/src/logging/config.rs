//! Logging configuration.
//!
//! Resolved from `PGM_LOG`, `RUST_LOG` and `PGM_LOG_FORMAT`, with explicit
//! overrides from the embedding application taking precedence.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding the log level.
pub const ENV_LOG_LEVEL: &str = "PGM_LOG";

/// Environment variable holding the log format.
pub const ENV_LOG_FORMAT: &str = "PGM_LOG_FORMAT";

/// Where events are rendered for people or for machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Console lines on stderr.
    #[default]
    Human,
    /// One flattened JSON object per event.
    Jsonl,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" | "structured" => Ok(LogFormat::Jsonl),
            other => Err(format!("unrecognized log format `{}`", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum severity admitted for the pgm crates.
///
/// Factor operations and test statistics log at `Debug`; undersized
/// contingency tables log at `Warn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Off,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// The equivalent subscriber filter.
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "warning" => Ok(LogLevel::Warn),
            "none" | "quiet" => Ok(LogLevel::Off),
            other => LogLevel::ALL
                .into_iter()
                .find(|level| level.as_str() == other)
                .ok_or_else(|| format!("unrecognized log level `{}`", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        level.filter()
    }
}

/// Subscriber settings for [`super::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human-format lines with a timestamp.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::default(),
            level: LogLevel::default(),
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Resolves level and format from the environment, then applies the
    /// explicit overrides.
    ///
    /// A parsable `PGM_LOG` wins over `RUST_LOG`; unparsable values are
    /// ignored.
    pub fn from_env(level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        let env_level = env::var(ENV_LOG_LEVEL)
            .ok()
            .and_then(|value| value.parse().ok())
            .or_else(|| {
                env::var("RUST_LOG")
                    .ok()
                    .and_then(|value| level_from_directives(&value))
            });
        let env_format = env::var(ENV_LOG_FORMAT)
            .ok()
            .and_then(|value| value.parse().ok());

        let defaults = LogConfig::default();
        LogConfig {
            format: format.or(env_format).unwrap_or(defaults.format),
            level: level.or(env_level).unwrap_or(defaults.level),
            timestamps: defaults.timestamps,
        }
    }

    pub fn with_format(self, format: LogFormat) -> Self {
        LogConfig { format, ..self }
    }

    pub fn with_level(self, level: LogLevel) -> Self {
        LogConfig { level, ..self }
    }

    pub fn with_timestamps(self, timestamps: bool) -> Self {
        LogConfig { timestamps, ..self }
    }
}

/// Level from `RUST_LOG`-style directives: a `pgm*` target wins over a
/// bare level; other targets are ignored.
fn level_from_directives(directives: &str) -> Option<LogLevel> {
    let mut bare = None;
    for directive in directives.split(',').map(str::trim) {
        match directive.split_once('=') {
            Some((target, level)) if target.starts_with("pgm") => {
                if let Ok(parsed) = level.parse() {
                    return Some(parsed);
                }
            }
            Some(_) => {}
            None => bare = directive.parse().ok().or(bare),
        }
    }
    bare
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_aliases() {
        for (text, expected) in [
            ("human", LogFormat::Human),
            ("Pretty", LogFormat::Human),
            ("json", LogFormat::Jsonl),
            (" JSONL ", LogFormat::Jsonl),
        ] {
            assert_eq!(text.parse::<LogFormat>(), Ok(expected), "{}", text);
        }
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn level_names_and_aliases() {
        for level in LogLevel::ALL {
            assert_eq!(level.as_str().parse::<LogLevel>(), Ok(level));
        }
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("quiet".parse::<LogLevel>(), Ok(LogLevel::Off));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn level_maps_to_filter() {
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::DEBUG);
        assert_eq!(LogLevel::Off.filter(), LevelFilter::OFF);
    }

    #[test]
    fn directives_prefer_pgm_targets() {
        assert_eq!(level_from_directives("debug"), Some(LogLevel::Debug));
        assert_eq!(
            level_from_directives("warn,pgm_factors=trace"),
            Some(LogLevel::Trace)
        );
        assert_eq!(level_from_directives("hyper=debug"), None);
        assert_eq!(level_from_directives(""), None);
    }

    #[test]
    fn builder_replaces_fields() {
        let config = LogConfig::default()
            .with_format(LogFormat::Jsonl)
            .with_level(LogLevel::Debug)
            .with_timestamps(false);
        assert_eq!(
            config,
            LogConfig {
                format: LogFormat::Jsonl,
                level: LogLevel::Debug,
                timestamps: false,
            }
        );
    }
}
