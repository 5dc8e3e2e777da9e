#![forbid(unsafe_code)]

//! Logging bootstrap.
//!
//! The engine crates emit `tracing` events unconditionally; installing a
//! subscriber is the host's choice. With the `tracing-json` feature this
//! module offers a one-call bootstrap that honours `RUST_LOG` (via
//! `EnvFilter`) and `GRIDFLOW_LOG_FORMAT` (`text` | `json`).

use std::fmt;

/// Environment variable selecting the output format.
pub const ENV_LOG_FORMAT: &str = "GRIDFLOW_LOG_FORMAT";

/// Output format for the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parse a format name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" | "pretty" => Some(Self::Text),
            "json" | "jsonl" => Some(Self::Json),
            _ => None,
        }
    }

    /// Read the format from a custom environment lookup, falling back to
    /// [`LogFormat::Text`].
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        get_env(ENV_LOG_FORMAT)
            .and_then(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

/// Failure to install the global subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingInitError {
    message: String,
}

impl fmt::Display for LoggingInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to install tracing subscriber: {}", self.message)
    }
}

impl std::error::Error for LoggingInitError {}

/// Install a global `tracing` subscriber.
///
/// Fails if another subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init(format: LogFormat) -> Result<(), LoggingInitError> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|err| LoggingInitError {
        message: err.to_string(),
    })?;
    tracing::debug!(?format, "gridflow logging initialized");
    Ok(())
}

/// Install a global subscriber using [`ENV_LOG_FORMAT`].
#[cfg(feature = "tracing-json")]
pub fn init_from_env() -> Result<(), LoggingInitError> {
    init(LogFormat::from_env_with(|key| std::env::var(key).ok()))
}
