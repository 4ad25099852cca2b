//! Subscriber setup for the `bn-query` binary.
//!
//! The library itself only emits `tracing` events; nothing is printed unless
//! a subscriber is installed.

use clap::ValueEnum;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

pub const DEFAULT_FILTER: &str = "warn,bayes_net=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, human-oriented output
    Pretty,
    /// One line per event
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        LogFormat::Compact
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Log span close events with their timings
    pub log_spans: bool,
    /// Filter directives such as "bayes_net=trace"; falls back to `RUST_LOG`
    pub filter: Option<String>,
}

impl LogConfig {
    fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        Ok(match &self.filter {
            Some(filter) => EnvFilter::try_new(filter)?,
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        })
    }
}

/// Install the global subscriber, writing to stderr
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let fmt_span = if config.log_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter()?)
        .with_writer(std::io::stderr)
        .with_span_events(fmt_span);

    match config.format {
        LogFormat::Pretty => subscriber
            .pretty()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize pretty logger: {}", e)),
        LogFormat::Compact => subscriber
            .compact()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize compact logger: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_filter_is_parsed() {
        let config = LogConfig {
            filter: Some("bayes_net=trace".to_string()),
            ..LogConfig::default()
        };
        assert!(config.env_filter().is_ok());
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        let config = LogConfig {
            filter: Some("bayes_net=loud".to_string()),
            ..LogConfig::default()
        };
        assert!(config.env_filter().is_err());
    }
}
