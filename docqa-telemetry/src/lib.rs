//! # docqa-telemetry
//!
//! Logging setup shared by the docqa binaries.
//!
//! A [`LogConfig`] is read from a YAML file once at startup and turned into a
//! `tracing-subscriber` registry: an [`EnvFilter`] built from the file's
//! levels (`RUST_LOG` takes precedence when set) and a `fmt` layer on stderr.
//!
//! ```rust,no_run
//! use docqa_telemetry::{LogConfig, init_logging};
//!
//! let config = LogConfig::load_or_default("logs_conf.yaml")?;
//! init_logging(&config)?;
//! tracing::info!("ready");
//! # Ok::<(), docqa_telemetry::TelemetryError>(())
//! ```

mod config;

use std::path::PathBuf;

use thiserror::Error;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use config::{LogConfig, LogFormat};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to read logging config {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("invalid logging config {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_yaml::Error },

    #[error("invalid log directive '{directive}': {message}")]
    Directive { directive: String, message: String },

    #[error("failed to install the global subscriber: {0}")]
    Init(String),
}

/// Build the filter for `config`. A non-empty `rust_log` replaces the
/// config's directives entirely.
pub fn build_filter(config: &LogConfig, rust_log: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    if let Some(spec) = rust_log.filter(|s| !s.trim().is_empty()) {
        return EnvFilter::try_new(spec).map_err(|e| TelemetryError::Directive {
            directive: spec.to_string(),
            message: e.to_string(),
        });
    }

    let mut filter = EnvFilter::default();
    for directive in config.directives() {
        let parsed = directive.parse().map_err(|e: tracing_subscriber::filter::ParseError| {
            TelemetryError::Directive { directive: directive.clone(), message: e.to_string() }
        })?;
        filter = filter.add_directive(parsed);
    }
    Ok(filter)
}

/// Install the global subscriber described by `config`.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(config, rust_log.as_deref())?;

    let layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
    let layer = match config.format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.pretty().with_ansi(config.ansi).boxed(),
        LogFormat::Compact => layer.compact().with_ansi(config.ansi).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_directives_build_a_filter() {
        let mut config = LogConfig::with_level("warn");
        config.targets.insert("docqa_rag".into(), "debug".into());
        let filter = build_filter(&config, None).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("warn"), "{rendered}");
        assert!(rendered.contains("docqa_rag=debug"), "{rendered}");
    }

    #[test]
    fn rust_log_overrides_the_file() {
        let filter = build_filter(&LogConfig::with_level("warn"), Some("trace")).unwrap();
        assert_eq!(filter.to_string(), "trace");
    }

    #[test]
    fn blank_rust_log_is_ignored() {
        let filter = build_filter(&LogConfig::with_level("error"), Some("  ")).unwrap();
        assert!(filter.to_string().contains("error"));
    }

    #[test]
    fn bad_level_is_reported() {
        let mut config = LogConfig::default();
        config.targets.insert("docqa_rag".into(), "loud".into());
        let err = build_filter(&config, None).unwrap_err();
        assert!(matches!(err, TelemetryError::Directive { directive, .. } if directive == "docqa_rag=loud"));
    }
}
