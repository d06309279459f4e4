//! YAML logging configuration.
//!
//! ```yaml
//! level: info
//! format: compact        # pretty | compact | json
//! ansi: true
//! targets:
//!   docqa_rag: debug
//!   sqlx: warn
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::TelemetryError;

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

/// Logging settings read from a YAML file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level directive for every target.
    pub level: String,
    pub format: LogFormat,
    /// Colored output. Ignored for the JSON format.
    pub ansi: bool,
    /// Per-target level overrides, e.g. `docqa_rag: debug`.
    pub targets: BTreeMap<String, String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            ansi: true,
            targets: BTreeMap::new(),
        }
    }
}

impl LogConfig {
    /// Same as the default, at `level`.
    pub fn with_level(level: impl Into<String>) -> Self {
        Self { level: level.into(), ..Self::default() }
    }

    /// Read and parse the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| TelemetryError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text).map_err(|e| match e {
            TelemetryError::Parse { source, .. } => {
                TelemetryError::Parse { path: path.to_path_buf(), source }
            }
            other => other,
        })
    }

    /// [`load`](Self::load), or `fallback` when the file does not exist.
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or(path: impl AsRef<Path>, fallback: LogConfig) -> Result<Self, TelemetryError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(fallback);
        }
        Self::load(path)
    }

    /// [`load_or`](Self::load_or) with [`LogConfig::default()`].
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        Self::load_or(path, Self::default())
    }

    /// Parse YAML text. An empty document yields the defaults.
    pub fn parse(text: &str) -> Result<Self, TelemetryError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
            .map_err(|source| TelemetryError::Parse { path: Default::default(), source })
    }

    /// The filter directives this config describes: the default level first,
    /// then one `target=level` per override.
    pub fn directives(&self) -> Vec<String> {
        std::iter::once(self.level.clone())
            .chain(self.targets.iter().map(|(target, level)| format!("{target}={level}")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_fields_take_defaults() {
        let config = LogConfig::parse("level: debug\n").unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.ansi);
        assert!(config.targets.is_empty());
    }

    #[test]
    fn full_document_parses() {
        let yaml = "level: warn\nformat: json\nansi: false\ntargets:\n  docqa_rag: debug\n  sqlx: error\n";
        let config = LogConfig::parse(yaml).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.ansi);
        assert_eq!(config.directives(), vec!["warn", "docqa_rag=debug", "sqlx=error"]);
    }

    #[test]
    fn unknown_format_is_a_parse_error() {
        assert!(matches!(LogConfig::parse("format: xml"), Err(TelemetryError::Parse { .. })));
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(LogConfig::parse("").unwrap(), LogConfig::default());
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "level: trace").unwrap();
        let config = LogConfig::load(file.path()).unwrap();
        assert_eq!(config.level, "trace");
    }

    #[test]
    fn load_reports_the_path_on_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ansi: [not, a, bool]").unwrap();
        match LogConfig::load(file.path()) {
            Err(TelemetryError::Parse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn absent_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs_conf.yaml");
        assert_eq!(LogConfig::load_or_default(&path).unwrap(), LogConfig::default());
        assert_eq!(LogConfig::load_or(&path, LogConfig::with_level("warn")).unwrap().level, "warn");
        assert!(matches!(LogConfig::load(&path), Err(TelemetryError::Read { .. })));
    }
}
