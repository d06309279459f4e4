use std::path::PathBuf;

use clap::Parser;
use docqa_telemetry::{LogConfig, TelemetryError};

pub const LOG_CONFIG_ENV: &str = "DOCQA_LOG_CONFIG";
pub const DEFAULT_LOG_CONFIG: &str = "logs_conf.yaml";

#[derive(Parser, Debug)]
#[command(
    name = "docqa-ingest",
    version,
    about = "Load the configured PDF, split it into chunks and store their embeddings in pgvector"
)]
pub struct IngestArgs {
    /// Logging configuration file (YAML).
    #[arg(long, env = LOG_CONFIG_ENV, default_value = DEFAULT_LOG_CONFIG)]
    pub log_config: PathBuf,
}

impl IngestArgs {
    /// Logging settings: the file if present, `info` defaults otherwise.
    pub fn log_config(&self) -> Result<LogConfig, TelemetryError> {
        LogConfig::load_or_default(&self.log_config)
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "docqa-chat",
    version,
    about = "Ask questions about the ingested PDF in an interactive chat"
)]
pub struct ChatArgs {
    /// Logging configuration file (YAML). Without it only warnings are logged.
    #[arg(long, env = LOG_CONFIG_ENV)]
    pub log_config: Option<PathBuf>,
}

impl ChatArgs {
    pub fn log_config(&self) -> Result<LogConfig, TelemetryError> {
        let quiet = LogConfig::with_level("warn");
        match &self.log_config {
            Some(path) => LogConfig::load_or(path, quiet),
            None => Ok(quiet),
        }
    }
}
