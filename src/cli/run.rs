use crate::config::{load_config, validate_config, Config, ConfigError};
use crate::pipeline::{EngineError, Mode, TailEngine};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Engine(#[from] EngineError),
}

/// Command line overrides for values from the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Audit log to read
    #[arg(long)]
    pub audit_log: Option<PathBuf>,

    /// Keep following the log and resume from the saved offset
    #[arg(long)]
    pub continuous: bool,

    /// Seconds to sleep between polls in continuous mode
    #[arg(long, value_name = "SECS")]
    pub sleep: Option<u64>,

    /// Minimum seconds between reports in continuous mode
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Regex a line must match; repeat for several (all must match)
    #[arg(long = "query", short = 'q', value_name = "PATTERN")]
    pub query: Vec<String>,

    /// Comma-separated fields to group by, in display order
    #[arg(long, short = 'g', value_delimiter = ',', value_name = "FIELDS")]
    pub group_by: Vec<String>,

    /// Maximum rows per report (0 for all)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Omit the header line and rule
    #[arg(long)]
    pub suppress_header: bool,
}

impl RunArgs {
    /// Apply overrides on top of `config`. Lists replace rather than extend.
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.audit_log {
            config.audit_log = Some(crate::config::expand_tilde(path));
        }
        if self.continuous {
            config.continuous = true;
        }
        if let Some(secs) = self.sleep {
            config.sleep = Duration::from_secs(secs);
        }
        if let Some(secs) = self.interval {
            config.interval = Duration::from_secs(secs);
        }
        if !self.query.is_empty() {
            config.query = self.query.clone();
        }
        if !self.group_by.is_empty() {
            config.group_by = self.group_by.clone();
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if self.suppress_header {
            config.suppress_header = true;
        }
    }
}

pub async fn run(config_path: Option<PathBuf>, args: RunArgs) -> Result<(), RunError> {
    let mut config = match &config_path {
        Some(path) => {
            info!(config_path = %path.display(), "Loading configuration");
            load_config(path)?
        }
        None => {
            info!("No config file found, using built-in HDFS audit field map");
            Config::default()
        }
    };

    args.apply(&mut config);
    validate_config(&config)?;

    let mut engine = TailEngine::from_config(&config, std::io::stdout())?;
    info!(
        audit_log = ?config.audit_log,
        mode = ?engine.mode(),
        group_by = ?config.group_by,
        offset = engine.offset(),
        "Processing audit log"
    );

    match engine.mode() {
        Mode::OneShot => engine.run().await?,
        Mode::Continuous => {
            tokio::select! {
                result = engine.run() => result?,
                _ = signal::ctrl_c() => {
                    info!("Shutdown signal received");
                }
            }
        }
    }

    Ok(())
}
