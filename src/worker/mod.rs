//! Upload worker
//!
//! Loads the task, fetches the parent task's manifest, publishes each update
//! file to S3 under a non-colliding name and submits the builds to Balrog.

pub mod http;
pub mod manifest;
pub mod runner;

use crate::balrog::BalrogClient;
use crate::config::ResolvedConfig;
use crate::error::Result;
use crate::naming::DEFAULT_MAX_SUFFIX;
use crate::storage::StorageClient;
use crate::task::SigningChannels;
use self::http::{HttpConfig, HttpFetcher};
use self::runner::{RunOutcome, Runner};
use std::sync::Arc;
use tracing::info;

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Suffixed alternatives probed before an upload gives up
    pub max_suffix: i64,
    pub channels: SigningChannels,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_suffix: DEFAULT_MAX_SUFFIX,
            channels: SigningChannels::default(),
        }
    }
}

/// Run the worker once against real collaborators
pub async fn run(config: &ResolvedConfig) -> Result<RunOutcome> {
    let fetcher = Arc::new(HttpFetcher::new(HttpConfig::default())?);

    let storage = match config.s3_credentials() {
        Some(credentials) => Some(StorageClient::s3(credentials)?),
        None => {
            info!("S3 uploads disabled, submitting source URLs");
            None
        }
    };

    let submitter = Arc::new(BalrogClient::from_config(config)?);

    let runner = Runner::new(WorkerConfig::default(), fetcher, storage, submitter);
    let outcome = runner.run_task(&config.taskdef).await?;

    info!(?outcome, metrics = ?runner.metrics(), "Worker finished");
    Ok(outcome)
}
