//! Task runner - processes one task definition end to end

use super::WorkerConfig;
use super::http::ArtifactFetcher;
use super::manifest::{ManifestEntry, UpdateFile};
use crate::balrog::{BuildData, ReleaseSubmitter, Submission, UpdatePatch, release_name};
use crate::error::{Result, WorkerError};
use crate::hashing::{HashAlgorithm, get_hash};
use crate::observability::{Metrics, MetricsSnapshot};
use crate::storage::StorageClient;
use crate::task::{TaskError, TaskPayload, load_task};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { submitted: usize },
    /// Task was well-formed but signed for a channel this worker does not serve
    Skipped { signing_cert: String },
}

pub struct Runner {
    config: WorkerConfig,
    fetcher: Arc<dyn ArtifactFetcher>,
    storage: Option<StorageClient>,
    submitter: Arc<dyn ReleaseSubmitter>,
    metrics: Metrics,
}

impl Runner {
    /// `storage` is `None` when S3 uploads are disabled
    pub fn new(
        config: WorkerConfig,
        fetcher: Arc<dyn ArtifactFetcher>,
        storage: Option<StorageClient>,
        submitter: Arc<dyn ReleaseSubmitter>,
    ) -> Self {
        Self {
            config,
            fetcher,
            storage,
            submitter,
            metrics: Metrics::new(),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Load the task definition at `taskdef` and process it.
    ///
    /// Malformed tasks are errors; tasks for an unknown channel are skipped.
    pub async fn run_task(&self, taskdef: &Path) -> Result<RunOutcome> {
        let payload = match load_task(taskdef, &self.config.channels) {
            Ok(payload) => payload,
            Err(TaskError::Rejected(signing_cert)) => {
                warn!(%signing_cert, "Skipping task for unsupported signing channel");
                self.metrics.task_skipped();
                return Ok(RunOutcome::Skipped { signing_cert });
            }
            Err(TaskError::Schema(e)) => {
                warn!(key = e.key(), error = %e, "Malformed task definition");
                return Err(TaskError::Schema(e).into());
            }
            Err(e) => return Err(e.into()),
        };

        self.process(&payload).await
    }

    pub async fn process(&self, payload: &TaskPayload) -> Result<RunOutcome> {
        let manifest_url = payload.manifest_url();
        info!(%manifest_url, signing_cert = %payload.signing_cert, "Processing task");

        let entries = self.fetcher.fetch_manifest(&manifest_url).await?;

        for entry in &entries {
            let submission = self.prepare(entry, &payload.signing_cert).await?;
            self.submitter.submit(&submission).await?;
            self.metrics.submission();
        }

        Ok(RunOutcome::Completed {
            submitted: entries.len(),
        })
    }

    /// Publish every update file of `entry` and build its submission
    async fn prepare(&self, entry: &ManifestEntry, signing_cert: &str) -> Result<Submission> {
        let algorithm: HashAlgorithm = entry.hash_type.parse()?;
        let release_for = |buildid: &str| {
            release_name(
                &entry.app_name,
                &entry.branch,
                &entry.app_version,
                buildid,
                signing_cert,
            )
        };

        let completes = vec![self.publish(entry, &entry.complete(), algorithm, "*").await?];

        let mut partials = Vec::new();
        if let Some(partial) = entry.partial() {
            let from = release_for(partial.from_buildid.unwrap_or_default());
            partials.push(self.publish(entry, &partial, algorithm, &from).await?);
        }

        let version = entry.ext_version.clone().unwrap_or_else(|| entry.app_version.clone());

        Ok(Submission {
            release_name: release_for(&entry.buildid),
            product: entry.app_name.clone(),
            platform: entry.platform.clone(),
            locale: entry.locale.clone(),
            hash_function: algorithm,
            build: BuildData {
                build_id: entry.buildid.clone(),
                app_version: entry.app_version.clone(),
                display_version: entry.app_version.clone(),
                platform_version: version,
                completes,
                partials,
            },
        })
    }

    /// Fetch, verify and store one update file
    async fn publish(
        &self,
        entry: &ManifestEntry,
        file: &UpdateFile<'_>,
        algorithm: HashAlgorithm,
        from: &str,
    ) -> Result<UpdatePatch> {
        let data = self.fetcher.fetch_artifact(file.url).await?;

        let actual = get_hash(&data, algorithm);
        if !actual.eq_ignore_ascii_case(file.hash) {
            return Err(WorkerError::HashMismatch {
                url: file.url.to_string(),
                algorithm: algorithm.to_string(),
                expected: file.hash.to_string(),
                actual,
            });
        }

        let filesize = data.len() as u64;
        if filesize != file.size {
            warn!(url = file.url, expected = file.size, actual = filesize, "Artifact size differs from manifest");
        }

        let file_url = match &self.storage {
            Some(storage) => {
                let key = entry.storage_key(file);
                let meta = storage.upload_unique(&key, data, self.config.max_suffix).await?;
                if meta.reused {
                    self.metrics.artifact_reused();
                } else {
                    self.metrics.artifact_uploaded();
                }
                storage.public_url(&meta.key)
            }
            None => {
                debug!(url = file.url, "S3 disabled, keeping source URL");
                file.url.to_string()
            }
        };

        Ok(UpdatePatch {
            from: from.to_string(),
            filesize,
            hash_value: actual,
            file_url,
        })
    }
}
