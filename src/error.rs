use crate::balrog::BalrogError;
use crate::config::ConfigError;
use crate::hashing::HashError;
use crate::storage::StorageError;
use crate::task::TaskError;
use crate::worker::http::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Balrog submission failed: {0}")]
    Balrog(#[from] BalrogError),

    #[error("Artifact {url} has {algorithm} digest {actual}, manifest says {expected}")]
    HashMismatch {
        url: String,
        algorithm: String,
        expected: String,
        actual: String,
    },
}

pub type Result<T> = std::result::Result<T, WorkerError>;
