pub mod balrog;
pub mod cli;
pub mod config;
pub mod error;
pub mod hashing;
pub mod naming;
pub mod observability;
pub mod storage;
pub mod task;
pub mod worker;

pub use error::{Result, WorkerError};
