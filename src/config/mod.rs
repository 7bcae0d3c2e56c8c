//! Runtime configuration for the worker
//!
//! Every setting is resolved from, in order of priority:
//! 1. Command-line flag (`--balrog-api-root`, ...)
//! 2. Environment variable (`BALROG_API_ROOT`, ...)
//! 3. Built-in default, or an error if the setting is required
//!
//! # Usage
//!
//! ```no_run
//! use balrogworker::config::verify_args;
//!
//! let config = verify_args(["--taskdef", "task.json", "--disable-s3"])
//!     .expect("Failed to resolve configuration");
//! println!("Submitting to: {}", config.api_root);
//! ```
//!
//! # Environment Variables
//!
//! - `BALROG_API_ROOT`, `BALROG_USERNAME`, `BALROG_PASSWORD`
//! - `S3_BUCKET`, `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`
//!
//! The S3 settings are only required when uploads are enabled.
//!
//! Lookups go through [`EnvLookup`], so callers (and tests) can resolve against
//! any key-value source with [`verify_args_with_env`].

mod models;
mod sources;
mod validation;

pub use models::{LogLevel, ResolvedConfig, S3Credentials};
pub use sources::{EnvLookup, Origin, ProcessEnv, Resolved, Setting, Source, resolve_layered};

use crate::cli::Cli;
use clap::Parser;
use sources::{
    AWS_KEY_ID, AWS_KEY_SECRET, BALROG_API_ROOT, BALROG_PASSWORD, BALROG_USERNAME, Layered,
    S3_BUCKET, TASKDEF,
};
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

/// Program name prepended to argument lists before parsing
const PROGRAM_NAME: &str = "balrogworker";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting '{setting}': {hint}")]
    MissingRequiredSetting { setting: &'static str, hint: String },

    #[error("Invalid arguments: {0}")]
    ArgumentError(String),
}

impl ConfigError {
    fn missing(setting: &Setting) -> Self {
        ConfigError::MissingRequiredSetting {
            setting: setting.name,
            hint: setting.hint(),
        }
    }
}

impl From<clap::Error> for ConfigError {
    fn from(err: clap::Error) -> Self {
        ConfigError::ArgumentError(err.to_string())
    }
}

/// Resolve `argv` (without the program name) against the process environment
pub fn verify_args<I, T>(argv: I) -> Result<ResolvedConfig, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    verify_args_with_env(argv, &ProcessEnv)
}

/// Resolve `argv` (without the program name) against `env`
pub fn verify_args_with_env<I, T>(argv: I, env: &dyn EnvLookup) -> Result<ResolvedConfig, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = std::iter::once(OsString::from(PROGRAM_NAME))
        .chain(argv.into_iter().map(Into::into));
    let cli = Cli::try_parse_from(args)?;
    resolve(&cli, env)
}

/// Apply layered precedence to already-parsed CLI flags
pub fn resolve(cli: &Cli, env: &dyn EnvLookup) -> Result<ResolvedConfig, ConfigError> {
    let mut layered = Layered::new(env);

    let mut required = |setting: &Setting, value: Option<&str>| {
        layered
            .lookup(setting, value)
            .ok_or_else(|| ConfigError::missing(setting))
    };

    let taskdef = PathBuf::from(required(&TASKDEF, cli.taskdef.as_deref())?);
    let api_root = required(&BALROG_API_ROOT, cli.balrog_api_root.as_deref())?;
    let balrog_username = required(&BALROG_USERNAME, cli.balrog_username.as_deref())?;
    let balrog_password = required(&BALROG_PASSWORD, cli.balrog_password.as_deref())?;

    let s3_bucket = layered.lookup(&S3_BUCKET, cli.s3_bucket.as_deref());
    let aws_key_id = layered.lookup(&AWS_KEY_ID, cli.aws_access_key_id.as_deref());
    let aws_key_secret = layered.lookup(&AWS_KEY_SECRET, cli.aws_secret_access_key.as_deref());

    let flag_origin = |set: bool| if set { Origin::Cli } else { Origin::Default };
    layered.record("disable_s3", flag_origin(cli.disable_s3));
    layered.record("dummy", flag_origin(cli.dummy));
    layered.record("loglevel", flag_origin(cli.verbose || cli.quiet));

    let config = ResolvedConfig {
        taskdef,
        api_root,
        balrog_username,
        balrog_password,
        s3_bucket,
        aws_key_id,
        aws_key_secret,
        disable_s3: cli.disable_s3,
        dummy: cli.dummy,
        loglevel: LogLevel::from_flags(cli.verbose, cli.quiet),
        origins: layered.into_origins(),
    };

    validation::validate(&config)?;
    Ok(config)
}
