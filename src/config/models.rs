use super::sources::Origin;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Logging verbosity, numbered like syslog-style levels (INFO = 20)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn numeric(&self) -> u8 {
        match self {
            LogLevel::Debug => 10,
            LogLevel::Info => 20,
            LogLevel::Warning => 30,
            LogLevel::Error => 40,
        }
    }

    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => LogLevel::Debug,
            (false, true) => LogLevel::Warning,
            (false, false) => LogLevel::Info,
        }
    }

    pub fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Fully resolved worker settings.
///
/// Built once by [`super::verify_args`]; the S3 fields are `None` only when
/// `disable_s3` is set.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub taskdef: PathBuf,
    pub api_root: String,
    pub balrog_username: String,
    pub balrog_password: String,
    pub s3_bucket: Option<String>,
    pub aws_key_id: Option<String>,
    pub aws_key_secret: Option<String>,
    pub disable_s3: bool,
    pub dummy: bool,
    pub loglevel: LogLevel,
    pub(crate) origins: BTreeMap<&'static str, Origin>,
}

impl ResolvedConfig {
    /// Where the named setting was taken from, if it was resolved at all
    pub fn origin(&self, setting: &str) -> Option<Origin> {
        self.origins.get(setting).copied()
    }

    /// S3 credentials, present when uploads are enabled
    pub fn s3_credentials(&self) -> Option<S3Credentials<'_>> {
        if self.disable_s3 {
            return None;
        }
        Some(S3Credentials {
            bucket: self.s3_bucket.as_deref()?,
            key_id: self.aws_key_id.as_deref()?,
            key_secret: self.aws_key_secret.as_deref()?,
        })
    }
}

/// Borrowed view of the S3 settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S3Credentials<'a> {
    pub bucket: &'a str,
    pub key_id: &'a str,
    pub key_secret: &'a str,
}

const REDACTED: &str = "<redacted>";

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("taskdef", &self.taskdef)
            .field("api_root", &self.api_root)
            .field("balrog_username", &self.balrog_username)
            .field("balrog_password", &REDACTED)
            .field("s3_bucket", &self.s3_bucket)
            .field("aws_key_id", &self.aws_key_id)
            .field("aws_key_secret", &self.aws_key_secret.as_ref().map(|_| REDACTED))
            .field("disable_s3", &self.disable_s3)
            .field("dummy", &self.dummy)
            .field("loglevel", &self.loglevel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResolvedConfig {
        ResolvedConfig {
            taskdef: PathBuf::from("t.json"),
            api_root: "R".to_string(),
            balrog_username: "user".to_string(),
            balrog_password: "hunter2".to_string(),
            s3_bucket: Some("bucket".to_string()),
            aws_key_id: Some("key".to_string()),
            aws_key_secret: Some("topsecret".to_string()),
            disable_s3: false,
            dummy: false,
            loglevel: LogLevel::default(),
            origins: BTreeMap::new(),
        }
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(LogLevel::default().numeric(), 20);
        assert_eq!(LogLevel::from_flags(true, false).numeric(), 10);
        assert_eq!(LogLevel::from_flags(false, true), LogLevel::Warning);
        assert_eq!(LogLevel::Error.as_filter(), LevelFilter::ERROR);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains("bucket"));
    }

    #[test]
    fn test_s3_credentials() {
        let mut config = sample();
        let creds = config.s3_credentials().unwrap();
        assert_eq!(creds.bucket, "bucket");
        assert_eq!(creds.key_secret, "topsecret");

        config.disable_s3 = true;
        assert!(config.s3_credentials().is_none());
    }
}
