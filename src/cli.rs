use clap::Parser;

/// Raw command-line surface.
///
/// Every setting with an environment fallback is optional here; precedence and
/// required-ness are decided by [`crate::config::verify_args`].
#[derive(Parser, Debug, Default)]
#[command(name = "balrogworker")]
#[command(about = "Upload release artifacts to S3 and submit them to Balrog", long_about = None)]
pub struct Cli {
    /// Path to the task definition JSON document
    #[arg(long, value_name = "FILE")]
    pub taskdef: Option<String>,

    /// Balrog API root URL (falls back to BALROG_API_ROOT)
    #[arg(long, value_name = "URL")]
    pub balrog_api_root: Option<String>,

    /// Balrog username (falls back to BALROG_USERNAME)
    #[arg(long)]
    pub balrog_username: Option<String>,

    /// Balrog password (falls back to BALROG_PASSWORD)
    #[arg(long)]
    pub balrog_password: Option<String>,

    /// S3 bucket for artifact uploads (falls back to S3_BUCKET)
    #[arg(long)]
    pub s3_bucket: Option<String>,

    /// AWS access key id (falls back to AWS_ACCESS_KEY_ID)
    #[arg(long)]
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key (falls back to AWS_SECRET_ACCESS_KEY)
    #[arg(long)]
    pub aws_secret_access_key: Option<String>,

    /// Skip S3 uploads; S3 settings become optional
    #[arg(long)]
    pub disable_s3: bool,

    /// Build Balrog submissions without sending them
    #[arg(long)]
    pub dummy: bool,

    /// Log at DEBUG level
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Log at WARNING level
    #[arg(short, long)]
    pub quiet: bool,
}
