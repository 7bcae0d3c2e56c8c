use super::ConfigError;
use super::models::ResolvedConfig;
use super::sources::{AWS_KEY_ID, AWS_KEY_SECRET, S3_BUCKET, Setting};

/// Validate the resolved configuration as a whole
pub fn validate(config: &ResolvedConfig) -> Result<(), ConfigError> {
    validate_s3(config)?;
    Ok(())
}

/// S3 settings are required unless uploads are disabled
fn validate_s3(config: &ResolvedConfig) -> Result<(), ConfigError> {
    if config.disable_s3 {
        return Ok(());
    }

    let required: [(&Setting, &Option<String>); 3] = [
        (&S3_BUCKET, &config.s3_bucket),
        (&AWS_KEY_ID, &config.aws_key_id),
        (&AWS_KEY_SECRET, &config.aws_key_secret),
    ];

    for (setting, value) in required {
        if value.is_none() {
            return Err(ConfigError::missing(setting));
        }
    }

    Ok(())
}
