//! Balrog release submission
//!
//! Each manifest entry becomes one build submission:
//! `PUT <api_root>/releases/<release>/builds/<platform>/<locale>` with basic
//! auth and a JSON body describing the complete (and optional partial) update.

use crate::config::ResolvedConfig;
use crate::hashing::HashAlgorithm;
use async_trait::async_trait;
use reqwest::{Client, Method, Request};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Balrog blob schema produced by this worker
pub const SCHEMA_VERSION: u32 = 4;

#[derive(Debug, Error)]
pub enum BalrogError {
    #[error("Invalid Balrog URL: {0}")]
    InvalidUrl(String),

    #[error("Balrog request failed: {0}")]
    RequestFailed(String),

    #[error("Balrog rejected submission (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, BalrogError>;

/// One update patch inside a build blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatch {
    pub from: String,
    pub filesize: u64,
    pub hash_value: String,
    pub file_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildData {
    #[serde(rename = "buildID")]
    pub build_id: String,
    pub app_version: String,
    pub display_version: String,
    pub platform_version: String,
    pub completes: Vec<UpdatePatch>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partials: Vec<UpdatePatch>,
}

/// A single platform/locale build destined for a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub release_name: String,
    pub product: String,
    pub platform: String,
    pub locale: String,
    pub hash_function: HashAlgorithm,
    pub build: BuildData,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionBody<'a> {
    product: &'a str,
    hash_function: HashAlgorithm,
    #[serde(rename = "schema_version")]
    schema_version: u32,
    data: &'a BuildData,
}

/// Release name for a build signed on `signing_cert`
pub fn release_name(
    product: &str,
    branch: &str,
    app_version: &str,
    buildid: &str,
    signing_cert: &str,
) -> String {
    match signing_cert {
        "release" => format!("{product}-{app_version}-build{buildid}"),
        _ => format!("{product}-{branch}-nightly-{buildid}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    DryRun,
}

/// Receiver of build submissions
#[async_trait]
pub trait ReleaseSubmitter: Send + Sync {
    async fn submit(&self, submission: &Submission) -> Result<SubmitOutcome>;
}

/// HTTP client for the Balrog admin API
pub struct BalrogClient {
    client: Client,
    api_root: String,
    username: String,
    password: String,
    dummy: bool,
}

impl BalrogClient {
    pub fn new(api_root: &str, username: &str, password: &str, dummy: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| BalrogError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            api_root: api_root.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            dummy,
        })
    }

    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        Self::new(
            &config.api_root,
            &config.balrog_username,
            &config.balrog_password,
            config.dummy,
        )
    }

    pub fn builds_url(&self, submission: &Submission) -> String {
        format!(
            "{}/releases/{}/builds/{}/{}",
            self.api_root, submission.release_name, submission.platform, submission.locale
        )
    }

    /// Build the HTTP request for `submission` without sending it
    pub fn build_request(&self, submission: &Submission) -> Result<Request> {
        let url = self.builds_url(submission);
        let url = reqwest::Url::parse(&url).map_err(|e| BalrogError::InvalidUrl(format!("{url}: {e}")))?;

        let body = SubmissionBody {
            product: &submission.product,
            hash_function: submission.hash_function,
            schema_version: SCHEMA_VERSION,
            data: &submission.build,
        };

        self.client
            .request(Method::PUT, url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .build()
            .map_err(|e| BalrogError::RequestFailed(e.to_string()))
    }
}

#[async_trait]
impl ReleaseSubmitter for BalrogClient {
    async fn submit(&self, submission: &Submission) -> Result<SubmitOutcome> {
        let request = self.build_request(submission)?;

        if self.dummy {
            info!(
                url = %request.url(),
                release = %submission.release_name,
                "Dummy run, not submitting to Balrog"
            );
            return Ok(SubmitOutcome::DryRun);
        }

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| BalrogError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), release = %submission.release_name, "Balrog rejected submission");
            return Err(BalrogError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            release = %submission.release_name,
            platform = %submission.platform,
            locale = %submission.locale,
            "Submitted to Balrog"
        );
        Ok(SubmitOutcome::Submitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;

    fn sample_submission() -> Submission {
        Submission {
            release_name: "Firefox-mozilla-central-nightly-20161101030203".to_string(),
            product: "Firefox".to_string(),
            platform: "linux64".to_string(),
            locale: "en-US".to_string(),
            hash_function: HashAlgorithm::Sha512,
            build: BuildData {
                build_id: "20161101030203".to_string(),
                app_version: "52.0a1".to_string(),
                display_version: "52.0a1".to_string(),
                platform_version: "52.0a1".to_string(),
                completes: vec![UpdatePatch {
                    from: "*".to_string(),
                    filesize: 3,
                    hash_value: "abc".to_string(),
                    file_url: "https://bucket.s3.amazonaws.com/a.mar".to_string(),
                }],
                partials: vec![],
            },
        }
    }

    #[test]
    fn test_release_name() {
        assert_eq!(
            release_name("Firefox", "mozilla-central", "52.0a1", "2016", "nightly"),
            "Firefox-mozilla-central-nightly-2016"
        );
        assert_eq!(
            release_name("Firefox", "mozilla-release", "50.0", "2016", "release"),
            "Firefox-50.0-build2016"
        );
    }

    #[test]
    fn test_build_request() {
        let client = BalrogClient::new("https://balrog.example.com/api/", "ffxbld", "pw", false).unwrap();
        let request = client.build_request(&sample_submission()).unwrap();

        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(
            request.url().as_str(),
            "https://balrog.example.com/api/releases/Firefox-mozilla-central-nightly-20161101030203/builds/linux64/en-US"
        );
        let auth = request.headers().get(AUTHORIZATION).unwrap().to_str().unwrap();
        assert!(auth.starts_with("Basic "));

        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["hashFunction"], "sha512");
        assert_eq!(body["schema_version"], 4);
        assert_eq!(body["data"]["buildID"], "20161101030203");
        assert_eq!(body["data"]["completes"][0]["fileUrl"], "https://bucket.s3.amazonaws.com/a.mar");
        assert!(body["data"].get("partials").is_none());
    }

    #[test]
    fn test_build_request_invalid_root() {
        let client = BalrogClient::new("TEST_API_ROOT", "u", "p", true).unwrap();
        let result = client.build_request(&sample_submission());
        assert!(matches!(result, Err(BalrogError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_dummy_submit_does_not_send() {
        let client = BalrogClient::new("https://balrog.invalid/api", "u", "p", true).unwrap();
        let outcome = client.submit(&sample_submission()).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::DryRun);
    }
}
