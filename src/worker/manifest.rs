//! Artifact manifest published by the parent task
//!
//! `manifest.json` is a list of entries, one per platform/locale update:
//!
//! ```json
//! [{
//!   "appName": "Firefox",
//!   "appVersion": "52.0a1",
//!   "branch": "mozilla-central",
//!   "buildid": "20161101030203",
//!   "platform": "linux64",
//!   "locale": "en-US",
//!   "hashType": "sha512",
//!   "extVersion": "52.0a1",
//!   "to_mar": "https://queue.example.com/.../target.complete.mar",
//!   "to_hash": "…",
//!   "to_size": 53821112
//! }]
//! ```
//!
//! Partial updates additionally carry `from_mar`, `from_hash`, `from_size` and
//! `from_buildid`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "appName")]
    pub app_name: String,
    #[serde(rename = "appVersion")]
    pub app_version: String,
    pub branch: String,
    pub buildid: String,
    pub platform: String,
    pub locale: String,
    #[serde(rename = "hashType", default = "default_hash_type")]
    pub hash_type: String,
    #[serde(rename = "extVersion", default)]
    pub ext_version: Option<String>,
    pub to_mar: String,
    pub to_hash: String,
    pub to_size: u64,
    #[serde(default)]
    pub from_mar: Option<String>,
    #[serde(default)]
    pub from_hash: Option<String>,
    #[serde(default)]
    pub from_size: Option<u64>,
    #[serde(default)]
    pub from_buildid: Option<String>,
}

fn default_hash_type() -> String {
    "sha512".to_string()
}

/// One update file named by a manifest entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFile<'a> {
    pub url: &'a str,
    pub hash: &'a str,
    pub size: u64,
    /// Build the partial applies on top of; `None` for a complete update
    pub from_buildid: Option<&'a str>,
}

impl ManifestEntry {
    pub fn complete(&self) -> UpdateFile<'_> {
        UpdateFile {
            url: &self.to_mar,
            hash: &self.to_hash,
            size: self.to_size,
            from_buildid: None,
        }
    }

    /// The partial update, when the entry names all of its parts
    pub fn partial(&self) -> Option<UpdateFile<'_>> {
        Some(UpdateFile {
            url: self.from_mar.as_deref()?,
            hash: self.from_hash.as_deref()?,
            size: self.from_size?,
            from_buildid: Some(self.from_buildid.as_deref()?),
        })
    }

    /// Storage key for an update file of this entry
    pub fn storage_key(&self, file: &UpdateFile<'_>) -> String {
        let file_name = file
            .url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .rsplit('/')
            .next()
            .unwrap_or_default();

        format!(
            "{}/{}/{}/{}/{}/{}",
            self.app_name.to_lowercase(),
            self.branch,
            self.buildid,
            self.platform,
            self.locale,
            file_name
        )
    }
}
