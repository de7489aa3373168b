use std::path::Path;

use chrono::{DateTime, Utc};
use pkg_constants::repository::{
    REPOSITORY_FILE_API_VERSION, STABLE_REPO_CACHE, STABLE_REPO_NAME, STABLE_REPO_URL,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One configured chart repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEntry {
    pub name: String,
    pub url: String,
    /// Index cache file, relative to the helm home unless absolute
    #[serde(default)]
    pub cache: String,
    #[serde(default)]
    pub ca_file: String,
    #[serde(default)]
    pub cert_file: String,
    #[serde(default)]
    pub key_file: String,
}

/// The repository registry (`repositories.yaml`).
///
/// Example:
/// ```yaml
/// apiVersion: v1
/// repositories:
/// - name: stable
///   url: https://kubernetes-charts.storage.googleapis.com
///   cache: repository/cache/stable-index.yaml
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryFile {
    pub api_version: String,
    #[serde(default)]
    pub generated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,
}

impl RepositoryFile {
    /// Registry holding only the public stable repository.
    pub fn with_stable() -> Self {
        Self {
            api_version: REPOSITORY_FILE_API_VERSION.to_string(),
            generated: Some(Utc::now()),
            repositories: vec![RepositoryEntry {
                name: STABLE_REPO_NAME.to_string(),
                url: STABLE_REPO_URL.to_string(),
                cache: STABLE_REPO_CACHE.to_string(),
                ..Default::default()
            }],
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "cannot read repository file {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "malformed repository file {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Write the stable-only registry if `path` does not exist yet.
    /// Returns whether a file was written.
    pub fn write_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Self::with_stable().save(path)?;
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<&RepositoryEntry> {
        self.repositories.iter().find(|r| r.name == name)
    }
}
