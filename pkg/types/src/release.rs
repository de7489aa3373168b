use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use pkg_constants::repository::ANY_CHART_VERSION;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use crate::error::{Error, Result};

/// Value overrides handed to the release server.
pub type Values = Mapping;

// --- Chart reference ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartReference {
    /// Chart directory or archive on the local filesystem
    Path(PathBuf),
    /// `repo/chart` resolved through the configured repositories
    Repository {
        name: String,
        /// Semver constraint; empty means any version
        #[serde(default)]
        version: String,
    },
}

impl ChartReference {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ChartReference::Path(path.into())
    }

    pub fn repository(name: &str, version: &str) -> Self {
        ChartReference::Repository {
            name: name.to_string(),
            version: version.to_string(),
        }
    }
}

/// Version constraint to download with; an empty constraint accepts any release.
pub fn version_constraint(version: &str) -> &str {
    if version.trim().is_empty() {
        ANY_CHART_VERSION
    } else {
        version
    }
}

// --- Desired release ---

#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub name: String,
    pub namespace: String,
    pub chart: ChartReference,
    pub values: Option<Values>,
    /// Install/upgrade timeout; `None` uses the client's configured deploy timeout
    pub timeout: Option<Duration>,
}

impl Release {
    pub fn new(name: &str, namespace: &str, chart: ChartReference) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            chart,
            values: None,
            timeout: None,
        }
    }

    pub fn with_values(mut self, values: Values) -> Self {
        self.values = Some(values);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }

    /// YAML override payload; no overrides yield an explicit empty payload.
    pub fn values_payload(&self) -> Result<String> {
        match &self.values {
            None => Ok(String::new()),
            Some(values) if values.is_empty() => Ok(String::new()),
            Some(values) => serde_yaml::to_string(values).map_err(|e| {
                Error::config(format!("cannot encode values of release {}: {}", self.name, e))
            }),
        }
    }
}

// --- Observed release ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseStatus {
    Unknown,
    Deployed,
    Deleted,
    Superseded,
    Failed,
    Deleting,
    PendingInstall,
    PendingUpgrade,
    PendingRollback,
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReleaseStatus::Unknown => "UNKNOWN",
            ReleaseStatus::Deployed => "DEPLOYED",
            ReleaseStatus::Deleted => "DELETED",
            ReleaseStatus::Superseded => "SUPERSEDED",
            ReleaseStatus::Failed => "FAILED",
            ReleaseStatus::Deleting => "DELETING",
            ReleaseStatus::PendingInstall => "PENDING_INSTALL",
            ReleaseStatus::PendingUpgrade => "PENDING_UPGRADE",
            ReleaseStatus::PendingRollback => "PENDING_ROLLBACK",
        };
        f.write_str(s)
    }
}

/// A release as reported by the release server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub name: String,
    pub namespace: String,
    pub revision: u32,
    pub status: ReleaseStatus,
    #[serde(default)]
    pub chart: Option<String>,
}

/// Uninstall response, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRecord {
    pub release: Option<ReleaseRecord>,
    #[serde(default)]
    pub info: String,
}

// --- Request options ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    pub release_name: String,
    pub values: String,
    pub timeout: Duration,
    pub reuse_name: bool,
    pub wait: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOptions {
    pub values: String,
    pub timeout: Duration,
    pub reuse_values: bool,
    pub wait: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub purge: bool,
}
