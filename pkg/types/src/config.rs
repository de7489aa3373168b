use std::path::{Path, PathBuf};
use std::time::Duration;

use pkg_constants::paths::DEFAULT_CLIENT_CONFIG;
use pkg_constants::{tiller, wait};
use serde::{Deserialize, Serialize};

use crate::deployment::ControlPlaneInstance;
use crate::error::{Error, Result};
use crate::home::HelmHome;
use crate::rbac::ClusterIdentity;
use crate::validate::validate_name;

/// Client configuration file (YAML).
///
/// Example `config.yaml`:
/// ```yaml
/// tiller-namespace: tiller
/// release-namespace: my-app
/// helm-home: /home/dev/.devspace/helm
/// wait-timeout-secs: 120
/// wait-interval-secs: 5
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfigFile {
    #[serde(default, alias = "tiller-namespace")]
    pub tiller_namespace: Option<String>,
    #[serde(default, alias = "release-namespace")]
    pub release_namespace: Option<String>,
    #[serde(default, alias = "helm-home")]
    pub helm_home: Option<String>,
    #[serde(default, alias = "tiller-image")]
    pub tiller_image: Option<String>,
    #[serde(default, alias = "wait-timeout-secs")]
    pub wait_timeout_secs: Option<u64>,
    #[serde(default, alias = "wait-interval-secs")]
    pub wait_interval_secs: Option<u64>,
    #[serde(default, alias = "deploy-timeout-secs")]
    pub deploy_timeout_secs: Option<u64>,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: T = serde_yaml::from_str(&content)
        .map_err(|e| Error::config(format!("malformed config {}: {}", path.display(), e)))?;
    Ok(config)
}

/// Bound and poll interval of a wait loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(wait::DEFAULT_WAIT_TIMEOUT_SECS),
            interval: Duration::from_secs(wait::DEFAULT_WAIT_INTERVAL_SECS),
        }
    }
}

impl WaitConfig {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Resolved client settings, passed explicitly to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub tiller_namespace: String,
    pub release_namespace: String,
    pub home: HelmHome,
    pub tiller_image: String,
    pub wait: WaitConfig,
    pub deploy_timeout: Duration,
}

impl ClientConfig {
    /// Defaults for a helm home rooted at `home`.
    pub fn new(home: HelmHome) -> Self {
        Self {
            tiller_namespace: tiller::DEFAULT_NAMESPACE.to_string(),
            release_namespace: tiller::DEFAULT_RELEASE_NAMESPACE.to_string(),
            home,
            tiller_image: tiller::DEFAULT_IMAGE.to_string(),
            wait: WaitConfig::default(),
            deploy_timeout: Duration::from_secs(wait::DEFAULT_DEPLOY_TIMEOUT_SECS),
        }
    }

    /// Fill unset fields with defaults and validate namespaces.
    pub fn from_file(file: ClientConfigFile) -> Result<Self> {
        let home = match file.helm_home {
            Some(path) => HelmHome::new(path),
            None => HelmHome::under(&user_home()?),
        };
        let mut config = Self::new(home);
        if let Some(ns) = file.tiller_namespace {
            config.tiller_namespace = ns;
        }
        if let Some(ns) = file.release_namespace {
            config.release_namespace = ns;
        }
        if let Some(image) = file.tiller_image {
            config.tiller_image = image;
        }
        if let Some(secs) = file.wait_timeout_secs {
            config.wait.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.wait_interval_secs {
            config.wait.interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.deploy_timeout_secs {
            config.deploy_timeout = Duration::from_secs(secs);
        }
        if config.wait.interval.is_zero() {
            return Err(Error::config("wait-interval-secs must be greater than 0"));
        }
        validate_name(&config.tiller_namespace)?;
        validate_name(&config.release_namespace)?;
        Ok(config)
    }

    /// Load from `path`, or from `~/.devspace/config.yaml` when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match path {
            Some(p) => p.to_path_buf(),
            None => user_home()?.join(DEFAULT_CLIENT_CONFIG),
        };
        let file: ClientConfigFile = load_config_file(&path)?;
        Self::from_file(file)
    }

    /// The tiller deployment this config describes.
    pub fn instance(&self) -> ControlPlaneInstance {
        ControlPlaneInstance::new(&self.tiller_namespace).with_image(&self.tiller_image)
    }

    /// Service account tiller runs as.
    pub fn identity(&self) -> ClusterIdentity {
        ClusterIdentity::new(tiller::SERVICE_ACCOUNT, &self.tiller_namespace)
    }
}

fn user_home() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| Error::config("cannot determine the user's home directory"))
}
