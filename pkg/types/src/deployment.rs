use pkg_constants::tiller;
use serde::{Deserialize, Serialize};

// --- Deployment status ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    /// Pods currently created for the deployment
    pub replicas: u32,
    pub ready_replicas: u32,
}

// --- Deployment ---

/// The slice of a remote deployment the bootstrapper looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub name: String,
    pub namespace: String,
    /// Desired replica count from the spec
    pub replicas: u32,
    #[serde(default)]
    pub status: DeploymentStatus,
}

impl Deployment {
    /// Every desired replica reports ready.
    pub fn is_ready(&self) -> bool {
        self.status.ready_replicas == self.replicas
    }
}

// --- Control plane ---

/// The tiller deployment the supervisor keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPlaneInstance {
    pub namespace: String,
    pub deployment_name: String,
    pub service_name: String,
    pub service_account: String,
    pub desired_image: String,
    pub max_history: u32,
}

impl ControlPlaneInstance {
    /// Standard tiller in `namespace`.
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            deployment_name: tiller::DEPLOYMENT_NAME.to_string(),
            service_name: tiller::SERVICE_NAME.to_string(),
            service_account: tiller::SERVICE_ACCOUNT.to_string(),
            desired_image: tiller::DEFAULT_IMAGE.to_string(),
            max_history: tiller::MAX_HISTORY,
        }
    }

    pub fn with_image(mut self, image: &str) -> Self {
        self.desired_image = image.to_string();
        self
    }
}
