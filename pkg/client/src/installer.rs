use async_trait::async_trait;
use pkg_types::deployment::ControlPlaneInstance;

/// Applies the tiller deployment and service manifests.
#[async_trait]
pub trait ControlPlaneInstaller: Send + Sync {
    /// Create deployment and service from scratch.
    async fn install(&self, instance: &ControlPlaneInstance) -> anyhow::Result<()>;

    /// Patch the existing deployment in place (image, max history).
    async fn upgrade(&self, instance: &ControlPlaneInstance) -> anyhow::Result<()>;
}
