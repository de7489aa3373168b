use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pkg_types::chart::Chart;
use pkg_types::release::{
    DeleteOptions, DeleteRecord, InstallOptions, ReleaseRecord, UpgradeOptions,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    /// The server has no history for the release
    #[error("release: \"{0}\" not found")]
    ReleaseNotFound(String),
    #[error(transparent)]
    Remote(#[from] anyhow::Error),
}

impl RpcError {
    /// Map a raw server message for `release` onto the error variants.
    ///
    /// The release server reports missing releases only through its message text.
    pub fn classify(release: &str, message: &str) -> Self {
        let needle = format!("release: \"{}\" not found", release);
        if message.contains(&needle) {
            RpcError::ReleaseNotFound(release.to_string())
        } else {
            RpcError::Remote(anyhow::anyhow!("{}", message))
        }
    }

    pub fn is_release_not_found(&self) -> bool {
        matches!(self, RpcError::ReleaseNotFound(_))
    }
}

pub type RpcResult<T> = std::result::Result<T, RpcError>;

/// Client of the release server, reached through the tunnel.
#[async_trait]
pub trait ReleaseRpc: Send + Sync {
    async fn list(&self, limit: usize) -> RpcResult<Vec<ReleaseRecord>>;

    /// Newest-first revisions of `name`, at most `max`.
    async fn history(&self, name: &str, max: usize) -> RpcResult<Vec<ReleaseRecord>>;

    async fn install(
        &self,
        chart: &Chart,
        namespace: &str,
        opts: &InstallOptions,
    ) -> RpcResult<ReleaseRecord>;

    async fn upgrade(
        &self,
        name: &str,
        chart_path: &Path,
        opts: &UpgradeOptions,
    ) -> RpcResult<ReleaseRecord>;

    async fn delete(&self, name: &str, opts: &DeleteOptions) -> RpcResult<DeleteRecord>;
}

/// Builds a release client for a `host:port`.
#[async_trait]
pub trait RpcConnector: Send + Sync {
    async fn connect(
        &self,
        host: &str,
        connect_timeout: Duration,
    ) -> anyhow::Result<Arc<dyn ReleaseRpc>>;
}
