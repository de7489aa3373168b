//! End-to-end client setup: tiller running, tunnel open, server healthy,
//! local chart repositories ready.

use std::sync::Arc;

use pkg_client::{
    ChartDownloader, ChartLoader, ClusterApi, ControlPlaneInstaller, DependencyManager,
    IndexDownloader, RpcConnector, TunnelEstablisher,
};
use pkg_console::Console;
use pkg_constants::repository::STABLE_REPO_CACHE;
use pkg_types::config::ClientConfig;
use pkg_types::home::HelmHome;
use pkg_types::rbac::AccessGrant;
use pkg_types::tunnel::Tunnel;
use pkg_types::{Error, ResourceKind, Result};
use tracing::{info, warn};

use crate::access::AccessBootstrapper;
use crate::control_plane::{ControlPlaneSupervisor, Rollout};
use crate::release::ReleaseReconciler;
use crate::repository::RepositoryIndexSyncer;

/// Implementations of every remote system a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub cluster: Arc<dyn ClusterApi>,
    pub installer: Arc<dyn ControlPlaneInstaller>,
    pub tunnels: Arc<dyn TunnelEstablisher>,
    pub connector: Arc<dyn RpcConnector>,
    pub charts: Arc<dyn ChartLoader>,
    pub dependencies: Arc<dyn DependencyManager>,
    pub downloader: Arc<dyn ChartDownloader>,
    pub indexes: Arc<dyn IndexDownloader>,
}

/// A connected client. Dropping it without `close` leaves the tunnel open.
pub struct HelmSession {
    config: ClientConfig,
    rollout: Rollout,
    tunnel: Tunnel,
    tunnels: Arc<dyn TunnelEstablisher>,
    reconciler: ReleaseReconciler,
}

impl HelmSession {
    pub async fn connect(
        config: ClientConfig,
        parts: Collaborators,
        console: Console,
        upgrade: bool,
    ) -> Result<Self> {
        let supervisor = ControlPlaneSupervisor::new(
            parts.cluster.clone(),
            parts.installer.clone(),
            parts.tunnels.clone(),
            &config,
            console.clone(),
        );
        let instance = config.instance();

        let rollout = supervisor.ensure_running(&instance, upgrade).await?;
        let tunnel = supervisor.open_tunnel(&instance).await?;

        let connected = async {
            let rpc = parts
                .connector
                .connect(&tunnel.address(), config.wait.interval)
                .await
                .map_err(|e| Error::remote(format!("connect to tiller at {}", tunnel.address()), e))?;
            supervisor
                .await_healthy(rpc.as_ref(), config.wait.timeout, config.wait.interval)
                .await?;
            prepare_home(&config.home, parts.indexes.clone()).await?;
            Ok::<_, Error>(rpc)
        }
        .await;

        let rpc = match connected {
            Ok(rpc) => rpc,
            Err(e) => {
                if let Err(close) = parts.tunnels.close(&tunnel).await {
                    warn!(local_port = tunnel.local_port, error = %close, "Failed to close tunnel");
                }
                return Err(e);
            }
        };

        info!(
            namespace = %instance.namespace,
            local_port = tunnel.local_port,
            "Connected to tiller"
        );

        let reconciler = ReleaseReconciler::new(
            rpc,
            parts.charts,
            parts.dependencies,
            parts.downloader,
            config.home.clone(),
            config.deploy_timeout,
        );

        Ok(Self {
            config,
            rollout,
            tunnel,
            tunnels: parts.tunnels,
            reconciler,
        })
    }

    pub fn reconciler(&self) -> &ReleaseReconciler {
        &self.reconciler
    }

    pub fn tunnel(&self) -> &Tunnel {
        &self.tunnel
    }

    pub fn home(&self) -> &HelmHome {
        &self.config.home
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// States tiller went through while this session was connecting.
    pub fn rollout(&self) -> &Rollout {
        &self.rollout
    }

    pub async fn close(self) -> Result<()> {
        self.tunnels.close(&self.tunnel).await.map_err(|e| {
            Error::cluster(
                ResourceKind::Tunnel,
                &self.tunnel.remote_namespace,
                &self.tunnel.remote_service_name,
                e,
            )
        })
    }

    /// Remove tiller, its service account, and both standard grants.
    pub async fn teardown(cluster: Arc<dyn ClusterApi>, config: &ClientConfig) -> Result<()> {
        let identity = config.identity();
        let grants = [
            AccessGrant::config_manager(&identity),
            AccessGrant::operator(&config.release_namespace, &identity),
        ];
        AccessBootstrapper::new(cluster)
            .teardown(&config.instance(), &identity, &grants)
            .await
    }
}

/// Home layout and registry; the stable index is fetched on first use only.
async fn prepare_home(home: &HelmHome, indexes: Arc<dyn IndexDownloader>) -> Result<()> {
    let syncer = RepositoryIndexSyncer::new(indexes, home.clone());
    syncer.ensure_registry()?;

    if home.resolve(STABLE_REPO_CACHE).exists() {
        return Ok(());
    }
    // Sync failures are logged by the syncer and do not stop the session.
    syncer.sync_all(&home.repository_file()).await?;
    Ok(())
}
