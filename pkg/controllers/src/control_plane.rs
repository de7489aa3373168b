use std::sync::Arc;
use std::time::Duration;

use pkg_client::{ApiError, ClusterApi, ControlPlaneInstaller, ReleaseRpc, TunnelEstablisher};
use pkg_console::Console;
use pkg_types::config::{ClientConfig, WaitConfig};
use pkg_types::deployment::ControlPlaneInstance;
use pkg_types::rbac::{AccessGrant, ClusterIdentity};
use pkg_types::tunnel::Tunnel;
use pkg_types::{Error, ResourceKind, Result};
use tracing::info;

use crate::access::AccessBootstrapper;
use crate::poll::{poll_until, retry_until};

/// Where `ensure_running` is in bringing tiller up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPlaneState {
    Absent,
    Installing,
    Upgrading,
    WaitingReady,
    Ready,
    Failed,
}

/// States visited by one `ensure_running` call, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rollout {
    states: Vec<ControlPlaneState>,
}

impl Rollout {
    fn enter(&mut self, instance: &ControlPlaneInstance, state: ControlPlaneState) {
        info!(
            namespace = %instance.namespace,
            deployment = %instance.deployment_name,
            state = ?state,
            "Tiller state"
        );
        self.states.push(state);
    }

    pub fn states(&self) -> &[ControlPlaneState] {
        &self.states
    }
}

/// Keeps the tiller deployment installed, healthy, and reachable.
pub struct ControlPlaneSupervisor {
    cluster: Arc<dyn ClusterApi>,
    installer: Arc<dyn ControlPlaneInstaller>,
    tunnels: Arc<dyn TunnelEstablisher>,
    access: AccessBootstrapper,
    release_namespace: String,
    wait: WaitConfig,
    console: Console,
}

impl ControlPlaneSupervisor {
    pub fn new(
        cluster: Arc<dyn ClusterApi>,
        installer: Arc<dyn ControlPlaneInstaller>,
        tunnels: Arc<dyn TunnelEstablisher>,
        config: &ClientConfig,
        console: Console,
    ) -> Self {
        Self {
            access: AccessBootstrapper::new(cluster.clone()),
            cluster,
            installer,
            tunnels,
            release_namespace: config.release_namespace.clone(),
            wait: config.wait,
            console,
        }
    }

    /// Install tiller if it is missing, upgrade it in place if asked to, and
    /// wait for the rollout. An existing tiller without `upgrade` is taken as is.
    ///
    /// On timeout the deployment is left untouched for inspection.
    pub async fn ensure_running(
        &self,
        instance: &ControlPlaneInstance,
        upgrade: bool,
    ) -> Result<Rollout> {
        let mut rollout = Rollout::default();

        match self
            .cluster
            .get_deployment(&instance.namespace, &instance.deployment_name)
            .await
        {
            Err(ApiError::NotFound) => {
                rollout.enter(instance, ControlPlaneState::Absent);
                rollout.enter(instance, ControlPlaneState::Installing);
                let spinner = self.console.start_wait("Installing Tiller server");
                self.install(instance).await?;
                spinner.stop();
            }
            Err(e) => {
                return Err(e.for_resource(
                    ResourceKind::Deployment,
                    &instance.namespace,
                    &instance.deployment_name,
                ));
            }
            Ok(_) if upgrade => {
                rollout.enter(instance, ControlPlaneState::Upgrading);
                let spinner = self.console.start_wait("Upgrading Tiller server");
                self.installer.upgrade(instance).await.map_err(|e| {
                    Error::cluster(
                        ResourceKind::Deployment,
                        &instance.namespace,
                        &instance.deployment_name,
                        e,
                    )
                })?;
                spinner.stop();
            }
            Ok(_) => {
                rollout.enter(instance, ControlPlaneState::Ready);
                return Ok(rollout);
            }
        }

        rollout.enter(instance, ControlPlaneState::WaitingReady);
        let spinner = self.console.start_wait("Waiting for Tiller server to start");
        let waited = self.wait_ready(instance).await;
        spinner.stop();

        match waited {
            Ok(()) => {
                rollout.enter(instance, ControlPlaneState::Ready);
                self.console.done("Tiller server started");
                Ok(rollout)
            }
            Err(e) => {
                rollout.enter(instance, ControlPlaneState::Failed);
                self.console.fail("Tiller server did not become ready");
                Err(e)
            }
        }
    }

    async fn install(&self, instance: &ControlPlaneInstance) -> Result<()> {
        let identity = ClusterIdentity::new(&instance.service_account, &instance.namespace);
        self.access.ensure_identity(&identity).await?;
        self.access
            .ensure_grant(&AccessGrant::config_manager(&identity))
            .await?;

        self.installer.install(instance).await.map_err(|e| {
            Error::cluster(
                ResourceKind::Deployment,
                &instance.namespace,
                &instance.deployment_name,
                e,
            )
        })?;

        self.access
            .ensure_grant(&AccessGrant::operator(&self.release_namespace, &identity))
            .await
    }

    async fn wait_ready(&self, instance: &ControlPlaneInstance) -> Result<()> {
        let cluster = &self.cluster;
        let (ns, name) = (instance.namespace.as_str(), instance.deployment_name.as_str());
        poll_until(
            self.wait,
            &format!("deployment {}/{} to become ready", ns, name),
            move || async move {
                let deployment = cluster
                    .get_deployment(ns, name)
                    .await
                    .map_err(|e| e.for_resource(ResourceKind::Deployment, ns, name))?;
                Ok(deployment.is_ready())
            },
        )
        .await
    }

    /// Forward a local port to the tiller service.
    ///
    /// The forward races the tiller pod becoming schedulable, so failed
    /// attempts are retried until the wait bound; the last error is returned.
    pub async fn open_tunnel(&self, instance: &ControlPlaneInstance) -> Result<Tunnel> {
        let tunnels = &self.tunnels;
        let (ns, service) = (instance.namespace.as_str(), instance.service_name.as_str());

        let spinner = self
            .console
            .start_wait("Waiting for tiller portforwarding to become ready");
        let local_port = retry_until(self.wait, "tiller port-forward", move || async move {
            tunnels
                .open(ns, service)
                .await
                .map_err(|e| Error::cluster(ResourceKind::Tunnel, ns, service, e))
        })
        .await?;
        spinner.stop();

        info!(namespace = %ns, service = %service, local_port, "Tunnel to tiller open");
        Ok(Tunnel {
            local_port,
            remote_namespace: ns.to_string(),
            remote_service_name: service.to_string(),
        })
    }

    /// Confirm the release server answers requests, not just that its pod runs.
    pub async fn await_healthy(
        &self,
        client: &dyn ReleaseRpc,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> Result<()> {
        if poll_interval.is_zero() {
            return Err(Error::config("health check poll interval must be greater than 0"));
        }
        let spinner = self
            .console
            .start_wait("Waiting for tiller server to become ready");
        retry_until(
            WaitConfig::new(max_wait, poll_interval),
            "tiller list releases",
            move || async move {
                client
                    .list(1)
                    .await
                    .map(|_| ())
                    .map_err(|e| Error::remote("list releases", e))
            },
        )
        .await?;
        spinner.stop();

        self.console.done("Tiller server is ready");
        Ok(())
    }
}
