use async_trait::async_trait;
use pkg_types::tunnel::Tunnel;

/// Opens port forwards to services in the cluster.
#[async_trait]
pub trait TunnelEstablisher: Send + Sync {
    /// Forward a free local port to `service` in `namespace`; returns the port.
    async fn open(&self, namespace: &str, service: &str) -> anyhow::Result<u16>;

    async fn close(&self, tunnel: &Tunnel) -> anyhow::Result<()>;
}
