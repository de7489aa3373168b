//! Narrow interfaces to the remote systems the bootstrapper drives.
//!
//! Implementations live outside this workspace: a kube-backed `ClusterApi`,
//! a port-forwarding `TunnelEstablisher`, the gRPC release client, and the
//! chart tooling. The core only ever talks to these traits.

pub mod chart;
pub mod cluster;
pub mod installer;
pub mod rpc;
pub mod tunnel;

pub use chart::{ChartDownloader, ChartLoader, DependencyManager, IndexDownloader};
pub use cluster::{ApiError, ApiResult, ClusterApi};
pub use installer::ControlPlaneInstaller;
pub use rpc::{ReleaseRpc, RpcConnector, RpcError, RpcResult};
pub use tunnel::TunnelEstablisher;
