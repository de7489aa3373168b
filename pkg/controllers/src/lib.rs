//! Bootstrap and reconciliation logic for the tiller release server.

pub mod access;
pub mod control_plane;
pub mod poll;
pub mod release;
pub mod repository;
pub mod session;

#[cfg(test)]
mod testing;

pub use access::AccessBootstrapper;
pub use control_plane::{ControlPlaneState, ControlPlaneSupervisor, Rollout};
pub use release::ReleaseReconciler;
pub use repository::{RepositoryIndexSyncer, SyncOutcome};
pub use session::{Collaborators, HelmSession};
