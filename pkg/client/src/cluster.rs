use async_trait::async_trait;
use pkg_types::deployment::Deployment;
use pkg_types::rbac::{ClusterIdentity, Role, RoleBinding};
use pkg_types::{Error, ResourceKind};
use thiserror::Error;

/// Failure of a single cluster API call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Attach the resource the call was about.
    pub fn for_resource(self, kind: ResourceKind, namespace: &str, name: &str) -> Error {
        match self {
            ApiError::NotFound => Error::not_found(kind, namespace, name),
            ApiError::AlreadyExists => {
                Error::cluster(kind, namespace, name, anyhow::anyhow!("already exists"))
            }
            ApiError::Other(e) => Error::cluster(kind, namespace, name, e),
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Resource API of the remote cluster.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn get_deployment(&self, namespace: &str, name: &str) -> ApiResult<Deployment>;

    async fn get_service_account(&self, namespace: &str, name: &str)
    -> ApiResult<ClusterIdentity>;

    async fn create_service_account(&self, identity: &ClusterIdentity) -> ApiResult<()>;

    async fn create_role(&self, role: &Role) -> ApiResult<()>;

    async fn create_role_binding(&self, binding: &RoleBinding) -> ApiResult<()>;

    async fn delete_deployment(&self, namespace: &str, name: &str) -> ApiResult<()>;

    async fn delete_service_account(&self, namespace: &str, name: &str) -> ApiResult<()>;

    async fn delete_role(&self, namespace: &str, name: &str) -> ApiResult<()>;

    async fn delete_role_binding(&self, namespace: &str, name: &str) -> ApiResult<()>;
}
