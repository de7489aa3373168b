use std::sync::Arc;

use pkg_client::{ApiError, ApiResult, ClusterApi};
use pkg_types::deployment::ControlPlaneInstance;
use pkg_types::rbac::{AccessGrant, ClusterIdentity};
use pkg_types::{Error, ResourceKind, Result, TeardownFailure};
use tracing::{debug, info, warn};

/// Creates the service account and role grants tiller needs, and removes them.
///
/// Every operation is safe to repeat: existing objects are left alone and
/// "already exists" on create counts as success.
pub struct AccessBootstrapper {
    cluster: Arc<dyn ClusterApi>,
}

impl AccessBootstrapper {
    pub fn new(cluster: Arc<dyn ClusterApi>) -> Self {
        Self { cluster }
    }

    /// Create `identity` unless it exists. Returns whether it was created.
    pub async fn ensure_identity(&self, identity: &ClusterIdentity) -> Result<bool> {
        let (ns, name) = (identity.namespace.as_str(), identity.name.as_str());
        match self.cluster.get_service_account(ns, name).await {
            Ok(_) => {
                debug!(namespace = %ns, name = %name, "Service account already present");
                Ok(false)
            }
            Err(ApiError::NotFound) => match self.cluster.create_service_account(identity).await {
                Ok(()) => {
                    info!(namespace = %ns, name = %name, "Created service account");
                    Ok(true)
                }
                // Someone else created it between our lookup and create.
                Err(ApiError::AlreadyExists) => Ok(false),
                Err(e) => Err(e.for_resource(ResourceKind::ServiceAccount, ns, name)),
            },
            Err(e) => Err(e.for_resource(ResourceKind::ServiceAccount, ns, name)),
        }
    }

    /// Create the grant's role and binding.
    ///
    /// If the binding cannot be created, a role created by this call is
    /// removed again so the pair never exists half-way.
    pub async fn ensure_grant(&self, grant: &AccessGrant) -> Result<()> {
        let ns = grant.namespace.as_str();
        let role = grant.role();
        let role_created = match self.cluster.create_role(&role).await {
            Ok(()) => true,
            Err(ApiError::AlreadyExists) => false,
            Err(e) => return Err(e.for_resource(ResourceKind::Role, ns, &role.name)),
        };

        let binding = grant.role_binding();
        match self.cluster.create_role_binding(&binding).await {
            Ok(()) | Err(ApiError::AlreadyExists) => {
                info!(
                    namespace = %ns,
                    role = %role.name,
                    subject = %grant.subject.name,
                    "Access grant in place"
                );
                Ok(())
            }
            Err(e) => {
                if role_created
                    && let Err(rollback) = self.cluster.delete_role(ns, &role.name).await
                {
                    warn!(
                        namespace = %ns,
                        role = %role.name,
                        error = %rollback,
                        "Failed to roll back role after binding creation failed"
                    );
                }
                Err(e.for_resource(ResourceKind::RoleBinding, ns, &binding.name))
            }
        }
    }

    /// Delete the tiller deployment, `identity`, and every role and binding of
    /// `grants`. Keeps going past failures and reports all of them at once.
    pub async fn teardown(
        &self,
        instance: &ControlPlaneInstance,
        identity: &ClusterIdentity,
        grants: &[AccessGrant],
    ) -> Result<()> {
        let mut targets = vec![
            (
                ResourceKind::Deployment,
                instance.namespace.clone(),
                instance.deployment_name.clone(),
            ),
            (
                ResourceKind::ServiceAccount,
                identity.namespace.clone(),
                identity.name.clone(),
            ),
        ];
        for grant in grants {
            targets.push((ResourceKind::Role, grant.namespace.clone(), grant.name.clone()));
            targets.push((
                ResourceKind::RoleBinding,
                grant.namespace.clone(),
                grant.binding_name(),
            ));
        }

        let mut failures = Vec::new();
        for (kind, namespace, name) in targets {
            if let Err(e) = self.delete(kind, &namespace, &name).await {
                warn!(kind = %kind, namespace = %namespace, name = %name, error = %e, "Delete failed");
                failures.push(TeardownFailure {
                    kind,
                    namespace,
                    name,
                    message: e.to_string(),
                });
            }
        }

        if failures.is_empty() {
            info!(namespace = %instance.namespace, "Tiller and its access grants removed");
            Ok(())
        } else {
            Err(Error::PartialTeardown(failures))
        }
    }

    async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str) -> ApiResult<()> {
        match kind {
            ResourceKind::Deployment => self.cluster.delete_deployment(namespace, name).await,
            ResourceKind::ServiceAccount => {
                self.cluster.delete_service_account(namespace, name).await
            }
            ResourceKind::Role => self.cluster.delete_role(namespace, name).await,
            ResourceKind::RoleBinding => self.cluster.delete_role_binding(namespace, name).await,
            other => Err(ApiError::Other(anyhow::anyhow!(
                "{} is not a cluster resource",
                other
            ))),
        }
    }
}
