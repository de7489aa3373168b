//! Access-control names and rule vocabulary.

/// Grant giving tiller access to its release configmaps.
pub const CONFIG_MANAGER_GRANT: &str = "tiller-config-manager";

/// Primary grant letting tiller deploy into the release namespace.
pub const OPERATOR_GRANT: &str = "devspace-tiller";

/// Suffix appended to a grant name to form its role binding name.
pub const BINDING_SUFFIX: &str = "-binding";

/// API group of role references.
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// Wildcard matching every API group, resource, or verb.
pub const ALL: &str = "*";

/// API groups every tiller grant covers.
pub const TILLER_API_GROUPS: &[&str] = &[ALL, "extensions", "apps"];
