use pkg_constants::rbac::{
    ALL, BINDING_SUFFIX, CONFIG_MANAGER_GRANT, OPERATOR_GRANT, RBAC_API_GROUP, TILLER_API_GROUPS,
};
use serde::{Deserialize, Serialize};

// --- Policy rules ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// API groups this rule applies to (e.g., "" for core, "*" for all)
    pub api_groups: Vec<String>,
    /// Resource types (e.g., "pods", "configmaps", "*" for all)
    pub resources: Vec<String>,
    /// Allowed verbs (e.g., "get", "list", "create", "update", "delete", "*" for all)
    pub verbs: Vec<String>,
}

impl PolicyRule {
    pub fn new(api_groups: &[&str], resources: &[&str], verbs: &[&str]) -> Self {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        Self {
            api_groups: owned(api_groups),
            resources: owned(resources),
            verbs: owned(verbs),
        }
    }
}

// --- Identity ---

/// A service-account principal tiller runs as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterIdentity {
    pub name: String,
    pub namespace: String,
}

impl ClusterIdentity {
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

// --- Role ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub namespace: String,
    pub rules: Vec<PolicyRule>,
}

// --- Subject ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectKind {
    ServiceAccount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub kind: SubjectKind,
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

// --- RoleBinding ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub api_group: String,
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    pub name: String,
    pub namespace: String,
    pub role_ref: RoleRef,
    pub subjects: Vec<Subject>,
}

// --- Grant ---

/// A role plus the binding that hands it to `subject`.
///
/// Both objects live in `namespace` and are always created and deleted
/// together. The binding is named after the role with a `-binding` suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub name: String,
    pub namespace: String,
    pub rules: Vec<PolicyRule>,
    pub subject: ClusterIdentity,
}

impl AccessGrant {
    /// Lets tiller manage the configmaps it stores release state in.
    pub fn config_manager(subject: &ClusterIdentity) -> Self {
        Self {
            name: CONFIG_MANAGER_GRANT.to_string(),
            namespace: subject.namespace.clone(),
            rules: vec![PolicyRule::new(TILLER_API_GROUPS, &["configmaps"], &[ALL])],
            subject: subject.clone(),
        }
    }

    /// Lets tiller deploy anything into `release_namespace`.
    pub fn operator(release_namespace: &str, subject: &ClusterIdentity) -> Self {
        Self {
            name: OPERATOR_GRANT.to_string(),
            namespace: release_namespace.to_string(),
            rules: vec![PolicyRule::new(TILLER_API_GROUPS, &[ALL], &[ALL])],
            subject: subject.clone(),
        }
    }

    pub fn binding_name(&self) -> String {
        format!("{}{}", self.name, BINDING_SUFFIX)
    }

    pub fn role(&self) -> Role {
        Role {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            rules: self.rules.clone(),
        }
    }

    pub fn role_binding(&self) -> RoleBinding {
        RoleBinding {
            name: self.binding_name(),
            namespace: self.namespace.clone(),
            role_ref: RoleRef {
                api_group: RBAC_API_GROUP.to_string(),
                kind: "Role".to_string(),
                name: self.name.clone(),
            },
            subjects: vec![Subject {
                kind: SubjectKind::ServiceAccount,
                name: self.subject.name.clone(),
                namespace: Some(self.subject.namespace.clone()),
            }],
        }
    }
}
