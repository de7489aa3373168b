//! Error taxonomy shared by every crate in the workspace.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Kind of remote (or local) object an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Deployment,
    ServiceAccount,
    Role,
    RoleBinding,
    Tunnel,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Deployment => "deployment",
            ResourceKind::ServiceAccount => "serviceaccount",
            ResourceKind::Role => "role",
            ResourceKind::RoleBinding => "rolebinding",
            ResourceKind::Tunnel => "tunnel",
        };
        f.write_str(s)
    }
}

/// One deletion that failed during teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownFailure {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
    pub message: String,
}

impl fmt::Display for TeardownFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}: {}",
            self.kind, self.namespace, self.name, self.message
        )
    }
}

fn join_failures(failures: &[TeardownFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Main error type for bootstrap and release operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Remote object is absent. Callers branch on this, it is not a failure by itself.
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },

    /// A bounded wait ran out
    #[error("timed out after {elapsed:?} waiting for {what}")]
    Timeout { what: String, elapsed: Duration },

    /// Cluster API call failed for a specific resource
    #[error("{kind} {namespace}/{name}: {source}")]
    Cluster {
        kind: ResourceKind,
        namespace: String,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Release server or transport failure, propagated as received
    #[error("{context}: {source}")]
    Remote {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    /// Several independent deletions failed during cleanup
    #[error("teardown failed for {} resource(s):\n{}", .0.len(), join_failures(.0))]
    PartialTeardown(Vec<TeardownFailure>),

    /// Missing or unreadable local files, malformed payloads
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid resource names and similar input problems
    #[error("validation error: {0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub fn not_found(kind: ResourceKind, namespace: &str, name: &str) -> Self {
        Self::NotFound {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn timeout(what: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            elapsed,
        }
    }

    pub fn cluster(
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Cluster {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
            source: source.into(),
        }
    }

    pub fn remote(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Remote {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for the not-found variant, regardless of resource kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
