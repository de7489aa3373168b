//! Tiller control-plane constants.

/// Service account tiller runs as.
pub const SERVICE_ACCOUNT: &str = "devspace-tiller";

/// Name of the tiller deployment.
pub const DEPLOYMENT_NAME: &str = "tiller-deploy";

/// Name of the tiller service the tunnel forwards to.
pub const SERVICE_NAME: &str = "tiller-deploy";

/// Image installed on first bootstrap.
pub const DEFAULT_IMAGE: &str = "gcr.io/kubernetes-helm/tiller:v2.9.1";

/// Release revisions tiller keeps per release.
pub const MAX_HISTORY: u32 = 10;

/// Namespace tiller is installed into when the config names none.
pub const DEFAULT_NAMESPACE: &str = "kube-system";

/// Namespace releases land in when the config names none.
pub const DEFAULT_RELEASE_NAMESPACE: &str = "default";

/// Local address the tunnel listens on.
pub const TUNNEL_HOST: &str = "127.0.0.1";
