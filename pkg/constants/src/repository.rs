//! Chart repository defaults.

/// Name of the repository written on first run.
pub const STABLE_REPO_NAME: &str = "stable";

/// URL of the default public repository.
pub const STABLE_REPO_URL: &str = "https://kubernetes-charts.storage.googleapis.com";

/// Index cache of the default repository, relative to the helm home.
pub const STABLE_REPO_CACHE: &str = "repository/cache/stable-index.yaml";

/// `apiVersion` written into a fresh registry file.
pub const REPOSITORY_FILE_API_VERSION: &str = "v1";

/// Version constraint used when a chart is requested without one.
pub const ANY_CHART_VERSION: &str = ">0.0.0-0";
