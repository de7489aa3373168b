//! Filesystem path constants for the local helm home.

// ─── Home layout ──────────────────────────────────────────────────────────

/// Helm home, relative to the user's home directory.
pub const HELM_HOME_DIR: &str = ".devspace/helm";

/// Repository directory inside the helm home.
pub const REPOSITORY_DIR: &str = "repository";

/// Registry file listing all configured chart repositories.
/// Full path = `<helm home>/REPOSITORY_DIR/REPOSITORY_FILE`.
pub const REPOSITORY_FILE: &str = "repositories.yaml";

/// Directory holding downloaded repository indexes, relative to the helm home.
pub const REPOSITORY_CACHE_DIR: &str = "repository/cache";

/// Directory where charts downloaded by name are archived.
pub const ARCHIVE_DIR: &str = "archive";

/// General-purpose cache directory.
pub const CACHE_DIR: &str = "cache";

// ─── Client config ────────────────────────────────────────────────────────

/// Default client config file, relative to the user's home directory.
pub const DEFAULT_CLIENT_CONFIG: &str = ".devspace/config.yaml";
