use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pkg_types::chart::Chart;
use pkg_types::home::HelmHome;
use pkg_types::repository::RepositoryEntry;

/// Reads a chart directory or archive into memory.
#[async_trait]
pub trait ChartLoader: Send + Sync {
    async fn load(&self, path: &Path) -> anyhow::Result<Chart>;
}

/// Fetches the subcharts a chart's requirements name into its `charts/` dir.
#[async_trait]
pub trait DependencyManager: Send + Sync {
    async fn update(&self, chart_path: &Path, home: &HelmHome) -> anyhow::Result<()>;
}

/// Downloads `repo/chart` matching a version constraint.
#[async_trait]
pub trait ChartDownloader: Send + Sync {
    /// Store the archive in `dest` and return its path.
    async fn download_to(
        &self,
        name: &str,
        version: &str,
        dest: &Path,
        home: &HelmHome,
    ) -> anyhow::Result<PathBuf>;
}

/// Refreshes the cached index of one repository.
#[async_trait]
pub trait IndexDownloader: Send + Sync {
    async fn download_index(&self, entry: &RepositoryEntry, home: &HelmHome) -> anyhow::Result<()>;
}
