use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pkg_client::{ChartDownloader, ChartLoader, DependencyManager, ReleaseRpc};
use pkg_types::chart::Chart;
use pkg_types::home::HelmHome;
use pkg_types::release::{
    ChartReference, DeleteOptions, DeleteRecord, InstallOptions, Release, ReleaseRecord,
    UpgradeOptions, version_constraint,
};
use pkg_types::validate::validate_name;
use pkg_types::{Error, Result};
use tracing::{debug, info};

/// Installs, upgrades, and deletes releases through the release server.
///
/// Holds no state of its own; every decision re-reads the server.
pub struct ReleaseReconciler {
    rpc: Arc<dyn ReleaseRpc>,
    charts: Arc<dyn ChartLoader>,
    dependencies: Arc<dyn DependencyManager>,
    downloader: Arc<dyn ChartDownloader>,
    home: HelmHome,
    deploy_timeout: Duration,
}

impl ReleaseReconciler {
    pub fn new(
        rpc: Arc<dyn ReleaseRpc>,
        charts: Arc<dyn ChartLoader>,
        dependencies: Arc<dyn DependencyManager>,
        downloader: Arc<dyn ChartDownloader>,
        home: HelmHome,
        deploy_timeout: Duration,
    ) -> Self {
        Self {
            rpc,
            charts,
            dependencies,
            downloader,
            home,
            deploy_timeout,
        }
    }

    /// Whether the server has any revision of `name`.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        match self.rpc.history(name, 1).await {
            Ok(revisions) => Ok(!revisions.is_empty()),
            Err(e) if e.is_release_not_found() => Ok(false),
            Err(e) => Err(Error::remote(format!("history of release {}", name), e)),
        }
    }

    /// Install `release`, or upgrade it in place when it already exists.
    ///
    /// Upgrades never reuse the values stored on the server: the payload sent
    /// is the complete set of overrides. A release without its own timeout
    /// gets the reconciler's deploy timeout.
    ///
    /// Release names follow Kubernetes object naming (lowercase `[a-z0-9-]`,
    /// at most 63 characters, no leading or trailing hyphen); anything else is
    /// rejected with a validation error before the server is contacted.
    pub async fn upsert(&self, release: &Release) -> Result<ReleaseRecord> {
        validate_name(&release.name)?;
        let timeout = release.timeout_or(self.deploy_timeout);

        let chart_path = self.resolve(&release.chart).await?;
        let chart = self.load(&chart_path).await?;
        let values = release.values_payload()?;

        if self.exists(&release.name).await? {
            let opts = UpgradeOptions {
                values,
                timeout,
                reuse_values: false,
                wait: true,
            };
            let record = self
                .rpc
                .upgrade(&release.name, &chart_path, &opts)
                .await
                .map_err(|e| Error::remote(format!("upgrade release {}", release.name), e))?;
            info!(
                release = %release.name,
                revision = record.revision,
                status = %record.status,
                "Release upgraded"
            );
            Ok(record)
        } else {
            let opts = InstallOptions {
                release_name: release.name.clone(),
                values,
                timeout,
                reuse_name: false,
                wait: true,
            };
            let record = self
                .rpc
                .install(&chart, &release.namespace, &opts)
                .await
                .map_err(|e| Error::remote(format!("install release {}", release.name), e))?;
            info!(
                release = %release.name,
                namespace = %release.namespace,
                status = %record.status,
                "Release installed"
            );
            Ok(record)
        }
    }

    /// Delete `name` on the server. Access grants are left alone.
    pub async fn delete(&self, name: &str, purge: bool) -> Result<DeleteRecord> {
        let record = self
            .rpc
            .delete(name, &DeleteOptions { purge })
            .await
            .map_err(|e| Error::remote(format!("delete release {}", name), e))?;
        info!(release = %name, purge, "Release deleted");
        Ok(record)
    }

    async fn resolve(&self, chart: &ChartReference) -> Result<PathBuf> {
        match chart {
            ChartReference::Path(path) => Ok(path.clone()),
            ChartReference::Repository { name, version } => {
                let archive = self.home.archive();
                std::fs::create_dir_all(&archive)?;
                let constraint = version_constraint(version);
                debug!(chart = %name, version = %constraint, "Downloading chart");
                self.downloader
                    .download_to(name, constraint, &archive, &self.home)
                    .await
                    .map_err(|e| Error::remote(format!("download chart {}", name), e))
            }
        }
    }

    /// Load the chart, bringing its dependencies up to date first if it has any.
    async fn load(&self, path: &std::path::Path) -> Result<Chart> {
        let chart = self.load_once(path).await?;
        if !chart.has_dependencies() {
            return Ok(chart);
        }

        debug!(chart = %chart.metadata.name, "Updating chart dependencies");
        self.dependencies
            .update(path, &self.home)
            .await
            .map_err(|e| Error::config(format!("update dependencies of {}: {:#}", path.display(), e)))?;
        self.load_once(path).await
    }

    async fn load_once(&self, path: &std::path::Path) -> Result<Chart> {
        self.charts
            .load(path)
            .await
            .map_err(|e| Error::config(format!("load chart {}: {:#}", path.display(), e)))
    }
}
