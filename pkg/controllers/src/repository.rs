use std::path::Path;
use std::sync::Arc;

use futures_util::future::join_all;
use pkg_client::IndexDownloader;
use pkg_types::home::HelmHome;
use pkg_types::repository::RepositoryFile;
use pkg_types::Result;
use tracing::{info, warn};

/// Result of refreshing one repository's index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub name: String,
    pub url: String,
    pub result: std::result::Result<(), String>,
}

impl SyncOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Keeps the local repository registry and index caches current.
pub struct RepositoryIndexSyncer {
    downloader: Arc<dyn IndexDownloader>,
    home: HelmHome,
}

impl RepositoryIndexSyncer {
    pub fn new(downloader: Arc<dyn IndexDownloader>, home: HelmHome) -> Self {
        Self { downloader, home }
    }

    /// Create the home layout, and a registry holding only the stable
    /// repository if none exists. Returns whether the registry was written.
    pub fn ensure_registry(&self) -> Result<bool> {
        self.home.ensure_layout()?;
        let written = RepositoryFile::write_default_if_missing(&self.home.repository_file())?;
        if written {
            info!(path = %self.home.repository_file().display(), "Wrote default repository file");
        }
        Ok(written)
    }

    /// Refresh every repository in the registry at `repository_file` concurrently.
    ///
    /// Per-repository failures are reported in the outcomes, in registry
    /// order; only an unreadable registry fails the call.
    pub async fn sync_all(&self, repository_file: &Path) -> Result<Vec<SyncOutcome>> {
        let registry = RepositoryFile::load(repository_file)?;

        let handles: Vec<_> = registry
            .repositories
            .iter()
            .cloned()
            .map(|entry| {
                let downloader = self.downloader.clone();
                let home = self.home.clone();
                tokio::spawn(async move { downloader.download_index(&entry, &home).await })
            })
            .collect();

        let results = join_all(handles).await;

        let outcomes: Vec<SyncOutcome> = registry
            .repositories
            .iter()
            .zip(results)
            .map(|(entry, joined)| {
                let result = match joined {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(format!("{:#}", e)),
                    Err(e) => Err(format!("sync task failed: {}", e)),
                };
                if let Err(error) = &result {
                    warn!(
                        repository = %entry.name,
                        url = %entry.url,
                        error = %error,
                        "Unable to get an update from the chart repository"
                    );
                }
                SyncOutcome {
                    name: entry.name.clone(),
                    url: entry.url.clone(),
                    result,
                }
            })
            .collect();

        let synced = outcomes.iter().filter(|o| o.is_ok()).count();
        info!(synced, total = outcomes.len(), "Repository update complete");
        Ok(outcomes)
    }
}
