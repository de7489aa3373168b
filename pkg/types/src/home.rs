use std::path::{Path, PathBuf};

use pkg_constants::paths::{
    ARCHIVE_DIR, CACHE_DIR, HELM_HOME_DIR, REPOSITORY_CACHE_DIR, REPOSITORY_DIR, REPOSITORY_FILE,
};

/// Local helm home layout:
///
/// ```text
/// <root>/
///   repository/repositories.yaml
///   repository/cache/<name>-index.yaml
///   archive/
///   cache/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmHome {
    root: PathBuf,
}

impl HelmHome {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Helm home below a user's home directory.
    pub fn under(user_home: &Path) -> Self {
        Self::new(user_home.join(HELM_HOME_DIR))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repository(&self) -> PathBuf {
        self.root.join(REPOSITORY_DIR)
    }

    pub fn repository_file(&self) -> PathBuf {
        self.repository().join(REPOSITORY_FILE)
    }

    pub fn repository_cache(&self) -> PathBuf {
        self.root.join(REPOSITORY_CACHE_DIR)
    }

    /// Index cache file for the repository called `name`.
    pub fn cache_index(&self, name: &str) -> PathBuf {
        self.repository_cache().join(format!("{}-index.yaml", name))
    }

    pub fn archive(&self) -> PathBuf {
        self.root.join(ARCHIVE_DIR)
    }

    pub fn cache(&self) -> PathBuf {
        self.root.join(CACHE_DIR)
    }

    /// Paths stored in the registry are relative to the home unless absolute.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    /// Create every directory of the layout.
    pub fn ensure_layout(&self) -> std::io::Result<()> {
        for dir in [
            self.cache(),
            self.repository(),
            self.repository_cache(),
            self.archive(),
        ] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}
