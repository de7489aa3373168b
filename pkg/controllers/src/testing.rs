//! In-memory stand-ins for the remote systems, shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pkg_client::{
    ApiError, ApiResult, ChartDownloader, ChartLoader, ClusterApi, ControlPlaneInstaller,
    DependencyManager, IndexDownloader, ReleaseRpc, RpcConnector, RpcError, RpcResult,
    TunnelEstablisher,
};
use pkg_types::chart::{Chart, ChartMetadata};
use pkg_types::config::WaitConfig;
use pkg_types::deployment::{ControlPlaneInstance, Deployment, DeploymentStatus};
use pkg_types::home::HelmHome;
use pkg_types::rbac::{ClusterIdentity, Role, RoleBinding};
use pkg_types::release::{
    DeleteOptions, DeleteRecord, InstallOptions, ReleaseRecord, ReleaseStatus, UpgradeOptions,
};
use pkg_types::repository::RepositoryEntry;
use pkg_types::tunnel::Tunnel;

pub fn fast_wait() -> WaitConfig {
    WaitConfig::new(Duration::from_millis(300), Duration::from_millis(10))
}

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

// --- Cluster ---

#[derive(Default)]
pub struct ClusterState {
    pub service_accounts: HashMap<Key, ClusterIdentity>,
    pub roles: HashMap<Key, Role>,
    pub bindings: HashMap<Key, RoleBinding>,
    pub deployments: HashMap<Key, Deployment>,
    /// Deployment lookups before a deployment reports ready; `None` never does
    pub ready_after_polls: Option<u32>,
    pub polls: u32,
    /// `"<verb> <kind> <ns>/<name>"` for every mutating call
    pub calls: Vec<String>,
    /// Deletions that fail with a generic error, keyed by `"<kind> <ns>/<name>"`
    pub failing_deletes: HashSet<String>,
    pub fail_binding_create: bool,
    pub fail_lookups: bool,
    pub fail_sa_lookup: bool,
}

#[derive(Default)]
pub struct FakeCluster {
    pub state: Mutex<ClusterState>,
}

impl FakeCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Cluster that already runs a tiller with `ready` of `replicas` pods ready.
    pub fn with_tiller(namespace: &str, replicas: u32, ready: u32) -> Arc<Self> {
        let cluster = Self::new();
        cluster.put_deployment(namespace, "tiller-deploy", replicas, ready);
        cluster
    }

    pub fn put_deployment(&self, namespace: &str, name: &str, replicas: u32, ready: u32) {
        let deployment = Deployment {
            name: name.to_string(),
            namespace: namespace.to_string(),
            replicas,
            status: DeploymentStatus {
                replicas,
                ready_replicas: ready,
            },
        };
        self.state
            .lock()
            .unwrap()
            .deployments
            .insert(key(namespace, name), deployment);
    }

    pub fn ready_after(&self, polls: Option<u32>) {
        self.state.lock().unwrap().ready_after_polls = polls;
    }

    pub fn fail_delete(&self, kind: &str, namespace: &str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_deletes
            .insert(format!("{} {}/{}", kind, namespace, name));
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn delete(&self, kind: &str, namespace: &str, name: &str) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        let id = format!("{} {}/{}", kind, namespace, name);
        state.calls.push(format!("delete {}", id));
        if state.failing_deletes.contains(&id) {
            return Err(ApiError::Other(anyhow::anyhow!("injected failure")));
        }
        let k = key(namespace, name);
        let removed = match kind {
            "deployment" => state.deployments.remove(&k).is_some(),
            "serviceaccount" => state.service_accounts.remove(&k).is_some(),
            "role" => state.roles.remove(&k).is_some(),
            _ => state.bindings.remove(&k).is_some(),
        };
        if removed { Ok(()) } else { Err(ApiError::NotFound) }
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn get_deployment(&self, namespace: &str, name: &str) -> ApiResult<Deployment> {
        let mut state = self.state.lock().unwrap();
        if state.fail_lookups {
            return Err(ApiError::Other(anyhow::anyhow!("apiserver unavailable")));
        }
        state.polls += 1;
        let polls = state.polls;
        let ready_after = state.ready_after_polls;
        let deployment = state
            .deployments
            .get_mut(&key(namespace, name))
            .ok_or(ApiError::NotFound)?;
        if let Some(n) = ready_after
            && polls >= n
        {
            deployment.status.ready_replicas = deployment.replicas;
        }
        Ok(deployment.clone())
    }

    async fn get_service_account(
        &self,
        namespace: &str,
        name: &str,
    ) -> ApiResult<ClusterIdentity> {
        let state = self.state.lock().unwrap();
        if state.fail_sa_lookup {
            return Err(ApiError::Other(anyhow::anyhow!("etcdserver: request timed out")));
        }
        state
            .service_accounts
            .get(&key(namespace, name))
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_service_account(&self, identity: &ClusterIdentity) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!(
            "create serviceaccount {}/{}",
            identity.namespace, identity.name
        ));
        let k = key(&identity.namespace, &identity.name);
        if state.service_accounts.contains_key(&k) {
            return Err(ApiError::AlreadyExists);
        }
        state.service_accounts.insert(k, identity.clone());
        Ok(())
    }

    async fn create_role(&self, role: &Role) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("create role {}/{}", role.namespace, role.name));
        let k = key(&role.namespace, &role.name);
        if state.roles.contains_key(&k) {
            return Err(ApiError::AlreadyExists);
        }
        state.roles.insert(k, role.clone());
        Ok(())
    }

    async fn create_role_binding(&self, binding: &RoleBinding) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!(
            "create rolebinding {}/{}",
            binding.namespace, binding.name
        ));
        if state.fail_binding_create {
            return Err(ApiError::Other(anyhow::anyhow!("admission webhook denied")));
        }
        let k = key(&binding.namespace, &binding.name);
        if state.bindings.contains_key(&k) {
            return Err(ApiError::AlreadyExists);
        }
        state.bindings.insert(k, binding.clone());
        Ok(())
    }

    async fn delete_deployment(&self, namespace: &str, name: &str) -> ApiResult<()> {
        self.delete("deployment", namespace, name)
    }

    async fn delete_service_account(&self, namespace: &str, name: &str) -> ApiResult<()> {
        self.delete("serviceaccount", namespace, name)
    }

    async fn delete_role(&self, namespace: &str, name: &str) -> ApiResult<()> {
        self.delete("role", namespace, name)
    }

    async fn delete_role_binding(&self, namespace: &str, name: &str) -> ApiResult<()> {
        self.delete("rolebinding", namespace, name)
    }
}

// --- Installer ---

/// Installs tiller into a `FakeCluster` with one replica that is not ready yet.
pub struct FakeInstaller {
    cluster: Arc<FakeCluster>,
    pub installs: AtomicU32,
    pub upgrades: AtomicU32,
}

impl FakeInstaller {
    pub fn new(cluster: Arc<FakeCluster>) -> Arc<Self> {
        Arc::new(Self {
            cluster,
            installs: AtomicU32::new(0),
            upgrades: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl ControlPlaneInstaller for FakeInstaller {
    async fn install(&self, instance: &ControlPlaneInstance) -> anyhow::Result<()> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        self.cluster.state.lock().unwrap().calls.push(format!(
            "install tiller {}/{}",
            instance.namespace, instance.deployment_name
        ));
        self.cluster
            .put_deployment(&instance.namespace, &instance.deployment_name, 1, 0);
        Ok(())
    }

    async fn upgrade(&self, instance: &ControlPlaneInstance) -> anyhow::Result<()> {
        self.upgrades.fetch_add(1, Ordering::SeqCst);
        self.cluster
            .put_deployment(&instance.namespace, &instance.deployment_name, 1, 0);
        Ok(())
    }
}

// --- Tunnel ---

pub struct FakeTunnels {
    failures_left: AtomicU32,
    pub opens: AtomicU32,
    pub closed: Mutex<Vec<u16>>,
}

impl FakeTunnels {
    /// Fails the first `failures` attempts to open.
    pub fn failing(failures: u32) -> Arc<Self> {
        Arc::new(Self {
            failures_left: AtomicU32::new(failures),
            opens: AtomicU32::new(0),
            closed: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TunnelEstablisher for FakeTunnels {
    async fn open(&self, _namespace: &str, _service: &str) -> anyhow::Result<u16> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            anyhow::bail!("unable to forward port: pod not running");
        }
        Ok(44134)
    }

    async fn close(&self, tunnel: &Tunnel) -> anyhow::Result<()> {
        self.closed.lock().unwrap().push(tunnel.local_port);
        Ok(())
    }
}

// --- Release server ---

#[derive(Default)]
pub struct FakeRpc {
    pub releases: Mutex<HashMap<String, ReleaseRecord>>,
    pub installs: Mutex<Vec<InstallOptions>>,
    pub upgrades: Mutex<Vec<(String, PathBuf, UpgradeOptions)>>,
    pub deletes: Mutex<Vec<(String, DeleteOptions)>>,
    pub list_failures_left: AtomicU32,
    pub lists: AtomicU32,
    /// Message every history call fails with, when set
    pub history_error: Mutex<Option<String>>,
}

impl FakeRpc {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_release(name: &str, namespace: &str) -> Arc<Self> {
        let rpc = Self::new();
        rpc.releases.lock().unwrap().insert(
            name.to_string(),
            ReleaseRecord {
                name: name.to_string(),
                namespace: namespace.to_string(),
                revision: 1,
                status: ReleaseStatus::Deployed,
                chart: None,
            },
        );
        rpc
    }
}

#[async_trait]
impl ReleaseRpc for FakeRpc {
    async fn list(&self, limit: usize) -> RpcResult<Vec<ReleaseRecord>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let left = self.list_failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.list_failures_left.store(left - 1, Ordering::SeqCst);
            return Err(RpcError::Remote(anyhow::anyhow!("transport is closing")));
        }
        Ok(self
            .releases
            .lock()
            .unwrap()
            .values()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn history(&self, name: &str, max: usize) -> RpcResult<Vec<ReleaseRecord>> {
        if let Some(message) = self.history_error.lock().unwrap().clone() {
            return Err(RpcError::classify(name, &message));
        }
        match self.releases.lock().unwrap().get(name) {
            Some(record) => Ok(vec![record.clone()].into_iter().take(max).collect()),
            None => Err(RpcError::classify(
                name,
                &format!("rpc error: code = Unknown desc = release: \"{}\" not found", name),
            )),
        }
    }

    async fn install(
        &self,
        chart: &Chart,
        namespace: &str,
        opts: &InstallOptions,
    ) -> RpcResult<ReleaseRecord> {
        self.installs.lock().unwrap().push(opts.clone());
        let record = ReleaseRecord {
            name: opts.release_name.clone(),
            namespace: namespace.to_string(),
            revision: 1,
            status: ReleaseStatus::Deployed,
            chart: Some(format!("{}-{}", chart.metadata.name, chart.metadata.version)),
        };
        self.releases
            .lock()
            .unwrap()
            .insert(opts.release_name.clone(), record.clone());
        Ok(record)
    }

    async fn upgrade(
        &self,
        name: &str,
        chart_path: &Path,
        opts: &UpgradeOptions,
    ) -> RpcResult<ReleaseRecord> {
        self.upgrades
            .lock()
            .unwrap()
            .push((name.to_string(), chart_path.to_path_buf(), opts.clone()));
        let mut releases = self.releases.lock().unwrap();
        let record = releases
            .get_mut(name)
            .ok_or_else(|| RpcError::ReleaseNotFound(name.to_string()))?;
        record.revision += 1;
        record.status = ReleaseStatus::Deployed;
        Ok(record.clone())
    }

    async fn delete(&self, name: &str, opts: &DeleteOptions) -> RpcResult<DeleteRecord> {
        self.deletes
            .lock()
            .unwrap()
            .push((name.to_string(), opts.clone()));
        let mut releases = self.releases.lock().unwrap();
        let record = if opts.purge {
            releases.remove(name)
        } else {
            releases.get_mut(name).map(|r| {
                r.status = ReleaseStatus::Deleted;
                r.clone()
            })
        };
        match record {
            Some(record) => Ok(DeleteRecord {
                release: Some(record),
                info: String::new(),
            }),
            None => Err(RpcError::ReleaseNotFound(name.to_string())),
        }
    }
}

pub struct FakeConnector {
    pub rpc: Arc<FakeRpc>,
    pub hosts: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn new(rpc: Arc<FakeRpc>) -> Arc<Self> {
        Arc::new(Self {
            rpc,
            hosts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RpcConnector for FakeConnector {
    async fn connect(
        &self,
        host: &str,
        _connect_timeout: Duration,
    ) -> anyhow::Result<Arc<dyn ReleaseRpc>> {
        self.hosts.lock().unwrap().push(host.to_string());
        Ok(self.rpc.clone())
    }
}

// --- Charts ---

#[derive(Default)]
pub struct FakeCharts {
    pub charts: Mutex<HashMap<PathBuf, Chart>>,
    pub loads: AtomicU32,
}

impl FakeCharts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, path: impl Into<PathBuf>, chart: Chart) {
        self.charts.lock().unwrap().insert(path.into(), chart);
    }
}

pub fn chart(name: &str, version: &str) -> Chart {
    Chart {
        metadata: ChartMetadata {
            name: name.to_string(),
            version: version.to_string(),
            description: None,
        },
        dependencies: Vec::new(),
    }
}

#[async_trait]
impl ChartLoader for FakeCharts {
    async fn load(&self, path: &Path) -> anyhow::Result<Chart> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.charts
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no Chart.yaml in {}", path.display()))
    }
}

#[derive(Default)]
pub struct FakeDependencies {
    pub updated: Mutex<Vec<PathBuf>>,
    pub fail: Mutex<Option<String>>,
}

impl FakeDependencies {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl DependencyManager for FakeDependencies {
    async fn update(&self, chart_path: &Path, _home: &HelmHome) -> anyhow::Result<()> {
        self.updated.lock().unwrap().push(chart_path.to_path_buf());
        if let Some(message) = self.fail.lock().unwrap().clone() {
            anyhow::bail!(message);
        }
        Ok(())
    }
}

/// Pretends to download `repo/chart` and registers the archive with `charts`.
pub struct FakeDownloader {
    charts: Arc<FakeCharts>,
    pub requests: Mutex<Vec<(String, String, PathBuf)>>,
}

impl FakeDownloader {
    pub fn new(charts: Arc<FakeCharts>) -> Arc<Self> {
        Arc::new(Self {
            charts,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChartDownloader for FakeDownloader {
    async fn download_to(
        &self,
        name: &str,
        version: &str,
        dest: &Path,
        _home: &HelmHome,
    ) -> anyhow::Result<PathBuf> {
        self.requests
            .lock()
            .unwrap()
            .push((name.to_string(), version.to_string(), dest.to_path_buf()));
        let short = name.rsplit('/').next().unwrap_or(name);
        let path = dest.join(format!("{}-1.0.0.tgz", short));
        self.charts.add(path.clone(), chart(short, "1.0.0"));
        Ok(path)
    }
}

// --- Repository indexes ---

#[derive(Default)]
pub struct FakeIndexes {
    pub failing: HashSet<String>,
    pub fetched: Mutex<Vec<String>>,
}

impl FakeIndexes {
    pub fn failing(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            fetched: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl IndexDownloader for FakeIndexes {
    async fn download_index(&self, entry: &RepositoryEntry, home: &HelmHome) -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.fetched.lock().unwrap().push(entry.name.clone());
        if self.failing.contains(&entry.name) {
            anyhow::bail!("GET {}/index.yaml: 404 Not Found", entry.url);
        }
        let cache = if entry.cache.is_empty() {
            home.cache_index(&entry.name)
        } else {
            home.resolve(&entry.cache)
        };
        if let Some(parent) = cache.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(cache, "apiVersion: v1\nentries: {}\n")?;
        Ok(())
    }
}
