use pkg_constants::tiller::TUNNEL_HOST;

/// A local port forwarding to a service inside the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tunnel {
    pub local_port: u16,
    pub remote_namespace: String,
    pub remote_service_name: String,
}

impl Tunnel {
    /// `host:port` the release client dials.
    pub fn address(&self) -> String {
        format!("{}:{}", TUNNEL_HOST, self.local_port)
    }
}
