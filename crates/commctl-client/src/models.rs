//! Wire models for the Commissaire REST API.
//!
//! The resource schemas are owned by the remote service; deserialization
//! tolerates unknown fields so newer servers keep working with this
//! client.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a managed host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostStatus {
    /// Bootstrapped and accepting work.
    Available,
    /// The service is examining the host.
    Investigating,
    /// Removed from its cluster.
    Disassociated,
    /// Bootstrapping or a later operation failed.
    Failed,
    /// The host stopped answering the service.
    Unresponsive,
    /// Cluster activation in progress.
    Activating,
    /// Fully active cluster member.
    Ready,
}

/// A single managed machine tracked by the service. Read-only from the
/// client's perspective; the service is the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Host IP address or name, the resource identifier.
    pub address: String,
    /// Current lifecycle status.
    pub status: HostStatus,
    /// Cluster the host belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

/// Aggregate health of a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    /// All hosts available.
    Ok,
    /// One or more hosts unavailable.
    Degraded,
}

/// A named group of hosts with aggregate status, as rendered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Unique cluster name.
    pub name: String,
    /// Number of hosts in the cluster.
    pub host_count: u64,
    /// Aggregate status.
    pub status: ClusterStatus,
}

/// Host membership counters inside a cluster detail response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ClusterHostCounts {
    /// Total hosts in the cluster.
    pub total: u64,
    /// Hosts currently available.
    #[serde(default)]
    pub available: u64,
    /// Hosts currently unavailable.
    #[serde(default)]
    pub unavailable: u64,
}

/// The service's cluster detail body (`GET /api/v0/cluster/{name}`).
/// The cluster name lives in the path, not the body.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterDetail {
    /// Aggregate status.
    pub status: ClusterStatus,
    /// Host membership counters.
    #[serde(default)]
    pub hosts: ClusterHostCounts,
}

impl ClusterDetail {
    /// Combines the detail body with the name from the request path.
    #[must_use]
    pub fn into_cluster(self, name: &str) -> Cluster {
        Cluster {
            name: name.to_string(),
            host_count: self.hosts.total,
            status: self.status,
        }
    }
}

/// Host registration spec, read from a user-supplied spec file for
/// `hosts create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSpec {
    /// Host IP address or name to register.
    pub address: String,
    /// Base64-encoded SSH private key the service uses to bootstrap the
    /// host.
    pub ssh_priv_key: String,
    /// Cluster to join on registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

impl HostSpec {
    /// The request body for `PUT /api/v0/host/{address}`; the address
    /// travels in the path.
    #[must_use]
    pub fn to_body(&self) -> serde_json::Value {
        match &self.cluster {
            Some(cluster) => serde_json::json!({
                "ssh_priv_key": self.ssh_priv_key,
                "cluster": cluster,
            }),
            None => serde_json::json!({ "ssh_priv_key": self.ssh_priv_key }),
        }
    }
}

/// Cluster creation spec, read from a user-supplied spec file for
/// `clusters create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Cluster name to create.
    pub name: String,
    /// Cluster kind; the service calls this `type` on the wire.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// Network configuration to use.
    #[serde(default = "default_network")]
    pub network: String,
}

fn default_kind() -> String {
    "kubernetes".to_string()
}

fn default_network() -> String {
    "default".to_string()
}

impl ClusterSpec {
    /// The request body for `PUT /api/v0/cluster/{name}`; the name
    /// travels in the path.
    #[must_use]
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.kind,
            "network": self.network,
        })
    }
}
