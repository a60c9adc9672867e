//! Shared data structures for HopSim.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const TOPOLOGY_FILE_VERSION: u32 = 1;

pub const MAX_HOPS_MIN: u32 = 1;
pub const MAX_HOPS_MAX: u32 = 30;
pub const TIMEOUT_BUDGET_MIN_MS: u64 = 1000;
pub const TIMEOUT_BUDGET_MAX_MS: u64 = 10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Source,
    Router,
    Destination,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub address: String,
    pub display_name: String,
    pub role: NodeRole,
    /// Baseline latency used for synthetic RTT samples. Zero on the
    /// source, which is never a probe target.
    pub baseline_rtt_ms: f64,
}

impl Node {
    pub fn source(address: &str, display_name: &str) -> Self {
        Self {
            address: address.to_string(),
            display_name: display_name.to_string(),
            role: NodeRole::Source,
            baseline_rtt_ms: 0.0,
        }
    }

    pub fn router(address: &str, display_name: &str, baseline_rtt_ms: f64) -> Self {
        Self {
            address: address.to_string(),
            display_name: display_name.to_string(),
            role: NodeRole::Router,
            baseline_rtt_ms,
        }
    }

    pub fn destination(address: &str, display_name: &str, baseline_rtt_ms: f64) -> Self {
        Self {
            address: address.to_string(),
            display_name: display_name.to_string(),
            role: NodeRole::Destination,
            baseline_rtt_ms,
        }
    }
}

/// One source, N routers in traversal order, one destination. TTL 1..=N
/// selects a router positionally; every TTL past that selects the
/// destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub source: Node,
    pub routers: Vec<Node>,
    pub destination: Node,
}

impl Topology {
    pub fn new(source: Node, routers: Vec<Node>, destination: Node) -> Self {
        Self {
            source,
            routers,
            destination,
        }
    }

    /// The built-in demo topology.
    pub fn reference() -> Self {
        Self {
            source: Node::source("192.168.1.100", "Your Computer"),
            routers: vec![
                Node::router("192.168.1.1", "Gateway Router", 1.0),
                Node::router("10.0.1.1", "ISP Router 1", 5.0),
                Node::router("10.0.2.1", "ISP Router 2", 12.0),
                Node::router("203.0.113.1", "Backbone Router 1", 25.0),
                Node::router("203.0.113.2", "Backbone Router 2", 35.0),
                Node::router("198.51.100.1", "Regional Router", 45.0),
                Node::router("198.51.100.2", "Edge Router", 52.0),
            ],
            destination: Node::destination("8.8.8.8", "google-public-dns-a.google.com", 58.0),
        }
    }

    pub fn router_count(&self) -> u32 {
        self.routers.len() as u32
    }

    /// TTL at which a probe reaches the destination.
    pub fn destination_ttl(&self) -> u32 {
        self.router_count() + 1
    }

    /// Resolves the probe target for a 1-based TTL. TTLs past the
    /// destination keep resolving to the destination.
    pub fn probe_target(&self, ttl: u32) -> Option<(NodeRef, &Node)> {
        if ttl == 0 {
            return None;
        }
        let index = (ttl - 1) as usize;
        if index < self.routers.len() {
            Some((NodeRef::Router(ttl), &self.routers[index]))
        } else {
            Some((NodeRef::Destination, &self.destination))
        }
    }
}

/// JSON form of a topology, for user-supplied files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopologyFile {
    pub version: u32,
    pub source: Node,
    pub routers: Vec<Node>,
    pub destination: Node,
}

impl TopologyFile {
    pub fn from_topology(topology: &Topology) -> Self {
        Self {
            version: TOPOLOGY_FILE_VERSION,
            source: topology.source.clone(),
            routers: topology.routers.clone(),
            destination: topology.destination.clone(),
        }
    }

    pub fn into_topology(self) -> Topology {
        Topology {
            source: self.source,
            routers: self.routers,
            destination: self.destination,
        }
    }
}

/// Scenario toggles plus run parameters. Mutated by the embedding layer
/// between runs; the sequencer clones a frozen snapshot at start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioConfig {
    pub too_many_hops: bool,
    pub timeout_at_hop: bool,
    pub timeout_hop_number: u32,
    pub network_unreachable: bool,
    pub host_unreachable: bool,
    pub max_hops: u32,
    pub timeout_budget_ms: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            too_many_hops: false,
            timeout_at_hop: false,
            timeout_hop_number: 5,
            network_unreachable: false,
            host_unreachable: false,
            max_hops: MAX_HOPS_MAX,
            timeout_budget_ms: 5000,
        }
    }
}

/// Symbolic reference to a topology position; no renderer identity leaks
/// into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Source,
    Router(u32),
    Destination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualState {
    Active,
    Timeout,
    Unreachable,
    Responding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ready,
    Running,
    Paused,
    Complete,
    TooManyHops,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RunStatus::Ready => "Ready",
            RunStatus::Running => "Running",
            RunStatus::Paused => "Paused",
            RunStatus::Complete => "Complete",
            RunStatus::TooManyHops => "Too Many Hops",
        };
        f.write_str(text)
    }
}

/// Mirror of the control surface the embedding UI shows the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub can_start: bool,
    pub can_pause: bool,
    pub start_label: &'static str,
    pub pause_label: &'static str,
}

impl ControlState {
    pub fn idle() -> Self {
        Self {
            can_start: true,
            can_pause: false,
            start_label: "Start Traceroute",
            pause_label: "Pause",
        }
    }

    pub fn running(paused: bool) -> Self {
        Self {
            can_start: false,
            can_pause: true,
            start_label: "Running...",
            pause_label: if paused { "Resume" } else { "Pause" },
        }
    }
}

/// Outcome of a single simulated hop; produced fresh per hop and not
/// retained beyond line formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum HopOutcome {
    Success { rtt: [f64; 3] },
    Timeout,
    NetworkUnreachable { rtt: f64 },
    HostUnreachable { rtt: f64 },
}

impl HopOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, HopOutcome::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_topology_maps_ttls_positionally() {
        let topology = Topology::reference();
        assert_eq!(topology.router_count(), 7);
        assert_eq!(topology.destination_ttl(), 8);

        let (node_ref, node) = topology.probe_target(1).unwrap();
        assert_eq!(node_ref, NodeRef::Router(1));
        assert_eq!(node.address, "192.168.1.1");

        let (node_ref, node) = topology.probe_target(7).unwrap();
        assert_eq!(node_ref, NodeRef::Router(7));
        assert_eq!(node.address, "198.51.100.2");

        let (node_ref, node) = topology.probe_target(8).unwrap();
        assert_eq!(node_ref, NodeRef::Destination);
        assert_eq!(node.address, "8.8.8.8");
    }

    #[test]
    fn ttls_past_destination_clamp_to_destination() {
        let topology = Topology::reference();
        let (node_ref, node) = topology.probe_target(12).unwrap();
        assert_eq!(node_ref, NodeRef::Destination);
        assert_eq!(node.role, NodeRole::Destination);
        assert!(topology.probe_target(0).is_none());
    }

    #[test]
    fn scenario_defaults_match_demo() {
        let config = ScenarioConfig::default();
        assert!(!config.too_many_hops);
        assert!(!config.timeout_at_hop);
        assert_eq!(config.timeout_hop_number, 5);
        assert_eq!(config.max_hops, 30);
        assert_eq!(config.timeout_budget_ms, 5000);
    }

    #[test]
    fn topology_file_round_trip_is_stable() {
        let file = TopologyFile::from_topology(&Topology::reference());
        let json = serde_json::to_string_pretty(&file).unwrap();
        let decoded: TopologyFile = serde_json::from_str(&json).unwrap();
        assert_eq!(file, decoded);
        assert_eq!(decoded.into_topology(), Topology::reference());
    }

    #[test]
    fn control_state_labels_follow_run_phase() {
        assert_eq!(ControlState::idle().start_label, "Start Traceroute");
        assert_eq!(ControlState::running(false).pause_label, "Pause");
        assert_eq!(ControlState::running(true).pause_label, "Resume");
        assert!(!ControlState::running(false).can_start);
    }

    #[test]
    fn run_status_display_matches_ui_text() {
        assert_eq!(RunStatus::TooManyHops.to_string(), "Too Many Hops");
        assert_eq!(RunStatus::Ready.to_string(), "Ready");
    }
}
