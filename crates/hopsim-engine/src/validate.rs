//! Validation for externally supplied topologies and configuration.

use anyhow::{bail, Result};
use hopsim_model::{
    NodeRole, ScenarioConfig, Topology, MAX_HOPS_MAX, MAX_HOPS_MIN, TIMEOUT_BUDGET_MAX_MS,
    TIMEOUT_BUDGET_MIN_MS,
};
use std::collections::HashSet;

pub fn validate_topology(topology: &Topology) -> Result<()> {
    if topology.routers.is_empty() {
        bail!("topology needs at least one router between source and destination");
    }
    if topology.source.role != NodeRole::Source {
        bail!("source node has role {:?}", topology.source.role);
    }
    if topology.destination.role != NodeRole::Destination {
        bail!("destination node has role {:?}", topology.destination.role);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(topology.source.address.as_str());
    for node in topology.routers.iter().chain([&topology.destination]) {
        if !seen.insert(node.address.as_str()) {
            bail!("duplicate address in topology: {}", node.address);
        }
        if node.role == NodeRole::Source {
            bail!("probe target {} has role source", node.address);
        }
        if node.baseline_rtt_ms <= 0.0 {
            bail!(
                "node {} needs a positive baseline latency (got {})",
                node.address,
                node.baseline_rtt_ms
            );
        }
    }

    Ok(())
}

pub fn validate_config(config: &ScenarioConfig) -> Result<()> {
    if !(MAX_HOPS_MIN..=MAX_HOPS_MAX).contains(&config.max_hops) {
        bail!(
            "max hops {} outside {}..={}",
            config.max_hops,
            MAX_HOPS_MIN,
            MAX_HOPS_MAX
        );
    }
    if !(TIMEOUT_BUDGET_MIN_MS..=TIMEOUT_BUDGET_MAX_MS).contains(&config.timeout_budget_ms) {
        bail!(
            "timeout budget {}ms outside {}..={}ms",
            config.timeout_budget_ms,
            TIMEOUT_BUDGET_MIN_MS,
            TIMEOUT_BUDGET_MAX_MS
        );
    }
    if config.timeout_hop_number == 0 {
        bail!("timeout hop number must be at least 1");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopsim_model::Node;

    #[test]
    fn reference_topology_is_valid() {
        assert!(validate_topology(&Topology::reference()).is_ok());
    }

    #[test]
    fn duplicate_addresses_are_rejected() {
        let mut topology = Topology::reference();
        topology.routers[1] = topology.routers[0].clone();
        assert!(validate_topology(&topology).is_err());
    }

    #[test]
    fn empty_router_list_is_rejected() {
        let topology = Topology::new(
            Node::source("10.0.0.1", "src"),
            Vec::new(),
            Node::destination("10.0.0.2", "dst", 10.0),
        );
        assert!(validate_topology(&topology).is_err());
    }

    #[test]
    fn zero_baseline_is_rejected() {
        let mut topology = Topology::reference();
        topology.routers[2].baseline_rtt_ms = 0.0;
        assert!(validate_topology(&topology).is_err());
    }

    #[test]
    fn config_bounds_are_enforced() {
        assert!(validate_config(&ScenarioConfig::default()).is_ok());
        let config = ScenarioConfig {
            max_hops: 0,
            ..ScenarioConfig::default()
        };
        assert!(validate_config(&config).is_err());
        let config = ScenarioConfig {
            timeout_budget_ms: 50,
            ..ScenarioConfig::default()
        };
        assert!(validate_config(&config).is_err());
        let config = ScenarioConfig {
            timeout_hop_number: 0,
            timeout_at_hop: true,
            ..ScenarioConfig::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
