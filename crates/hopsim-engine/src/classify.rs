//! Per-hop outcome classification.

use hopsim_model::ScenarioConfig;

/// Hop pinned by the network-unreachable scenario.
pub const NETWORK_UNREACHABLE_TTL: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    Timeout,
    NetworkUnreachable,
    HostUnreachable,
}

/// Fixed precedence, first match wins, so behavior stays deterministic
/// even if several scenarios are enabled at once. The too-many-hops
/// scenario terminates the whole run and lives in the sequencer's loop
/// guard, not here.
pub fn classify(ttl: u32, config: &ScenarioConfig, router_count: u32) -> OutcomeKind {
    if config.timeout_at_hop && ttl == config.timeout_hop_number {
        OutcomeKind::Timeout
    } else if config.network_unreachable && ttl == NETWORK_UNREACHABLE_TTL {
        OutcomeKind::NetworkUnreachable
    } else if config.host_unreachable && ttl >= router_count + 1 {
        OutcomeKind::HostUnreachable
    } else {
        OutcomeKind::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScenarioConfig {
        ScenarioConfig::default()
    }

    #[test]
    fn default_config_is_all_success() {
        let config = config();
        for ttl in 1..=16 {
            assert_eq!(classify(ttl, &config, 7), OutcomeKind::Success);
        }
    }

    #[test]
    fn timeout_fires_only_at_configured_hop() {
        let config = ScenarioConfig {
            timeout_at_hop: true,
            timeout_hop_number: 5,
            ..config()
        };
        assert_eq!(classify(4, &config, 7), OutcomeKind::Success);
        assert_eq!(classify(5, &config, 7), OutcomeKind::Timeout);
        assert_eq!(classify(6, &config, 7), OutcomeKind::Success);
    }

    #[test]
    fn timeout_wins_over_network_unreachable() {
        let config = ScenarioConfig {
            timeout_at_hop: true,
            timeout_hop_number: 5,
            network_unreachable: true,
            ..config()
        };
        // Hop 3 still trips network-unreachable on its own.
        assert_eq!(classify(3, &config, 7), OutcomeKind::NetworkUnreachable);
        assert_eq!(classify(5, &config, 7), OutcomeKind::Timeout);
    }

    #[test]
    fn timeout_at_hop_three_shadows_network_unreachable() {
        let config = ScenarioConfig {
            timeout_at_hop: true,
            timeout_hop_number: 3,
            network_unreachable: true,
            ..config()
        };
        assert_eq!(classify(3, &config, 7), OutcomeKind::Timeout);
    }

    #[test]
    fn host_unreachable_covers_destination_and_beyond() {
        let config = ScenarioConfig {
            host_unreachable: true,
            ..config()
        };
        assert_eq!(classify(7, &config, 7), OutcomeKind::Success);
        assert_eq!(classify(8, &config, 7), OutcomeKind::HostUnreachable);
        assert_eq!(classify(12, &config, 7), OutcomeKind::HostUnreachable);
    }
}
