//! Terminal line formatting for the simulated traceroute output.

use hopsim_model::{HopOutcome, Node, Topology};

pub const PACKET_BYTES: u32 = 60;
pub const COMPLETE_LINE: &str = "Traceroute complete!";

pub fn banner(topology: &Topology, max_hops: u32) -> String {
    format!(
        "traceroute to {} ({}), {} hops max, {} byte packets",
        topology.destination.display_name, topology.destination.address, max_hops, PACKET_BYTES
    )
}

pub fn too_many_hops(max_hops: u32) -> String {
    format!("*** Too many hops - destination not reached within {max_hops} hops ***")
}

pub fn hop_line(ttl: u32, node: &Node, outcome: &HopOutcome) -> String {
    match outcome {
        HopOutcome::Timeout => format!("{ttl:>2}  * * *"),
        HopOutcome::Success { rtt } => format!(
            "{ttl:>2}  {} ({})  {}ms  {}ms  {}ms",
            node.address,
            node.display_name,
            fmt_rtt(rtt[0]),
            fmt_rtt(rtt[1]),
            fmt_rtt(rtt[2])
        ),
        HopOutcome::NetworkUnreachable { rtt } => format!(
            "{ttl:>2}  {} ({})  {}ms !N",
            node.address,
            node.display_name,
            fmt_rtt(*rtt)
        ),
        HopOutcome::HostUnreachable { rtt } => format!(
            "{ttl:>2}  {} ({})  {}ms !H",
            node.address,
            node.display_name,
            fmt_rtt(*rtt)
        ),
    }
}

/// Whole numbers drop the decimal: `5` rather than `5.0`, but `5.2`
/// as-is.
fn fmt_rtt(rtt: f64) -> String {
    if rtt.fract() == 0.0 {
        format!("{}", rtt as i64)
    } else {
        format!("{rtt:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopsim_model::Topology;

    fn gateway() -> Node {
        Node::router("192.168.1.1", "Gateway Router", 1.0)
    }

    #[test]
    fn banner_names_destination_and_limit() {
        assert_eq!(
            banner(&Topology::reference(), 30),
            "traceroute to google-public-dns-a.google.com (8.8.8.8), 30 hops max, 60 byte packets"
        );
    }

    #[test]
    fn timeout_line_pads_ttl_to_width_two() {
        assert_eq!(
            hop_line(3, &gateway(), &HopOutcome::Timeout),
            " 3  * * *"
        );
        assert_eq!(
            hop_line(12, &gateway(), &HopOutcome::Timeout),
            "12  * * *"
        );
    }

    #[test]
    fn success_line_lists_three_rtts() {
        let outcome = HopOutcome::Success {
            rtt: [1.2, 1.0, 0.9],
        };
        assert_eq!(
            hop_line(1, &gateway(), &outcome),
            " 1  192.168.1.1 (Gateway Router)  1.2ms  1ms  0.9ms"
        );
    }

    #[test]
    fn unreachable_lines_carry_icmp_suffix() {
        let node = Node::router("10.0.2.1", "ISP Router 2", 12.0);
        assert_eq!(
            hop_line(3, &node, &HopOutcome::NetworkUnreachable { rtt: 11.5 }),
            " 3  10.0.2.1 (ISP Router 2)  11.5ms !N"
        );
        let dest = Node::destination("8.8.8.8", "google-public-dns-a.google.com", 58.0);
        assert_eq!(
            hop_line(8, &dest, &HopOutcome::HostUnreachable { rtt: 60.0 }),
            " 8  8.8.8.8 (google-public-dns-a.google.com)  60ms !H"
        );
    }

    #[test]
    fn too_many_hops_line_uses_effective_limit() {
        assert_eq!(
            too_many_hops(4),
            "*** Too many hops - destination not reached within 4 hops ***"
        );
    }
}
