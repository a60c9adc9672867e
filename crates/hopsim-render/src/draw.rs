use super::model::ViewState;
use hopsim_model::{NodeRef, Topology, VisualState};

#[derive(Debug, Clone, Copy)]
pub struct UiOpts {
    /// No ANSI color codes; plain characters only.
    pub plain: bool,
}

const ANSI_RESET: &str = "\x1b[0m";

/// Rows used by the title, status, topology strip, packet line, hints,
/// and spacing; the rest of the height goes to the terminal pane.
const CHROME_ROWS: usize = 8;

pub fn render_frame(
    topology: &Topology,
    state: &ViewState,
    opts: &UiOpts,
    term_w: u16,
    term_h: u16,
) -> String {
    let width = term_w as usize;
    let mut rows = Vec::new();

    rows.push(center_line("HOPSIM TRACEROUTE", width));
    rows.push(center_line(&format!("Status: {}", state.status), width));
    rows.push(String::new());

    rows.push(format!(" {}", topology_strip(topology, state, opts)));
    rows.push(format!(" {}", packet_line(topology, state)));
    rows.push(String::new());

    let budget = (term_h as usize).saturating_sub(CHROME_ROWS).max(1);
    let start = state.lines.len().saturating_sub(budget);
    for line in &state.lines[start..] {
        rows.push(format!("  {line}"));
    }
    rows.push(String::new());

    rows.push(format!(
        " [s] {}   [p] {}   [r] Reset   [q] Quit",
        state.controls.start_label, state.controls.pause_label
    ));

    rows.join("\n")
}

fn topology_strip(topology: &Topology, state: &ViewState, opts: &UiOpts) -> String {
    let mut cells = Vec::new();
    cells.push("SRC".to_string());
    for ttl in 1..=topology.router_count() {
        let node_ref = NodeRef::Router(ttl);
        cells.push(node_cell(
            &ttl.to_string(),
            state.node_states.get(&node_ref).copied(),
            opts,
        ));
    }
    cells.push(node_cell(
        "DST",
        state.node_states.get(&NodeRef::Destination).copied(),
        opts,
    ));
    cells.join(" -- ")
}

fn node_cell(label: &str, state: Option<VisualState>, opts: &UiOpts) -> String {
    match state {
        None => label.to_string(),
        Some(VisualState::Active) => paint(&format!("({label})"), "33", opts),
        Some(VisualState::Timeout) => paint(&format!("{label}x"), "31", opts),
        Some(VisualState::Unreachable) => paint(&format!("{label}!"), "31", opts),
        Some(VisualState::Responding) => paint(&format!("{label}*"), "32", opts),
    }
}

fn packet_line(topology: &Topology, state: &ViewState) -> String {
    match &state.packet {
        Some(packet) => format!(
            "packet {}: {} -> {}",
            packet.label,
            node_name(topology, packet.from),
            node_name(topology, packet.to)
        ),
        None => "no packet in flight".to_string(),
    }
}

fn node_name(topology: &Topology, node_ref: NodeRef) -> String {
    match node_ref {
        NodeRef::Source => topology.source.display_name.clone(),
        NodeRef::Destination => topology.destination.display_name.clone(),
        NodeRef::Router(ttl) => topology
            .probe_target(ttl)
            .map(|(_, node)| node.display_name.clone())
            .unwrap_or_else(|| format!("hop {ttl}")),
    }
}

fn paint(text: &str, color: &str, opts: &UiOpts) -> String {
    if opts.plain {
        text.to_string()
    } else {
        format!("\x1b[{color}m{text}{ANSI_RESET}")
    }
}

fn center_line(text: &str, width: usize) -> String {
    if text.len() >= width {
        return text.to_string();
    }
    let pad = (width - text.len()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}
