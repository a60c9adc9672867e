use hopsim_model::{ControlState, NodeRef, RunStatus, VisualState};
use std::collections::HashMap;

/// Packet currently shown in flight between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketView {
    pub from: NodeRef,
    pub to: NodeRef,
    pub label: String,
}

/// Everything the terminal UI needs to draw one frame. Mutated from
/// renderer events on the UI thread; drawing never blocks the engine.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub status: RunStatus,
    pub controls: ControlState,
    pub node_states: HashMap<NodeRef, VisualState>,
    pub packet: Option<PacketView>,
    pub lines: Vec<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            status: RunStatus::Ready,
            controls: ControlState::idle(),
            node_states: HashMap::new(),
            packet: None,
            lines: Vec::new(),
        }
    }

    pub fn push_line(&mut self, text: String) {
        self.lines.push(text);
    }

    pub fn clear_lines(&mut self) {
        self.lines.clear();
    }

    pub fn set_node_state(&mut self, node: NodeRef, state: VisualState) {
        self.node_states.insert(node, state);
    }

    pub fn clear_node_states(&mut self) {
        self.node_states.clear();
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}
