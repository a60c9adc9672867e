//! Bridges the engine's collaborator traits onto the UI event channel.
//! The renderer runs on the sequencer's thread; the draw loop applies
//! events to the view state on the UI thread.

use hopsim_engine::{ControlListener, Renderer};
use hopsim_model::{ControlState, NodeRef, RunStatus, VisualState};
use hopsim_render::{PacketView, ViewState};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

pub enum UiEvent {
    Line(String),
    ClearOutput,
    Visual(NodeRef, VisualState),
    ClearVisuals,
    PacketStart {
        from: NodeRef,
        to: NodeRef,
        label: String,
    },
    PacketEnd,
    RemovePackets,
    Status(RunStatus),
    Controls(ControlState),
}

pub struct TuiRenderer {
    tx: Sender<UiEvent>,
    probe_ms: u64,
}

impl TuiRenderer {
    pub fn new(tx: Sender<UiEvent>, probe_ms: u64) -> Self {
        Self { tx, probe_ms }
    }

    fn send(&self, event: UiEvent) {
        // A closed UI just drops the frame; the run itself continues.
        let _ = self.tx.send(event);
    }

    fn animate(&self, ms: u64) {
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
    }
}

impl Renderer for TuiRenderer {
    fn append_line(&mut self, text: &str) {
        self.send(UiEvent::Line(text.to_string()));
    }

    fn clear_output(&mut self) {
        self.send(UiEvent::ClearOutput);
    }

    fn animate_probe(&mut self, from: NodeRef, to: NodeRef, ttl: u32) {
        self.send(UiEvent::PacketStart {
            from,
            to,
            label: ttl.to_string(),
        });
        self.animate(self.probe_ms);
        self.send(UiEvent::PacketEnd);
    }

    fn animate_return(&mut self, from: NodeRef, to: NodeRef, label: &str) {
        self.send(UiEvent::PacketStart {
            from,
            to,
            label: label.to_string(),
        });
        self.animate(self.probe_ms * 7 / 10);
        self.send(UiEvent::PacketEnd);
    }

    fn set_visual_state(&mut self, node: NodeRef, state: VisualState) {
        self.send(UiEvent::Visual(node, state));
    }

    fn clear_visual_states(&mut self) {
        self.send(UiEvent::ClearVisuals);
    }

    fn remove_packets(&mut self) {
        self.send(UiEvent::RemovePackets);
    }
}

pub struct TuiListener {
    tx: Sender<UiEvent>,
}

impl TuiListener {
    pub fn new(tx: Sender<UiEvent>) -> Self {
        Self { tx }
    }
}

impl ControlListener for TuiListener {
    fn status_changed(&mut self, status: RunStatus) {
        let _ = self.tx.send(UiEvent::Status(status));
    }

    fn controls_changed(&mut self, controls: &ControlState) {
        let _ = self.tx.send(UiEvent::Controls(controls.clone()));
    }
}

pub fn apply_event(state: &mut ViewState, event: UiEvent) {
    match event {
        UiEvent::Line(text) => state.push_line(text),
        UiEvent::ClearOutput => state.clear_lines(),
        UiEvent::Visual(node, visual) => state.set_node_state(node, visual),
        UiEvent::ClearVisuals => state.clear_node_states(),
        UiEvent::PacketStart { from, to, label } => {
            state.packet = Some(PacketView { from, to, label });
        }
        UiEvent::PacketEnd | UiEvent::RemovePackets => state.packet = None,
        UiEvent::Status(status) => state.status = status,
        UiEvent::Controls(controls) => state.controls = controls,
    }
}
