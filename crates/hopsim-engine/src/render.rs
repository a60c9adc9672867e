//! Collaborator boundaries: the rendering sink and the control-state
//! listener. The sequencer only ever talks to these traits.

use hopsim_model::{ControlState, NodeRef, RunStatus, VisualState};

/// Label carried by simulated ICMP Time Exceeded return packets.
pub const ICMP_TIME_EXCEEDED_LABEL: &str = "11";

/// Rendering sink driven by the sequencer. Implementations own their
/// animation durations; the animate calls block until the animation is
/// done and are cooperative suspension points for the run. A renderer
/// that cannot draw a requested node must skip the call, never fail the
/// sequencer.
pub trait Renderer {
    fn append_line(&mut self, text: &str);
    fn clear_output(&mut self);
    fn animate_probe(&mut self, from: NodeRef, to: NodeRef, ttl: u32);
    fn animate_return(&mut self, from: NodeRef, to: NodeRef, label: &str);
    fn set_visual_state(&mut self, node: NodeRef, state: VisualState);
    fn clear_visual_states(&mut self);
    fn remove_packets(&mut self);
}

/// Receives status and control-surface updates for the embedding UI.
pub trait ControlListener {
    fn status_changed(&mut self, status: RunStatus);
    fn controls_changed(&mut self, controls: &ControlState);
}

pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn append_line(&mut self, _text: &str) {}
    fn clear_output(&mut self) {}
    fn animate_probe(&mut self, _from: NodeRef, _to: NodeRef, _ttl: u32) {}
    fn animate_return(&mut self, _from: NodeRef, _to: NodeRef, _label: &str) {}
    fn set_visual_state(&mut self, _node: NodeRef, _state: VisualState) {}
    fn clear_visual_states(&mut self) {}
    fn remove_packets(&mut self) {}
}

pub struct NullListener;

impl ControlListener for NullListener {
    fn status_changed(&mut self, _status: RunStatus) {}
    fn controls_changed(&mut self, _controls: &ControlState) {}
}
