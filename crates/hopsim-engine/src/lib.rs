//! Hop simulation engine: RTT sampling, outcome classification, line
//! formatting, and the pausable run sequencer.

pub mod classify;
pub mod line;
pub mod render;
pub mod rtt;
pub mod sequencer;
pub mod validate;

pub use classify::{classify, OutcomeKind, NETWORK_UNREACHABLE_TTL};
pub use render::{
    ControlListener, NullListener, NullRenderer, Renderer, ICMP_TIME_EXCEEDED_LABEL,
};
pub use rtt::RttSampler;
pub use sequencer::{
    Command, Pacing, RunOutcome, Sequencer, SequencerHandle, TOO_MANY_HOPS_TTL,
};
pub use validate::{validate_config, validate_topology};
