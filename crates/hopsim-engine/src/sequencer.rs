//! The hop simulation sequencer: an ordered, pausable, cancellable loop
//! over TTL values that classifies each hop, drives the renderer, and
//! serializes every outcome into a terminal line.

use crate::classify::{classify, OutcomeKind};
use crate::line;
use crate::render::{ControlListener, Renderer, ICMP_TIME_EXCEEDED_LABEL};
use crate::rtt::RttSampler;
use hopsim_model::{
    ControlState, HopOutcome, NodeRef, RunStatus, ScenarioConfig, Topology, VisualState,
};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// The too-many-hops scenario aborts the run at the first TTL above this.
pub const TOO_MANY_HOPS_TTL: u32 = 15;

/// Requests accepted by [`Sequencer::serve`]. Pause and cancel also work
/// directly through the [`SequencerHandle`], which is how an embedding UI
/// reaches a run already in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    PauseToggle,
    Reset,
    Shutdown,
}

/// How a [`Sequencer::start`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Complete,
    TooManyHops,
    Cancelled,
    AlreadyRunning,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RunOutcome::Complete => "complete",
            RunOutcome::TooManyHops => "too_many_hops",
            RunOutcome::Cancelled => "cancelled",
            RunOutcome::AlreadyRunning => "already_running",
        };
        f.write_str(text)
    }
}

/// Engine pacing, independent of renderer animation durations.
#[derive(Debug, Clone)]
pub struct Pacing {
    pub inter_hop_delay: Duration,
    pub settle_delay: Duration,
    pub pause_poll: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            inter_hop_delay: Duration::from_millis(800),
            settle_delay: Duration::from_millis(200),
            pause_poll: Duration::from_millis(100),
        }
    }
}

impl Pacing {
    /// No wall-clock waits; tests run a full traceroute in microseconds.
    pub fn instant() -> Self {
        Self {
            inter_hop_delay: Duration::ZERO,
            settle_delay: Duration::ZERO,
            pause_poll: Duration::from_millis(1),
        }
    }
}

#[derive(Debug, Default)]
struct Flags {
    running: bool,
    paused: bool,
}

struct HandleInner {
    state: Mutex<Flags>,
    wake: Condvar,
}

/// Cloneable cross-thread control surface for one sequencer. All methods
/// are safe in any state; requests that do not apply are ignored.
#[derive(Clone)]
pub struct SequencerHandle {
    inner: Arc<HandleInner>,
}

impl SequencerHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HandleInner {
                state: Mutex::new(Flags::default()),
                wake: Condvar::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Flags> {
        self.inner.state.lock().expect("sequencer flags poisoned")
    }

    /// Claims the idle state for a new run. Returns false when a run is
    /// already active, which makes a second start request a no-op.
    pub fn try_begin(&self) -> bool {
        let mut flags = self.lock();
        if flags.running {
            return false;
        }
        flags.running = true;
        flags.paused = false;
        true
    }

    /// Flips the pause flag; no-op unless a run is active. Returns the new
    /// paused state so a UI can reflect it immediately.
    pub fn pause_toggle(&self) -> bool {
        let mut flags = self.lock();
        if !flags.running {
            return false;
        }
        flags.paused = !flags.paused;
        self.inner.wake.notify_all();
        flags.paused
    }

    /// Requests the run stop at its next suspension point.
    pub fn cancel(&self) {
        let mut flags = self.lock();
        flags.running = false;
        flags.paused = false;
        self.inner.wake.notify_all();
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    fn finish(&self) {
        let mut flags = self.lock();
        flags.running = false;
        flags.paused = false;
    }

    /// Blocks until the run is resumed or cancelled, waking at the pause
    /// poll granularity.
    fn block_while_paused(&self, poll: Duration) {
        let mut flags = self.lock();
        while flags.paused && flags.running {
            let (next, _) = self
                .inner
                .wake
                .wait_timeout(flags, poll)
                .expect("sequencer flags poisoned");
            flags = next;
        }
    }
}

impl Default for SequencerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Run bookkeeping, owned exclusively by the sequencer; outside layers
/// only see it through the control listener.
#[derive(Debug, Clone, Copy, Default)]
struct RunState {
    is_running: bool,
    is_paused: bool,
    current_hop: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunEnd {
    Complete,
    TooManyHops,
    Cancelled,
}

impl From<RunEnd> for RunOutcome {
    fn from(end: RunEnd) -> Self {
        match end {
            RunEnd::Complete => RunOutcome::Complete,
            RunEnd::TooManyHops => RunOutcome::TooManyHops,
            RunEnd::Cancelled => RunOutcome::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HopResult {
    Success,
    Error,
}

pub struct Sequencer<R: Renderer, L: ControlListener> {
    topology: Topology,
    config: ScenarioConfig,
    pacing: Pacing,
    sampler: RttSampler,
    renderer: R,
    listener: L,
    handle: SequencerHandle,
    run_state: RunState,
}

impl<R: Renderer, L: ControlListener> Sequencer<R, L> {
    pub fn new(
        topology: Topology,
        config: ScenarioConfig,
        renderer: R,
        listener: L,
        handle: SequencerHandle,
    ) -> Self {
        Self {
            topology,
            config,
            pacing: Pacing::default(),
            sampler: RttSampler::from_entropy(),
            renderer,
            listener,
            handle,
            run_state: RunState::default(),
        }
    }

    pub fn pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn sampler(mut self, sampler: RttSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn handle(&self) -> SequencerHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Replaces the scenario configuration. Ignored while a run is
    /// active; an active run keeps the snapshot it froze at start.
    pub fn set_config(&mut self, config: ScenarioConfig) -> bool {
        if self.handle.is_running() {
            return false;
        }
        self.config = config;
        true
    }

    /// Runs one full traceroute. A second start while a run is active is
    /// a silent no-op. The configuration is frozen for the whole run.
    pub fn start(&mut self) -> RunOutcome {
        if !self.handle.try_begin() {
            debug!("start ignored, run already active");
            return RunOutcome::AlreadyRunning;
        }
        let config = self.config.clone();
        self.run_state = RunState {
            is_running: true,
            is_paused: false,
            current_hop: 0,
        };
        self.set_status(RunStatus::Running);
        self.listener.controls_changed(&ControlState::running(false));
        self.renderer.clear_output();
        self.renderer
            .append_line(&line::banner(&self.topology, config.max_hops));

        let end = self.hop_loop(&config);
        match end {
            RunEnd::Complete => {
                self.set_status(RunStatus::Complete);
                self.renderer.append_line("");
                self.renderer.append_line(line::COMPLETE_LINE);
            }
            RunEnd::TooManyHops => {
                self.set_status(RunStatus::TooManyHops);
                self.renderer.append_line("");
                self.renderer
                    .append_line(&line::too_many_hops(config.max_hops));
            }
            RunEnd::Cancelled => debug!(hop = self.run_state.current_hop, "run cancelled"),
        }

        self.run_state.is_running = false;
        self.handle.finish();
        self.listener.controls_changed(&ControlState::idle());
        end.into()
    }

    /// Valid from any state: cancels an in-flight run at its next
    /// suspension point, positively clears output and visuals, and
    /// returns to the ready banner.
    pub fn reset(&mut self) {
        self.handle.cancel();
        self.run_state = RunState::default();
        self.renderer.clear_output();
        self.renderer.clear_visual_states();
        self.renderer.remove_packets();
        self.set_status(RunStatus::Ready);
        self.listener.controls_changed(&ControlState::idle());
        self.renderer
            .append_line(&line::banner(&self.topology, self.config.max_hops));
    }

    /// The idle state as a blocking command loop, for embedding on a
    /// worker thread. Pause and cancel reach a run in progress through
    /// the handle; the channel carries the rest.
    pub fn serve(&mut self, commands: Receiver<Command>) {
        self.set_status(RunStatus::Ready);
        self.listener.controls_changed(&ControlState::idle());
        self.renderer
            .append_line(&line::banner(&self.topology, self.config.max_hops));
        while let Ok(command) = commands.recv() {
            match command {
                Command::Start => {
                    self.start();
                }
                Command::PauseToggle => {
                    self.handle.pause_toggle();
                }
                Command::Reset => self.reset(),
                Command::Shutdown => break,
            }
        }
    }

    fn hop_loop(&mut self, config: &ScenarioConfig) -> RunEnd {
        let destination_ttl = self.topology.destination_ttl();
        for ttl in 1..=config.max_hops {
            // The only place pause and cancel take effect; a hop already
            // in progress runs to completion first.
            self.wait_while_paused();
            if !self.handle.is_running() {
                return RunEnd::Cancelled;
            }
            self.run_state.current_hop = ttl;

            if config.too_many_hops && ttl > TOO_MANY_HOPS_TTL {
                return RunEnd::TooManyHops;
            }

            let result = self.simulate_hop(ttl, config);

            if !config.too_many_hops && ttl >= destination_ttl && result == HopResult::Success {
                return RunEnd::Complete;
            }

            self.sleep(self.pacing.inter_hop_delay);
        }
        if self.handle.is_running() {
            RunEnd::TooManyHops
        } else {
            RunEnd::Cancelled
        }
    }

    fn simulate_hop(&mut self, ttl: u32, config: &ScenarioConfig) -> HopResult {
        let (target, node) = match self.topology.probe_target(ttl) {
            Some((target, node)) => (target, node.clone()),
            None => {
                debug!(ttl, "no probe target, skipping hop");
                return HopResult::Error;
            }
        };

        self.renderer.set_visual_state(target, VisualState::Active);
        self.renderer.animate_probe(NodeRef::Source, target, ttl);

        let kind = classify(ttl, config, self.topology.router_count());
        debug!(ttl, ?kind, "hop classified");
        let outcome = match kind {
            OutcomeKind::Timeout => {
                self.renderer.set_visual_state(target, VisualState::Timeout);
                // Half the configured budget, compressing the real wait.
                self.sleep(Duration::from_millis(config.timeout_budget_ms / 2));
                HopOutcome::Timeout
            }
            OutcomeKind::NetworkUnreachable => {
                let rtt = self.sampler.sample(node.baseline_rtt_ms);
                self.renderer
                    .set_visual_state(target, VisualState::Unreachable);
                self.renderer
                    .animate_return(target, NodeRef::Source, ICMP_TIME_EXCEEDED_LABEL);
                HopOutcome::NetworkUnreachable { rtt }
            }
            OutcomeKind::HostUnreachable => {
                let rtt = self.sampler.sample(node.baseline_rtt_ms);
                self.renderer
                    .set_visual_state(target, VisualState::Unreachable);
                self.renderer
                    .animate_return(target, NodeRef::Source, ICMP_TIME_EXCEEDED_LABEL);
                HopOutcome::HostUnreachable { rtt }
            }
            OutcomeKind::Success => {
                let rtt = [
                    self.sampler.sample(node.baseline_rtt_ms),
                    self.sampler.sample(node.baseline_rtt_ms),
                    self.sampler.sample(node.baseline_rtt_ms),
                ];
                self.renderer
                    .animate_return(target, NodeRef::Source, ICMP_TIME_EXCEEDED_LABEL);
                self.renderer
                    .set_visual_state(target, VisualState::Responding);
                self.sleep(self.pacing.settle_delay);
                HopOutcome::Success { rtt }
            }
        };

        // The line lands before the loop can observe a pause or cancel.
        self.renderer.append_line(&line::hop_line(ttl, &node, &outcome));
        self.renderer.clear_visual_states();
        if outcome.is_success() {
            HopResult::Success
        } else {
            HopResult::Error
        }
    }

    fn wait_while_paused(&mut self) {
        if !(self.handle.is_paused() && self.handle.is_running()) {
            return;
        }
        self.run_state.is_paused = true;
        self.set_status(RunStatus::Paused);
        self.listener.controls_changed(&ControlState::running(true));
        self.handle.block_while_paused(self.pacing.pause_poll);
        self.run_state.is_paused = false;
        if self.handle.is_running() {
            self.set_status(RunStatus::Running);
            self.listener.controls_changed(&ControlState::running(false));
        }
    }

    fn set_status(&mut self, status: RunStatus) {
        debug!(%status, "status changed");
        self.listener.status_changed(status);
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_begin_claims_idle_exactly_once() {
        let handle = SequencerHandle::new();
        assert!(handle.try_begin());
        assert!(!handle.try_begin());
        handle.cancel();
        assert!(handle.try_begin());
    }

    #[test]
    fn pause_toggle_requires_active_run() {
        let handle = SequencerHandle::new();
        assert!(!handle.pause_toggle());
        assert!(!handle.is_paused());

        handle.try_begin();
        assert!(handle.pause_toggle());
        assert!(handle.is_paused());
        assert!(!handle.pause_toggle());
    }

    #[test]
    fn cancel_clears_pause() {
        let handle = SequencerHandle::new();
        handle.try_begin();
        handle.pause_toggle();
        handle.cancel();
        assert!(!handle.is_running());
        assert!(!handle.is_paused());
    }
}
