//! Headless runs: terminal lines go straight to stdout as the sequencer
//! emits them; visuals become debug logs.

use crate::{load_topology, write_json, RunArgs};
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use hopsim_engine::{
    ControlListener, Pacing, Renderer, RttSampler, Sequencer, SequencerHandle,
};
use hopsim_model::{ControlState, NodeRef, RunStatus, ScenarioConfig, VisualState};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

const PROBE_ANIMATION_MS: u64 = 800;

struct StdoutRenderer {
    lines: Arc<Mutex<Vec<String>>>,
    probe_ms: u64,
}

impl StdoutRenderer {
    fn animate(&self, ms: u64) {
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
    }
}

impl Renderer for StdoutRenderer {
    fn append_line(&mut self, text: &str) {
        println!("{text}");
        self.lines
            .lock()
            .expect("line log poisoned")
            .push(text.to_string());
    }

    fn clear_output(&mut self) {
        // stdout is append-only; only the transcript restarts.
        self.lines.lock().expect("line log poisoned").clear();
    }

    fn animate_probe(&mut self, _from: NodeRef, to: NodeRef, ttl: u32) {
        debug!(?to, ttl, "probe in flight");
        self.animate(self.probe_ms);
    }

    fn animate_return(&mut self, from: NodeRef, _to: NodeRef, label: &str) {
        debug!(?from, label, "return in flight");
        self.animate(self.probe_ms * 7 / 10);
    }

    fn set_visual_state(&mut self, node: NodeRef, state: VisualState) {
        debug!(?node, ?state, "visual state");
    }

    fn clear_visual_states(&mut self) {}

    fn remove_packets(&mut self) {}
}

struct StatusLogger;

impl ControlListener for StatusLogger {
    fn status_changed(&mut self, status: RunStatus) {
        info!(%status, "status");
    }

    fn controls_changed(&mut self, _controls: &ControlState) {}
}

#[derive(Serialize)]
struct Transcript {
    version: String,
    started_at_utc: String,
    finished_at_utc: String,
    outcome: String,
    seed: Option<u64>,
    config: ScenarioConfig,
    lines: Vec<String>,
}

pub fn run_headless(args: RunArgs) -> Result<()> {
    let topology = load_topology(args.scenario.topology.as_deref())?;
    let config = args.scenario.to_config();

    let handle = SequencerHandle::new();
    {
        let handle = handle.clone();
        ctrlc::set_handler(move || handle.cancel())
            .context("failed to install interrupt handler")?;
    }

    let lines: Arc<Mutex<Vec<String>>> = Arc::default();
    let renderer = StdoutRenderer {
        lines: lines.clone(),
        probe_ms: if args.fast { 0 } else { PROBE_ANIMATION_MS },
    };
    let pacing = if args.fast {
        Pacing::instant()
    } else {
        Pacing::default()
    };
    let sampler = match args.scenario.seed {
        Some(seed) => RttSampler::seeded(seed),
        None => RttSampler::from_entropy(),
    };

    let started_at_utc = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut sequencer = Sequencer::new(topology, config.clone(), renderer, StatusLogger, handle)
        .pacing(pacing)
        .sampler(sampler);
    let outcome = sequencer.start();
    let finished_at_utc = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    if let Some(path) = &args.transcript {
        let transcript = Transcript {
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at_utc,
            finished_at_utc,
            outcome: outcome.to_string(),
            seed: args.scenario.seed,
            config,
            lines: lines.lock().expect("line log poisoned").clone(),
        };
        write_json(path, &transcript)?;
        info!(path = %path.display(), "transcript written");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_serializes_with_stable_keys() {
        let transcript = Transcript {
            version: "0.1.0".to_string(),
            started_at_utc: "2026-02-01T12:00:00Z".to_string(),
            finished_at_utc: "2026-02-01T12:00:30Z".to_string(),
            outcome: "complete".to_string(),
            seed: Some(7),
            config: ScenarioConfig::default(),
            lines: vec!["traceroute to example".to_string()],
        };
        let value = serde_json::to_value(&transcript).unwrap();
        for key in [
            "version",
            "started_at_utc",
            "finished_at_utc",
            "outcome",
            "seed",
            "config",
            "lines",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["config"]["max_hops"], 30);
        assert_eq!(value["outcome"], "complete");
    }
}
