//! HopSim CLI: simulated traceroute runs on the terminal.

mod headless;
mod tui;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use hopsim_engine::validate_topology;
use hopsim_model::{ScenarioConfig, Topology, TopologyFile, TOPOLOGY_FILE_VERSION};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::Level;

#[derive(Parser)]
#[command(name = "hopsim", version, about = "Interactive traceroute simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulated traceroute and print the terminal output
    Run(RunArgs),
    /// Interactive terminal UI with start/pause/reset controls
    Tui(TuiArgs),
    /// Print a topology as JSON
    Topology(TopologyArgs),
}

#[derive(Args, Clone)]
struct ScenarioArgs {
    /// Simulate a routing loop: abort once the TTL passes 15
    #[arg(long)]
    too_many_hops: bool,

    /// Simulate a probe timeout at this hop
    #[arg(long, value_name = "HOP", value_parser = clap::value_parser!(u32).range(1..))]
    timeout_at_hop: Option<u32>,

    /// Simulate an ICMP network-unreachable at hop 3
    #[arg(long)]
    network_unreachable: bool,

    /// Simulate an ICMP host-unreachable at the destination
    #[arg(long)]
    host_unreachable: bool,

    /// Probe TTL limit
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=30))]
    max_hops: u32,

    /// Simulated probe timeout budget in milliseconds
    #[arg(long, default_value_t = 5000, value_parser = clap::value_parser!(u64).range(1000..=10000))]
    timeout_ms: u64,

    /// Topology JSON file (defaults to the built-in topology)
    #[arg(long)]
    topology: Option<PathBuf>,

    /// RNG seed for reproducible RTT samples
    #[arg(long)]
    seed: Option<u64>,
}

impl ScenarioArgs {
    fn to_config(&self) -> ScenarioConfig {
        ScenarioConfig {
            too_many_hops: self.too_many_hops,
            timeout_at_hop: self.timeout_at_hop.is_some(),
            timeout_hop_number: self.timeout_at_hop.unwrap_or(5),
            network_unreachable: self.network_unreachable,
            host_unreachable: self.host_unreachable,
            max_hops: self.max_hops,
            timeout_budget_ms: self.timeout_ms,
        }
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,

    /// Skip all pacing and animation delays
    #[arg(long)]
    fast: bool,

    /// Write a JSON transcript of the run
    #[arg(long, value_name = "PATH")]
    transcript: Option<PathBuf>,
}

#[derive(Args)]
struct TuiArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,

    /// Probe animation duration in milliseconds
    #[arg(long, default_value_t = 800)]
    anim_ms: u64,
}

#[derive(Args)]
struct TopologyArgs {
    /// Topology JSON file (defaults to the built-in topology)
    #[arg(long)]
    topology: Option<PathBuf>,

    /// Write to a file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => headless::run_headless(args),
        Commands::Tui(args) => tui::run_tui(args),
        Commands::Topology(args) => run_topology(args),
    }
}

fn run_topology(args: TopologyArgs) -> Result<()> {
    let topology = load_topology(args.topology.as_deref())?;
    let file = TopologyFile::from_topology(&topology);
    match args.out {
        Some(path) => write_json(&path, &file),
        None => {
            println!("{}", serde_json::to_string_pretty(&file)?);
            Ok(())
        }
    }
}

fn load_topology(path: Option<&Path>) -> Result<Topology> {
    let topology = match path {
        None => Topology::reference(),
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read topology file {path:?}"))?;
            let file: TopologyFile = serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse topology file {path:?}"))?;
            if file.version != TOPOLOGY_FILE_VERSION {
                return Err(anyhow!(
                    "unsupported topology file version {} (expected {})",
                    file.version,
                    TOPOLOGY_FILE_VERSION
                ));
            }
            file.into_topology()
        }
    };
    validate_topology(&topology)?;
    Ok(topology)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &json)
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {parent:?}"))?;
    }

    let tmp_path = temp_path(path);
    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("failed to create temp file {tmp_path:?}"))?;
    file.write_all(data)
        .with_context(|| format!("failed to write temp file {tmp_path:?}"))?;
    file.sync_all()
        .with_context(|| format!("failed to sync temp file {tmp_path:?}"))?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(anyhow!("failed to replace output {path:?}: {err}"));
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output");
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    parent.join(format!(".{}.part-{}-{}", file_name, std::process::id(), stamp))
}
