use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use netlat_abstract::{NoiseSource, SimConfig, SimConfigOverride};
use netlat_simulator::tui::{MemoryLogBuffer, TuiApp};
use netlat_simulator::{
    FixedNoise, SimulationReport, Simulator, UniformNoise, chart, report, scenario_runner,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Switch/router latency simulator")]
struct Args {
    /// Load a TOML file with simulation settings (same keys as a scenario's [config]).
    #[arg(long, conflicts_with = "scenario")]
    config: Option<PathBuf>,

    /// Run a scenario file and check its assertions.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Comma-separated latency levels in ms.
    #[arg(long, value_delimiter = ',', conflicts_with = "scenario")]
    levels: Option<Vec<f64>>,

    /// Clients spawned per latency level.
    #[arg(long, conflicts_with = "scenario")]
    clients: Option<u32>,

    /// Seed for the packet-loss noise.
    #[arg(long, conflicts_with = "scenario")]
    seed: Option<u64>,

    /// Use a constant packet-loss noise term instead of seeded jitter.
    #[arg(long, allow_hyphen_values = true, conflicts_with = "scenario")]
    fixed_noise: Option<f64>,

    /// Launch the terminal UI visualizer.
    #[arg(long, default_value_t = false)]
    tui: bool,

    /// Write one SVG chart per metric into this directory.
    #[arg(long)]
    chart_dir: Option<PathBuf>,

    /// Write a JSON trace of the finished simulation.
    #[arg(long)]
    trace_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let logs = init_logging(args.tui);
    info!("netlat starting…");

    let report = if let Some(path) = &args.scenario {
        if args.tui {
            let scenario = scenario_runner::load_scenario(path)?;
            let sim = scenario_runner::build_simulator(&scenario)?;
            let report = run_tui(sim, Some(scenario.name.clone()), logs)?;
            scenario_runner::check_assertions(&scenario, &report)?;
            report
        } else {
            scenario_runner::run_scenario(path)?
        }
    } else {
        let sim = args.build_simulator()?;
        if args.tui {
            run_tui(sim, None, logs)?
        } else {
            run_headless(sim)
        }
    };

    println!("{}", report::render_table(&report.summary));

    if let Some(dir) = &args.chart_dir {
        for path in chart::render_charts(&report.summary, dir)? {
            info!("Wrote chart {}", path.display());
        }
    }

    if let Some(trace_path) = &args.trace_out {
        write_trace(trace_path, &report)?;
    }

    Ok(())
}

impl Args {
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = SimConfig::default();
        if let Some(path) = &self.config {
            load_config_override(path)?.apply_to(&mut config);
        }
        SimConfigOverride {
            latency_levels: self.levels.clone(),
            clients_per_level: self.clients,
            seed: self.seed,
            ..Default::default()
        }
        .apply_to(&mut config);
        Ok(config)
    }

    fn build_simulator(&self) -> Result<Simulator> {
        let config = self.sim_config()?;
        let noise: Box<dyn NoiseSource> = match self.fixed_noise {
            Some(value) => Box::new(FixedNoise::new(value).context("Invalid --fixed-noise")?),
            None => Box::new(UniformNoise::seeded(config.seed)),
        };
        Simulator::new(config, noise).context("Invalid simulation config")
    }
}

fn init_logging(use_tui: bool) -> Option<MemoryLogBuffer> {
    if use_tui {
        let buffer = MemoryLogBuffer::new();
        let writer = buffer.clone();
        tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .init();
        Some(buffer)
    } else {
        tracing_subscriber::fmt::init();
        None
    }
}

fn run_headless(mut sim: Simulator) -> SimulationReport {
    info!("Starting headless simulation…");
    sim.run_until_complete();
    sim.export_report()
}

fn run_tui(
    sim: Simulator,
    scenario_name: Option<String>,
    logs: Option<MemoryLogBuffer>,
) -> Result<SimulationReport> {
    let mut app = TuiApp::new(sim, scenario_name);
    if let Some(logs) = logs {
        app = app.with_logs(logs);
    }
    app.run()?;
    let mut sim = app.into_simulator();
    // finish whatever the user did not step through
    sim.run_until_complete();
    Ok(sim.export_report())
}

fn load_config_override(path: &Path) -> Result<SimConfigOverride> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn write_trace(path: &Path, report: &SimulationReport) -> Result<()> {
    let data = serde_json::to_vec_pretty(report).context("Failed to serialize simulation trace")?;
    fs::write(path, &data)
        .with_context(|| format!("Failed to write trace file {}", path.display()))?;
    Ok(())
}
