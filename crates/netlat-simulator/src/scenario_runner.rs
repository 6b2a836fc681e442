use anyhow::{Context, Result, bail};
use netlat_abstract::{NoiseSource, SimConfig, TestAssertion, TestScenario};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::engine::Simulator;
use crate::noise::{FixedNoise, UniformNoise};
use crate::trace::SimulationReport;

pub fn load_scenario(path: &Path) -> Result<TestScenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    toml::from_str(&content).context("Failed to parse scenario file")
}

/// Build the simulator a scenario describes without running it.
pub fn build_simulator(scenario: &TestScenario) -> Result<Simulator> {
    let mut config = SimConfig::default();
    scenario.config.apply_to(&mut config);
    let noise: Box<dyn NoiseSource> = match scenario.fixed_noise {
        Some(value) => Box::new(
            FixedNoise::new(value)
                .with_context(|| format!("Invalid noise in scenario '{}'", scenario.name))?,
        ),
        None => Box::new(UniformNoise::seeded(config.seed)),
    };
    Simulator::new(config, noise)
        .with_context(|| format!("Invalid config in scenario '{}'", scenario.name))
}

/// Load, run and check the scenario at `path`.
pub fn run_scenario(path: &Path) -> Result<SimulationReport> {
    let scenario = load_scenario(path)?;
    let mut sim = build_simulator(&scenario)?;
    info!("Running scenario '{}': {}", scenario.name, scenario.description);
    sim.run_until_complete();
    let report = sim.export_report();
    check_assertions(&scenario, &report)?;
    info!(
        "Scenario '{}' passed {} assertions",
        scenario.name,
        scenario.assertions.len()
    );
    Ok(report)
}

pub fn check_assertions(scenario: &TestScenario, report: &SimulationReport) -> Result<()> {
    for assertion in &scenario.assertions {
        match assertion {
            TestAssertion::RecordCount { expected } => {
                if report.records.len() != *expected {
                    bail!(
                        "Expected {} records, got {}",
                        expected,
                        report.records.len()
                    );
                }
            }
            TestAssertion::MeanWithin {
                latency,
                metric,
                min,
                max,
            } => {
                let level = report
                    .summary
                    .iter()
                    .find(|s| s.latency_ms == *latency)
                    .with_context(|| format!("No records at latency {latency}ms"))?;
                let mean = level.metric(*metric);
                if mean < *min {
                    bail!("Mean {metric} at {latency}ms is {mean}, below {min}");
                }
                if let Some(max) = max
                    && mean > *max
                {
                    bail!("Mean {metric} at {latency}ms is {mean}, above {max}");
                }
            }
            TestAssertion::MaxDuration { ms } => {
                if report.duration_ms > *ms {
                    bail!(
                        "Simulation took {}ms, exceeding limit of {}ms",
                        report.duration_ms,
                        ms
                    );
                }
            }
        }
    }
    Ok(())
}
