pub mod engine;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "charts")]
pub mod chart;

pub mod metrics;
pub mod noise;
pub mod report;
pub mod scenario_runner;
pub mod topology;
pub mod trace;

pub use engine::{Simulator, TimelineEntry, TimelineKind};
pub use noise::{FixedNoise, UniformNoise};
pub use report::LevelSummary;
pub use topology::{Stage, Traversal};
pub use trace::SimulationReport;
