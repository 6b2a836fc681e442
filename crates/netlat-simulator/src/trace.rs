use netlat_abstract::{ResultRecord, SimConfig};
use serde::Serialize;

use crate::engine::TimelineEntry;
use crate::report::LevelSummary;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub config: SimConfig,
    pub duration_ms: f64,
    pub records: Vec<ResultRecord>,
    pub summary: Vec<LevelSummary>,
    pub timeline: Vec<TimelineEntry>,
}
