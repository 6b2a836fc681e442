//! Per-latency aggregation of result records and the printed summary table.

use netlat_abstract::{Metric, ResultRecord};
use serde::Serialize;
use std::fmt::Write;

/// Arithmetic means of every metric over the records of one latency level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub latency_ms: f64,
    pub samples: usize,
    pub response_time_ms: f64,
    pub throughput_mbps: f64,
    pub packet_loss_pct: f64,
}

impl LevelSummary {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::ResponseTime => self.response_time_ms,
            Metric::Throughput => self.throughput_mbps,
            Metric::PacketLoss => self.packet_loss_pct,
        }
    }
}

/// Group records by latency level, ascending, and average each metric.
pub fn summarize(records: &[ResultRecord]) -> Vec<LevelSummary> {
    let mut groups: Vec<(f64, Vec<&ResultRecord>)> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|(l, _)| *l == record.latency_ms) {
            Some((_, members)) => members.push(record),
            None => groups.push((record.latency_ms, vec![record])),
        }
    }
    groups.sort_by(|a, b| a.0.total_cmp(&b.0));

    groups
        .into_iter()
        .map(|(latency_ms, members)| {
            let n = members.len() as f64;
            let mean = |metric: Metric| members.iter().map(|r| r.metric(metric)).sum::<f64>() / n;
            LevelSummary {
                latency_ms,
                samples: members.len(),
                response_time_ms: mean(Metric::ResponseTime),
                throughput_mbps: mean(Metric::Throughput),
                packet_loss_pct: mean(Metric::PacketLoss),
            }
        })
        .collect()
}

pub fn render_table(summaries: &[LevelSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>12}  {:>7}  {:>18}  {:>17}  {:>15}",
        "Latency (ms)",
        "Samples",
        Metric::ResponseTime.label(),
        Metric::Throughput.label(),
        Metric::PacketLoss.label()
    );
    for s in summaries {
        let _ = writeln!(
            out,
            "{:>12}  {:>7}  {:>18.3}  {:>17.3}  {:>15.3}",
            s.latency_ms, s.samples, s.response_time_ms, s.throughput_mbps, s.packet_loss_pct
        );
    }
    out
}
