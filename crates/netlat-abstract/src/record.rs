use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a simulated client within its latency wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub u32);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Outcome of one client's traversal, created when its packet reaches the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub client: ClientId,
    pub latency_ms: f64,
    pub response_time_ms: f64,
    pub throughput_mbps: f64,
    pub packet_loss_pct: f64,
    /// Virtual time at which the record was emitted.
    pub completed_at: f64,
}

impl ResultRecord {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::ResponseTime => self.response_time_ms,
            Metric::Throughput => self.throughput_mbps,
            Metric::PacketLoss => self.packet_loss_pct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ResponseTime,
    Throughput,
    PacketLoss,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::ResponseTime, Metric::Throughput, Metric::PacketLoss];

    pub fn label(self) -> &'static str {
        match self {
            Metric::ResponseTime => "Response Time (ms)",
            Metric::Throughput => "Throughput (Mbps)",
            Metric::PacketLoss => "Packet Loss (%)",
        }
    }

    /// File-name friendly identifier.
    pub fn slug(self) -> &'static str {
        match self {
            Metric::ResponseTime => "response_time",
            Metric::Throughput => "throughput",
            Metric::PacketLoss => "packet_loss",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
