//! The fixed two-hop path every packet takes: switch, then router.
//!
//! Each hop holds the packet for half of the configured latency. The split
//! only shapes timing; the router always evaluates metrics against the full
//! configured level.

use netlat_abstract::{ClientId, NoiseSource, ResultRecord};
use std::fmt;

use crate::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Switch,
    Router,
}

impl Stage {
    /// How long this hop holds a packet travelling at `latency`.
    pub fn hold_time(self, latency: f64) -> f64 {
        latency / 2.0
    }

    /// The hop a packet is handed to once this one releases it.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Switch => Some(Stage::Router),
            Stage::Router => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Switch => f.write_str("switch"),
            Stage::Router => f.write_str("router"),
        }
    }
}

/// One client's packet in flight. Carries the original latency level through
/// every hop unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Traversal {
    pub client: ClientId,
    pub latency: f64,
}

/// Terminal router step: evaluate the metrics for a traversal that has just
/// cleared its last hop.
pub fn complete(traversal: Traversal, now: f64, noise: &mut dyn NoiseSource) -> ResultRecord {
    let packet_loss_pct = metrics::packet_loss(traversal.latency, noise);
    ResultRecord {
        client: traversal.client,
        latency_ms: traversal.latency,
        response_time_ms: metrics::response_time(traversal.latency, packet_loss_pct),
        throughput_mbps: metrics::throughput(traversal.latency, packet_loss_pct),
        packet_loss_pct,
        completed_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::FixedNoise;

    #[test]
    fn hops_split_latency_evenly() {
        let latency = 150.0;
        let total: f64 = [Stage::Switch, Stage::Router]
            .iter()
            .map(|s| s.hold_time(latency))
            .sum();
        assert_eq!(total, latency);
    }

    #[test]
    fn router_is_terminal() {
        assert_eq!(Stage::Switch.next(), Some(Stage::Router));
        assert_eq!(Stage::Router.next(), None);
    }

    #[test]
    fn complete_uses_full_latency() {
        let traversal = Traversal {
            client: ClientId(2),
            latency: 0.0,
        };
        let record = complete(traversal, 10.0, &mut FixedNoise::new(0.0).unwrap());
        assert_eq!(record.client, ClientId(2));
        assert_eq!(record.packet_loss_pct, 0.0);
        assert_eq!(record.response_time_ms, 3.0);
        assert_eq!(record.throughput_mbps, 100.0);
        assert_eq!(record.completed_at, 10.0);
    }
}
