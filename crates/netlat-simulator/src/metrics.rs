//! Closed-form link metrics evaluated when a packet reaches the router.
//!
//! All latencies are in milliseconds and loss values in percent. Callers
//! must pass finite, non-negative latencies; anything else panics.

use netlat_abstract::NoiseSource;

/// Asymptotic packet loss (%) reached at very high latency.
pub const LOSS_SCALE: f64 = 20.0;
/// Growth rate of packet loss per millisecond of latency.
pub const LOSS_GROWTH: f64 = 0.02;
/// Link capacity in Mbps.
pub const BANDWIDTH_MBPS: f64 = 100.0;
/// Minimum round-trip time of the path in ms.
pub const RTT_MIN_MS: f64 = 10.0;
pub const PROCESSING_DELAY_MS: f64 = 1.0;
pub const BASE_QUEUEING_DELAY_MS: f64 = 2.0;
/// Throughput never drops below this floor when latency is non-zero.
pub const MIN_THROUGHPUT_MBPS: f64 = 1.0;

fn check_latency(latency: f64) {
    assert!(
        latency.is_finite() && latency >= 0.0,
        "latency must be finite and non-negative, got {latency}"
    );
}

/// Loss percentage rising as `20 * (1 - e^(-0.02 * latency))`, jittered by one
/// draw from `noise` and clamped at zero.
pub fn packet_loss(latency: f64, noise: &mut dyn NoiseSource) -> f64 {
    check_latency(latency);
    let base = LOSS_SCALE * (1.0 - (-LOSS_GROWTH * latency).exp());
    (base + noise.sample()).max(0.0)
}

/// Achievable throughput in Mbps for the given latency and loss.
pub fn throughput(latency: f64, packet_loss_pct: f64) -> f64 {
    check_latency(latency);
    let loss_rate = packet_loss_pct / 100.0;
    if latency == 0.0 {
        return BANDWIDTH_MBPS * (1.0 - loss_rate);
    }
    let throughput = BANDWIDTH_MBPS * (1.0 - loss_rate) * (1.0 / (1.0 + latency / RTT_MIN_MS));
    throughput.max(MIN_THROUGHPUT_MBPS)
}

/// Response time in ms: round trip, processing, queueing and retransmissions.
pub fn response_time(latency: f64, packet_loss_pct: f64) -> f64 {
    check_latency(latency);
    let loss_rate = packet_loss_pct / 100.0;
    let rtt = 2.0 * latency;
    let queueing_delay = BASE_QUEUEING_DELAY_MS * (1.0 + loss_rate);
    let retransmission_delay = rtt * loss_rate;
    rtt + PROCESSING_DELAY_MS + queueing_delay + retransmission_delay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{FixedNoise, UniformNoise};

    const EPS: f64 = 1e-9;

    const LATENCIES: [f64; 9] = [0.0, 0.5, 1.0, 10.0, 50.0, 100.0, 150.0, 200.0, 10_000.0];

    #[test]
    fn throughput_peaks_at_full_bandwidth() {
        assert_eq!(throughput(0.0, 0.0), 100.0);
    }

    #[test]
    fn throughput_never_below_floor() {
        for latency in LATENCIES {
            for loss in [0.0, 17.0, 50.0, 99.0, 100.0] {
                if latency == 0.0 && loss == 100.0 {
                    // the zero-latency branch skips the floor
                    continue;
                }
                assert!(
                    throughput(latency, loss) >= 1.0,
                    "throughput({latency}, {loss}) below floor"
                );
            }
        }
    }

    #[test]
    fn throughput_decays_with_latency() {
        for loss in [0.0, 5.0, 17.0, 20.0] {
            let values: Vec<f64> = LATENCIES.iter().map(|&l| throughput(l, loss)).collect();
            for pair in values.windows(2) {
                assert!(pair[1] <= pair[0] + EPS, "{values:?} not decreasing");
            }
        }
    }

    #[test]
    fn response_time_baseline_is_three() {
        assert_eq!(response_time(0.0, 0.0), 3.0);
    }

    #[test]
    fn response_time_grows_with_latency() {
        for loss in [0.0, 4.0, 17.0, 20.0] {
            let values: Vec<f64> = LATENCIES.iter().map(|&l| response_time(l, loss)).collect();
            for pair in values.windows(2) {
                assert!(pair[1] + EPS >= pair[0], "{values:?} not increasing");
            }
        }
    }

    #[test]
    fn metrics_at_hundred_ms_and_seventeen_percent() {
        let rt = response_time(100.0, 17.0);
        assert!((rt - 237.34).abs() < 1e-9, "got {rt}");
        let tp = throughput(100.0, 17.0);
        assert!((tp - 100.0 * 0.83 / 11.0).abs() < 1e-9, "got {tp}");
        assert!((tp - 7.545).abs() < 1e-3);
    }

    #[test]
    fn packet_loss_follows_saturating_curve() {
        let mut quiet = FixedNoise::new(0.0).unwrap();
        assert_eq!(packet_loss(0.0, &mut quiet), 0.0);
        let at_100 = packet_loss(100.0, &mut quiet);
        assert!((at_100 - 20.0 * (1.0 - (-2.0f64).exp())).abs() < EPS);
        assert!(packet_loss(10_000.0, &mut quiet) <= LOSS_SCALE);
    }

    #[test]
    fn packet_loss_never_negative() {
        let mut worst = FixedNoise::new(-1.0).unwrap();
        for latency in LATENCIES {
            assert!(packet_loss(latency, &mut worst) >= 0.0);
        }
        let mut noise = UniformNoise::seeded(7);
        for latency in LATENCIES {
            for _ in 0..200 {
                assert!(packet_loss(latency, &mut noise) >= 0.0);
            }
        }
    }

    #[test]
    fn packet_loss_noise_is_bounded() {
        let mut noise = UniformNoise::seeded(99);
        let base = LOSS_SCALE * (1.0 - (-LOSS_GROWTH * 50.0f64).exp());
        for _ in 0..500 {
            let loss = packet_loss(50.0, &mut noise);
            assert!((loss - base).abs() <= 1.0 + EPS);
        }
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn negative_latency_panics() {
        response_time(-1.0, 0.0);
    }
}
