use crate::config::SimConfig;
use crate::record::Metric;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub config: SimConfigOverride,
    /// Replace the seeded noise with a constant, making every metric exact.
    #[serde(default)]
    pub fixed_noise: Option<f64>,
    #[serde(default)]
    pub assertions: Vec<TestAssertion>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SimConfigOverride {
    pub latency_levels: Option<Vec<f64>>,
    pub clients_per_level: Option<u32>,
    pub pre_send_delay: Option<f64>,
    pub spawn_interval: Option<f64>,
    pub seed: Option<u64>,
}

impl SimConfigOverride {
    pub fn apply_to(&self, config: &mut SimConfig) {
        if let Some(v) = &self.latency_levels {
            config.latency_levels = v.clone();
        }
        if let Some(v) = self.clients_per_level {
            config.clients_per_level = v;
        }
        if let Some(v) = self.pre_send_delay {
            config.pre_send_delay = v;
        }
        if let Some(v) = self.spawn_interval {
            config.spawn_interval = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestAssertion {
    /// Assert the exact number of result records produced by the run
    RecordCount { expected: usize },
    /// Assert that the mean of a metric at one latency level falls within range
    MeanWithin {
        latency: f64,
        metric: Metric,
        min: f64,
        max: Option<f64>,
    },
    /// Assert that the timeline drains before the given virtual time
    MaxDuration { ms: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
name = "two-levels"
description = "zero and 100 ms, noise pinned to zero"
fixed_noise = 0.0

[config]
latency_levels = [0.0, 100.0]
clients_per_level = 4

[[assertions]]
type = "record_count"
expected = 8

[[assertions]]
type = "mean_within"
latency = 0.0
metric = "throughput"
min = 99.9
max = 100.1

[[assertions]]
type = "max_duration"
ms = 200.0
"#;

    #[test]
    fn parses_scenario_file() {
        let scenario: TestScenario = toml::from_str(SAMPLE).unwrap();
        assert_eq!(scenario.name, "two-levels");
        assert_eq!(scenario.fixed_noise, Some(0.0));
        assert_eq!(scenario.assertions.len(), 3);
        assert_eq!(
            scenario.assertions[1],
            TestAssertion::MeanWithin {
                latency: 0.0,
                metric: Metric::Throughput,
                min: 99.9,
                max: Some(100.1),
            }
        );
    }

    #[test]
    fn override_only_touches_present_fields() {
        let scenario: TestScenario = toml::from_str(SAMPLE).unwrap();
        let mut config = SimConfig::default();
        scenario.config.apply_to(&mut config);
        assert_eq!(config.latency_levels, vec![0.0, 100.0]);
        assert_eq!(config.clients_per_level, 4);
        assert_eq!(config.pre_send_delay, 10.0);
        assert_eq!(config.seed, 0);
    }
}
