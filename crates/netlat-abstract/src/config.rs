use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Latency levels simulated when nothing else is configured (ms).
pub const DEFAULT_LATENCY_LEVELS: [f64; 6] = [0.0, 10.0, 50.0, 100.0, 150.0, 200.0];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    /// Ordered end-to-end latency levels, one wave of clients per level.
    pub latency_levels: Vec<f64>,
    pub clients_per_level: u32,
    /// Time a client waits before handing its packet to the switch.
    pub pre_send_delay: f64,
    /// Gap the driver leaves between two consecutive client spawns.
    pub spawn_interval: f64,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            latency_levels: DEFAULT_LATENCY_LEVELS.to_vec(),
            clients_per_level: 3,
            pre_send_delay: 10.0,
            spawn_interval: 1.0,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("latency level #{index} is {value}, expected a finite value >= 0")]
    InvalidLatency { index: usize, value: f64 },
    #[error("{field} is {value}, expected a finite value >= 0")]
    InvalidDelay { field: &'static str, value: f64 },
    #[error("fixed noise is {value}, expected a value within [-1, 1]")]
    InvalidNoise { value: f64 },
}

fn is_valid_duration(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl SimConfig {
    /// Total number of client processes a run with this config spawns.
    pub fn total_clients(&self) -> usize {
        self.latency_levels.len() * self.clients_per_level as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((index, &value)) = self
            .latency_levels
            .iter()
            .enumerate()
            .find(|(_, v)| !is_valid_duration(**v))
        {
            return Err(ConfigError::InvalidLatency { index, value });
        }
        for (field, value) in [
            ("pre_send_delay", self.pre_send_delay),
            ("spawn_interval", self.spawn_interval),
        ] {
            if !is_valid_duration(value) {
                return Err(ConfigError::InvalidDelay { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.total_clients(), 18);
    }

    #[test]
    fn negative_latency_is_rejected() {
        let config = SimConfig {
            latency_levels: vec![0.0, 10.0, -5.0],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidLatency {
                index: 2,
                value: -5.0
            })
        );
    }

    #[test]
    fn nan_delay_is_rejected() {
        let config = SimConfig {
            spawn_interval: f64::NAN,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().starts_with("spawn_interval"));
    }

    #[test]
    fn empty_levels_spawn_nothing() {
        let config = SimConfig {
            latency_levels: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.total_clients(), 0);
    }
}
