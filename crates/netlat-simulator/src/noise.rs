use netlat_abstract::{ConfigError, NoiseSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform jitter in `[-1, 1]` drawn from a seeded `StdRng`.
pub struct UniformNoise {
    rng: StdRng,
}

impl UniformNoise {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NoiseSource for UniformNoise {
    fn sample(&mut self) -> f64 {
        self.rng.random_range(-1.0..=1.0)
    }
}

/// Returns the same value on every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedNoise(f64);

impl FixedNoise {
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if !(-1.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidNoise { value });
        }
        Ok(Self(value))
    }
}

impl NoiseSource for FixedNoise {
    fn sample(&mut self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_draws() {
        let mut a = UniformNoise::seeded(42);
        let mut b = UniformNoise::seeded(42);
        for _ in 0..32 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn fixed_noise_outside_unit_range_is_rejected() {
        for value in [150.0, -1.5, f64::NAN, f64::INFINITY] {
            assert!(FixedNoise::new(value).is_err(), "{value} accepted");
        }
        let mut edge = FixedNoise::new(-1.0).unwrap();
        assert_eq!(edge.sample(), -1.0);
        assert!(FixedNoise::new(1.0).is_ok());
    }

    #[test]
    fn draws_stay_in_range() {
        let mut noise = UniformNoise::seeded(3);
        for _ in 0..1000 {
            let v = noise.sample();
            assert!((-1.0..=1.0).contains(&v));
        }
    }
}
