pub mod config;
pub mod interface;
pub mod record;
pub mod scenario;

pub use interface::NoiseSource;
pub use record::{ClientId, Metric, ResultRecord};

pub use config::{ConfigError, SimConfig};
pub use scenario::{SimConfigOverride, TestAssertion, TestScenario};
