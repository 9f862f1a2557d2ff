use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::train::throttle::{self, THROTTLE_MAX};

pub const DEFAULT_LEARNING_RATE: f64 = 0.0001;
pub const DEFAULT_BATCH_SIZE: usize = 6;
/// Average error at which the worker stops backing off its polling rate.
pub const DEFAULT_ERROR_TOLERANCE: f64 = 0.1;

/// Knobs the training controller starts with.
///
/// # Fields
/// - `learning_rate`  : base rate, scaled per step by the throttle table
/// - `throttle`       : initial throttle level, clamped to `THROTTLE_MAX`
/// - `batch_size`     : samples drawn per worker iteration
/// - `error_tolerance`: divisor of the moving error when computing pressure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub throttle: usize,
    pub batch_size: usize,
    pub error_tolerance: f64,
}

impl TrainConfig {
    pub fn new(learning_rate: f64, throttle: usize, batch_size: usize) -> Self {
        TrainConfig {
            learning_rate,
            throttle: throttle::clamp_level(throttle),
            batch_size,
            ..TrainConfig::default()
        }
    }

    pub fn load_json(path: &str) -> Result<TrainConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let mut config: TrainConfig = serde_json::from_reader(reader)?;
        config.throttle = throttle::clamp_level(config.throttle);
        Ok(config)
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            learning_rate: DEFAULT_LEARNING_RATE,
            throttle: THROTTLE_MAX,
            batch_size: DEFAULT_BATCH_SIZE,
            error_tolerance: DEFAULT_ERROR_TOLERANCE,
        }
    }
}
