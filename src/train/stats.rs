use serde::{Serialize, Deserialize};

/// Point-in-time view of a running controller, taken under its lock.
///
/// Front-ends poll this to display progress; it is the only way the moving
/// error leaves the locked state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Exponential moving average of per-batch mean absolute error.
    pub avg_error: f64,
    /// Number of samples currently in the dataset.
    pub samples: usize,
    /// Worker iterations completed so far.
    pub iterations: u64,
    pub learning_rate: f64,
    pub throttle: usize,
    pub batch_size: usize,
    /// Whether the worker thread is still alive.
    pub running: bool,
}
