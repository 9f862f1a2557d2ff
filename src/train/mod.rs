pub mod controller;
pub mod stats;
pub mod throttle;
pub mod train_config;

pub use controller::{TrainingController, TrainingState, ERROR_AVERAGE_ALPHA};
pub use stats::TrainingStats;
pub use throttle::THROTTLE_MAX;
pub use train_config::TrainConfig;
