pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod data;
pub mod train;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::random::WeightRange;
pub use activation::activation::{ActivationFn, ActivationFunction};
pub use layers::{dense::Layer, unit::Unit};
pub use network::network::Network;
pub use network::spec::{parse_layer_list, NetworkSpec};
pub use data::{Dataset, PointLabel, Sample};
pub use train::{TrainConfig, TrainingController, TrainingState, TrainingStats, THROTTLE_MAX};
