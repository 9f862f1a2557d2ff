pub mod activation;

pub use activation::{ActivationFn, ActivationFunction};
