pub mod dataset;
pub mod label;

pub use dataset::{Dataset, Sample};
pub use label::PointLabel;
