pub mod random;

pub use random::{error, remap, WeightRange};
