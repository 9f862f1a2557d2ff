pub mod field;
pub mod network;
pub mod spec;

pub use field::{input_to_pixel, pixel_to_input, sample_field};
pub use network::Network;
pub use spec::{parse_layer_list, NetworkSpec, DEFAULT_LAYER_LIST};
