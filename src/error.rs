use std::io;

/// The crate's result type.
pub type Result<T> = std::result::Result<T, NnError>;

/// Failures surfaced by network construction, configuration and the training worker.
#[derive(Debug, thiserror::Error)]
pub enum NnError {
    /// A topology needs at least an input and an output width.
    #[error("topology needs at least two widths, got {0}")]
    EmptyTopology(usize),

    #[error("width at position {index} is zero")]
    ZeroWidth { index: usize },

    /// Adjacent layers (or units) do not agree on their shared width.
    #[error("layer {layer} expects {expected} inputs, got {got}")]
    WidthMismatch {
        layer: usize,
        expected: usize,
        got: usize,
    },

    /// The canvas front-ends feed `(x, y)` points and read one value back.
    #[error("canvas needs a 2-input, 1-output network, got {input} -> {output}")]
    NotPlanar { input: usize, output: usize },

    #[error("invalid weight range [{lo}, {hi}]")]
    InvalidWeightRange { lo: f64, hi: f64 },

    /// The network's layers and scratch buffers were moved into another value.
    #[error("network has been moved out and holds no buffers")]
    MovedOut,

    #[error("\"{0}\" is not a number")]
    InvalidNumber(String),

    #[error("invalid layer list: {0}")]
    InvalidList(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not spawn training worker: {0}")]
    WorkerSpawn(io::Error),
}
