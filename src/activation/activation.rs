use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Element-wise activation (or derivative) as passed to `guess`/`train`.
pub type ActivationFn = fn(f64) -> f64;

/// The fixed set of activations the engine supports.
///
/// Each variant resolves to a pair of plain functions.  The derivative
/// helpers re-apply the base activation to their argument before
/// differentiating; the back-propagation pass feeds them already-activated
/// values and relies on that pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sign,
    Sigmoid,
    ReLU,
    Tanh,
    Identity,
}

impl ActivationFunction {
    pub fn function(self) -> ActivationFn {
        match self {
            ActivationFunction::Sign => sign,
            ActivationFunction::Sigmoid => sigmoid,
            ActivationFunction::ReLU => relu,
            ActivationFunction::Tanh => tanh,
            ActivationFunction::Identity => identity,
        }
    }

    pub fn derivative(self) -> ActivationFn {
        match self {
            ActivationFunction::Sign => sign_derivative,
            ActivationFunction::Sigmoid => sigmoid_derivative,
            ActivationFunction::ReLU => relu_derivative,
            ActivationFunction::Tanh => tanh_derivative,
            ActivationFunction::Identity => identity_derivative,
        }
    }
}

impl Default for ActivationFunction {
    fn default() -> Self {
        ActivationFunction::Tanh
    }
}

pub fn sign(x: f64) -> f64 {
    if x > 0.0 { 1.0 } else { -1.0 }
}

/// Flat everywhere it is defined.
pub fn sign_derivative(_x: f64) -> f64 {
    0.0
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + E.powf(-x))
}

pub fn sigmoid_derivative(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

pub fn relu(x: f64) -> f64 {
    if x > 0.0 { x } else { 0.0 }
}

pub fn relu_derivative(x: f64) -> f64 {
    if x > 0.0 { 1.0 } else { 0.0 }
}

pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

pub fn tanh_derivative(x: f64) -> f64 {
    let t = tanh(x);
    1.0 - t * t
}

pub fn identity(x: f64) -> f64 {
    x
}

pub fn identity_derivative(_x: f64) -> f64 {
    1.0
}
