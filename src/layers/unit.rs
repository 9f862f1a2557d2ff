use rand::Rng;

use crate::activation::ActivationFn;
use crate::data::Dataset;
use crate::error::{NnError, Result};
use crate::math::{self, WeightRange};

/// A single weighted sum plus bias passed through an activation.
///
/// `weights` holds `input_width + 1` values; the last one is the bias.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    input_width: usize,
    weights: Vec<f64>,
}

impl Unit {
    /// Builds a unit with weights drawn uniformly from the default range.
    pub fn new(input_width: usize) -> Unit {
        Unit::with_range(input_width, WeightRange::default(), &mut rand::thread_rng())
    }

    pub fn with_range<R: Rng + ?Sized>(input_width: usize, range: WeightRange, rng: &mut R) -> Unit {
        let weights = (0..=input_width).map(|_| range.sample(rng)).collect();
        Unit { input_width, weights }
    }

    /// Builds a unit from explicit `[w0, .., wn-1, bias]` weights.
    pub fn from_weights(weights: Vec<f64>) -> Result<Unit> {
        if weights.len() < 2 {
            return Err(NnError::ZeroWidth { index: 0 });
        }
        Ok(Unit { input_width: weights.len() - 1, weights })
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    /// Input weights, bias excluded.
    pub fn weights(&self) -> &[f64] {
        &self.weights[..self.input_width]
    }

    pub fn bias(&self) -> f64 {
        self.weights[self.input_width]
    }

    pub fn set_bias(&mut self, value: f64) {
        self.weights[self.input_width] = value;
    }

    /// `activation(w · input + bias)`.
    ///
    /// `input` must hold at least `input_width` values.
    pub fn guess(&self, activation: ActivationFn, input: &[f64]) -> f64 {
        debug_assert!(input.len() >= self.input_width);
        let sum: f64 = self.weights[..self.input_width]
            .iter()
            .zip(input)
            .map(|(w, x)| w * x)
            .sum();
        activation(sum + self.weights[self.input_width])
    }

    /// Delta-rule step: `w_i -= rate * error * input_i`, `bias -= rate * error`.
    ///
    /// `error` is `got - expected` and must already carry any
    /// derivative factor the caller wants applied.
    pub fn learn(&mut self, input: &[f64], error: f64, rate: f64) {
        debug_assert!(input.len() >= self.input_width);
        let step = rate * error;
        let (weights, bias) = self.weights.split_at_mut(self.input_width);
        for (w, x) in weights.iter_mut().zip(input) {
            *w -= step * x;
        }
        bias[0] -= step;
    }

    /// Online pass over `data` against each sample's first expected value.
    /// Returns the mean absolute error seen before each step.
    pub fn train(&mut self, activation: ActivationFn, data: &Dataset, rate: f64) -> f64 {
        if data.is_empty() {
            return 0.0;
        }
        let mut total = 0.0;
        for sample in data {
            let got = self.guess(activation, &sample.input);
            let err = math::error(sample.expected[0], got);
            total += err.abs();
            self.learn(&sample.input, err, rate);
        }
        total / data.len() as f64
    }

    pub fn randomize(&mut self) {
        self.randomize_within(WeightRange::default(), &mut rand::thread_rng());
    }

    /// Redraws every weight and the bias independently from `range`.
    pub fn randomize_within<R: Rng + ?Sized>(&mut self, range: WeightRange, rng: &mut R) {
        for w in &mut self.weights {
            *w = range.sample(rng);
        }
    }
}
