use rand::Rng;

use crate::activation::ActivationFn;
use crate::data::Dataset;
use crate::error::{NnError, Result};
use crate::layers::unit::Unit;
use crate::math::{self, WeightRange};

/// A group of units sharing one input width.  Output width is the unit count.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    input_width: usize,
    units: Vec<Unit>,
}

impl Layer {
    /// `output_width` randomly initialised units, each reading `input_width` values.
    pub fn new(input_width: usize, output_width: usize) -> Layer {
        Layer::with_range(input_width, output_width, WeightRange::default(), &mut rand::thread_rng())
    }

    pub fn with_range<R: Rng + ?Sized>(
        input_width: usize,
        output_width: usize,
        range: WeightRange,
        rng: &mut R,
    ) -> Layer {
        let units = (0..output_width)
            .map(|_| Unit::with_range(input_width, range, rng))
            .collect();
        Layer { input_width, units }
    }

    /// Assembles a layer from prebuilt units; all must share one input width.
    pub fn from_units(units: Vec<Unit>) -> Result<Layer> {
        let first = units.first().ok_or(NnError::ZeroWidth { index: 0 })?;
        let input_width = first.input_width();
        if let Some(bad) = units.iter().find(|u| u.input_width() != input_width) {
            return Err(NnError::WidthMismatch {
                layer: 0,
                expected: input_width,
                got: bad.input_width(),
            });
        }
        Ok(Layer { input_width, units })
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn output_width(&self) -> usize {
        self.units.len()
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, i: usize) -> &Unit {
        &self.units[i]
    }

    pub fn unit_mut(&mut self, i: usize) -> &mut Unit {
        &mut self.units[i]
    }

    /// Writes each unit's activation into the matching `output` slot.
    pub fn guess(&self, activation: ActivationFn, input: &[f64], output: &mut [f64]) {
        debug_assert!(output.len() >= self.units.len());
        for (out, unit) in output.iter_mut().zip(&self.units) {
            *out = unit.guess(activation, input);
        }
    }

    /// Steps every unit with its own component of `errors`.
    ///
    /// The activation is unused by the delta rule; it is accepted so
    /// callers can treat `guess` and `learn` symmetrically.
    pub fn learn(&mut self, _activation: ActivationFn, input: &[f64], errors: &[f64], rate: f64) {
        debug_assert!(errors.len() >= self.units.len());
        for (unit, &err) in self.units.iter_mut().zip(errors) {
            unit.learn(input, err, rate);
        }
    }

    /// Online training of this layer on its own, for a one-layer topology.
    ///
    /// Every unit is stepped against its expected component for every
    /// sample, recomputing its forward value each time.  No network buffers
    /// are involved.  Returns the mean absolute error over all samples and
    /// outputs, measured before each step.
    pub fn train(&mut self, activation: ActivationFn, data: &Dataset, rate: f64) -> f64 {
        if data.is_empty() || self.units.is_empty() {
            return 0.0;
        }
        let mut total = 0.0;
        for sample in data {
            for (unit, &expected) in self.units.iter_mut().zip(&sample.expected) {
                let err = math::error(expected, unit.guess(activation, &sample.input));
                total += err.abs();
                unit.learn(&sample.input, err, rate);
            }
        }
        total / (data.len() * self.units.len()) as f64
    }

    pub fn randomize(&mut self) {
        self.randomize_within(WeightRange::default(), &mut rand::thread_rng());
    }

    pub fn randomize_within<R: Rng + ?Sized>(&mut self, range: WeightRange, rng: &mut R) {
        for unit in &mut self.units {
            unit.randomize_within(range, rng);
        }
    }
}
