use rand::prelude::*;
use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};

/// Closed interval weights and biases are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    pub lo: f64,
    pub hi: f64,
}

impl WeightRange {
    pub fn new(lo: f64, hi: f64) -> Result<WeightRange> {
        let range = WeightRange { lo, hi };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.lo.is_finite() || !self.hi.is_finite() || self.lo > self.hi {
            return Err(NnError::InvalidWeightRange { lo: self.lo, hi: self.hi });
        }
        Ok(())
    }

    /// One uniform draw from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen::<f64>() * (self.hi - self.lo) + self.lo
    }
}

impl Default for WeightRange {
    fn default() -> Self {
        WeightRange { lo: -1.0, hi: 1.0 }
    }
}

/// Signed training error.  The engine subtracts `rate * error * input`
/// everywhere, so the order of the operands matters.
pub fn error(expected: f64, got: f64) -> f64 {
    got - expected
}

/// Maps `value` linearly from `[from_lo, from_hi]` onto `[to_lo, to_hi]`.
pub fn remap(value: f64, from_lo: f64, from_hi: f64, to_lo: f64, to_hi: f64) -> f64 {
    (value - from_lo) / (from_hi - from_lo) * (to_hi - to_lo) + to_lo
}
