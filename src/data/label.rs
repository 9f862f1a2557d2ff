use serde::{Serialize, Deserialize};

use crate::data::dataset::Sample;

/// Discrete value a user can paint onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointLabel {
    Positive,
    Neutral,
    Negative,
}

impl PointLabel {
    /// Target value for this label; `half` halves it.
    pub fn value(self, half: bool) -> f64 {
        let v = match self {
            PointLabel::Positive => 1.0,
            PointLabel::Neutral => 0.0,
            PointLabel::Negative => -1.0,
        };
        if half { v / 2.0 } else { v }
    }

    /// Builds the sample for a click at `(x, y)` in network input space.
    ///
    /// Returns `None` for a non-neutral label whose value collapsed to zero.
    pub fn sample_at(self, x: f64, y: f64, half: bool) -> Option<Sample> {
        let value = self.value(half);
        if self == PointLabel::Neutral || value != 0.0 {
            Some(Sample::point(x, y, value))
        } else {
            None
        }
    }
}
