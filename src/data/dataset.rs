use std::ops::Index;

use serde::{Serialize, Deserialize};

/// One labelled training example.
///
/// `input.len()` must equal the network input width and `expected.len()` the
/// network output width; the engine does not check this at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub input: Vec<f64>,
    pub expected: Vec<f64>,
}

impl Sample {
    pub fn new(input: Vec<f64>, expected: Vec<f64>) -> Sample {
        Sample { input, expected }
    }

    /// A 2-in / 1-out sample, the shape produced by clicking on the canvas.
    pub fn point(x: f64, y: f64, value: f64) -> Sample {
        Sample { input: vec![x, y], expected: vec![value] }
    }
}

/// Growable ordered collection of samples.
///
/// Order only matters for indexing; the worker samples it uniformly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    pub fn new() -> Dataset {
        Dataset { samples: Vec::new() }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Removes the most recently appended sample, if any.
    pub fn pop(&mut self) -> Option<Sample> {
        self.samples.pop()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }
}

impl From<Vec<Sample>> for Dataset {
    fn from(samples: Vec<Sample>) -> Self {
        Dataset { samples }
    }
}

impl FromIterator<Sample> for Dataset {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Dataset { samples: iter.into_iter().collect() }
    }
}

impl Extend<Sample> for Dataset {
    fn extend<I: IntoIterator<Item = Sample>>(&mut self, iter: I) {
        self.samples.extend(iter);
    }
}

impl Index<usize> for Dataset {
    type Output = Sample;

    fn index(&self, index: usize) -> &Sample {
        &self.samples[index]
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_is_lifo() {
        let mut ds = Dataset::new();
        ds.push(Sample::point(0.1, 0.2, 1.0));
        ds.push(Sample::point(-0.5, 0.5, -1.0));
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.pop(), Some(Sample::point(-0.5, 0.5, -1.0)));
        assert_eq!(ds[0].expected, vec![1.0]);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut ds = Dataset::new();
        assert!(ds.pop().is_none());
        assert!(ds.is_empty());
    }
}
