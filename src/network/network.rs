use log::debug;
use rand::Rng;

use crate::activation::ActivationFn;
use crate::data::Dataset;
use crate::error::{NnError, Result};
use crate::layers::dense::Layer;
use crate::math::{self, WeightRange};

/// Per-boundary scratch storage for one training step.
///
/// `forward[i]` and `backward[i]` are sized to layer `i`'s input width;
/// the last entry of each is sized to the network output width.
#[derive(Debug, Clone, PartialEq)]
struct Buffers {
    forward: Vec<Vec<f64>>,
    backward: Vec<Vec<f64>>,
}

impl Buffers {
    fn for_layers(layers: &[Layer]) -> Buffers {
        let mut widths: Vec<usize> = layers.iter().map(Layer::input_width).collect();
        widths.push(layers.last().map_or(0, Layer::output_width));
        Buffers {
            forward: widths.iter().map(|&w| vec![0.0; w]).collect(),
            backward: widths.iter().map(|&w| vec![0.0; w]).collect(),
        }
    }
}

/// Whether this value still owns its layers and buffers.
#[derive(Debug, Clone, PartialEq)]
enum Scratch {
    Live(Buffers),
    MovedOut,
}

/// A chain of layers where each layer's output width is the next one's input width.
///
/// Scratch buffers are allocated once at construction and reused by every
/// `guess`/`train` call.  `Clone` produces a fully independent copy with its
/// own buffers; [`Network::take`] moves the contents out and leaves this
/// value unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    layers: Vec<Layer>,
    input_width: usize,
    output_width: usize,
    weight_range: WeightRange,
    scratch: Scratch,
}

impl Network {
    /// Builds `input -> hidden.. -> output` with random weights in `[-1, 1]`.
    pub fn new(input_width: usize, hidden: &[usize], output_width: usize) -> Result<Network> {
        let mut widths = Vec::with_capacity(hidden.len() + 2);
        widths.push(input_width);
        widths.extend_from_slice(hidden);
        widths.push(output_width);
        Network::from_widths(&widths)
    }

    /// Builds a network from boundary widths `[input, hidden.., output]`.
    pub fn from_widths(widths: &[usize]) -> Result<Network> {
        Network::with_range(widths, WeightRange::default(), &mut rand::thread_rng())
    }

    pub fn with_range<R: Rng + ?Sized>(
        widths: &[usize],
        range: WeightRange,
        rng: &mut R,
    ) -> Result<Network> {
        if widths.len() < 2 {
            return Err(NnError::EmptyTopology(widths.len()));
        }
        if let Some(index) = widths.iter().position(|&w| w == 0) {
            return Err(NnError::ZeroWidth { index });
        }
        range.validate()?;
        let layers = widths
            .windows(2)
            .map(|pair| Layer::with_range(pair[0], pair[1], range, rng))
            .collect();
        let mut network = Network::from_layers(layers)?;
        network.weight_range = range;
        Ok(network)
    }

    /// Assembles a network from prebuilt layers, checking that widths chain.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Network> {
        let first = layers.first().ok_or(NnError::EmptyTopology(0))?;
        let input_width = first.input_width();
        if input_width == 0 {
            return Err(NnError::ZeroWidth { index: 0 });
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].output_width() != pair[1].input_width() {
                return Err(NnError::WidthMismatch {
                    layer: i + 1,
                    expected: pair[0].output_width(),
                    got: pair[1].input_width(),
                });
            }
        }
        for (i, layer) in layers.iter().enumerate() {
            if layer.output_width() == 0 {
                return Err(NnError::ZeroWidth { index: i + 1 });
            }
        }
        let output_width = layers.last().map_or(0, Layer::output_width);
        let scratch = Scratch::Live(Buffers::for_layers(&layers));
        debug!(
            "built network: {} layers, {} -> {}",
            layers.len(),
            input_width,
            output_width
        );
        Ok(Network {
            layers,
            input_width,
            output_width,
            weight_range: WeightRange::default(),
            scratch,
        })
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn output_width(&self) -> usize {
        self.output_width
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_mut(&mut self, i: usize) -> &mut Layer {
        &mut self.layers[i]
    }

    /// Boundary widths `[input, hidden.., output]`; empty once moved out.
    pub fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.layers.iter().map(Layer::input_width).collect();
        if let Some(last) = self.layers.last() {
            widths.push(last.output_width());
        }
        widths
    }

    pub fn is_moved(&self) -> bool {
        matches!(self.scratch, Scratch::MovedOut)
    }

    /// Moves layers and buffers into a new value, leaving `self` marked as moved-out.
    pub fn take(&mut self) -> Network {
        let scratch = std::mem::replace(&mut self.scratch, Scratch::MovedOut);
        Network {
            layers: std::mem::take(&mut self.layers),
            input_width: self.input_width,
            output_width: self.output_width,
            weight_range: self.weight_range,
            scratch,
        }
    }

    /// Forward pass for inference.
    ///
    /// Layer 0 reads `input` directly and the last layer writes straight into
    /// `output`; intermediate activations go through the forward buffers, so
    /// this needs exclusive access even though weights are untouched.
    /// `input` must hold `input_width` values and `output` `output_width`.
    pub fn guess(&mut self, activation: ActivationFn, input: &[f64], output: &mut [f64]) -> Result<()> {
        let buffers = match &mut self.scratch {
            Scratch::Live(b) => b,
            Scratch::MovedOut => return Err(NnError::MovedOut),
        };
        debug_assert_eq!(input.len(), self.input_width);
        debug_assert_eq!(output.len(), self.output_width);

        let last = self.layers.len() - 1;
        if last == 0 {
            self.layers[0].guess(activation, input, output);
            return Ok(());
        }
        self.layers[0].guess(activation, input, &mut buffers.forward[1]);
        for i in 1..last {
            let (src, dst) = adjacent(&mut buffers.forward, i);
            self.layers[i].guess(activation, src, dst);
        }
        self.layers[last].guess(activation, &buffers.forward[last], output);
        Ok(())
    }

    /// Allocating convenience over [`Network::guess`].
    pub fn predict(&mut self, activation: ActivationFn, input: &[f64]) -> Result<Vec<f64>> {
        let mut output = vec![0.0; self.output_width];
        self.guess(activation, input, &mut output)?;
        Ok(output)
    }

    /// One back-propagation step on a single sample.
    ///
    /// Returns the mean absolute output error measured before the update.
    /// `derivative` is evaluated on activated forward values, not on raw sums.
    pub fn train(
        &mut self,
        activation: ActivationFn,
        derivative: ActivationFn,
        input: &[f64],
        expected: &[f64],
        rate: f64,
    ) -> Result<f64> {
        let Buffers { forward, backward } = match &mut self.scratch {
            Scratch::Live(b) => b,
            Scratch::MovedOut => return Err(NnError::MovedOut),
        };
        debug_assert_eq!(input.len(), self.input_width);
        debug_assert_eq!(expected.len(), self.output_width);
        let n = self.layers.len();

        forward[0].copy_from_slice(input);
        for (i, layer) in self.layers.iter().enumerate() {
            let (src, dst) = adjacent(forward, i);
            layer.guess(activation, src, dst);
        }

        let mut avg_error = 0.0;
        let out_width = self.output_width as f64;
        for ((slot, &got), &want) in backward[n].iter_mut().zip(&forward[n]).zip(expected) {
            *slot = math::error(want, got);
            avg_error += slot.abs() / out_width;
        }

        // Down to layer 1; layer 0 has no upstream boundary worth filling.
        for k in (1..n).rev() {
            let accum: f64 = backward[k + 1].iter().sum();
            for (b, &f) in backward[k].iter_mut().zip(&forward[k]) {
                *b = accum * derivative(f);
            }
            self.layers[k].learn(activation, &forward[k], &backward[k + 1], rate);
        }
        self.layers[0].learn(activation, &forward[0], &backward[1], rate);

        Ok(avg_error)
    }

    /// Trains on `data[which % len]`, or on every sample in order when `which` is `None`.
    ///
    /// The all-samples form returns the arithmetic mean of the per-sample
    /// errors.  An empty dataset is a no-op returning `0.0`.
    pub fn train_dataset(
        &mut self,
        activation: ActivationFn,
        derivative: ActivationFn,
        data: &Dataset,
        which: Option<usize>,
        rate: f64,
    ) -> Result<f64> {
        if self.is_moved() {
            return Err(NnError::MovedOut);
        }
        if data.is_empty() {
            return Ok(0.0);
        }
        match which {
            Some(i) => {
                let sample = &data[i % data.len()];
                self.train(activation, derivative, &sample.input, &sample.expected, rate)
            }
            None => {
                let mut total = 0.0;
                for sample in data {
                    total += self.train(activation, derivative, &sample.input, &sample.expected, rate)?;
                }
                Ok(total / data.len() as f64)
            }
        }
    }

    /// Redraws every weight from the network's configured range.  Buffers are untouched.
    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::thread_rng());
    }

    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let range = self.weight_range;
        for layer in &mut self.layers {
            layer.randomize_within(range, rng);
        }
    }
}

/// Splits `bufs` into `(&bufs[i], &mut bufs[i + 1])`.
fn adjacent(bufs: &mut [Vec<f64>], i: usize) -> (&[f64], &mut [f64]) {
    let (head, tail) = bufs.split_at_mut(i + 1);
    (&head[i], &mut tail[0])
}
