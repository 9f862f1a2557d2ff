use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pixnn::{ActivationFn, ActivationFunction, TrainingController};

/// Everything request handlers share.
///
/// The network and dataset live inside the controller; handlers reach them
/// only through `trainer.lock()`.
pub struct StudioState {
    pub trainer: TrainingController,
    pub activation: ActivationFunction,
    /// Side length of the rendered field in pixels.
    pub resolution: usize,
    /// Render the activation's derivative instead of the activation itself.
    show_derivs: AtomicBool,
    /// Overlay the training points on the frame.
    show_training: AtomicBool,
}

impl StudioState {
    pub fn new(trainer: TrainingController, activation: ActivationFunction, resolution: usize) -> Self {
        StudioState {
            trainer,
            activation,
            resolution,
            show_derivs: AtomicBool::new(false),
            show_training: AtomicBool::new(true),
        }
    }

    pub fn toggle_derivs(&self) -> bool {
        !self.show_derivs.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn showing_derivs(&self) -> bool {
        self.show_derivs.load(Ordering::Relaxed)
    }

    pub fn toggle_training(&self) -> bool {
        !self.show_training.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn showing_training(&self) -> bool {
        self.show_training.load(Ordering::Relaxed)
    }

    /// Function the canvas is painted with.
    pub fn view_fn(&self) -> ActivationFn {
        if self.showing_derivs() {
            self.activation.derivative()
        } else {
            self.activation.function()
        }
    }
}

/// Shared state type: an `Arc<StudioState>` passed to every handler.
pub type SharedState = Arc<StudioState>;

#[cfg(test)]
mod tests {
    use super::*;
    use pixnn::{Dataset, Network, TrainConfig};

    #[test]
    fn view_toggles_flip_independently() {
        let net = Network::from_widths(&[2, 1]).unwrap();
        let trainer = TrainingController::spawn(net, Dataset::new(), ActivationFunction::Tanh, TrainConfig::default()).unwrap();
        let state = StudioState::new(trainer, ActivationFunction::Tanh, 8);

        assert!(state.showing_training());
        assert!(!state.toggle_training());
        assert!(!state.showing_training());
        assert!(!state.showing_derivs());

        assert!(state.toggle_derivs());
        // tanh'(0) = 1 while tanh(0) = 0
        assert_eq!((state.view_fn())(0.0), 1.0);
        assert!(state.toggle_training());
        assert!(state.showing_derivs());
    }
}
