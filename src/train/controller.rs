use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, warn};
use rand::Rng;

use crate::activation::{ActivationFn, ActivationFunction};
use crate::data::Dataset;
use crate::error::{NnError, Result};
use crate::network::Network;
use crate::train::stats::TrainingStats;
use crate::train::throttle;
use crate::train::train_config::{TrainConfig, DEFAULT_BATCH_SIZE};

/// Smoothing factor of the moving error average.
pub const ERROR_AVERAGE_ALPHA: f64 = 0.05 / DEFAULT_BATCH_SIZE as f64;

/// Everything the worker and the foreground share behind one lock.
///
/// Inference for rendering also goes through this lock because `guess`
/// writes the network's forward buffers.
#[derive(Debug)]
pub struct TrainingState {
    pub network: Network,
    pub dataset: Dataset,
    avg_error: f64,
    iterations: u64,
}

impl TrainingState {
    pub fn avg_error(&self) -> f64 {
        self.avg_error
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}

/// Lock-free knobs the foreground may turn while the worker runs.
#[derive(Debug)]
struct Settings {
    learning_rate: AtomicU64,
    batch_size: AtomicUsize,
    throttle: AtomicUsize,
    error_tolerance: f64,
}

impl Settings {
    fn from_config(config: &TrainConfig) -> Settings {
        Settings {
            learning_rate: AtomicU64::new(config.learning_rate.to_bits()),
            batch_size: AtomicUsize::new(config.batch_size),
            throttle: AtomicUsize::new(throttle::clamp_level(config.throttle)),
            error_tolerance: config.error_tolerance,
        }
    }

    fn learning_rate(&self) -> f64 {
        f64::from_bits(self.learning_rate.load(Ordering::Relaxed))
    }

    fn batch_size(&self) -> usize {
        self.batch_size.load(Ordering::Relaxed)
    }

    fn throttle(&self) -> usize {
        self.throttle.load(Ordering::Relaxed)
    }
}

/// Background worker that keeps training a network against a live dataset.
///
/// Each iteration takes the shared lock, trains on `batch_size` random
/// samples at `learning_rate * RATE_SCALE[throttle]`, folds the batch error
/// into a moving average, releases the lock and sleeps for a delay picked
/// from the throttle table.  The stop flag is checked between iterations,
/// outside the lock.
pub struct TrainingController {
    state: Arc<Mutex<TrainingState>>,
    settings: Arc<Settings>,
    stop_flag: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl TrainingController {
    /// Takes ownership of `network` and `dataset` and starts the worker.
    pub fn spawn(
        network: Network,
        dataset: Dataset,
        activation: ActivationFunction,
        config: TrainConfig,
    ) -> Result<TrainingController> {
        TrainingController::spawn_with(
            network,
            dataset,
            activation.function(),
            activation.derivative(),
            config,
        )
    }

    /// Same as [`TrainingController::spawn`] with an explicit activation pair.
    pub fn spawn_with(
        network: Network,
        dataset: Dataset,
        activation: ActivationFn,
        derivative: ActivationFn,
        config: TrainConfig,
    ) -> Result<TrainingController> {
        info!(
            "starting training worker: widths={:?} batch={} throttle={} rate={}",
            network.widths(),
            config.batch_size,
            config.throttle,
            config.learning_rate
        );
        let state = Arc::new(Mutex::new(TrainingState {
            network,
            dataset,
            avg_error: 0.0,
            iterations: 0,
        }));
        let settings = Arc::new(Settings::from_config(&config));
        let stop_flag = Arc::new(AtomicBool::new(false));

        let worker = {
            let state = state.clone();
            let settings = settings.clone();
            let stop_flag = stop_flag.clone();
            thread::Builder::new()
                .name("pixnn-trainer".into())
                .spawn(move || run_worker(&state, &settings, &stop_flag, activation, derivative))
                .map_err(NnError::WorkerSpawn)?
        };

        Ok(TrainingController {
            state,
            settings,
            stop_flag,
            worker: Some(worker),
        })
    }

    /// Acquires the lock the worker trains under.
    ///
    /// Dataset edits, re-randomizing, inference and reading the moving error
    /// must all happen through this guard.  Keep it short: the worker is
    /// blocked for as long as it is held.
    pub fn lock(&self) -> MutexGuard<'_, TrainingState> {
        lock_state(&self.state)
    }

    pub fn learning_rate(&self) -> f64 {
        self.settings.learning_rate()
    }

    pub fn set_learning_rate(&self, value: f64) {
        self.settings.learning_rate.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn batch_size(&self) -> usize {
        self.settings.batch_size()
    }

    pub fn set_batch_size(&self, value: usize) {
        self.settings.batch_size.store(value, Ordering::Relaxed);
    }

    pub fn throttle(&self) -> usize {
        self.settings.throttle()
    }

    /// Sets the throttle ceiling, clamped to `THROTTLE_MAX`.
    pub fn set_throttle(&self, value: usize) {
        self.settings.throttle.store(throttle::clamp_level(value), Ordering::Relaxed);
    }

    /// Moving average of training error, read under the lock.
    pub fn error(&self) -> f64 {
        self.lock().avg_error
    }

    pub fn stats(&self) -> TrainingStats {
        let (avg_error, samples, iterations) = {
            let st = self.lock();
            (st.avg_error, st.dataset.len(), st.iterations)
        };
        TrainingStats {
            avg_error,
            samples,
            iterations,
            learning_rate: self.learning_rate(),
            throttle: self.throttle(),
            batch_size: self.batch_size(),
            running: self.is_running(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the worker and waits for it to exit.  Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("training worker panicked before stopping");
            } else {
                debug!("training worker joined");
            }
        }
    }
}

impl Drop for TrainingController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock_state(state: &Mutex<TrainingState>) -> MutexGuard<'_, TrainingState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn run_worker(
    state: &Mutex<TrainingState>,
    settings: &Settings,
    stop_flag: &AtomicBool,
    activation: ActivationFn,
    derivative: ActivationFn,
) {
    let mut rng = rand::thread_rng();

    while !stop_flag.load(Ordering::Acquire) {
        let step = run_iteration(&mut lock_state(state), settings, activation, derivative, &mut rng);
        let pause = match step {
            Ok(pause) => pause,
            Err(e) => {
                error!("training step failed, worker exiting: {e}");
                break;
            }
        };

        if pause.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(pause);
        }
    }

    info!("training worker stopped");
}

/// One worker iteration, run with the lock held.
///
/// Trains a batch at `learning_rate * RATE_SCALE[throttle]`, folds the batch
/// error into the moving average and returns how long to pause afterwards.
/// The pause level is taken from the average as it stood before the batch.
fn run_iteration<R: Rng + ?Sized>(
    st: &mut TrainingState,
    settings: &Settings,
    activation: ActivationFn,
    derivative: ActivationFn,
    rng: &mut R,
) -> Result<Duration> {
    let level = settings.throttle();
    let rate = settings.learning_rate() * throttle::rate_scale(level);
    let sleep_level = throttle::sleep_level(level, st.avg_error, settings.error_tolerance);

    if let Some(batch_error) = train_batch(st, activation, derivative, settings.batch_size(), rate, rng)? {
        st.avg_error = st.avg_error * (1.0 - ERROR_AVERAGE_ALPHA) + batch_error * ERROR_AVERAGE_ALPHA;
    }
    st.iterations += 1;
    Ok(throttle::delay(sleep_level))
}

/// Runs one batch of single-sample steps on uniformly drawn indices.
///
/// Returns the batch's mean error, or `None` for an empty batch.  Draws
/// against an empty dataset are no-op steps contributing zero error.
fn train_batch<R: Rng + ?Sized>(
    st: &mut TrainingState,
    activation: ActivationFn,
    derivative: ActivationFn,
    batch_size: usize,
    rate: f64,
    rng: &mut R,
) -> Result<Option<f64>> {
    if batch_size == 0 {
        return Ok(None);
    }
    let TrainingState { network, dataset, .. } = st;
    let mut total = 0.0;
    for _ in 0..batch_size {
        let which = if dataset.is_empty() { 0 } else { rng.gen_range(0..dataset.len()) };
        total += network.train_dataset(activation, derivative, dataset, Some(which), rate)?;
    }
    Ok(Some(total / batch_size as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::{identity, identity_derivative};
    use crate::data::Sample;
    use crate::layers::{Layer, Unit};
    use crate::train::throttle::{DELAY_MS, RATE_SCALE, THROTTLE_MAX};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;

    fn quadrants() -> Dataset {
        vec![
            Sample::point(0.5, 0.5, 1.0),
            Sample::point(-0.5, -0.5, 1.0),
            Sample::point(0.5, -0.5, -1.0),
            Sample::point(-0.5, 0.5, -1.0),
        ]
        .into()
    }

    fn fast_config() -> TrainConfig {
        TrainConfig::new(0.05, THROTTLE_MAX, 4)
    }

    fn wait_for_iterations(ctl: &TrainingController, n: u64) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while ctl.lock().iterations() < n {
            assert!(Instant::now() < deadline, "worker made no progress");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn worker_trains_and_tracks_error() {
        let net = Network::from_widths(&[2, 4, 1]).unwrap();
        let mut ctl = TrainingController::spawn(net, quadrants(), ActivationFunction::Tanh, fast_config()).unwrap();
        wait_for_iterations(&ctl, 20);
        assert!(ctl.error() > 0.0);
        assert!(ctl.is_running());
        ctl.stop();
        assert!(!ctl.is_running());
    }

    #[test]
    fn no_mutation_after_stop() {
        let net = Network::from_widths(&[2, 3, 1]).unwrap();
        let mut ctl = TrainingController::spawn(net, quadrants(), ActivationFunction::Tanh, fast_config()).unwrap();
        wait_for_iterations(&ctl, 5);
        ctl.stop();
        let (net_before, iters_before) = {
            let st = ctl.lock();
            (st.network.clone(), st.iterations())
        };
        thread::sleep(Duration::from_millis(30));
        let st = ctl.lock();
        assert_eq!(st.network, net_before);
        assert_eq!(st.iterations(), iters_before);
    }

    #[test]
    fn stop_is_idempotent() {
        let net = Network::from_widths(&[2, 1]).unwrap();
        let mut ctl = TrainingController::spawn(net, Dataset::new(), ActivationFunction::Tanh, fast_config()).unwrap();
        ctl.stop();
        ctl.stop();
        drop(ctl);
    }

    #[test]
    fn empty_dataset_leaves_network_alone() {
        let net = Network::from_widths(&[2, 2, 1]).unwrap();
        let snapshot = net.clone();
        let mut ctl = TrainingController::spawn(net, Dataset::new(), ActivationFunction::Tanh, fast_config()).unwrap();
        // zero error keeps the worker on the longest delay
        wait_for_iterations(&ctl, 3);
        ctl.stop();
        let st = ctl.lock();
        assert_eq!(st.network.layers(), snapshot.layers());
        assert_eq!(st.avg_error(), 0.0);
    }

    #[test]
    fn foreground_edits_through_lock() {
        let net = Network::from_widths(&[2, 3, 1]).unwrap();
        let mut ctl = TrainingController::spawn(net, Dataset::new(), ActivationFunction::Tanh, fast_config()).unwrap();
        for s in quadrants().iter() {
            ctl.lock().dataset.push(s.clone());
        }
        ctl.lock().dataset.pop();
        {
            let mut st = ctl.lock();
            st.network.randomize();
            let out = st.network.predict(tanh_fn(), &[0.0, 0.0]).unwrap();
            assert_eq!(out.len(), 1);
        }
        assert_eq!(ctl.stats().samples, 3);
        ctl.stop();
    }

    #[test]
    fn settings_are_clamped_and_visible() {
        let net = Network::from_widths(&[2, 1]).unwrap();
        let ctl = TrainingController::spawn(net, Dataset::new(), ActivationFunction::Tanh, TrainConfig::default()).unwrap();
        ctl.set_throttle(THROTTLE_MAX + 7);
        assert_eq!(ctl.throttle(), THROTTLE_MAX);
        ctl.set_learning_rate(0.25);
        ctl.set_batch_size(2);
        let stats = ctl.stats();
        assert_eq!(stats.learning_rate, 0.25);
        assert_eq!(stats.batch_size, 2);
        assert!(stats.running);
    }

    #[test]
    fn moved_out_network_ends_worker() {
        let net = Network::from_widths(&[2, 1]).unwrap();
        let mut ctl = TrainingController::spawn(net, quadrants(), ActivationFunction::Tanh, fast_config()).unwrap();
        let _stolen = ctl.lock().network.take();
        let deadline = Instant::now() + Duration::from_secs(10);
        while ctl.is_running() {
            assert!(Instant::now() < deadline, "worker kept running on a moved-out network");
            thread::sleep(Duration::from_millis(1));
        }
        ctl.stop();
    }

    fn tanh_fn() -> ActivationFn {
        ActivationFunction::Tanh.function()
    }

    /// Identity unit `x + 0y + 0` and the single sample `(0.5, 0) -> 1`,
    /// so every step sees `got = 0.5` and `error = -0.5` until weights move.
    fn single_point_state() -> TrainingState {
        let unit = Unit::from_weights(vec![1.0, 0.0, 0.0]).unwrap();
        let network = Network::from_layers(vec![Layer::from_units(vec![unit]).unwrap()]).unwrap();
        TrainingState {
            network,
            dataset: vec![Sample::point(0.5, 0.0, 1.0)].into(),
            avg_error: 0.0,
            iterations: 0,
        }
    }

    fn iterate(st: &mut TrainingState, settings: &Settings) -> Duration {
        let mut rng = StdRng::seed_from_u64(0);
        run_iteration(st, settings, identity, identity_derivative, &mut rng).unwrap()
    }

    #[test]
    fn iteration_folds_batch_error_into_moving_average() {
        let mut st = single_point_state();
        let settings = Settings::from_config(&TrainConfig::new(0.0, THROTTLE_MAX, 3));

        iterate(&mut st, &settings);
        assert_eq!(st.iterations(), 1);
        assert_eq!(st.avg_error(), 0.5 * ERROR_AVERAGE_ALPHA);

        let after_one = st.avg_error();
        iterate(&mut st, &settings);
        assert_eq!(st.iterations(), 2);
        assert_eq!(
            st.avg_error(),
            after_one * (1.0 - ERROR_AVERAGE_ALPHA) + 0.5 * ERROR_AVERAGE_ALPHA
        );
        // rate 0 leaves the weights alone
        assert_eq!(st.network.layers()[0].unit(0).weights(), &[1.0, 0.0]);
    }

    #[test]
    fn iteration_scales_rate_by_throttle_level() {
        let level = 3;
        let rate = 0.2;
        let mut st = single_point_state();
        let settings = Settings::from_config(&TrainConfig::new(rate, level, 1));

        iterate(&mut st, &settings);

        let effective = rate * RATE_SCALE[level];
        let (err, x) = (-0.5, 0.5);
        let unit = st.network.layers()[0].unit(0);
        assert!((unit.weights()[0] - (1.0 - effective * err * x)).abs() < 1e-15);
        assert_eq!(unit.weights()[1], 0.0);
        assert!((unit.bias() - (0.0 - effective * err)).abs() < 1e-15);
    }

    #[test]
    fn iteration_pause_follows_pressure_before_the_batch() {
        let settings = Settings::from_config(&TrainConfig::new(0.0, 3, 1));

        // zero average: no pressure, longest delay
        let mut st = single_point_state();
        assert_eq!(iterate(&mut st, &settings), Duration::from_millis(DELAY_MS[0]));

        // 3² · 1.0 / 0.1 = 90, capped at the configured level 3
        let mut st = single_point_state();
        st.avg_error = 1.0;
        assert_eq!(iterate(&mut st, &settings), Duration::from_millis(DELAY_MS[3]));

        // 3² · 0.02 / 0.1 = 1.8 -> level 1
        let mut st = single_point_state();
        st.avg_error = 0.02;
        assert_eq!(iterate(&mut st, &settings), Duration::from_millis(DELAY_MS[1]));

        let fast = Settings::from_config(&TrainConfig::new(0.0, THROTTLE_MAX, 1));
        let mut st = single_point_state();
        st.avg_error = 1.0;
        assert_eq!(iterate(&mut st, &fast), Duration::ZERO);
    }
}
