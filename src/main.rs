//! Headless trainer: seeds a toy point set, lets the background worker train
//! for a while, and prints the learned decision field as text.
//!
//! Run with:
//!   RUST_LOG=info cargo run --bin pixnn -- --layers 8,8 --pattern circle --seconds 3

use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use log::{error, info};
use rand::Rng;

use pixnn::network::{sample_field, DEFAULT_LAYER_LIST};
use pixnn::{
    parse_layer_list, Dataset, NetworkSpec, NnError, PointLabel, Result, TrainConfig, TrainingController,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Pattern {
    /// Positive in the first and third quadrants.
    Xor,
    /// Positive inside a circle of radius 0.5.
    Circle,
    /// Positive right of the y axis.
    Split,
}

impl Pattern {
    fn label(self, x: f64, y: f64) -> PointLabel {
        let positive = match self {
            Pattern::Xor => x * y > 0.0,
            Pattern::Circle => x * x + y * y < 0.25,
            Pattern::Split => x > 0.0,
        };
        if positive { PointLabel::Positive } else { PointLabel::Negative }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pixnn", about = "Train a small network on a toy point set in the background")]
struct Args {
    /// Hidden layer widths, separated by ',', ':' or ';'.
    #[arg(long, default_value = DEFAULT_LAYER_LIST)]
    layers: String,

    /// JSON network spec; overrides --layers.
    #[arg(long)]
    spec: Option<String>,

    /// JSON training config; individual flags below override it.
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    rate: Option<f64>,

    #[arg(long)]
    throttle: Option<usize>,

    #[arg(long)]
    batch: Option<usize>,

    #[arg(long, value_enum, default_value_t = Pattern::Xor)]
    pattern: Pattern,

    /// Number of random points to label.
    #[arg(long, default_value_t = 48)]
    points: usize,

    #[arg(long, default_value_t = 5.0)]
    seconds: f64,

    #[arg(long, default_value_t = 500)]
    report_ms: u64,

    /// Width of the printed field in characters.
    #[arg(long, default_value_t = 48)]
    columns: usize,
}

fn main() {
    env_logger::init();
    if let Err(e) = run(Args::parse()) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let spec = match &args.spec {
        Some(path) => NetworkSpec::load_json(path)?,
        None => NetworkSpec::plane(&parse_layer_list(&args.layers)?),
    };
    spec.ensure_plane()?;
    let mut config = match &args.config {
        Some(path) => TrainConfig::load_json(path)?,
        None => TrainConfig::default(),
    };
    if let Some(rate) = args.rate {
        config.learning_rate = rate;
    }
    if let Some(level) = args.throttle {
        // the controller clamps out-of-range levels
        config.throttle = level;
    }
    if let Some(batch) = args.batch {
        config.batch_size = batch;
    }

    let run_for = run_duration(args.seconds)?;
    let network = spec.build()?;
    let dataset = seed_points(args.pattern, args.points);
    info!("seeded {} {:?} points", dataset.len(), args.pattern);

    let mut trainer = TrainingController::spawn(network, dataset, spec.activation, config)?;

    let started = Instant::now();
    while started.elapsed() < run_for {
        thread::sleep(Duration::from_millis(args.report_ms.max(1)).min(run_for));
        let stats = trainer.stats();
        info!(
            "t={:.1}s error={:.5} iterations={} throttle={}",
            started.elapsed().as_secs_f64(),
            stats.avg_error,
            stats.iterations,
            stats.throttle
        );
        if !stats.running {
            break;
        }
    }
    trainer.stop();

    let columns = args.columns.max(2);
    let rows = columns / 2;
    let field = {
        let mut st = trainer.lock();
        sample_field(&mut st.network, spec.activation.function(), columns, rows)?
    };
    println!("final error: {:.5}", trainer.error());
    for line in field.chunks(columns) {
        println!("{}", line.iter().map(|&v| shade(v)).collect::<String>());
    }
    Ok(())
}

/// `--seconds` as a duration; negative or NaN means no training time.
fn run_duration(seconds: f64) -> Result<Duration> {
    let seconds = if seconds.is_nan() { 0.0 } else { seconds.max(0.0) };
    Duration::try_from_secs_f64(seconds).map_err(|_| NnError::InvalidNumber(seconds.to_string()))
}

fn seed_points(pattern: Pattern, count: usize) -> Dataset {
    let mut rng = rand::thread_rng();
    (0..count)
        .filter_map(|_| {
            let x = rng.gen_range(-1.0..1.0);
            let y = rng.gen_range(-1.0..1.0);
            pattern.label(x, y).sample_at(x, y, false)
        })
        .collect()
}

fn shade(v: f64) -> char {
    match v {
        v if v > 0.5 => '#',
        v if v > 0.0 => '+',
        v if v > -0.5 => '-',
        _ => ' ',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_duration_rejects_unrepresentable_seconds() {
        assert_eq!(run_duration(1.5).unwrap(), Duration::from_millis(1500));
        assert_eq!(run_duration(-3.0).unwrap(), Duration::ZERO);
        assert_eq!(run_duration(f64::NAN).unwrap(), Duration::ZERO);
        assert!(matches!(run_duration(f64::INFINITY), Err(NnError::InvalidNumber(_))));
        assert!(run_duration(1e300).is_err());
    }

    #[test]
    fn patterns_label_quadrants() {
        assert_eq!(Pattern::Xor.label(0.5, 0.5), PointLabel::Positive);
        assert_eq!(Pattern::Xor.label(-0.5, 0.5), PointLabel::Negative);
        assert_eq!(Pattern::Circle.label(0.1, 0.1), PointLabel::Positive);
        assert_eq!(Pattern::Split.label(-0.1, 0.9), PointLabel::Negative);
    }
}
