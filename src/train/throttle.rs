use std::time::Duration;

/// Highest throttle level; also the last index of both tables.
pub const THROTTLE_MAX: usize = 10;

/// Worker sleep after each batch, per level.  Reaches zero at `THROTTLE_MAX`.
pub const DELAY_MS: [u64; THROTTLE_MAX + 1] = [200, 50, 40, 30, 20, 10, 5, 4, 2, 1, 0];

/// Learning-rate multiplier per level, halving on every step down.
pub const RATE_SCALE: [f64; THROTTLE_MAX + 1] = [
    0.03125 / 32.0,
    0.03125 / 16.0,
    0.03125 / 8.0,
    0.03125 / 4.0,
    0.03125 / 2.0,
    0.03125,
    0.0625,
    0.125,
    0.25,
    0.5,
    1.0,
];

pub fn clamp_level(level: usize) -> usize {
    level.min(THROTTLE_MAX)
}

pub fn delay(level: usize) -> Duration {
    Duration::from_millis(DELAY_MS[clamp_level(level)])
}

pub fn rate_scale(level: usize) -> f64 {
    RATE_SCALE[clamp_level(level)]
}

/// `floor(level² · avg_error / tolerance)`, saturating; NaN maps to 0.
pub fn pressure(level: usize, avg_error: f64, tolerance: f64) -> usize {
    let level = level as f64;
    let p = level * level * (avg_error / tolerance);
    if p.is_nan() || p <= 0.0 {
        0
    } else {
        // f64 -> usize casts saturate
        p as usize
    }
}

/// Level whose delay the worker sleeps for: the pressure, capped by the
/// configured level and by the table.
pub fn sleep_level(level: usize, avg_error: f64, tolerance: f64) -> usize {
    pressure(level, avg_error, tolerance).min(level).min(THROTTLE_MAX)
}
