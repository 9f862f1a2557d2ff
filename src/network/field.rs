use crate::activation::ActivationFn;
use crate::error::Result;
use crate::math::remap;
use crate::network::network::Network;

/// Input-space coordinates of the centre of pixel `(col, row)` on a
/// `width x height` canvas.  Row 0 is the top edge (`y = +1`).
pub fn pixel_to_input(col: usize, row: usize, width: usize, height: usize) -> (f64, f64) {
    let x = remap(col as f64 + 0.5, 0.0, width as f64, -1.0, 1.0);
    let y = remap(row as f64 + 0.5, 0.0, height as f64, 1.0, -1.0);
    (x, y)
}

/// Inverse of [`pixel_to_input`], rounded down and clamped to the canvas.
pub fn input_to_pixel(x: f64, y: f64, width: usize, height: usize) -> (usize, usize) {
    let col = remap(x, -1.0, 1.0, 0.0, width as f64).floor();
    let row = remap(y, 1.0, -1.0, 0.0, height as f64).floor();
    let clamp = |v: f64, len: usize| v.max(0.0).min(len.saturating_sub(1) as f64) as usize;
    (clamp(col, width), clamp(row, height))
}

/// Evaluates a 2-input network over a `width x height` grid, row-major.
///
/// Only the first output is kept.  The caller must hold the training lock.
pub fn sample_field(
    network: &mut Network,
    activation: ActivationFn,
    width: usize,
    height: usize,
) -> Result<Vec<f64>> {
    let mut field = Vec::with_capacity(width * height);
    let mut output = vec![0.0; network.output_width()];
    for row in 0..height {
        for col in 0..width {
            let (x, y) = pixel_to_input(col, row, width, height);
            network.guess(activation, &[x, y], &mut output)?;
            field.push(output[0]);
        }
    }
    Ok(field)
}
