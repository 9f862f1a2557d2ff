//! Page and frame rendering for the pixnn studio.
//!
//! The HTML shell is embedded at compile time (`studio/assets/canvas.html`)
//! with `{{TOKEN}}` placeholders.  The canvas itself is a PNG produced on
//! every `/frame.png` request from a snapshot of the network's output field.
use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};

use pixnn::Sample;
use pixnn::network::input_to_pixel;

const TEMPLATE: &str = include_str!("assets/canvas.html");

/// Positive outputs are painted orange, negative ones blue.
const POSITIVE: [f32; 3] = [1.0, 0.6, 0.0];
const NEGATIVE: [f32; 3] = [0.0, 0.6, 1.0];

/// Renders the page shell.  The page re-polls the frame every `refresh_ms`
/// and re-sends a held click every `click_repeat_ms`.
pub fn render_page(refresh_ms: u64, click_repeat_ms: u64) -> String {
    TEMPLATE
        .replace("{{REFRESH_MS}}", &refresh_ms.to_string())
        .replace("{{CLICK_REPEAT_MS}}", &click_repeat_ms.to_string())
}

/// Colour for one output value: alpha is `|value|` clamped to 1, blended on white.
pub fn shade(value: f64) -> Rgba<u8> {
    let v = value.clamp(-1.0, 1.0) as f32;
    let (base, alpha) = if v > 0.0 { (POSITIVE, v) } else { (NEGATIVE, -v) };
    let channel = |c: f32| ((alpha * c + (1.0 - alpha)) * 255.0).round() as u8;
    Rgba([channel(base[0]), channel(base[1]), channel(base[2]), 255])
}

fn marker_colour(expected: f64) -> Rgba<u8> {
    if expected > 0.0 {
        Rgba([150, 70, 0, 255])
    } else if expected < 0.0 {
        Rgba([0, 60, 150, 255])
    } else {
        Rgba([90, 90, 90, 255])
    }
}

/// Paints `field` (row-major, `size x size`) and overlays a 3x3 marker per sample.
pub fn render_frame(field: &[f64], size: usize, samples: &[Sample]) -> RgbaImage {
    let side = size as u32;
    let mut img = RgbaImage::from_fn(side, side, |x, y| {
        let i = y as usize * size + x as usize;
        field.get(i).copied().map_or(Rgba([255, 255, 255, 255]), shade)
    });
    for sample in samples {
        let (Some(&x), Some(&y)) = (sample.input.first(), sample.input.get(1)) else {
            continue;
        };
        let (col, row) = input_to_pixel(x, y, size, size);
        let colour = marker_colour(sample.expected.first().copied().unwrap_or(0.0));
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let (px, py) = (col as i64 + dx, row as i64 + dy);
                if px >= 0 && py >= 0 && px < size as i64 && py < size as i64 {
                    img.put_pixel(px as u32, py as u32, colour);
                }
            }
        }
    }
    img
}

/// Encodes a frame as PNG bytes.
pub fn encode_png(img: RgbaImage) -> Result<Vec<u8>, String> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageOutputFormat::Png)
        .map_err(|e| e.to_string())?;
    Ok(buf.into_inner())
}
