use std::io::{Cursor, Read};
use tiny_http::{Request, Response};

use pixnn::math::remap;
use pixnn::PointLabel;

use crate::state::SharedState;
use crate::util::form::Form;

// ---------------------------------------------------------------------------
// POST /points
// ---------------------------------------------------------------------------

/// Adds a point from a click at `(x, y)` on a `w x h` canvas.
///
/// Clicks outside the canvas are ignored, as are zero-valued non-neutral
/// labels.
pub fn handle_add(request: &mut Request, state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut body = String::new();
    if let Err(e) = request.as_reader().read_to_string(&mut body) {
        return crate::routes::bad_request(&format!("could not read body: {e}"));
    }
    let form = Form::parse(&body);

    let (Some(x), Some(y), Some(w), Some(h)) = (form.f64("x"), form.f64("y"), form.f64("w"), form.f64("h")) else {
        return crate::routes::bad_request("x, y, w and h are required");
    };
    let label = match form.get("label") {
        Some("positive") | None => PointLabel::Positive,
        Some("neutral")         => PointLabel::Neutral,
        Some("negative")        => PointLabel::Negative,
        Some(other) => return crate::routes::bad_request(&format!("unknown label \"{other}\"")),
    };

    if !(x >= 0.0 && x < w && y >= 0.0 && y < h) {
        return crate::routes::no_content();
    }
    let nx = remap(x, 0.0, w, -1.0, 1.0);
    let ny = remap(y, 0.0, h, 1.0, -1.0);

    if let Some(sample) = label.sample_at(nx, ny, form.flag("half")) {
        state.trainer.lock().dataset.push(sample);
        log::debug!("added {label:?} point at ({nx:.3}, {ny:.3})");
    }
    crate::routes::no_content()
}

// ---------------------------------------------------------------------------
// POST /points/undo
// ---------------------------------------------------------------------------

pub fn handle_undo(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let removed = state.trainer.lock().dataset.pop();
    if removed.is_none() {
        log::debug!("undo with no points left");
    }
    crate::routes::no_content()
}

// ---------------------------------------------------------------------------
// POST /points/clear
// ---------------------------------------------------------------------------

pub fn handle_clear(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    state.trainer.lock().dataset.clear();
    log::info!("cleared all points");
    crate::routes::no_content()
}
