use std::io::Cursor;
use tiny_http::Response;

use pixnn::network::sample_field;

use crate::render::{encode_png, render_frame, render_page};
use crate::state::SharedState;

/// Page refresh interval; roughly a redraw every few frames at 60 Hz.
const REFRESH_MS: u64 = 100;
/// Interval at which a held mouse button keeps adding points.
const CLICK_REPEAT_MS: u64 = 100;

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

pub fn handle_page(_state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    crate::routes::html_response(render_page(REFRESH_MS, CLICK_REPEAT_MS))
}

// ---------------------------------------------------------------------------
// GET /frame.png
// ---------------------------------------------------------------------------

/// Samples the network once per pixel under the training lock, then
/// encodes outside it.
pub fn handle_frame(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let size = state.resolution;
    let view = state.view_fn();
    let with_points = state.showing_training();

    let snapshot = {
        let mut st = state.trainer.lock();
        let st = &mut *st;
        sample_field(&mut st.network, view, size, size).map(|field| {
            let samples = if with_points { st.dataset.as_slice().to_vec() } else { Vec::new() };
            (field, samples)
        })
    };

    let (field, samples) = match snapshot {
        Ok(s) => s,
        Err(e) => {
            log::error!("could not sample network: {e}");
            return crate::routes::server_error(&e.to_string());
        }
    };

    match encode_png(render_frame(&field, size, &samples)) {
        Ok(bytes) => crate::routes::png_response(bytes),
        Err(e) => {
            log::error!("png encoding failed: {e}");
            crate::routes::server_error(&e)
        }
    }
}
