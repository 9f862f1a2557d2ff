use std::io::Cursor;
use tiny_http::Response;

use crate::state::SharedState;
use crate::util::form::Form;

/// Learning rate is never stepped below this.
const MIN_RATE: f64 = 1e-9;

fn direction(query: &str) -> Option<bool> {
    match Form::parse(query).get("dir") {
        Some("up")   => Some(true),
        Some("down") => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// GET /stats
// ---------------------------------------------------------------------------

pub fn handle_stats(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    match serde_json::to_string(&state.trainer.stats()) {
        Ok(json) => crate::routes::json_response(json),
        Err(e) => crate::routes::server_error(&e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// POST /network/regen
// ---------------------------------------------------------------------------

pub fn handle_regen(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    state.trainer.lock().network.randomize();
    log::info!("network re-randomized");
    crate::routes::no_content()
}

// ---------------------------------------------------------------------------
// POST /throttle?dir=up|down
// ---------------------------------------------------------------------------

pub fn handle_throttle(query: &str, state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let Some(up) = direction(query) else {
        return crate::routes::bad_request("dir must be up or down");
    };
    let level = state.trainer.throttle();
    let next = if up { level + 1 } else { level.saturating_sub(1) };
    state.trainer.set_throttle(next);
    log::info!("throttle: {}", state.trainer.throttle());
    crate::routes::no_content()
}

// ---------------------------------------------------------------------------
// POST /rate?dir=up|down
// ---------------------------------------------------------------------------

pub fn handle_rate(query: &str, state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let Some(up) = direction(query) else {
        return crate::routes::bad_request("dir must be up or down");
    };
    let rate = state.trainer.learning_rate();
    let next = if up { rate * 2.0 } else { (rate / 2.0).max(MIN_RATE) };
    state.trainer.set_learning_rate(next);
    log::info!("learning rate: {next:e}");
    crate::routes::no_content()
}

// ---------------------------------------------------------------------------
// POST /view/derivs
// ---------------------------------------------------------------------------

pub fn handle_toggle_derivs(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let on = state.toggle_derivs();
    log::info!("{} derivatives", if on { "showing" } else { "hiding" });
    crate::routes::no_content()
}

// ---------------------------------------------------------------------------
// POST /view/training
// ---------------------------------------------------------------------------

pub fn handle_toggle_training(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let on = state.toggle_training();
    log::info!("{} training points", if on { "showing" } else { "hiding" });
    crate::routes::no_content()
}
