use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::handlers;
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn response(status: u16, content_type: &str, bytes: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let len = bytes.len();
    let mut headers = vec![Header::from_bytes(b"Cache-Control", b"no-store").ok()];
    headers.push(Header::from_bytes(b"Content-Type", content_type.as_bytes()).ok());
    Response::new(
        StatusCode(status),
        headers.into_iter().flatten().collect(),
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn html_response(body: String) -> Response<Cursor<Vec<u8>>> {
    response(200, "text/html; charset=utf-8", body.into_bytes())
}

pub fn png_response(bytes: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    response(200, "image/png", bytes)
}

pub fn json_response(body: String) -> Response<Cursor<Vec<u8>>> {
    response(200, "application/json", body.into_bytes())
}

pub fn no_content() -> Response<Cursor<Vec<u8>>> {
    response(204, "text/plain", Vec::new())
}

pub fn bad_request(msg: &str) -> Response<Cursor<Vec<u8>>> {
    response(400, "text/plain", msg.as_bytes().to_vec())
}

pub fn server_error(msg: &str) -> Response<Cursor<Vec<u8>>> {
    response(500, "text/plain", msg.as_bytes().to_vec())
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    response(404, "text/plain", b"404 Not Found".to_vec())
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches one request.  Handlers that read a body get `&mut Request`;
/// the dispatcher keeps ownership and responds at the end.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();

    let (path, query) = match url.split_once('?') {
        Some((p, q)) => (p.to_owned(), q.to_owned()),
        None => (url.clone(), String::new()),
    };
    log::debug!("{method:?} {path}");

    let response = match (method, path.as_str()) {
        // ── Canvas ───────────────────────────────────────────────────────
        (Method::Get, "/")          => handlers::canvas::handle_page(&state),
        (Method::Get, "/frame.png") => handlers::canvas::handle_frame(&state),
        (Method::Get, "/stats")     => handlers::controls::handle_stats(&state),

        // ── Points ───────────────────────────────────────────────────────
        (Method::Post, "/points")       => handlers::points::handle_add(&mut request, &state),
        (Method::Post, "/points/undo")  => handlers::points::handle_undo(&state),
        (Method::Post, "/points/clear") => handlers::points::handle_clear(&state),

        // ── Training controls ────────────────────────────────────────────
        (Method::Post, "/network/regen") => handlers::controls::handle_regen(&state),
        (Method::Post, "/throttle")      => handlers::controls::handle_throttle(&query, &state),
        (Method::Post, "/rate")          => handlers::controls::handle_rate(&query, &state),
        (Method::Post, "/view/derivs")   => handlers::controls::handle_toggle_derivs(&state),
        (Method::Post, "/view/training") => handlers::controls::handle_toggle_training(&state),

        // ── 404 ──────────────────────────────────────────────────────────
        _ => not_found(),
    };

    if let Err(e) = request.respond(response) {
        log::debug!("client went away: {e}");
    }
}
