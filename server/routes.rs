use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::handlers;
use crate::state::SharedState;

pub type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn content_type(value: &str) -> Vec<Header> {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).into_iter().collect()
}

fn bytes_response(status: u16, mime: &str, bytes: Vec<u8>) -> HttpResponse {
    let len = bytes.len();
    Response::new(StatusCode(status), content_type(mime), Cursor::new(bytes), Some(len), None)
}

pub fn jpeg_response(bytes: Vec<u8>) -> HttpResponse {
    bytes_response(200, "image/jpeg", bytes)
}

pub fn json_response(status: u16, body: &serde_json::Value) -> HttpResponse {
    bytes_response(status, "application/json", body.to_string().into_bytes())
}

/// `{"error": kind, "detail": message}` with the given status.
pub fn json_error(status: u16, kind: &str, detail: &str) -> HttpResponse {
    json_response(status, &serde_json::json!({ "error": kind, "detail": detail }))
}

pub fn not_found() -> HttpResponse {
    json_error(404, "not_found", "no such route")
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Routes one request and responds to it.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();
    let path   = url.split('?').next().unwrap_or("").to_owned();

    let response = match (method, path.as_str()) {
        (Method::Get,  "/")       => json_response(200, &serde_json::json!({ "message": "Hello World" })),
        (Method::Get,  "/health") => json_response(200, &serde_json::json!({ "status": "ok" })),
        (Method::Post, "/style")  => handlers::style::handle(&mut request, &state),
        _ => not_found(),
    };

    tracing::debug!(method = %request.method(), path = %path, "request");
    if let Err(e) = request.respond(response) {
        tracing::warn!(path = %path, error = %e, "failed to send response");
    }
}
