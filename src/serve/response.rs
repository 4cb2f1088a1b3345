//! Conversion from an [`Exchange`] to a `tiny_http` response.

use std::io::Cursor;

use anyhow::Result;
use tiny_http::{Header, Request, Response, StatusCode};

use super::Exchange;
use crate::utils::mime::types::PLAIN;

/// Build the wire response. Headers that `tiny_http` rejects are dropped.
pub fn build(exchange: Exchange) -> Response<Cursor<Vec<u8>>> {
    let (status, headers, body) = exchange.into_parts();
    let mut response = Response::from_data(body).with_status_code(StatusCode(status));
    for (name, value) in &headers {
        if let Some(header) = make_header(name, value) {
            response.add_header(header);
        }
    }
    response
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    let mut response = Response::from_data(b"503 Service Unavailable".to_vec())
        .with_status_code(StatusCode(503));
    if let Some(header) = make_header("Content-Type", PLAIN) {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}
