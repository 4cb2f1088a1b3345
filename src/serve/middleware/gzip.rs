//! Response compression.

use std::io::Write;

use flate2::{Compression, write::GzEncoder};

use crate::{
    serve::{Exchange, Middleware},
    utils::mime,
};

/// Gzips successful text-like responses for clients that accept it.
///
/// Runs after the handler, so the `ETag` still names the uncompressed
/// content.
pub struct Gzip {
    level: Compression,
}

impl Gzip {
    pub fn new() -> Self {
        Self {
            level: Compression::default(),
        }
    }

    fn applies(exchange: &Exchange) -> bool {
        exchange.status == 200
            && !exchange.body.is_empty()
            && exchange.header("Content-Encoding").is_none()
            && exchange
                .header("Content-Type")
                .is_some_and(mime::is_compressible)
            && exchange
                .request_header("Accept-Encoding")
                .is_some_and(accepts_gzip)
    }

    fn compress(&self, body: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(body.len() / 2), self.level);
        encoder.write_all(body)?;
        encoder.finish()
    }
}

impl Default for Gzip {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for Gzip {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn after(&self, exchange: &mut Exchange) {
        if !Self::applies(exchange) {
            return;
        }
        match self.compress(&exchange.body) {
            Ok(compressed) => {
                exchange.body = compressed;
                exchange.set_header("Content-Encoding", "gzip");
            }
            Err(e) => crate::debug!("serve"; "gzip failed for {}: {}", exchange.path(), e),
        }
    }
}

/// Whether an `Accept-Encoding` value allows gzip (`q=0` refuses it).
fn accepts_gzip(header: &str) -> bool {
    header.split(',').any(|item| {
        let mut parts = item.split(';').map(str::trim);
        let coding = parts.next().unwrap_or_default();
        if !coding.eq_ignore_ascii_case("gzip") {
            return false;
        }
        !parts.any(|param| {
            param
                .strip_prefix("q=")
                .and_then(|q| q.parse::<f32>().ok())
                .is_some_and(|q| q <= 0.0)
        })
    })
}
