//! Serves assets from the active root.

use std::{io, sync::Arc};

use anyhow::{Context, Result};
use tiny_http::Method;

use super::{Exchange, Handler};
use crate::{
    asset::{AssetRoot, AssetSource, EntryKind, ReplacementRules, is_hidden_name, join},
    utils::mime::{self, types::PLAIN},
};

/// Reads the requested asset, applies its replacement rule, and fills in
/// the response.
pub struct FileHandler {
    root: Arc<AssetRoot>,
    rules: Arc<ReplacementRules>,
}

impl FileHandler {
    pub fn new(root: Arc<AssetRoot>, rules: Arc<ReplacementRules>) -> Self {
        Self { root, rules }
    }

    /// Resolve a key to a servable file, trying `index.html` for directories.
    fn resolve(&self, key: &str) -> Option<String> {
        if key.split('/').any(is_hidden_name) {
            return None;
        }
        match self.root.kind(key)? {
            EntryKind::File => Some(key.to_string()),
            EntryKind::Dir => {
                let index = join(key, "index.html");
                (self.root.kind(&index) == Some(EntryKind::File)).then_some(index)
            }
        }
    }
}

impl Handler for FileHandler {
    fn handle(&self, exchange: &mut Exchange) -> Result<()> {
        match exchange.method {
            Method::Get | Method::Head => {}
            Method::Options => {
                exchange.set_header("Allow", "GET, HEAD, OPTIONS");
                exchange.respond_empty(204);
                return Ok(());
            }
            _ => {
                exchange.set_header("Allow", "GET, HEAD, OPTIONS");
                exchange.respond(405, PLAIN, b"405 Method Not Allowed".to_vec());
                return Ok(());
            }
        }

        let Some(key) = exchange.key().and_then(|key| self.resolve(key)) else {
            not_found(exchange);
            return Ok(());
        };

        let body = match self.root.read(&key) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                not_found(exchange);
                return Ok(());
            }
            Err(e) => return Err(e).with_context(|| format!("failed to read `{key}`")),
        };

        let body = self.rules.apply(&key, body);
        exchange.respond(200, mime::from_path(&key), body);
        Ok(())
    }
}

fn not_found(exchange: &mut Exchange) {
    exchange.respond(404, PLAIN, b"404 Not Found".to_vec());
}
