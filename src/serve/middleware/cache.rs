//! Cache negotiation: `Cache-Control`, `ETag` and `If-None-Match`.

use std::sync::Arc;

use crate::{
    asset::IdentityMap,
    serve::{Exchange, Flow, Middleware},
};

/// Sets caching headers from the startup identity map and answers
/// `304 Not Modified` when the client already holds the current content.
///
/// With a TTL of zero or less the middleware does nothing.
pub struct CacheNegotiation {
    ttl: i64,
    cache_control: String,
    identities: Arc<IdentityMap>,
}

impl CacheNegotiation {
    pub fn new(ttl: i64, identities: Arc<IdentityMap>) -> Self {
        Self {
            ttl,
            cache_control: format!("private, max-age={ttl}"),
            identities,
        }
    }

    fn etag(&self, exchange: &Exchange) -> String {
        exchange
            .key()
            .map(|key| self.identities.etag(key))
            .unwrap_or_default()
    }
}

impl Middleware for CacheNegotiation {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn before(&self, exchange: &mut Exchange) -> Flow {
        if self.ttl <= 0 {
            return Flow::Continue;
        }

        let etag = self.etag(exchange);
        exchange.set_header("Cache-Control", self.cache_control.as_str());
        exchange.set_header("ETag", etag.as_str());

        let if_none_match = exchange.request_header("If-None-Match").unwrap_or_default();
        if !if_none_match.is_empty() && if_none_match == etag {
            crate::debug!("etag"; "not modified: {}", exchange.path());
            exchange.respond_empty(304);
            return Flow::Halt;
        }

        Flow::Continue
    }
}
