//! Cross-origin headers and preflight handling.

use tiny_http::Method;

use crate::{
    config::CorsConfig,
    serve::{Exchange, Flow, Middleware},
};

/// Adds `Access-Control-*` headers to every response and answers
/// preflight `OPTIONS` requests with `204 No Content`.
pub struct Cors {
    origin: String,
    methods: String,
    headers: String,
    expose: String,
    credentials: &'static str,
}

impl Cors {
    pub fn new(config: &CorsConfig) -> Self {
        Self {
            origin: config.allow_origin.clone(),
            methods: config.methods(),
            headers: config.request_headers(),
            expose: config.expose_headers(),
            credentials: config.credentials(),
        }
    }
}

impl Middleware for Cors {
    fn name(&self) -> &'static str {
        "cors"
    }

    fn before(&self, exchange: &mut Exchange) -> Flow {
        exchange.set_header("Access-Control-Allow-Origin", self.origin.as_str());
        exchange.set_header("Access-Control-Allow-Methods", self.methods.as_str());
        exchange.set_header("Access-Control-Allow-Headers", self.headers.as_str());
        exchange.set_header("Access-Control-Expose-Headers", self.expose.as_str());
        exchange.set_header("Access-Control-Allow-Credentials", self.credentials);

        if exchange.method == Method::Options {
            exchange.respond_empty(204);
            return Flow::Halt;
        }
        Flow::Continue
    }
}
