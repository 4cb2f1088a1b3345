//! Ordered middleware chain around a single handler.

use anyhow::Result;

use super::exchange::Exchange;
use crate::{log, utils::mime};

/// Whether a `before` hook lets the request proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The response is complete; skip the rest of the chain and the handler.
    Halt,
}

/// A stage that can inspect or short-circuit a request and post-process the
/// response.
pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    fn before(&self, _exchange: &mut Exchange) -> Flow {
        Flow::Continue
    }

    fn after(&self, _exchange: &mut Exchange) {}
}

/// Produces the response for requests that pass every middleware.
pub trait Handler: Send + Sync {
    fn handle(&self, exchange: &mut Exchange) -> Result<()>;
}

pub struct Pipeline {
    middlewares: Vec<Box<dyn Middleware>>,
    handler: Box<dyn Handler>,
}

impl Pipeline {
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self {
            middlewares: Vec::new(),
            handler: Box::new(handler),
        }
    }

    /// Append a middleware; earlier ones run first.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// Run the chain for one request.
    ///
    /// `after` hooks run in reverse, and only for middlewares whose `before`
    /// ran. A handler error becomes a 500.
    pub fn run(&self, exchange: &mut Exchange) {
        let mut entered = 0;
        let mut flow = Flow::Continue;
        for middleware in &self.middlewares {
            entered += 1;
            flow = middleware.before(exchange);
            if flow == Flow::Halt {
                crate::debug!("serve"; "{} halted {}", middleware.name(), exchange.path());
                break;
            }
        }

        if flow == Flow::Continue
            && let Err(e) = self.handler.handle(exchange)
        {
            log!("error"; "{} {}: {:#}", exchange.method, exchange.path(), e);
            exchange.respond(500, mime::types::PLAIN, b"500 Internal Server Error".to_vec());
        }

        for middleware in self.middlewares[..entered].iter().rev() {
            middleware.after(exchange);
        }
    }
}
