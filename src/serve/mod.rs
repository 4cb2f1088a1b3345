//! HTTP server: request pipeline, middlewares and the request loop.
//!
//! # Module Structure
//!
//! ```text
//! serve/
//! ├── access       # client address for access logs
//! ├── exchange     # per-request state
//! ├── files        # asset handler
//! ├── lifecycle    # bind, Ctrl+C, drain
//! ├── middleware/  # cors, cache negotiation, gzip
//! ├── path         # URL to asset key
//! ├── pipeline     # Middleware/Handler traits and the chain
//! └── response     # Exchange to tiny_http response
//! ```
//!
//! Everything a request needs (root, identities, rules, config) is built
//! before the listener binds and shared read-only afterwards.

mod access;
mod exchange;
mod files;
mod lifecycle;
mod middleware;
mod path;
mod pipeline;
mod response;

pub use exchange::Exchange;
pub use files::FileHandler;
pub use lifecycle::setup_shutdown_handler;
pub use middleware::{CacheNegotiation, Cors, Gzip};
pub use pipeline::{Flow, Handler, Middleware, Pipeline};

use std::{
    any::Any,
    net::{IpAddr, SocketAddr},
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::{
    asset::{AssetRoot, BundleSource, IdentityMap, ReplacementRules},
    config::{ConfigError, ServerConfig},
    debug, log, logger,
};

/// How long shutdown waits for running requests.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Everything needed to answer requests, built once at startup.
pub struct App {
    config: ServerConfig,
    pipeline: Arc<Pipeline>,
}

impl App {
    /// Select the asset root, hash it, and assemble the pipeline.
    ///
    /// Fails without binding if no root is available or any asset cannot be
    /// read.
    pub fn prepare(config: ServerConfig, bundle: BundleSource) -> Result<Self> {
        let root = AssetRoot::select(
            config.assets.directory().map(Path::to_path_buf),
            config.assets.dir_root,
            Some(bundle),
        )
        .ok_or_else(|| {
            ConfigError::Validation("no asset root: pass --dir or --current".to_string())
        })?;
        log!("serve"; "serving {}", root.describe());

        let identities = if config.cache.is_enabled() {
            IdentityMap::build(&root)?
        } else {
            debug!("etag"; "cache ttl is {}, skipping content hashing", config.cache.ttl);
            IdentityMap::empty()
        };

        let rules = ReplacementRules::from_config(&config.replace)
            .context("cannot build replacement rules")?;
        if !rules.is_empty() {
            debug!("serve"; "{} replacement rule(s)", rules.len());
        }

        let pipeline = build_pipeline(&config, root, identities, rules);
        debug!("serve"; "middlewares: {}", pipeline.names().join(", "));

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
        })
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Bind the listener and register it for Ctrl+C shutdown.
    pub fn bind(self) -> Result<BoundServer> {
        let serve = &self.config.serve;
        let (server, addr) = lifecycle::bind(serve.interface, serve.port)?;
        let server = Arc::new(server);
        lifecycle::register_server(Arc::clone(&server));

        log!("serve"; "{} listening on http://{}", serve.name, addr);

        Ok(BoundServer {
            server,
            addr,
            app: self,
        })
    }
}

fn build_pipeline(
    config: &ServerConfig,
    root: AssetRoot,
    identities: IdentityMap,
    rules: ReplacementRules,
) -> Pipeline {
    let handler = FileHandler::new(Arc::new(root), Arc::new(rules));
    let mut pipeline = Pipeline::new(handler);

    if config.cors.is_enabled() {
        pipeline = pipeline.with(Cors::new(&config.cors));
    }
    pipeline = pipeline.with(CacheNegotiation::new(config.cache.ttl, Arc::new(identities)));
    if config.serve.gzip {
        pipeline = pipeline.with(Gzip::new());
    }
    pipeline
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    app: App,
}

impl BoundServer {
    /// Get the bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the request loop (blocking) until shutdown.
    pub fn run(self) -> Result<()> {
        let serve = &self.app.config.serve;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(serve.workers)
            .thread_name(|i| format!("worker-{i}"))
            .panic_handler(|payload| {
                log!("error"; "request handler panicked: {}", panic_message(&*payload));
            })
            .build()
            .context("failed to create thread pool")?;

        let trusted: Arc<[IpAddr]> = serve.trusted_proxies.clone().into();
        let (inflight_tx, inflight_rx) = channel::bounded::<()>(0);

        for request in self.server.incoming_requests() {
            let pipeline = Arc::clone(&self.app.pipeline);
            let trusted = Arc::clone(&trusted);
            let guard = inflight_tx.clone();
            pool.spawn(move || {
                let _guard = guard;
                if let Err(e) = handle_request(request, &pipeline, &trusted) {
                    log!("error"; "request error: {e}");
                }
            });
        }

        drop(inflight_tx);
        lifecycle::drain(&inflight_rx, DRAIN_TIMEOUT);
        log!("serve"; "stopped");
        Ok(())
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, pipeline: &Pipeline, trusted: &[IpAddr]) -> Result<()> {
    if lifecycle::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let started = Instant::now();
    let mut exchange = Exchange::from_request(&request);
    pipeline.run(&mut exchange);

    let client = access::client_ip(
        exchange.peer,
        exchange.request_header("X-Forwarded-For"),
        trusted,
    );
    let method = exchange.method.to_string();
    let path = exchange.path().to_string();
    let status = exchange.status;

    request.respond(response::build(exchange))?;
    logger::access(&client, &method, &path, status, started.elapsed());
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
