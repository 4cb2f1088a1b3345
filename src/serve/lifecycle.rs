//! Server lifecycle: bind, Ctrl+C shutdown, and draining in-flight requests.

use std::{
    net::{IpAddr, SocketAddr},
    sync::{
        Arc, OnceLock,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use anyhow::{Result, anyhow};
use crossbeam::channel::{Receiver, RecvTimeoutError};
use tiny_http::Server;

use crate::log;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The handler behavior depends on whether a server has been registered:
/// - Before `register_server()`: exit immediately, nothing is listening yet
/// - After `register_server()`: stop accepting and let the request loop end
pub fn setup_shutdown_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(server) = SERVER.get() {
            log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
///
/// Call this after binding the server, before entering the request loop
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Bind to the specified interface and port.
pub fn bind(interface: IpAddr, port: u16) -> Result<(Server, SocketAddr)> {
    let addr = SocketAddr::new(interface, port);
    let server = Server::http(addr).map_err(|e| anyhow!("failed to bind {}: {}", addr, e))?;
    // Port 0 asks the OS for a free port
    let addr = server.server_addr().to_ip().unwrap_or(addr);
    Ok((server, addr))
}

/// Wait until every in-flight request has dropped its sender, or `timeout`.
///
/// Returns `true` when all requests finished in time.
pub fn drain(inflight: &Receiver<()>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        match inflight.recv_deadline(deadline) {
            Ok(()) => continue,
            Err(RecvTimeoutError::Disconnected) => return true,
            Err(RecvTimeoutError::Timeout) => {
                log!("serve"; "requests still running after {:?}, exiting anyway", timeout);
                return false;
            }
        }
    }
}
