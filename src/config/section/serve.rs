//! `[serve]` section configuration.
//!
//! Contains HTTP listener settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! name = "asset-web"          # Name shown in logs
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8080                 # HTTP port number
//! trusted_proxies = ["10.0.0.1"]
//! gzip = true                 # Compress text responses
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Server name, used as log prefix context.
    pub name: String,

    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Gateways whose `X-Forwarded-For` header is trusted for access logs.
    pub trusted_proxies: Vec<IpAddr>,

    /// Gzip text responses when the client accepts it.
    pub gzip: bool,

    /// Worker threads handling requests.
    pub workers: usize,
}

impl ServeConfig {
    pub const NAME: FieldPath = FieldPath::new("serve.name");
    pub const PORT: FieldPath = FieldPath::new("serve.port");
    pub const WORKERS: FieldPath = FieldPath::new("serve.workers");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error(Self::PORT, "port required");
        }
        if self.workers == 0 {
            diag.error_with_hint(Self::WORKERS, "at least one worker is required", "try 4");
        }
        if self.name.trim().is_empty() {
            diag.error(Self::NAME, "name must not be empty");
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            name: "asset-web".to_string(),
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8080,
            trusted_proxies: Vec::new(),
            gzip: true,
            workers: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_serve_config() {
        let config = test_parse_config(
            "[serve]\ninterface = \"0.0.0.0\"\nport = 9000\ngzip = false\ntrusted_proxies = [\"10.0.0.1\", \"::1\"]",
        );

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
        );
        assert_eq!(config.serve.port, 9000);
        assert!(!config.serve.gzip);
        assert_eq!(
            config.serve.trusted_proxies,
            vec![
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
                IpAddr::V6(Ipv6Addr::LOCALHOST)
            ]
        );
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.serve.name, "asset-web");
        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert_eq!(config.serve.port, 8080);
        assert!(config.serve.gzip);
        assert!(config.serve.trusted_proxies.is_empty());
    }

    #[test]
    fn test_serve_config_partial_override() {
        let config = test_parse_config("[serve]\nport = 3000");

        assert_eq!(config.serve.port, 3000);
        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
    }

    #[test]
    fn test_serve_config_zero_port_rejected() {
        let config = test_parse_config("[serve]\nport = 0\nworkers = 0");
        let mut diag = ConfigDiagnostics::new();
        config.serve.validate(&mut diag);
        assert_eq!(diag.len(), 2);
        assert_eq!(diag.errors()[0].field.as_str(), "serve.port");
    }
}
