//! `[cors]` section configuration.
//!
//! CORS headers are only sent when `allow_origin` is set. Empty lists fall
//! back to the defaults below.
//!
//! # Example
//!
//! ```toml
//! [cors]
//! allow_origin = "*"
//! allow_credentials = true
//! allow_methods = ["GET", "OPTIONS"]
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

pub const DEFAULT_ALLOW_METHODS: &[&str] = &["OPTIONS", "GET", "POST", "PUT", "PATCH", "DELETE"];

pub const DEFAULT_ALLOW_HEADERS: &[&str] = &[
    "Origin",
    "X-Requested-With",
    "Content-Type",
    "Accept",
    "Authorization",
    "Language",
    "Request-Origin",
    "X-App-Id",
    "X-Security-Sign",
    "X-Security-Iv",
];

pub const DEFAULT_EXPOSE_HEADERS: &[&str] = &[
    "Content-Length",
    "Access-Control-Allow-Origin",
    "Access-Control-Allow-Headers",
    "Cache-Control",
    "Content-Language",
    "Content-Type",
    "X-App-Id",
    "X-Security-Sign",
    "X-Security-Iv",
];

/// Cross-origin resource sharing headers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub const ALLOW_ORIGIN: FieldPath = FieldPath::new("cors.allow_origin");

    /// Allow every origin, with credentials.
    pub fn allow_all() -> Self {
        Self::allow_one("*")
    }

    /// Allow a single origin, with credentials.
    pub fn allow_one(origin: impl Into<String>) -> Self {
        Self {
            allow_origin: origin.into(),
            allow_credentials: true,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.allow_origin.is_empty()
    }

    pub fn methods(&self) -> String {
        join_or_default(&self.allow_methods, DEFAULT_ALLOW_METHODS)
    }

    pub fn request_headers(&self) -> String {
        join_or_default(&self.allow_headers, DEFAULT_ALLOW_HEADERS)
    }

    pub fn expose_headers(&self) -> String {
        join_or_default(&self.expose_headers, DEFAULT_EXPOSE_HEADERS)
    }

    pub fn credentials(&self) -> &'static str {
        if self.allow_credentials { "true" } else { "false" }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.allow_origin == "*" && self.allow_credentials {
            diag.warn(
                Self::ALLOW_ORIGIN,
                "browsers ignore credentials with a wildcard origin",
            );
        }
    }
}

fn join_or_default(values: &[String], default: &[&str]) -> String {
    if values.is_empty() {
        default.join(",")
    } else {
        values.join(",")
    }
}
