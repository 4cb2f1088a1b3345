//! Per-request state shared by middlewares and the handler.

use std::net::IpAddr;

use tiny_http::{Method, Request};

use super::path::request_key;

/// One request and the response being built for it.
///
/// Owned by a single worker for the lifetime of the request.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub method: Method,
    /// URL exactly as requested, query included.
    pub url: String,
    /// Normalized asset key, `None` when the path was rejected.
    key: Option<String>,
    request_headers: Vec<(String, String)>,
    pub peer: Option<IpAddr>,

    pub status: u16,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Exchange {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            key: request_key(&url),
            method,
            url,
            request_headers: Vec::new(),
            peer: None,
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn from_request(request: &Request) -> Self {
        let mut exchange = Self::new(request.method().clone(), request.url());
        exchange.peer = request.remote_addr().map(|addr| addr.ip());
        exchange.request_headers = request
            .headers()
            .iter()
            .map(|h| (h.field.as_str().to_string(), h.value.to_string()))
            .collect();
        exchange
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.request_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Path part of the URL, for logs.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    /// First request header named `name`, compared case-insensitively.
    pub fn request_header(&self, name: &str) -> Option<&str> {
        find(&self.request_headers, name)
    }

    /// Response header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find(&self.headers, name)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Set a response header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// Status, response headers and body.
    pub fn into_parts(self) -> (u16, Vec<(String, String)>, Vec<u8>) {
        (self.status, self.headers, self.body)
    }

    /// Complete the response with a body and its content type.
    pub fn respond(&mut self, status: u16, content_type: &str, body: impl Into<Vec<u8>>) {
        self.status = status;
        self.set_header("Content-Type", content_type);
        self.body = body.into();
    }

    /// Complete the response without a body.
    pub fn respond_empty(&mut self, status: u16) {
        self.status = status;
        self.remove_header("Content-Type");
        self.body.clear();
    }
}

fn find<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_key() {
        let ex = Exchange::new(Method::Get, "/docs/?lang=en");
        assert_eq!(ex.key(), Some("docs/index.html"));
        assert_eq!(ex.path(), "/docs/");
        assert_eq!(ex.status, 200);

        assert_eq!(Exchange::new(Method::Get, "/../x").key(), None);
    }

    #[test]
    fn test_headers_case_insensitive() {
        let mut ex = Exchange::new(Method::Get, "/").with_header("if-none-match", "abc");
        assert_eq!(ex.request_header("If-None-Match"), Some("abc"));

        ex.set_header("ETag", "1");
        ex.set_header("etag", "2");
        assert_eq!(ex.headers().len(), 1);
        assert_eq!(ex.header("ETAG"), Some("2"));

        ex.remove_header("Etag");
        assert!(ex.header("ETag").is_none());
    }

    #[test]
    fn test_respond_empty_drops_body_and_type() {
        let mut ex = Exchange::new(Method::Get, "/a.txt");
        ex.respond(200, "text/plain", b"hello".to_vec());
        ex.respond_empty(304);
        assert_eq!(ex.status, 304);
        assert!(ex.body.is_empty());
        assert!(ex.header("Content-Type").is_none());
    }
}
