//! URL to asset key normalization.

use percent_encoding::percent_decode_str;

use crate::asset::join;

/// Map a request URL to the asset key it names.
///
/// The query is dropped, the path is percent-decoded and trimmed of
/// slashes, and a directory (empty path or trailing `/`) maps to its
/// `index.html`. Returns `None` for paths that try to leave the root.
pub fn request_key(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8().ok()?;

    let mut segments = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains(['\\', '\0']) => return None,
            s => segments.push(s),
        }
    }

    let key = segments.join("/");
    if key.is_empty() || decoded.ends_with('/') {
        return Some(join(&key, "index.html"));
    }
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_maps_to_index() {
        assert_eq!(request_key("/").as_deref(), Some("index.html"));
        assert_eq!(request_key("").as_deref(), Some("index.html"));
        assert_eq!(request_key("/?v=1").as_deref(), Some("index.html"));
    }

    #[test]
    fn test_trailing_slash_maps_to_dir_index() {
        assert_eq!(request_key("/docs/").as_deref(), Some("docs/index.html"));
        assert_eq!(request_key("/docs").as_deref(), Some("docs"));
    }

    #[test]
    fn test_query_and_fragment_stripped() {
        assert_eq!(
            request_key("/assets/app.js?v=3#top").as_deref(),
            Some("assets/app.js")
        );
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            request_key("/my%20file.txt").as_deref(),
            Some("my file.txt")
        );
        // an encoded `?` is part of the name
        assert_eq!(request_key("/a%3Fb").as_deref(), Some("a?b"));
    }

    #[test]
    fn test_duplicate_slashes_collapse() {
        assert_eq!(request_key("//a//b/./c").as_deref(), Some("a/b/c"));
    }

    #[test]
    fn test_traversal_rejected() {
        assert_eq!(request_key("/../etc/passwd"), None);
        assert_eq!(request_key("/a/%2e%2e/b"), None);
        assert_eq!(request_key("/a/..%2f..%2fb"), None);
        assert_eq!(request_key("/a%5c..%5cb"), None);
        assert_eq!(request_key("/bad%00name"), None);
        assert_eq!(request_key("/%ff"), None);
    }

    #[test]
    fn test_dots_inside_names_allowed() {
        assert_eq!(request_key("/a..b/c.js").as_deref(), Some("a..b/c.js"));
    }
}
