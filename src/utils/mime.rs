//! MIME type detection for asset keys.

/// Common MIME type constants.
pub mod types {
    // Text
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const MANIFEST: &str = "application/manifest+json";
    pub const XML: &str = "application/xml";
    pub const MARKDOWN: &str = "text/markdown; charset=utf-8";
    pub const CSV: &str = "text/csv; charset=utf-8";
    pub const MAP: &str = "application/json";

    // Web feeds
    pub const RSS: &str = "application/rss+xml";
    pub const ATOM: &str = "application/atom+xml";

    // Documents
    pub const PDF: &str = "application/pdf";

    // Binary
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const WASM: &str = "application/wasm";
    pub const ZIP: &str = "application/zip";
    pub const GZIP: &str = "application/gzip";

    // Images
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const AVIF: &str = "image/avif";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";

    // Audio / Video
    pub const MP3: &str = "audio/mpeg";
    pub const OGG_AUDIO: &str = "audio/ogg";
    pub const MP4: &str = "video/mp4";
    pub const WEBM: &str = "video/webm";

    // Fonts
    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const OTF: &str = "font/otf";
}

/// Guess MIME type from an asset key such as `assets/app.js`.
///
/// Returns a full MIME type string suitable for HTTP Content-Type header.
pub fn from_path(key: &str) -> &'static str {
    let name = key.rsplit('/').next().unwrap_or(key);
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    from_extension(ext.as_deref())
}

/// Guess MIME type from file extension string.
pub fn from_extension(ext: Option<&str>) -> &'static str {
    match ext {
        // Web / Text
        Some("html" | "htm") => types::HTML,
        Some("css") => types::CSS,
        Some("js" | "mjs" | "cjs") => types::JAVASCRIPT,
        Some("json") => types::JSON,
        Some("webmanifest") => types::MANIFEST,
        Some("map") => types::MAP,
        Some("xml") => types::XML,
        Some("csv") => types::CSV,
        Some("txt") => types::PLAIN,
        Some("md") => types::MARKDOWN,

        // Web feeds
        Some("rss") => types::RSS,
        Some("atom") => types::ATOM,

        // Images
        Some("svg") => types::SVG,
        Some("png") => types::PNG,
        Some("jpg" | "jpeg") => types::JPEG,
        Some("gif") => types::GIF,
        Some("webp") => types::WEBP,
        Some("avif") => types::AVIF,
        Some("ico") => types::ICO,

        // Audio / Video
        Some("mp3") => types::MP3,
        Some("ogg" | "oga") => types::OGG_AUDIO,
        Some("mp4" | "m4v") => types::MP4,
        Some("webm") => types::WEBM,

        // Fonts
        Some("woff") => types::WOFF,
        Some("woff2") => types::WOFF2,
        Some("ttf") => types::TTF,
        Some("otf") => types::OTF,

        // Documents / Binary
        Some("pdf") => types::PDF,
        Some("wasm") => types::WASM,
        Some("zip") => types::ZIP,
        Some("gz" | "gzip") => types::GZIP,

        _ => types::OCTET_STREAM,
    }
}

/// Check if the MIME type represents text content.
pub fn is_text(mime: &str) -> bool {
    mime.starts_with("text/")
        || mime == types::JSON
        || mime == types::MANIFEST
        || mime == types::XML
        || mime == types::RSS
        || mime == types::ATOM
}

/// Whether gzip is likely to shrink a body of this type.
///
/// Already-compressed formats (images other than svg, media, fonts,
/// archives) are left alone.
pub fn is_compressible(mime: &str) -> bool {
    is_text(mime) || mime == types::SVG || mime == types::WASM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(from_path("index.html"), types::HTML);
        assert_eq!(from_path("assets/style.css"), types::CSS);
        assert_eq!(from_path("app.min.js"), types::JAVASCRIPT);
        assert_eq!(from_path("config.json"), types::JSON);
        assert_eq!(from_path("img/LOGO.PNG"), types::PNG);
        assert_eq!(from_path("photo.jpeg"), types::JPEG);
        assert_eq!(from_path("fonts/a.woff2"), types::WOFF2);
        assert_eq!(from_path("unknown.xyz"), types::OCTET_STREAM);
        assert_eq!(from_path("LICENSE"), types::OCTET_STREAM);
        assert_eq!(from_path("v1.2/README"), types::OCTET_STREAM);
    }

    #[test]
    fn test_is_text() {
        assert!(is_text(types::HTML));
        assert!(is_text(types::CSS));
        assert!(is_text(types::JSON));
        assert!(is_text(types::XML));
        assert!(!is_text(types::PNG));
        assert!(!is_text(types::MP4));
    }

    #[test]
    fn test_is_compressible() {
        assert!(is_compressible(types::JAVASCRIPT));
        assert!(is_compressible(types::SVG));
        assert!(is_compressible(types::WASM));
        assert!(!is_compressible(types::PNG));
        assert!(!is_compressible(types::WOFF2));
        assert!(!is_compressible(types::GZIP));
    }
}
