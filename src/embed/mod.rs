//! Assets compiled into the binary.
//!
//! Everything under `bundle/` is embedded at build time. The folder named by
//! `[assets] bundle_root` is what gets served when no directory is chosen.

use rust_embed::RustEmbed;

use crate::asset::BundleSource;

#[derive(RustEmbed)]
#[folder = "bundle/"]
struct Bundle;

/// Files of the embedded bundle below `root`, keyed relative to it.
pub fn bundle(root: &str) -> BundleSource {
    BundleSource::from_embed::<Bundle>(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetSource, IdentityMap};

    #[test]
    fn test_default_bundle_has_index() {
        let bundle = bundle("www");
        assert!(!bundle.is_empty());
        assert!(bundle.read("index.html").is_ok());
        assert!(bundle.read("www/index.html").is_err());
    }

    #[test]
    fn test_bundle_hashes() {
        let identities = IdentityMap::build(&bundle("www")).unwrap();
        assert!(identities.contains("index.html"));
        assert!(identities.contains("assets/app.js"));
        assert_eq!(identities.etag("").len(), 64);
    }

    #[test]
    fn test_unknown_root_is_empty() {
        assert!(bundle("missing").is_empty());
    }
}
