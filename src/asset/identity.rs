//! Content identities (etags) computed once at startup using blake3.
//!
//! The builder walks the active asset root depth-first, skipping hidden
//! entries, and hashes every file. Any I/O error aborts the whole build:
//! a partial map is never returned.

use std::io::{self, Read};
use std::time::Instant;

use rustc_hash::FxHashMap;
use thiserror::Error;

use super::source::{AssetSource, EntryKind, join};

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentIdentity([u8; 32]);

impl ContentIdentity {
    /// Hash an in-memory buffer.
    pub fn of(content: &[u8]) -> Self {
        Self(*blake3::hash(content).as_bytes())
    }

    /// Hash everything a reader yields.
    pub fn from_reader(mut reader: impl Read) -> io::Result<Self> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = [0u8; 64 * 1024];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buffer[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(Self(*hasher.finalize().as_bytes()))
    }

    /// Lowercase hex rendering, used verbatim as the `ETag` value.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ContentIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Failure while building the identity map. Fatal at startup.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("cannot list asset directory `{path}`")]
    List {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot hash asset `{path}`")]
    Hash {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Request path to content identity, built once and read-only afterwards.
///
/// Keys are `/`-separated paths relative to the asset root, without a
/// leading slash (`index.html`, `css/site.css`).
#[derive(Debug, Default)]
pub struct IdentityMap {
    entries: FxHashMap<String, ContentIdentity>,
}

impl IdentityMap {
    /// An empty map: every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Hash every non-hidden file reachable from the root of `source`.
    pub fn build(source: &impl AssetSource) -> Result<Self, IdentityError> {
        let start = Instant::now();
        let mut map = Self::empty();
        map.scan_dir(source, "")?;

        crate::debug!(
            "etag";
            "hashed {} files in {:.1?}",
            map.len(),
            start.elapsed()
        );
        Ok(map)
    }

    /// Recursive helper: hash files of `dir`, then descend into subdirectories.
    fn scan_dir(&mut self, source: &impl AssetSource, dir: &str) -> Result<(), IdentityError> {
        let entries = source.list(dir).map_err(|source| IdentityError::List {
            path: display_path(dir),
            source,
        })?;

        for entry in entries {
            if entry.is_hidden() {
                continue;
            }

            let path = join(dir, &entry.name);
            match entry.kind {
                EntryKind::Dir => self.scan_dir(source, &path)?,
                EntryKind::File => {
                    let identity = source
                        .open(&path)
                        .and_then(ContentIdentity::from_reader)
                        .map_err(|source| IdentityError::Hash {
                            path: path.clone(),
                            source,
                        })?;
                    self.entries.insert(path, identity);
                }
            }
        }

        Ok(())
    }

    /// Identity of an exact key.
    pub fn get(&self, path: &str) -> Option<&ContentIdentity> {
        self.entries.get(path)
    }

    /// Identity of a request key, falling back to `<key>/index.html` so a
    /// directory requested without trailing slash matches its index page.
    pub fn lookup(&self, key: &str) -> Option<&ContentIdentity> {
        self.entries
            .get(key)
            .or_else(|| self.entries.get(&join(key, "index.html")))
    }

    /// `ETag` value for a request key; empty on a miss.
    pub fn etag(&self, key: &str) -> String {
        self.lookup(key).map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn display_path(dir: &str) -> String {
    if dir.is_empty() { ".".to_string() } else { dir.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::source::{AssetEntry, BundleSource, DirSource};
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::create_dir_all(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join(".hidden/secret.txt"), "secret").unwrap();
        fs::create_dir_all(dir.path().join("css/.cache")).unwrap();
        fs::write(dir.path().join("css/site.css"), "body {}").unwrap();
        fs::write(dir.path().join("css/.env"), "TOKEN=1").unwrap();
        fs::write(dir.path().join("css/.cache/tmp.css"), "x").unwrap();
        dir
    }

    #[test]
    fn test_identity_is_lowercase_hex() {
        let hex = ContentIdentity::of(b"hello").to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        assert_eq!(ContentIdentity::of(b"hello").to_string(), hex);
    }

    #[test]
    fn test_reader_matches_buffer_hash() {
        let content = vec![7u8; 200 * 1024];
        let streamed = ContentIdentity::from_reader(content.as_slice()).unwrap();
        assert_eq!(streamed, ContentIdentity::of(&content));
    }

    #[test]
    fn test_build_from_directory() {
        let dir = site();
        let map = IdentityMap::build(&DirSource::new(dir.path())).unwrap();

        assert_eq!(map.len(), 2);
        let index = map.get("index.html").unwrap();
        assert_eq!(*index, ContentIdentity::of(b"<html></html>"));
        assert!(!index.to_hex().is_empty());
        assert!(map.contains("css/site.css"));
        assert!(map.keys().all(|k| !k.contains(".hidden")));
        assert!(map.keys().all(|k| !k.split('/').any(|s| s.starts_with('.'))));
    }

    #[test]
    fn test_build_is_deterministic() {
        let dir = site();
        let source = DirSource::new(dir.path());
        let first = IdentityMap::build(&source).unwrap();
        let second = IdentityMap::build(&source).unwrap();

        for key in first.keys() {
            assert_eq!(first.get(key), second.get(key));
        }
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_different_content_different_identity() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        fs::write(dir.path().join("b.txt"), "beta").unwrap();
        fs::write(dir.path().join("c.txt"), "alpha").unwrap();

        let map = IdentityMap::build(&DirSource::new(dir.path())).unwrap();
        assert_ne!(map.get("a.txt"), map.get("b.txt"));
        assert_eq!(map.get("a.txt"), map.get("c.txt"));
    }

    #[test]
    fn test_build_from_bundle_matches_directory() {
        let dir = site();
        let from_dir = IdentityMap::build(&DirSource::new(dir.path())).unwrap();

        let bundle = BundleSource::from_files([
            ("index.html", "<html></html>"),
            ("css/site.css", "body {}"),
            (".hidden/secret.txt", "secret"),
            ("css/.env", "TOKEN=1"),
        ]);
        let from_bundle = IdentityMap::build(&bundle).unwrap();

        assert_eq!(from_bundle.len(), from_dir.len());
        for key in from_dir.keys() {
            assert_eq!(from_dir.get(key), from_bundle.get(key));
        }
    }

    #[test]
    fn test_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let err = IdentityMap::build(&DirSource::new(dir.path().join("missing"))).unwrap_err();
        assert!(matches!(err, IdentityError::List { .. }));
        assert!(err.to_string().contains("cannot list"));
    }

    /// Source whose files can be listed but never opened.
    struct Unreadable;

    impl AssetSource for Unreadable {
        fn list(&self, dir: &str) -> io::Result<Vec<AssetEntry>> {
            match dir {
                "" => Ok(vec![AssetEntry::file("ok.txt"), AssetEntry::dir("sub")]),
                _ => Ok(vec![AssetEntry::file("locked.txt")]),
            }
        }

        fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
            if path == "sub/locked.txt" {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            } else {
                Ok(Box::new(&b"ok"[..]))
            }
        }

        fn kind(&self, _path: &str) -> Option<EntryKind> {
            None
        }
    }

    #[test]
    fn test_unreadable_file_aborts_build() {
        let err = IdentityMap::build(&Unreadable).unwrap_err();
        match err {
            IdentityError::Hash { path, source } => {
                assert_eq!(path, "sub/locked.txt");
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_aborts_build() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "ok").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("link")).unwrap();

        assert!(IdentityMap::build(&DirSource::new(dir.path())).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_is_hashed_once() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "ok").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("self")).unwrap();

        let map = IdentityMap::build(&DirSource::new(dir.path())).unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains("index.html"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_names_the_directory() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "ok").unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.txt")), "x").unwrap();

        match IdentityMap::build(&DirSource::new(dir.path())).unwrap_err() {
            IdentityError::List { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::InvalidData);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lookup_directory_index() {
        let bundle = BundleSource::from_files([("docs/index.html", "docs")]);
        let map = IdentityMap::build(&bundle).unwrap();

        let expected = ContentIdentity::of(b"docs").to_hex();
        assert_eq!(map.etag("docs/index.html"), expected);
        assert_eq!(map.etag("docs"), expected);
        assert_eq!(map.etag("missing.html"), "");
    }
}
