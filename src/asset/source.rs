//! Asset sources: a real directory or a bundle compiled into the binary.
//!
//! Both sources expose the same `list`/`open` capability so the identity
//! builder and the file handler walk them with one algorithm. The active
//! source is chosen once at startup as an [`AssetRoot`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use rust_embed::RustEmbed;

/// Kind of an entry returned by [`AssetSource::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// A single directory entry, named relative to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl AssetEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Dir,
        }
    }

    /// Hidden entries (`.git`, `.env`, ...) are never hashed nor served.
    pub fn is_hidden(&self) -> bool {
        is_hidden_name(&self.name)
    }
}

/// Whether a single path segment names a hidden entry.
#[inline]
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Join a relative asset path with a child name using `/`.
#[inline]
pub fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}

/// Read-only tree of static files addressed by `/`-separated relative paths.
///
/// The empty path `""` is the root.
pub trait AssetSource {
    /// List the direct children of `dir`.
    fn list(&self, dir: &str) -> io::Result<Vec<AssetEntry>>;

    /// Open the file at `path` for reading.
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>>;

    /// Kind of the entry at `path`, or `None` if it does not exist.
    fn kind(&self, path: &str) -> Option<EntryKind>;

    /// Read the complete file at `path`.
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.open(path)?.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

// ============================================================================
// Directory source
// ============================================================================

/// Files served from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn local(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }

    /// Whether the directory `target` resolves to `dir` or to one of the
    /// directories on the way to it from the root.
    fn loops_back(&self, dir: &str, target: &Path) -> io::Result<bool> {
        let target = fs::canonicalize(target)?;
        let mut current = self.root.clone();
        if fs::canonicalize(&current)? == target {
            return Ok(true);
        }
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            current.push(segment);
            if fs::canonicalize(&current)? == target {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl AssetSource for DirSource {
    fn list(&self, dir: &str) -> io::Result<Vec<AssetEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.local(dir))? {
            let entry = entry?;
            let name = entry.file_name().into_string().map_err(|raw| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("file name is not valid UTF-8: {raw:?}"),
                )
            })?;
            if is_hidden_name(&name) {
                // Skipped by callers, no need to follow links
                let kind = if entry.file_type()?.is_dir() {
                    EntryKind::Dir
                } else {
                    EntryKind::File
                };
                entries.push(AssetEntry { name, kind });
                continue;
            }
            // Follow symlinks: a dangling link surfaces as an error here
            let meta = fs::metadata(entry.path())?;
            if meta.is_dir() {
                if entry.file_type()?.is_symlink() && self.loops_back(dir, &entry.path())? {
                    crate::log!(
                        "serve";
                        "skipping `{}`: symlink points back into its own path",
                        join(dir, &name)
                    );
                    continue;
                }
                entries.push(AssetEntry::dir(name));
            } else if meta.is_file() {
                entries.push(AssetEntry::file(name));
            }
        }
        Ok(entries)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        let file = File::open(self.local(path))?;
        Ok(Box::new(BufReader::with_capacity(64 * 1024, file)))
    }

    fn kind(&self, path: &str) -> Option<EntryKind> {
        let meta = fs::metadata(self.local(path)).ok()?;
        if meta.is_dir() {
            Some(EntryKind::Dir)
        } else if meta.is_file() {
            Some(EntryKind::File)
        } else {
            None
        }
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.local(path))
    }
}

// ============================================================================
// Bundle source
// ============================================================================

/// Files compiled into the binary, exposed as a virtual directory tree.
///
/// Directories are implied by the file paths; there are no empty directories.
#[derive(Debug, Clone, Default)]
pub struct BundleSource {
    files: BTreeMap<String, Cow<'static, [u8]>>,
}

impl BundleSource {
    /// Collect the files of a `RustEmbed` folder that live under `root`.
    ///
    /// Paths are stored relative to `root`, so `www/index.html` with
    /// `root = "www"` is served as `index.html`.
    pub fn from_embed<E: RustEmbed>(root: &str) -> Self {
        let root = root.trim_matches('/');
        let files = E::iter()
            .filter_map(|path| {
                let rel = strip_root(&path, root)?.to_string();
                let file = E::get(&path)?;
                Some((rel, file.data))
            })
            .collect();
        Self { files }
    }

    /// Build a bundle from in-memory `(path, content)` pairs.
    pub fn from_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<String>,
        C: Into<Vec<u8>>,
    {
        let files = files
            .into_iter()
            .map(|(path, content)| {
                let path: String = path.into();
                (
                    path.trim_matches('/').to_string(),
                    Cow::Owned(content.into()),
                )
            })
            .collect();
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths of every file below `dir`, relative to `dir`.
    fn below<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        self.files
            .range::<str, _>((
                std::ops::Bound::Included(prefix.as_str()),
                std::ops::Bound::Unbounded,
            ))
            .map(|(path, _)| path.as_str())
            .take_while(move |path| path.starts_with(&prefix))
            .map(move |path| &path[prefix_len(dir)..])
    }
}

fn prefix_len(dir: &str) -> usize {
    if dir.is_empty() { 0 } else { dir.len() + 1 }
}

fn strip_root<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    if root.is_empty() {
        return Some(path);
    }
    path.strip_prefix(root)?.strip_prefix('/')
}

impl AssetSource for BundleSource {
    fn list(&self, dir: &str) -> io::Result<Vec<AssetEntry>> {
        let mut children: BTreeMap<&str, EntryKind> = BTreeMap::new();
        for rest in self.below(dir) {
            match rest.split_once('/') {
                Some((name, _)) => children.insert(name, EntryKind::Dir),
                None => children.insert(rest, EntryKind::File),
            };
        }

        if children.is_empty() && !dir.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no bundled directory `{dir}`"),
            ));
        }

        Ok(children
            .into_iter()
            .map(|(name, kind)| AssetEntry {
                name: name.to_string(),
                kind,
            })
            .collect())
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        let data = self.files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no bundled file `{path}`"),
            )
        })?;
        Ok(Box::new(Cursor::new(&data[..])))
    }

    fn kind(&self, path: &str) -> Option<EntryKind> {
        if path.is_empty() {
            return Some(EntryKind::Dir);
        }
        if self.files.contains_key(path) {
            return Some(EntryKind::File);
        }
        self.below(path).next().map(|_| EntryKind::Dir)
    }
}

// ============================================================================
// Asset root
// ============================================================================

/// The single source of static files for a server instance.
#[derive(Debug, Clone)]
pub enum AssetRoot {
    Dir(DirSource),
    Bundle(BundleSource),
}

impl AssetRoot {
    /// Pick the active root.
    ///
    /// The directory wins when it is flagged as root or when there is no
    /// non-empty bundle; otherwise the bundle is served.
    pub fn select(dir: Option<PathBuf>, dir_root: bool, bundle: Option<BundleSource>) -> Option<Self> {
        let bundle = bundle.filter(|b| !b.is_empty());
        match (dir, bundle) {
            (Some(dir), None) => Some(Self::Dir(DirSource::new(dir))),
            (Some(dir), Some(_)) if dir_root => Some(Self::Dir(DirSource::new(dir))),
            (_, Some(bundle)) => Some(Self::Bundle(bundle)),
            (None, None) => None,
        }
    }

    /// Human readable description for startup logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Dir(dir) => format!("directory {}", dir.root().display()),
            Self::Bundle(bundle) => format!("bundle ({} files)", bundle.len()),
        }
    }
}

impl AssetSource for AssetRoot {
    fn list(&self, dir: &str) -> io::Result<Vec<AssetEntry>> {
        match self {
            Self::Dir(s) => s.list(dir),
            Self::Bundle(s) => s.list(dir),
        }
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        match self {
            Self::Dir(s) => s.open(path),
            Self::Bundle(s) => s.open(path),
        }
    }

    fn kind(&self, path: &str) -> Option<EntryKind> {
        match self {
            Self::Dir(s) => s.kind(path),
            Self::Bundle(s) => s.kind(path),
        }
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        match self {
            Self::Dir(s) => s.read(path),
            Self::Bundle(s) => s.read(path),
        }
    }
}
