//! `[assets]` section configuration.
//!
//! Chooses where static files come from.
//!
//! # Example
//!
//! ```toml
//! [assets]
//! dir = "public"        # Directory to serve (relative to this file)
//! current = false       # Serve the working directory instead
//! dir_root = true       # Prefer the directory over the bundled assets
//! bundle_root = "www"   # Folder inside the bundle holding the site
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Asset root selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory to serve.
    pub dir: Option<PathBuf>,

    /// Serve the current working directory when `dir` is unset.
    pub current: bool,

    /// Directory takes precedence over the bundle when both exist.
    pub dir_root: bool,

    /// Prefix of the bundled files that is served as `/`.
    pub bundle_root: String,

    /// Working directory captured when `current` is applied.
    #[serde(skip)]
    cwd: Option<PathBuf>,
}

impl AssetsConfig {
    pub const DIR: FieldPath = FieldPath::new("assets.dir");

    /// Directory to serve, if any: `dir` first, then the working directory
    /// when `current` is set.
    pub fn directory(&self) -> Option<&Path> {
        if let Some(dir) = &self.dir {
            return Some(dir);
        }
        if self.current {
            return self.cwd.as_deref();
        }
        None
    }

    /// Resolve relative paths against `base` and capture the working directory.
    pub fn normalize(&mut self, base: &Path, cwd: &Path) {
        if let Some(dir) = self.dir.take() {
            self.dir = Some(if dir.is_relative() { base.join(dir) } else { dir });
        }
        self.cwd = Some(cwd.to_path_buf());
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let Some(dir) = self.directory() else {
            return;
        };
        if !dir.exists() {
            diag.error(Self::DIR, format!("`{}` does not exist", dir.display()));
        } else if !dir.is_dir() {
            diag.error_with_hint(
                Self::DIR,
                format!("`{}` is not a directory", dir.display()),
                "point it at the folder that holds index.html",
            );
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            current: false,
            dir_root: true,
            bundle_root: "www".to_string(),
            cwd: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::AssetsConfig;
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_assets_defaults() {
        let config = test_parse_config("");
        assert!(config.assets.dir.is_none());
        assert!(!config.assets.current);
        assert!(config.assets.dir_root);
        assert_eq!(config.assets.bundle_root, "www");
        assert!(config.assets.directory().is_none());
    }

    #[test]
    fn test_relative_dir_resolved_against_base() {
        let mut assets = test_parse_config("[assets]\ndir = \"public\"").assets;
        assets.normalize(Path::new("/srv/site"), Path::new("/tmp"));
        assert_eq!(assets.directory(), Some(Path::new("/srv/site/public")));
    }

    #[test]
    fn test_current_uses_cwd() {
        let mut assets = AssetsConfig {
            current: true,
            ..Default::default()
        };
        assets.normalize(Path::new("/srv"), Path::new("/home/me"));
        assert_eq!(assets.directory(), Some(Path::new("/home/me")));

        // explicit dir wins over current
        assets.dir = Some(PathBuf::from("/var/www"));
        assert_eq!(assets.directory(), Some(Path::new("/var/www")));
    }

    #[test]
    fn test_validate_dir() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        let mut diag = ConfigDiagnostics::new();
        let ok = AssetsConfig {
            dir: Some(temp.path().to_path_buf()),
            ..Default::default()
        };
        ok.validate(&mut diag);
        assert!(diag.is_empty());

        let not_dir = AssetsConfig {
            dir: Some(file),
            ..Default::default()
        };
        not_dir.validate(&mut diag);

        let missing = AssetsConfig {
            dir: Some(temp.path().join("missing")),
            ..Default::default()
        };
        missing.validate(&mut diag);

        assert_eq!(diag.len(), 2);
        assert!(diag.errors()[0].message.contains("not a directory"));
        assert!(diag.errors()[1].message.contains("does not exist"));
    }
}
