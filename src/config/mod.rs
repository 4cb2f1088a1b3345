//! Server configuration, loaded once from an optional TOML file plus CLI flags.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── assets     # [assets]
//! │   ├── cache      # [cache]
//! │   ├── cors       # [cors]
//! │   ├── replace    # [[replace]]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # ServerConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section       | Purpose                                           |
//! |---------------|---------------------------------------------------|
//! | `[serve]`     | Listener (name, interface, port, proxies, gzip)   |
//! | `[assets]`    | Directory or bundled assets                       |
//! | `[cache]`     | `Cache-Control` max-age and etags                 |
//! | `[cors]`      | Cross-origin headers                              |
//! | `[[replace]]` | Per-file text substitution                        |
//!
//! Precedence is defaults, then the file, then CLI flags. The result is
//! immutable and handed to the server by value.

pub mod section;
pub mod types;

pub use section::{AssetsConfig, CacheConfig, CorsConfig, ReplaceItem, ServeConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, ReplaceArg},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Absolute path to the config file, when one was given.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub assets: AssetsConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub replace: Vec<ReplaceItem>,
}

impl ServerConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Paths in the file are relative to the file; paths on the command line
    /// are relative to the working directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, base) = match &cli.config {
            Some(path) => {
                let path = cwd.join(path);
                let mut config = Self::from_path(&path)?;
                let base = path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.clone());
                config.config_path = Some(path);
                (config, base)
            }
            None => (Self::default(), cwd.clone()),
        };

        config.assets.normalize(&base, &cwd);
        config.apply_cli(cli, &cwd);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        log!("warning"; "unknown fields in {}, ignoring:", path.display());
        for field in fields {
            log!("warning"; "- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_cli(&mut self, cli: &Cli, cwd: &Path) {
        Self::update_option(&mut self.serve.name, cli.name.as_ref());
        Self::update_option(&mut self.serve.interface, cli.interface.as_ref());
        Self::update_option(&mut self.serve.port, cli.port.as_ref());
        Self::update_option(&mut self.serve.gzip, cli.gzip.as_ref());
        self.serve.trusted_proxies.extend(cli.trusted_ips.iter().copied());

        if let Some(dir) = &cli.dir {
            self.assets.dir = Some(cwd.join(dir));
        }
        if cli.current {
            self.assets.current = true;
        }
        Self::update_option(&mut self.assets.dir_root, cli.dir_root.as_ref());

        Self::update_option(&mut self.cache.ttl, cli.cache_ttl.as_ref());
        Self::update_option(&mut self.cors.allow_origin, cli.cors_origin.as_ref());

        for arg in &cli.replace {
            self.merge_replace(arg);
        }
    }

    /// Add a command-line substitution to the last entry for the same file,
    /// or start a new entry.
    fn merge_replace(&mut self, arg: &ReplaceArg) {
        let file = arg.file.trim_matches('/');
        let existing = self
            .replace
            .iter_mut()
            .rev()
            .find(|item| item.file.trim_matches('/') == file);

        match existing {
            Some(item) => {
                item.items.insert(arg.from.clone(), arg.to.clone());
            }
            None => self.replace.push(ReplaceItem {
                file: file.to_string(),
                items: [(arg.from.clone(), arg.to.clone())].into(),
            }),
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, collecting all errors at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.serve.validate(&mut diag);
        self.assets.validate(&mut diag);
        self.cors.validate(&mut diag);
        for item in &self.replace {
            item.validate(&mut diag);
        }

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> ServerConfig {
    let (parsed, ignored) = ServerConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["assetweb"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(ServerConfig::from_str("[serve\nport = 1").is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[serve]\nport = 9000\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = ServerConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.serve.port, 9000);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_cli_overrides_file() {
        let temp = TempDir::new().unwrap();
        let public = temp.path().join("public");
        fs::create_dir(&public).unwrap();
        let path = temp.path().join("assetweb.toml");
        fs::write(
            &path,
            "[serve]\nport = 9000\nname = \"file\"\n[assets]\ndir = \"public\"\n[cache]\nttl = 60",
        )
        .unwrap();

        let path = path.to_string_lossy().into_owned();
        let config = ServerConfig::load(&cli(&[
            "-c",
            &path,
            "--port",
            "9100",
            "--cache-ttl",
            "0",
            "--trusted-ip",
            "10.0.0.1",
        ]))
        .unwrap();

        assert_eq!(config.serve.port, 9100);
        assert_eq!(config.serve.name, "file");
        assert_eq!(config.cache.ttl, 0);
        assert_eq!(config.assets.directory(), Some(public.as_path()));
        assert_eq!(config.serve.trusted_proxies.len(), 1);
        assert!(config.config_path.is_some());
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.toml");
        let path = path.to_string_lossy().into_owned();
        let err = ServerConfig::load(&cli(&["-c", &path])).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_missing_dir_fails_validation() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nope").to_string_lossy().into_owned();
        let err = ServerConfig::load(&cli(&["--dir", &dir])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Diagnostics(_))
        ));
    }

    #[test]
    fn test_cli_replace_merges_into_file_entry() {
        let mut config =
            test_parse_config("[[replace]]\nfile = \"/config.json\"\nitems = { a = \"b\" }");
        let cwd = std::env::current_dir().unwrap();
        config.apply_cli(
            &cli(&[
                "--replace",
                "config.json:c=d",
                "--replace",
                "env.js:__ENV__=prod",
            ]),
            &cwd,
        );

        assert_eq!(config.replace.len(), 2);
        assert_eq!(config.replace[0].items.len(), 2);
        assert_eq!(config.replace[0].items["c"], "d");
        assert_eq!(config.replace[1].file, "env.js");
    }

    #[test]
    fn test_cors_origin_flag_enables_cors() {
        let mut config = ServerConfig::default();
        let cwd = std::env::current_dir().unwrap();
        config.apply_cli(&cli(&["--cors-origin", "https://example.com"]), &cwd);
        assert!(config.cors.is_enabled());
    }
}
