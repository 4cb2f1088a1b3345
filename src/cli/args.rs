//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::{net::IpAddr, path::PathBuf};

/// Static asset web server with content-hash etags
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (TOML)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Server name shown in logs
    #[arg(long)]
    pub name: Option<String>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory to serve
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Serve the current working directory
    #[arg(long)]
    pub current: bool,

    /// Use the directory as root instead of the bundled assets
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub dir_root: Option<bool>,

    /// Cache-Control max-age in seconds (0 or less disables caching)
    #[arg(long, allow_negative_numbers = true)]
    pub cache_ttl: Option<i64>,

    /// Trusted proxy (gateway) ip, may be repeated
    #[arg(long = "trusted-ip", value_name = "IP")]
    pub trusted_ips: Vec<IpAddr>,

    /// Replace text in a served file, may be repeated
    ///
    /// Example: --replace "config.json:127.0.0.1=api.example.com"
    #[arg(long, value_name = "FILE:FROM=TO", value_parser = parse_replace)]
    pub replace: Vec<ReplaceArg>,

    /// Allowed CORS origin (enables CORS headers)
    #[arg(long)]
    pub cors_origin: Option<String>,

    /// Compress text responses with gzip
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub gzip: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}

/// One `--replace FILE:FROM=TO` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceArg {
    pub file: String,
    pub from: String,
    pub to: String,
}

fn parse_replace(value: &str) -> Result<ReplaceArg, String> {
    let (file, item) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FILE:FROM=TO, got `{value}`"))?;
    let (from, to) = item
        .split_once('=')
        .ok_or_else(|| format!("expected FROM=TO after `{file}:`"))?;

    if file.is_empty() {
        return Err("file must not be empty".to_string());
    }
    if from.is_empty() {
        return Err("cannot replace an empty string".to_string());
    }

    Ok(ReplaceArg {
        file: file.to_string(),
        from: from.to_string(),
        to: to.to_string(),
    })
}
