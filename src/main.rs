//! assetweb - static asset server with content-hash etags.

mod asset;
mod cli;
mod config;
mod embed;
mod logger;
mod serve;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::ServerConfig;
use serve::App;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    serve::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = ServerConfig::load(&cli)?;
    let bundle = embed::bundle(&config.assets.bundle_root);

    App::prepare(config, bundle)?.bind()?.run()
}
