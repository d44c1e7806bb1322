//! cli subcommands for selvage.
//!
//! - `selvage serve` - run the backend server
//! - `selvage licenses create` / `list` - manage license rows
//! - `selvage models add` / `list` - manage the model catalog
//! - `selvage reviews add` / `list` - manage review rows

mod licenses;
mod models;
mod reviews;
mod serve;

pub use licenses::LicensesCommand;
pub use models::ModelsCommand;
pub use reviews::ReviewsCommand;
pub use serve::ServeCommand;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use selvage_db::SelvageDb;
use selvage_types::Config;
use tracing::debug;

/// selvage - licensing and model delivery backend
#[derive(Parser, Debug)]
#[command(name = "selvage")]
#[command(about = "Licensing and model delivery backend", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// run the backend server
    Serve(ServeCommand),

    /// manage licenses
    #[command(subcommand)]
    Licenses(LicensesCommand),

    /// manage the model catalog
    #[command(subcommand)]
    Models(ModelsCommand),

    /// manage reviews
    #[command(subcommand)]
    Reviews(ReviewsCommand),
}

/// shared config-file argument for admin subcommands.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// path to config file (toml format)
    #[arg(short, long, env = "SELVAGE_CONFIG")]
    config: Option<PathBuf>,
}

/// default config file search paths (in order of priority).
const CONFIG_SEARCH_PATHS: &[&str] = &[
    "/etc/selvage/config.toml",
    "~/.config/selvage/config.toml",
    "./config.toml",
];

/// find and load a config file, returning none if no config file is found.
///
/// an explicitly given path must exist; otherwise the default search paths
/// are tried in order.
fn load_config_file(config_path: Option<&PathBuf>) -> Result<Option<Config>> {
    if let Some(path) = config_path {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {:?}", path))?;
        return Ok(Some(config));
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = expand_tilde::expand_tilde(path_str)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| PathBuf::from(path_str));
        if path.exists() {
            debug!("Found config file at {:?}", path);
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file: {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("failed to parse config file: {:?}", path))?;
            return Ok(Some(config));
        }
    }

    Ok(None)
}

/// load configuration for admin subcommands: config file if found, defaults
/// otherwise.
fn load_config_or_default(config_path: Option<&PathBuf>) -> Result<Config> {
    Ok(load_config_file(config_path)?.unwrap_or_default())
}

/// open the database named by the config.
async fn open_database(config: &Config) -> Result<SelvageDb> {
    SelvageDb::new(config)
        .await
        .context("failed to initialize database")
}
