//! Server configuration: a TOML file plus command line overrides

use std::{
    io,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::Parser;
use netroute_core::RouterConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::logging::LogFormat;

/// Padding added around the waypoints when selecting catalogue files
pub const DEFAULT_CATALOG_MARGIN_DEG: f64 = 0.01;

/// Feature `class` values kept from catalogue files unless configured otherwise
pub const DEFAULT_FEATURE_CLASSES: [&str; 3] = ["river", "ocean", "sea"];

#[derive(Parser, Debug, Default)]
#[command(name = "netroute-server", version, about = "Route waypoints along line networks over HTTP")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, overrides the config file
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Default log filter when `RUST_LOG` is unset
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub log_level: String,
    pub log_format: LogFormat,
    pub catalog: Option<CatalogConfig>,
    pub router: RouterConfig,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            catalog: None,
            router: RouterConfig::default(),
            request_timeout_secs: 30,
            max_concurrent_requests: 64,
        }
    }
}

/// Local mirror of a release catalogue
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogConfig {
    /// JSON manifest listing themes, types and files with their extents
    pub manifest: PathBuf,
    /// Directory the manifest's relative paths resolve against.
    /// Defaults to the manifest's own directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default = "default_margin")]
    pub margin_deg: f64,
    /// Accepted values of a feature's `class` property. An empty list keeps
    /// every feature.
    #[serde(default = "default_feature_classes")]
    pub feature_classes: Vec<String>,
}

fn default_margin() -> f64 {
    DEFAULT_CATALOG_MARGIN_DEG
}

pub(crate) fn default_feature_classes() -> Vec<String> {
    DEFAULT_FEATURE_CLASSES.map(String::from).to_vec()
}

impl CatalogConfig {
    pub fn root(&self) -> PathBuf {
        match &self.root {
            Some(root) => root.clone(),
            None => self
                .manifest
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the file named on the command line, if any, then applies the
    /// remaining flags on top.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(bind) = cli.bind {
            config.bind = bind;
        }
        if let Some(level) = &cli.log_level {
            config.log_level.clone_from(level);
        }
        Ok(config)
    }
}
