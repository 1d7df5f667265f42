//! Configuration for repograph
//!
//! Settings come from a TOML file and a couple of environment overrides:
//!
//! ```toml
//! repos_dir = "./temp/repos"
//!
//! [graph]
//! extra_excluded_dirs = ["vendor"]
//! follow_symlinks = false
//! max_file_size = 0
//! parallel_threads = 0
//! resolution_order = "javascript-first"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 5000
//! ```
//!
//! Lookup order: an explicit path, `./repograph.toml`, `~/.repograph/config.toml`,
//! then built-in defaults. `TEMP_REPO_PATH` and `PORT` override the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::resolver::ResolutionOrder;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "repograph.toml";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory holding checkouts as `<repos_dir>/<owner>/<name>`
    #[serde(default = "default_repos_dir")]
    pub repos_dir: PathBuf,

    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Graph building behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphConfig {
    /// Directory names pruned in addition to the built-in exclusions
    #[serde(default)]
    pub extra_excluded_dirs: Vec<String>,

    /// Follow symbolic links while walking
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Files larger than this (bytes) stay in the graph but are not parsed (0 = no limit)
    #[serde(default)]
    pub max_file_size: u64,

    /// Worker threads for parsing (0 = auto, 80% of available cores)
    #[serde(default)]
    pub parallel_threads: usize,

    /// Suffix order used when resolving extensionless imports
    #[serde(default)]
    pub resolution_order: ResolutionOrder,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_repos_dir() -> PathBuf {
    PathBuf::from("./temp/repos")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repos_dir: default_repos_dir(),
            graph: GraphConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            extra_excluded_dirs: Vec::new(),
            follow_symlinks: false,
            max_file_size: 0,
            parallel_threads: 0,
            resolution_order: ResolutionOrder::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl GraphConfig {
    /// Effective worker count (0 resolves to 80% of available cores, minimum 1)
    pub fn thread_count(&self) -> usize {
        if self.parallel_threads == 0 {
            let available_cores = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4);
            ((available_cores as f64 * 0.8).ceil() as usize).max(1)
        } else {
            self.parallel_threads
        }
    }
}

impl Config {
    /// Parse a config file; a missing file is an error here
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration following the lookup order, then apply env overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::find_config_file() {
                Some(path) => {
                    log::debug!("Using config file {}", path.display());
                    Self::from_file(&path)?
                }
                None => {
                    log::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env();
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }

        let home = dirs::home_dir()?;
        let user = home.join(".repograph").join("config.toml");
        user.exists().then_some(user)
    }

    /// Apply `TEMP_REPO_PATH` and `PORT` overrides
    pub fn apply_env(&mut self) {
        if let Ok(dir) = env::var("TEMP_REPO_PATH") {
            if !dir.trim().is_empty() {
                self.repos_dir = PathBuf::from(dir);
            }
        }

        if let Ok(port) = env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
    }

    /// Serialize back to TOML (used by `rgraph config`)
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.repos_dir, PathBuf::from("./temp/repos"));
        assert_eq!(config.graph.max_file_size, 0);
        assert_eq!(config.graph.resolution_order, ResolutionOrder::JavascriptFirst);
        assert_eq!(config.server.port, 5000);
        assert!(config.graph.thread_count() >= 1);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("repograph.toml");
        std::fs::write(
            &path,
            r#"
repos_dir = "/srv/repos"

[graph]
extra_excluded_dirs = ["vendor"]
resolution_order = "typescript-first"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.repos_dir, PathBuf::from("/srv/repos"));
        assert_eq!(config.graph.extra_excluded_dirs, vec!["vendor"]);
        assert_eq!(config.graph.resolution_order, ResolutionOrder::TypescriptFirst);
        assert!(!config.graph.follow_symlinks);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        std::fs::write(&path, "repos_dir = [").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(temp.path().join("nope.toml").as_path())).is_err());
    }

    #[test]
    fn test_thread_count_explicit() {
        let graph = GraphConfig { parallel_threads: 3, ..Default::default() };
        assert_eq!(graph.thread_count(), 3);
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
