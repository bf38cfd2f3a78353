//! Layered configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `roster.toml` (or the file named by `ROSTER_CONFIG`), then environment
//! variables prefixed `ROSTER`, with `__` between path segments:
//!
//! ```text
//! ROSTER__SERVER__PORT=8080
//! ROSTER__STORAGE__DATA_DIR=/var/lib/roster
//! ```

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;

/// Config file consulted when `ROSTER_CONFIG` is unset. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "roster.toml";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HttpConfig {
    /// Largest accepted request body in bytes.
    pub max_body_size: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub profiles_json: String,
    pub profiles_csv: String,
    /// Rebuild the row store from the structured store at startup when
    /// their record counts differ.
    pub reconcile_on_start: bool,
}

impl Config {
    /// Load from `ROSTER_CONFIG` (or [`DEFAULT_CONFIG_FILE`]) plus environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var("ROSTER_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_owned());
        Self::load_from(&path)
    }

    /// Load from the given file path plus environment.
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Self::defaults()?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("ROSTER").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    fn defaults() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("http.max_body_size", 1_048_576)? // 1 MiB
            .set_default("storage.data_dir", ".")?
            .set_default("storage.profiles_json", "profiles.json")?
            .set_default("storage.profiles_csv", "profiles.csv")?
            .set_default("storage.reconcile_on_start", true)?)
    }

    /// `host:port` string for [`Server::bind`](crate::Server::bind).
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl StorageConfig {
    /// Config rooted at `dir` with the default file names.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            profiles_json: "profiles.json".to_owned(),
            profiles_csv: "profiles.csv".to_owned(),
            reconcile_on_start: true,
        }
    }

    pub fn json_path(&self) -> PathBuf {
        self.data_dir.join(&self.profiles_json)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.data_dir.join(&self.profiles_csv)
    }
}
