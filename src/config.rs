/// Server configuration read from the environment.
///
/// | Variable          | Default     |
/// |-------------------|-------------|
/// | `HOST`            | `127.0.0.1` |
/// | `PORT`            | `8080`      |
/// | `NGSS_DATA_DIR`   | `data`      |
/// | `NGSS_ALIAS_FILE` | unset       |

use crate::alias::AliasTable;
use crate::error::TableError;
use std::fs;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got '{value}'")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("could not load alias file {}: {source}", path.display())]
    AliasFile {
        path: PathBuf,
        #[source]
        source: TableError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory scanned by `LoadDirectory` requests.
    pub data_dir: PathBuf,
    /// Optional JSON alias table replacing the built-in vocabularies.
    pub alias_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            alias_file: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset or empty keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = ServerConfig::default();

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => defaults.port,
        };

        Ok(ServerConfig {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            data_dir: get("NGSS_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            alias_file: get("NGSS_ALIAS_FILE").map(PathBuf::from),
        })
    }

    /// Load the configured alias table, if any.
    pub fn load_aliases(&self) -> Result<Option<AliasTable>, ConfigError> {
        let Some(path) = &self.alias_file else {
            return Ok(None);
        };

        let to_error = |source: TableError| ConfigError::AliasFile {
            path: path.clone(),
            source,
        };
        let json = fs::read_to_string(path).map_err(|e| to_error(TableError::Io(e)))?;
        AliasTable::from_json(&json).map(Some).map_err(to_error)
    }
}
