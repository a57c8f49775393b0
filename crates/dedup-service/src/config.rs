//! Process configuration
//!
//! Loaded from a TOML file named on the command line. Without one the
//! service falls back to [`ServiceConfig::ephemeral`]: an in-memory store
//! and freshly generated dev credentials, nothing persisted.
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8625
//! keys = ["client-key-1"]
//! superkey = "super-secret"
//!
//! [store]
//! kind = "file"
//! path = "/var/lib/dedup/ledger.json"
//!
//! [[audit]]
//! kind = "tracing"
//!
//! [[audit]]
//! kind = "file"
//! path = "/var/log/dedup/audit.log"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::audit::{AuditSink, FileSink, NullSink, TracingSink};
use crate::storage::{FactStore, FileStore, MemoryStore, StoreError};

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default bind port
pub const DEFAULT_PORT: u16 = 8625;

/// Configuration loading failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub keys: HashSet<String>,
    pub superkey: String,
    pub store: StoreConfig,
    pub audit: Vec<AuditConfig>,
}

/// Fact-store backend selection
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Memory,
    File { path: PathBuf },
}

/// Audit sink selection
#[derive(Debug, Clone)]
pub enum AuditConfig {
    Tracing,
    File { path: PathBuf },
    Null,
}

/// Raw configuration file structure (TOML)
#[derive(Debug, Deserialize)]
struct ConfigFile {
    host: Option<String>,
    port: Option<u16>,
    keys: Vec<String>,
    superkey: String,
    store: Option<StoreSection>,
    #[serde(default)]
    audit: Vec<AuditSection>,
}

/// `[store]` section
#[derive(Debug, Deserialize)]
struct StoreSection {
    kind: String,
    path: Option<PathBuf>,
}

/// `[[audit]]` section
#[derive(Debug, Deserialize)]
struct AuditSection {
    kind: String,
    path: Option<PathBuf>,
}

impl ServiceConfig {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_file(file)
    }

    fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        if file.superkey.is_empty() {
            return Err(ConfigError::Invalid("superkey must not be empty".into()));
        }

        let keys: HashSet<String> = file.keys.into_iter().collect();
        if keys.is_empty() || keys.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid(
                "keys must be a non-empty list of non-empty strings".into(),
            ));
        }

        let store = match file.store {
            None => StoreConfig::Memory,
            Some(section) => match section.kind.as_str() {
                "memory" => StoreConfig::Memory,
                "file" => {
                    let path = section.path.ok_or_else(|| {
                        ConfigError::Invalid("store kind `file` requires `path`".into())
                    })?;
                    StoreConfig::File { path }
                }
                other => {
                    return Err(ConfigError::Invalid(format!("unknown store kind `{other}`")))
                }
            },
        };

        let mut audit = Vec::new();
        for section in file.audit {
            audit.push(match section.kind.as_str() {
                "tracing" => AuditConfig::Tracing,
                "null" => AuditConfig::Null,
                "file" => {
                    let path = section.path.ok_or_else(|| {
                        ConfigError::Invalid("audit kind `file` requires `path`".into())
                    })?;
                    AuditConfig::File { path }
                }
                other => {
                    return Err(ConfigError::Invalid(format!("unknown audit kind `{other}`")))
                }
            });
        }
        if audit.is_empty() {
            audit.push(AuditConfig::Tracing);
        }

        Ok(Self {
            host: file.host.unwrap_or_else(|| DEFAULT_HOST.into()),
            port: file.port.unwrap_or(DEFAULT_PORT),
            keys,
            superkey: file.superkey,
            store,
            audit,
        })
    }

    /// Ephemeral development configuration: in-memory store, tracing audit,
    /// freshly generated credentials. Nothing survives a restart.
    pub fn ephemeral() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            keys: HashSet::from([format!("dev-key-{}", Uuid::new_v4())]),
            superkey: format!("dev-superkey-{}", Uuid::new_v4()),
            store: StoreConfig::Memory,
            audit: vec![AuditConfig::Tracing],
        }
    }
}

impl StoreConfig {
    /// Open the configured backend
    pub fn open(&self) -> Result<Arc<dyn FactStore>, StoreError> {
        Ok(match self {
            Self::Memory => Arc::new(MemoryStore::new()),
            Self::File { path } => Arc::new(FileStore::open(path.clone())?),
        })
    }
}

impl AuditConfig {
    /// Open the configured sink
    pub fn open(&self) -> std::io::Result<Arc<dyn AuditSink>> {
        Ok(match self {
            Self::Tracing => Arc::new(TracingSink),
            Self::Null => Arc::new(NullSink),
            Self::File { path } => Arc::new(FileSink::open(path)?),
        })
    }
}
