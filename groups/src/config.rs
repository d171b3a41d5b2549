//! Service configuration, loaded from TOML.

use std::path::PathBuf;

use bnms_dedup::RequestLocks;
use bnms_store_lmdb::{LmdbEnvironment, LmdbLockStore};
use bnms_types::NetworkId;
use bnms_utils::LogFormat;
use serde::{Deserialize, Serialize};

use crate::error::GroupsError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory holding the LMDB lock environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size for the lock environment, in bytes.
    #[serde(default = "default_lock_map_size")]
    pub lock_map_size: usize,

    /// Locks older than this are treated as leaked by [`reconcile`](crate::NetworkCoordinator::reconcile_locks).
    #[serde(default = "default_lock_max_age_secs")]
    pub lock_max_age_secs: u64,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Network created by [`BootstrapNetwork::from_config`](crate::BootstrapNetwork::from_config).
    #[serde(default)]
    pub default_network_id: Option<NetworkId>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./bnms_data")
}

fn default_lock_map_size() -> usize {
    64 * 1024 * 1024
}

fn default_lock_max_age_secs() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, GroupsError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| GroupsError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GroupsError> {
        toml::from_str(s).map_err(|e| GroupsError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GroupsError> {
        toml::to_string_pretty(self).map_err(|e| GroupsError::Config(e.to_string()))
    }

    /// Install the global tracing subscriber described by this config.
    pub fn init_logging(&self) -> bool {
        bnms_utils::init_logging(self.log_format, &self.log_level)
    }

    /// Open the LMDB lock environment under `data_dir`.
    pub fn open_request_locks(
        &self,
    ) -> Result<(LmdbEnvironment, RequestLocks<LmdbLockStore>), GroupsError> {
        let locks_dir = self.data_dir.join("locks");
        let env = LmdbEnvironment::open(&locks_dir, 4, self.lock_map_size)
            .map_err(|e| GroupsError::Store(e.into()))?;
        let locks = RequestLocks::new(std::sync::Arc::new(env.lock_store()));
        Ok((env, locks))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            lock_map_size: default_lock_map_size(),
            lock_max_age_secs: default_lock_max_age_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            default_network_id: None,
        }
    }
}
