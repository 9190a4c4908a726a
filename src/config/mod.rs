use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::bulk::AfterUseAction;
use crate::core::error::ConfigError;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub log: LogConfig,
    pub query: QueryConfig,
    pub bulk: BulkConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QueryConfig {
    /// Capacity of the translated-plan cache, keyed by query text.
    pub plan_cache_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BulkConfig {
    /// What happens to an id table after a bulk statement used it.
    pub after_use: AfterUseAction,
    /// Shared id tables are visible across sessions and carry a session-uid
    /// discriminator column so concurrent executions stay isolated.
    pub shared_id_tables: bool,
    pub session_uid_column: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log: LogConfig {
                level: "info".to_string(),
                dir: "logs".to_string(),
                file: "relmap".to_string(),
                max_file_size: 100 * 1024 * 1024, // 100MB
                max_files: 5,
            },
            query: QueryConfig {
                plan_cache_capacity: 128,
            },
            bulk: BulkConfig {
                after_use: AfterUseAction::Clean,
                shared_id_tables: false,
                session_uid_column: "sess_uid".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}
