// Copyright © 2026 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::cache::CacheOptions;
use crate::database::{DataSource, DatabaseOptions};
use crate::logger::LoggerOptions;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Configuration file error: {0}")]
    FileError(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for crate::types::CoreError {
    fn from(e: ConfigError) -> Self {
        crate::types::CoreError::ConfigurationError(e.to_string())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub engine: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    /// 0 表示使用默认值（下同）
    pub max_open_connections: u32,
    pub max_idle_connections: u32,
    pub conn_max_lifetime_seconds: u64,
    pub prepare_stmt: bool,
    pub log_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            engine: "mysql".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3306,
            username: "root".to_string(),
            password: std::env::var("COREX_DB_PASSWORD").unwrap_or_default(),
            database: String::new(),
            max_open_connections: 0,
            max_idle_connections: 0,
            conn_max_lifetime_seconds: 0,
            prepare_stmt: false,
            log_name: String::new(),
        }
    }
}

impl DatabaseConfig {
    pub fn data_source(&self) -> DataSource {
        DataSource::new(
            self.engine.as_str(),
            self.username.as_str(),
            self.password.as_str(),
            self.host.as_str(),
            self.port,
            self.database.as_str(),
        )
    }

    pub fn options(&self) -> DatabaseOptions {
        DatabaseOptions::new()
            .with_max_open_conn(self.max_open_connections)
            .with_max_idle_conn(self.max_idle_connections)
            .with_conn_max_lifetime(Duration::from_secs(self.conn_max_lifetime_seconds))
            .with_prepare_stmt(self.prepare_stmt)
            .with_log_name(self.log_name.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RedisConfig {
    pub addr: String,
    pub password: String,
    pub db: i64,
    pub dial_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub pool_size: usize,
    pub pool_timeout_ms: u64,
    pub idle_timeout_seconds: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6379".to_string(),
            password: std::env::var("COREX_REDIS_PASSWORD").unwrap_or_default(),
            db: 0,
            dial_timeout_ms: 0,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            pool_size: 0,
            pool_timeout_ms: 0,
            idle_timeout_seconds: 0,
        }
    }
}

impl RedisConfig {
    pub fn options(&self) -> CacheOptions {
        CacheOptions::new()
            .with_dial_timeout(Duration::from_millis(self.dial_timeout_ms))
            .with_read_timeout(Duration::from_millis(self.read_timeout_ms))
            .with_write_timeout(Duration::from_millis(self.write_timeout_ms))
            .with_pool_size(self.pool_size)
            .with_pool_timeout(Duration::from_millis(self.pool_timeout_ms))
            .with_idle_timeout(Duration::from_secs(self.idle_timeout_seconds))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// console | file
    pub mode: String,
    pub path: String,
    pub level: String,
    pub server_name: String,
    /// 单个文件大小（MB），0 取默认的 100MB
    pub max_size: u32,
    /// 归档最长保存天数，0 不限制
    pub max_day: u32,
    /// 最多保留的归档数，0 不限制
    pub max_backups: u32,
    pub compress: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            mode: "console".to_string(),
            path: "./logs".to_string(),
            level: "info".to_string(),
            server_name: "corex".to_string(),
            max_size: 0,
            max_day: 0,
            max_backups: 0,
            compress: false,
        }
    }
}

impl LoggingConfig {
    pub fn options(&self) -> LoggerOptions {
        LoggerOptions::new()
            .with_mode(&self.mode)
            .with_log_path(self.path.as_str())
            .with_level(&self.level)
            .with_server_name(self.server_name.as_str())
            .with_max_size(self.max_size)
            .with_max_day(self.max_day)
            .with_max_backups(self.max_backups)
            .with_compress(self.compress)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }

    pub fn load_from_env() -> ConfigResult<Self> {
        Self::load_from_lookup(|key| std::env::var(key).ok())
    }

    /// 按 `COREX_*` 变量名逐项覆盖默认配置，变量值由 `lookup` 提供
    pub fn load_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Config::default();

        if let Some(engine) = lookup("COREX_DB_ENGINE") {
            config.database.engine = engine;
        }
        if let Some(host) = lookup("COREX_DB_HOST") {
            config.database.host = host;
        }
        if let Some(port) = lookup("COREX_DB_PORT") {
            config.database.port = parse("COREX_DB_PORT", port)?;
        }
        if let Some(user) = lookup("COREX_DB_USER") {
            config.database.username = user;
        }
        if let Some(password) = lookup("COREX_DB_PASSWORD") {
            config.database.password = password;
        }
        if let Some(name) = lookup("COREX_DB_NAME") {
            config.database.database = name;
        }
        if let Some(max_open) = lookup("COREX_DB_MAX_OPEN_CONN") {
            config.database.max_open_connections = parse("COREX_DB_MAX_OPEN_CONN", max_open)?;
        }

        if let Some(addr) = lookup("COREX_REDIS_ADDR") {
            config.redis.addr = addr;
        }
        if let Some(password) = lookup("COREX_REDIS_PASSWORD") {
            config.redis.password = password;
        }
        if let Some(db) = lookup("COREX_REDIS_DB") {
            config.redis.db = parse("COREX_REDIS_DB", db)?;
        }

        if let Some(mode) = lookup("COREX_LOG_MODE") {
            config.logging.mode = mode;
        }
        if let Some(path) = lookup("COREX_LOG_PATH") {
            config.logging.path = path;
        }
        if let Some(level) = lookup("COREX_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(name) = lookup("COREX_LOG_SERVER_NAME") {
            config.logging.server_name = name;
        }

        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.database.is_empty() {
            return Err(ConfigError::MissingRequired("database.database".to_string()));
        }
        if self.redis.addr.is_empty() {
            return Err(ConfigError::MissingRequired("redis.addr".to_string()));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: String) -> ConfigResult<T> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}
