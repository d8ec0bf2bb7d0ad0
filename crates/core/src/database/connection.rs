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

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbBackend,
    DbErr, ExecResult, QueryResult, Statement,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::hooks::{HookRegistry, OperationKind, SqlLogHook, StatementEvent, StatementHook};
use super::naming::NamingStrategy;
use crate::types::{CoreError, Result};

pub const DEFAULT_MAX_OPEN_CONN: u32 = 1000;
pub const DEFAULT_MAX_IDLE_CONN: u32 = 100;
pub const DEFAULT_CONN_MAX_LIFETIME: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_LOG_NAME: &str = "sql";

/// 唯一支持的驱动标识
pub const DRIVER_MYSQL: &str = "mysql";

/// 建表时附加的表选项
pub const DEFAULT_TABLE_OPTIONS: &str = "CHARSET=utf8mb4";

impl From<DbErr> for CoreError {
    fn from(e: DbErr) -> Self {
        CoreError::DatabaseError(e.to_string())
    }
}

/// 连接参数：驱动、账号与地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub driver: String,
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl DataSource {
    pub fn new(
        driver: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
    ) -> Self {
        Self {
            driver: driver.into(),
            username: username.into(),
            password: password.into(),
            host: host.into(),
            port,
            database: database.into(),
        }
    }

    /// 生成连接串；不支持的驱动返回 `None`。
    /// 账号和密码会做百分号编码，`#`、`/`、`@` 等字符不会破坏 URL 结构。
    pub fn dsn(&self) -> Option<String> {
        match self.driver.as_str() {
            DRIVER_MYSQL => Some(format!(
                "mysql://{}:{}@{}:{}/{}?charset=utf8mb4",
                utf8_percent_encode(&self.username, NON_ALPHANUMERIC),
                utf8_percent_encode(&self.password, NON_ALPHANUMERIC),
                self.host,
                self.port,
                self.database
            )),
            _ => None,
        }
    }
}

/// 连接池可调参数，0 表示未设置
///
/// sqlx 连接池没有"最多保留多少空闲连接"的开关，`max_idle_conn` 只记录配置值，
/// 空闲连接由 `max_lifetime` 回收。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseOptions {
    pub max_open_conn: u32,
    pub max_idle_conn: u32,
    pub conn_max_lifetime: Duration,
    pub prepare_stmt: bool,
    pub log_name: String,
}

impl DatabaseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_open_conn(mut self, num: u32) -> Self {
        self.max_open_conn = num;
        self
    }

    pub fn with_max_idle_conn(mut self, num: u32) -> Self {
        self.max_idle_conn = num;
        self
    }

    pub fn with_conn_max_lifetime(mut self, lifetime: Duration) -> Self {
        self.conn_max_lifetime = lifetime;
        self
    }

    pub fn with_prepare_stmt(mut self, enabled: bool) -> Self {
        self.prepare_stmt = enabled;
        self
    }

    pub fn with_log_name(mut self, name: impl Into<String>) -> Self {
        self.log_name = name.into();
        self
    }

    /// 填充默认值。`max_open_conn` 不在这里处理，留到建立连接池时兜底。
    pub fn resolve(mut self) -> Self {
        if self.conn_max_lifetime.is_zero() {
            self.conn_max_lifetime = DEFAULT_CONN_MAX_LIFETIME;
        }
        if self.max_idle_conn == 0 {
            self.max_idle_conn = DEFAULT_MAX_IDLE_CONN;
        }
        if self.log_name.is_empty() {
            self.log_name = DEFAULT_LOG_NAME.to_string();
        }
        self
    }

    fn connect_options(&self, dsn: String) -> ConnectOptions {
        let max_open = if self.max_open_conn > 0 {
            self.max_open_conn
        } else {
            DEFAULT_MAX_OPEN_CONN
        };

        let mut opts = ConnectOptions::new(dsn);
        opts.max_connections(max_open).sqlx_logging(false);

        if !self.conn_max_lifetime.is_zero() {
            opts.max_lifetime(self.conn_max_lifetime);
        }

        #[cfg(feature = "mysql")]
        if !self.prepare_stmt {
            opts.map_sqlx_mysql_opts(|o| o.statement_cache_capacity(0));
        }

        opts
    }
}

/// 带语句回调的数据库客户端
pub struct Database {
    conn: DatabaseConnection,
    hooks: Arc<HookRegistry>,
    naming: NamingStrategy,
    database_name: String,
}

impl Database {
    /// 建立连接池并登记 create/query/update/delete 四个 SQL 日志回调
    pub async fn connect(source: &DataSource, options: DatabaseOptions) -> Result<Self> {
        let options = options.resolve();

        let dsn = source.dsn().ok_or_else(|| {
            CoreError::DatabaseError(format!(
                "unsupported database driver '{}', [db connection failed] Database name: {}",
                source.driver, source.database
            ))
        })?;

        info!(
            "Connecting to {} database {} at {}:{}",
            source.driver, source.database, source.host, source.port
        );

        let conn = SeaDatabase::connect(options.connect_options(dsn))
            .await
            .map_err(|e| {
                CoreError::DatabaseError(format!(
                    "{}, [db connection failed] Database name: {}",
                    e, source.database
                ))
            })?;

        info!("Database connection established successfully");

        let mut db = Self::from_connection(conn, &options.log_name);
        db.database_name = source.database.clone();
        Ok(db)
    }

    /// 包装一个现成的连接，并登记默认的 SQL 日志回调
    pub fn from_connection(conn: DatabaseConnection, log_name: &str) -> Self {
        let log_name = if log_name.is_empty() {
            DEFAULT_LOG_NAME
        } else {
            log_name
        };

        let db = Self {
            conn,
            hooks: Arc::new(HookRegistry::new()),
            naming: NamingStrategy::default(),
            database_name: String::new(),
        };

        let hook: Arc<dyn StatementHook> = Arc::new(SqlLogHook::new(log_name));
        for kind in OperationKind::ALL {
            if let Err(e) = db.hooks.register(kind, log_name, hook.clone()) {
                error!("Register {} hook error, {}", kind, e);
            }
        }

        db
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn register_hook(
        &self,
        kind: OperationKind,
        name: &str,
        hook: Arc<dyn StatementHook>,
    ) -> Result<()> {
        self.hooks.register(kind, name, hook)
    }

    pub fn naming(&self) -> &NamingStrategy {
        &self.naming
    }

    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    /// 按命名策略把模型名转换为表名
    pub fn table_name(&self, model: &str) -> String {
        self.naming.table_name(model)
    }

    pub fn table_options(&self) -> &'static str {
        DEFAULT_TABLE_OPTIONS
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub async fn ping(&self) -> Result<()> {
        self.conn.ping().await.map_err(CoreError::from)
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await.map_err(CoreError::from)
    }

    fn after(&self, stmt: &Statement, error: Option<&DbErr>) {
        if self.hooks.is_empty() {
            return;
        }
        let Some(kind) = OperationKind::classify(&stmt.sql) else {
            return;
        };

        self.hooks.fire(&StatementEvent {
            kind,
            sql: stmt.to_string(),
            error: error.map(|e| e.to_string()),
        });
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("database_name", &self.database_name)
            .field("hooks", &self.hooks)
            .field("naming", &self.naming)
            .finish()
    }
}

#[async_trait]
impl ConnectionTrait for Database {
    fn get_database_backend(&self) -> DbBackend {
        self.conn.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> std::result::Result<ExecResult, DbErr> {
        let result = self.conn.execute(stmt.clone()).await;
        self.after(&stmt, result.as_ref().err());
        result
    }

    async fn execute_unprepared(&self, sql: &str) -> std::result::Result<ExecResult, DbErr> {
        let result = self.conn.execute_unprepared(sql).await;
        let stmt = Statement::from_string(self.get_database_backend(), sql);
        self.after(&stmt, result.as_ref().err());
        result
    }

    async fn query_one(&self, stmt: Statement) -> std::result::Result<Option<QueryResult>, DbErr> {
        let result = self.conn.query_one(stmt.clone()).await;
        self.after(&stmt, result.as_ref().err());
        result
    }

    async fn query_all(&self, stmt: Statement) -> std::result::Result<Vec<QueryResult>, DbErr> {
        let result = self.conn.query_all(stmt.clone()).await;
        self.after(&stmt, result.as_ref().err());
        result
    }

    fn support_returning(&self) -> bool {
        self.conn.support_returning()
    }

    fn is_mock_connection(&self) -> bool {
        self.conn.is_mock_connection()
    }
}
