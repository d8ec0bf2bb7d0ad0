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

use parking_lot::Mutex;
use redis::aio::MultiplexedConnection;
use redis::{
    AsyncCommands, ConnectionAddr, ConnectionInfo, FromRedisValue, RedisConnectionInfo,
    RedisError, RedisResult, ToRedisArgs,
};
use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use crate::types::{CoreError, Result};

pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);
/// 每个 CPU 对应的默认连接数
pub const POOL_SIZE_PER_CPU: usize = 10;

impl From<RedisError> for CoreError {
    fn from(e: RedisError) -> Self {
        CoreError::CacheError(e.to_string())
    }
}

/// Redis 客户端可调参数，零值表示使用客户端默认值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheOptions {
    pub dial_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub pool_size: usize,
    pub pool_timeout: Duration,
    pub idle_timeout: Duration,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dial_timeout(mut self, t: Duration) -> Self {
        self.dial_timeout = t;
        self
    }

    pub fn with_read_timeout(mut self, t: Duration) -> Self {
        self.read_timeout = t;
        self
    }

    pub fn with_write_timeout(mut self, t: Duration) -> Self {
        self.write_timeout = t;
        self
    }

    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    pub fn with_pool_timeout(mut self, t: Duration) -> Self {
        self.pool_timeout = t;
        self
    }

    pub fn with_idle_timeout(mut self, t: Duration) -> Self {
        self.idle_timeout = t;
        self
    }

    /// 把零值替换为客户端默认值
    pub fn resolve(mut self) -> Self {
        if self.dial_timeout.is_zero() {
            self.dial_timeout = DEFAULT_DIAL_TIMEOUT;
        }
        if self.read_timeout.is_zero() {
            self.read_timeout = DEFAULT_READ_TIMEOUT;
        }
        if self.write_timeout.is_zero() {
            self.write_timeout = self.read_timeout;
        }
        if self.pool_size == 0 {
            let cpus = std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1);
            self.pool_size = POOL_SIZE_PER_CPU * cpus;
        }
        if self.pool_timeout.is_zero() {
            self.pool_timeout = self.read_timeout + Duration::from_secs(1);
        }
        if self.idle_timeout.is_zero() {
            self.idle_timeout = DEFAULT_IDLE_TIMEOUT;
        }
        self
    }
}

/// 空闲连接
struct IdleConnection {
    connection: MultiplexedConnection,
    last_used: Instant,
}

impl IdleConnection {
    fn is_stale(&self, max_idle: Duration) -> bool {
        self.last_used.elapsed() > max_idle
    }
}

/// Redis 连接池
struct ConnectionPool {
    client: redis::Client,
    idle: Mutex<Vec<IdleConnection>>,
    permits: Arc<Semaphore>,
    dial_timeout: Duration,
    pool_timeout: Duration,
    idle_timeout: Duration,
}

impl ConnectionPool {
    fn new(client: redis::Client, options: &CacheOptions) -> Self {
        Self {
            client,
            idle: Mutex::new(Vec::new()),
            permits: Arc::new(Semaphore::new(options.pool_size)),
            dial_timeout: options.dial_timeout,
            pool_timeout: options.pool_timeout,
            idle_timeout: options.idle_timeout,
        }
    }

    async fn get(&self) -> Result<PooledConnection<'_>> {
        let permit = match tokio::time::timeout(
            self.pool_timeout,
            self.permits.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                return Err(CoreError::InternalError(
                    "Connection pool closed".to_string(),
                ))
            }
            Err(_) => {
                return Err(CoreError::CacheError(
                    "connection pool timeout".to_string(),
                ))
            }
        };

        // 尝试复用未过期的空闲连接
        let reused = {
            let mut idle = self.idle.lock();
            idle.retain(|c| !c.is_stale(self.idle_timeout));
            idle.pop()
        };

        let connection = match reused {
            Some(idle) => idle.connection,
            None => {
                debug!("Opening new Redis connection");
                tokio::time::timeout(
                    self.dial_timeout,
                    self.client.get_multiplexed_async_connection(),
                )
                .await
                .map_err(|_| {
                    CoreError::TimeoutError(format!(
                        "dial exceeded {:?}",
                        self.dial_timeout
                    ))
                })?
                .map_err(|e| {
                    CoreError::CacheError(format!("Failed to connect to Redis: {}", e))
                })?
            }
        };

        Ok(PooledConnection {
            connection: Some(connection),
            pool: self,
            _permit: permit,
        })
    }

    fn put_back(&self, connection: MultiplexedConnection) {
        self.idle.lock().push(IdleConnection {
            connection,
            last_used: Instant::now(),
        });
    }

    fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }
}

/// 从连接池借出的连接，释放时归还
pub struct PooledConnection<'a> {
    connection: Option<MultiplexedConnection>,
    pool: &'a ConnectionPool,
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection<'_> {
    /// 丢弃连接而不归还，用于命令出错后
    pub fn discard(mut self) {
        self.connection.take();
    }
}

impl Deref for PooledConnection<'_> {
    type Target = MultiplexedConnection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("connection is present until drop")
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("connection is present until drop")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.put_back(connection);
        }
    }
}

async fn timed<T>(
    limit: Duration,
    command: &str,
    fut: impl Future<Output = RedisResult<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(CoreError::from),
        Err(_) => Err(CoreError::TimeoutError(format!(
            "redis {} exceeded {:?}",
            command, limit
        ))),
    }
}

/// Redis 客户端
///
/// 构造时不建立连接，第一次执行命令时才会拨号，连接错误在那时返回。
pub struct CacheClient {
    pool: ConnectionPool,
    addr: String,
    db: i64,
    options: CacheOptions,
}

impl CacheClient {
    pub fn new(addr: &str, password: &str, db: i64, options: CacheOptions) -> Result<Self> {
        let options = options.resolve();
        let (host, port) = parse_addr(addr)?;

        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(host, port),
            redis: RedisConnectionInfo {
                db,
                password: (!password.is_empty()).then(|| password.to_string()),
                ..Default::default()
            },
        };
        let client = redis::Client::open(info)?;

        debug!(
            "Redis client configured for {} db={} pool_size={}",
            addr, db, options.pool_size
        );

        Ok(Self {
            pool: ConnectionPool::new(client, &options),
            addr: addr.to_string(),
            db,
            options,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn db(&self) -> i64 {
        self.db
    }

    /// 生效的参数（已填充默认值）
    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub fn idle_connections(&self) -> usize {
        self.pool.idle_count()
    }

    /// 借出一个连接，用于执行任意命令
    pub async fn connection(&self) -> Result<PooledConnection<'_>> {
        self.pool.get().await
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let result: Result<String> = timed(
            self.options.read_timeout,
            "PING",
            redis::cmd("PING").query_async(&mut *conn),
        )
        .await;

        match result {
            Ok(pong) if pong == "PONG" => Ok(()),
            Ok(other) => {
                conn.discard();
                Err(CoreError::CacheError(format!(
                    "Unexpected PING response: {}",
                    other
                )))
            }
            Err(e) => {
                conn.discard();
                warn!("Redis PING to {} failed: {}", self.addr, e);
                Err(e)
            }
        }
    }

    pub async fn get<V: FromRedisValue>(&self, key: &str) -> Result<Option<V>> {
        let mut conn = self.pool.get().await?;
        let result = timed(
            self.options.read_timeout,
            "GET",
            conn.get::<_, Option<V>>(key),
        )
        .await;
        finish(conn, result)
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        let result = timed(
            self.options.read_timeout,
            "EXISTS",
            conn.exists::<_, bool>(key),
        )
        .await;
        finish(conn, result)
    }

    pub async fn set<V: ToRedisArgs + Send + Sync>(&self, key: &str, value: V) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let result = timed(
            self.options.write_timeout,
            "SET",
            conn.set::<_, _, ()>(key, value),
        )
        .await;
        finish(conn, result)
    }

    pub async fn set_ex<V: ToRedisArgs + Send + Sync>(
        &self,
        key: &str,
        value: V,
        seconds: u64,
    ) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let result = timed(
            self.options.write_timeout,
            "SETEX",
            conn.set_ex::<_, _, ()>(key, value, seconds),
        )
        .await;
        finish(conn, result)
    }

    /// 删除键，返回实际删除的数量
    pub async fn del(&self, key: &str) -> Result<u64> {
        let mut conn = self.pool.get().await?;
        let result = timed(
            self.options.write_timeout,
            "DEL",
            conn.del::<_, u64>(key),
        )
        .await;
        finish(conn, result)
    }
}

impl std::fmt::Debug for CacheClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheClient")
            .field("addr", &self.addr)
            .field("db", &self.db)
            .field("options", &self.options)
            .finish()
    }
}

fn finish<T>(conn: PooledConnection<'_>, result: Result<T>) -> Result<T> {
    if result.is_err() {
        conn.discard();
    }
    result
}

fn parse_addr(addr: &str) -> Result<(String, u16)> {
    let (host, port) = addr.rsplit_once(':').ok_or_else(|| {
        CoreError::ConfigurationError(format!("Invalid Redis address '{}', expected host:port", addr))
    })?;

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(CoreError::ConfigurationError(format!(
            "Invalid Redis address '{}', missing host",
            addr
        )));
    }

    let port = port.parse::<u16>().map_err(|_| {
        CoreError::ConfigurationError(format!("Invalid Redis port in address '{}'", addr))
    })?;

    Ok((host.to_string(), port))
}
