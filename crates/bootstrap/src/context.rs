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

use corex_core::cache::CacheClient;
use corex_core::config::Config;
use corex_core::database::Database;
use corex_core::types::Result;
use std::sync::Arc;
use tracing::info;

/// 启动后由调用方持有的客户端集合，通过参数传给需要它们的组件
#[derive(Debug)]
pub struct AppContext {
    pub database: Database,
    pub cache: Arc<CacheClient>,
}

impl AppContext {
    /// 连接数据库并创建缓存客户端。缓存客户端不会在这里拨号。
    pub async fn connect(config: &Config) -> Result<Self> {
        info!("Connecting to database...");
        let database =
            Database::connect(&config.database.data_source(), config.database.options()).await?;

        let cache = CacheClient::new(
            &config.redis.addr,
            &config.redis.password,
            config.redis.db,
            config.redis.options(),
        )?;
        info!("Redis client created for {}", cache.addr());

        Ok(Self {
            database,
            cache: Arc::new(cache),
        })
    }

    pub async fn health_check(&self) -> Result<()> {
        self.database.ping().await?;
        self.cache.ping().await?;
        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        self.database.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corex_core::types::CoreError;

    #[tokio::test]
    async fn test_connect_with_unsupported_engine_fails() {
        let mut config = Config::default();
        config.database.engine = "sqlserver".to_string();
        config.database.database = "inventory".to_string();

        let err = AppContext::connect(&config).await.unwrap_err();
        assert!(matches!(err, CoreError::DatabaseError(ref msg) if msg.contains("Database name: inventory")));
    }
}
