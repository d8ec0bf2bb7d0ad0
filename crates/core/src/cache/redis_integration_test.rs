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

//! 需要本地 Redis（127.0.0.1:6379，无密码）的集成测试，默认忽略

use crate::cache::{CacheClient, CacheOptions};
use crate::types::CoreError;
use std::time::Duration;

const REDIS_ADDR: &str = "127.0.0.1:6379";

fn test_client(options: CacheOptions) -> CacheClient {
    CacheClient::new(REDIS_ADDR, "", 0, options).expect("Failed to create test client")
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_ping() {
    let client = test_client(CacheOptions::new());
    client.ping().await.expect("PING should succeed");
    assert_eq!(client.idle_connections(), 1);
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_set_get_del() {
    let client = test_client(CacheOptions::new());
    let key = "corex:test:set_get_del";

    client.set(key, "value").await.unwrap();
    let value: Option<String> = client.get(key).await.unwrap();
    assert_eq!(value.as_deref(), Some("value"));
    assert!(client.exists(key).await.unwrap());

    assert_eq!(client.del(key).await.unwrap(), 1);
    let value: Option<String> = client.get(key).await.unwrap();
    assert!(value.is_none());
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_set_ex() {
    let client = test_client(CacheOptions::new());
    let key = "corex:test:set_ex";

    client.set_ex(key, 42i64, 60).await.unwrap();
    let value: Option<i64> = client.get(key).await.unwrap();
    assert_eq!(value, Some(42));

    let _ = client.del(key).await;
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_pool_timeout() {
    let client = test_client(
        CacheOptions::new()
            .with_pool_size(1)
            .with_pool_timeout(Duration::from_millis(100)),
    );

    let held = client.connection().await.unwrap();
    let err = client.ping().await.unwrap_err();
    assert!(matches!(err, CoreError::CacheError(ref msg) if msg.contains("pool timeout")));

    drop(held);
    client.ping().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_connection_reused() {
    let client = test_client(CacheOptions::new().with_pool_size(2));

    client.ping().await.unwrap();
    client.ping().await.unwrap();
    assert_eq!(client.idle_connections(), 1);
}
