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

//! 日志是进程级的全局状态，这个测试文件单独成一个进程，只放一个测试

use corex_core::logger::{
    init_logger, is_initialized, shutdown_logger, LoggerOptions, SinkKind, TIMESTAMP_FORMAT,
};
use corex_core::CoreError;
use tempfile::TempDir;

#[test]
fn test_file_logger_lifecycle() {
    let dir = TempDir::new().unwrap();
    let options = LoggerOptions::new()
        .with_mode("file")
        .with_log_path(dir.path().to_string_lossy())
        .with_server_name("orders")
        .with_level("WARN")
        .with_max_day(7)
        .with_max_size(10)
        .with_compress(true);

    let handle = init_logger(options).expect("first init should succeed");
    let log_file = dir.path().join("orders.log");

    assert!(is_initialized());
    assert_eq!(handle.sink(), &SinkKind::File(log_file.clone()));
    assert_eq!(handle.level(), tracing::Level::WARN);
    assert!(handle.fallback_reason().is_none());
    // 设置了保存天数也不改变当前文件名
    assert!(log_file.exists());

    // 第二次初始化被拒绝，第一次的配置保持生效
    let other_dir = TempDir::new().unwrap();
    let err = init_logger(
        LoggerOptions::new()
            .with_mode("file")
            .with_log_path(other_dir.path().to_string_lossy())
            .with_level("debug"),
    )
    .unwrap_err();
    assert_eq!(err, CoreError::AlreadyInitialized("logger"));
    assert!(!other_dir.path().join("log.log").exists());

    corex_core::debug!("below threshold");
    corex_core::info!("below threshold");
    corex_core::warn!(order_id = 7, "payment delayed");
    corex_core::error!("charge failed: {}", "card declined");

    shutdown_logger();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["orders.log".to_string()]);

    let content = std::fs::read_to_string(&log_file).unwrap();
    let records: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is a JSON record"))
        .collect();

    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first["level"], "WARN");
    assert_eq!(first["message"], "payment delayed");
    assert_eq!(first["order_id"], 7);
    assert!(first["filename"]
        .as_str()
        .is_some_and(|f| f.ends_with("logger_file_sink.rs")));
    assert!(first["line_number"].is_u64());

    let timestamp = first["timestamp"].as_str().unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok());
    assert_eq!(timestamp.len(), "2006-01-02 15:04:05.000000".len());

    assert_eq!(records[1]["level"], "ERROR");
    assert_eq!(records[1]["message"], "charge failed: card declined");
}
