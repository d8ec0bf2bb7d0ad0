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

//! 结构化日志初始化
//!
//! 进程内只能初始化一次：日志核心安装为 tracing 的全局 dispatcher，
//! 重复调用 [`init_logger`] 返回 [`CoreError::AlreadyInitialized`]，
//! 第一次的配置保持生效。日志通过 `tracing` 的宏以及本 crate 的
//! [`fatal!`](crate::fatal) / [`log_panic!`](crate::log_panic) 输出。

mod level;
mod sink;

pub use level::parse_level;
pub use sink::{FileSink, LocalMicros, SinkKind, DEFAULT_MAX_SIZE_MB, TIMESTAMP_FORMAT};

use parking_lot::Mutex;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{warn, Level};
use tracing_appender::non_blocking::WorkerGuard;

use crate::types::{CoreError, Result};

pub const DEFAULT_LOG_PATH: &str = "./log";
pub const DEFAULT_SERVER_NAME: &str = "log";

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static WORKER: Mutex<Option<WorkerGuard>> = parking_lot::const_mutex(None);

/// 日志输出模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    #[default]
    Console,
    File,
}

impl LogMode {
    /// 只有 `file` 会选择文件输出，其它值（包括空串）都输出到控制台
    pub fn parse(mode: &str) -> Self {
        if mode.trim().eq_ignore_ascii_case("file") {
            LogMode::File
        } else {
            LogMode::Console
        }
    }
}

/// 日志配置，零值表示不限制
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggerOptions {
    pub mode: LogMode,
    pub log_path: String,
    pub level: String,
    pub server_name: String,
    /// 单个文件大小上限（MB），0 取 [`DEFAULT_MAX_SIZE_MB`]
    pub max_size: u32,
    /// 最长保存天数
    pub max_day: u32,
    /// 最多保留的文件数
    pub max_backups: u32,
    /// 是否 gzip 压缩
    pub compress: bool,
}

impl LoggerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: &str) -> Self {
        self.mode = LogMode::parse(mode);
        self
    }

    pub fn with_log_path(mut self, path: impl Into<String>) -> Self {
        self.log_path = path.into();
        self
    }

    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_lowercase();
        self
    }

    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn with_max_size(mut self, size_mb: u32) -> Self {
        self.max_size = size_mb;
        self
    }

    pub fn with_max_day(mut self, days: u32) -> Self {
        self.max_day = days;
        self
    }

    pub fn with_max_backups(mut self, count: u32) -> Self {
        self.max_backups = count;
        self
    }

    pub fn with_compress(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// 文件模式下为空的路径和服务名填充默认值
    pub fn resolve(mut self) -> Self {
        if self.log_path.is_empty() {
            self.log_path = DEFAULT_LOG_PATH.to_string();
        }
        if self.server_name.is_empty() {
            self.server_name = DEFAULT_SERVER_NAME.to_string();
        }
        self
    }

    /// 日志文件路径 `<log_path>/<server_name>.log`
    pub fn log_file(&self) -> PathBuf {
        PathBuf::from(&self.log_path).join(format!("{}.log", self.server_name))
    }
}

/// 初始化结果
#[derive(Debug, Clone)]
pub struct LoggerHandle {
    sink: SinkKind,
    level: Level,
    fallback_reason: Option<String>,
}

impl LoggerHandle {
    pub fn sink(&self) -> &SinkKind {
        &self.sink
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// 文件输出打开失败、回落到控制台时的原因
    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

/// 构建并安装全局日志核心
pub fn init_logger(options: LoggerOptions) -> Result<LoggerHandle> {
    if INITIALIZED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return Err(CoreError::AlreadyInitialized("logger"));
    }

    let level = parse_level(&options.level);

    let (writer, sink, fallback_reason): (Box<dyn Write + Send>, SinkKind, Option<String>) =
        match options.mode {
            LogMode::File => {
                let options = options.clone().resolve();
                match sink::open_file_sink(&options) {
                    Ok((file, path)) => (Box::new(file), SinkKind::File(path), None),
                    Err(e) => (Box::new(std::io::stdout()), SinkKind::Console, Some(e.to_string())),
                }
            }
            LogMode::Console => (Box::new(std::io::stdout()), SinkKind::Console, None),
        };

    let (non_blocking, worker) = tracing_appender::non_blocking(writer);

    let subscriber = tracing_subscriber::fmt()
        .with_timer(LocalMicros)
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(non_blocking)
        .json()
        .flatten_event(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return Err(CoreError::AlreadyInitialized("logger"));
    }

    *WORKER.lock() = Some(worker);

    if let Some(reason) = &fallback_reason {
        warn!(reason = %reason, "File sink unavailable, logging to console");
    }

    Ok(LoggerHandle {
        sink,
        level,
        fallback_reason,
    })
}

/// 刷新并停止后台写线程，之后的日志将被丢弃
pub fn shutdown_logger() {
    drop(WORKER.lock().take());
}

/// 刷新日志后退出进程
pub fn exit_process(code: i32) -> ! {
    shutdown_logger();
    std::process::exit(code)
}

/// 记录一条 ERROR 日志后以状态码 1 退出进程
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {{
        $crate::tracing::error!("{}", ::std::format!($($arg)+));
        $crate::logger::exit_process(1)
    }};
}

/// 记录一条 ERROR 日志后以同样的消息 panic
#[macro_export]
macro_rules! log_panic {
    ($($arg:tt)+) => {{
        let message = ::std::format!($($arg)+);
        $crate::tracing::error!("{}", message);
        ::std::panic!("{}", message)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mode_parse() {
        assert_eq!(LogMode::parse("file"), LogMode::File);
        assert_eq!(LogMode::parse("FILE"), LogMode::File);
        assert_eq!(LogMode::parse("console"), LogMode::Console);
        assert_eq!(LogMode::parse(""), LogMode::Console);
        assert_eq!(LogMode::parse("syslog"), LogMode::Console);
    }

    #[test]
    fn test_options_resolve_file_defaults() {
        let opts = LoggerOptions::new().with_mode("file").resolve();
        assert_eq!(opts.log_path, DEFAULT_LOG_PATH);
        assert_eq!(opts.server_name, DEFAULT_SERVER_NAME);
        assert_eq!(opts.log_file(), PathBuf::from("./log/log.log"));
    }

    #[test]
    fn test_options_last_setter_wins() {
        let opts = LoggerOptions::new()
            .with_level("Debug")
            .with_server_name("api")
            .with_level("WARN");
        assert_eq!(opts.level, "warn");
        assert_eq!(opts.server_name, "api");
        assert_eq!(opts.max_size, 0);
        assert!(!opts.compress);
    }

    #[test]
    fn test_open_file_sink_creates_file() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("nested");
        let opts = LoggerOptions::new()
            .with_mode("file")
            .with_log_path(log_path.to_string_lossy())
            .with_server_name("orders")
            .resolve();

        let (_file, path) = sink::open_file_sink(&opts).unwrap();
        assert_eq!(path, log_path.join("orders.log"));
        assert!(path.exists());
    }

    #[test]
    fn test_file_sink_rotates_by_size_and_compresses() {
        let dir = TempDir::new().unwrap();
        let opts = LoggerOptions::new()
            .with_mode("file")
            .with_log_path(dir.path().to_string_lossy())
            .with_server_name("orders")
            .with_max_size(1)
            .with_max_backups(3)
            .with_compress(true)
            .resolve();

        let (mut file, path) = sink::open_file_sink(&opts).unwrap();
        let line = [b'x'; 64 * 1024];
        for _ in 0..20 {
            file.write_all(&line).unwrap();
            file.write_all(b"\n").unwrap();
        }
        file.flush().unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() < 1024 * 1024);

        let archives: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("orders.log."))
            .collect();
        assert_eq!(archives.len(), 1);
        assert!(archives[0].ends_with(".gz"));
    }

    #[test]
    fn test_open_file_sink_fails_on_unwritable_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let opts = LoggerOptions::new()
            .with_mode("file")
            .with_log_path(blocker.join("logs").to_string_lossy())
            .resolve();

        assert!(sink::open_file_sink(&opts).is_err());
    }

    #[test]
    fn test_timestamp_format_has_microseconds() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_micro_opt(7, 5, 3, 42)
            .unwrap();
        assert_eq!(
            ts.format(TIMESTAMP_FORMAT).to_string(),
            "2024-03-09 07:05:03.000042"
        );
    }
}
