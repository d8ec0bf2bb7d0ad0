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

use file_rotate::compression::Compression;
use file_rotate::suffix::{AppendTimestamp, FileLimit};
use file_rotate::{ContentLimit, FileRotate};
use std::fmt;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

use super::LoggerOptions;
use crate::types::Result;

/// 时间戳格式，精确到微秒
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// 未设置 `max_size` 时单个文件的大小上限（MB）
pub const DEFAULT_MAX_SIZE_MB: u32 = 100;

/// 写入 `<server_name>.log` 的滚动文件，归档文件名追加时间戳
pub type FileSink = FileRotate<AppendTimestamp>;

/// 当前生效的输出目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkKind {
    Console,
    File(PathBuf),
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Console => write!(f, "console"),
            SinkKind::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

/// 本地时间，微秒精度
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMicros;

impl FormatTime for LocalMicros {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format(TIMESTAMP_FORMAT))
    }
}

/// 打开日志文件 `<log_path>/<server_name>.log`。
///
/// 当前文件名始终不变，超过 `max_size` 后改名归档为 `<server_name>.log.<时间戳>`。
/// 归档保留数量优先取 `max_backups`，否则按 `max_day` 清理过期归档；
/// `compress` 打开时归档文件以 gzip 压缩。
pub fn open_file_sink(options: &LoggerOptions) -> Result<(FileSink, PathBuf)> {
    let path = options.log_file();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    // 目录或文件不可写时在这里返回错误
    OpenOptions::new().create(true).append(true).open(&path)?;

    let max_size = if options.max_size > 0 {
        options.max_size
    } else {
        DEFAULT_MAX_SIZE_MB
    };

    let file_limit = if options.max_backups > 0 {
        FileLimit::MaxFiles(options.max_backups as usize)
    } else if options.max_day > 0 {
        FileLimit::Age(chrono::Duration::days(i64::from(options.max_day)))
    } else {
        FileLimit::Unlimited
    };

    let compression = if options.compress {
        Compression::OnRotate(0)
    } else {
        Compression::None
    };

    let sink = FileRotate::new(
        &path,
        AppendTimestamp::default(file_limit),
        ContentLimit::BytesSurpassed(max_size as usize * 1024 * 1024),
        compression,
        #[cfg(unix)]
        None,
    );

    Ok((sink, path))
}
