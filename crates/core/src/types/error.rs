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

use derive_more::Display;
use thiserror::Error;

#[derive(Debug, Error, Display, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[display("Database error: {}", _0)]
    DatabaseError(String),

    #[display("Cache error: {}", _0)]
    CacheError(String),

    #[display("Configuration error: {}", _0)]
    ConfigurationError(String),

    /// 全局组件（如日志）只能初始化一次
    #[display("{} is already initialized", _0)]
    AlreadyInitialized(&'static str),

    #[display("I/O error: {}", _0)]
    IoError(String),

    #[display("Timeout error: {}", _0)]
    TimeoutError(String),

    #[display("Internal error: {}", _0)]
    InternalError(String),
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::IoError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::AlreadyInitialized("logger");
        assert_eq!(err.to_string(), "logger is already initialized");

        let err = CoreError::CacheError("connection pool timeout".to_string());
        assert_eq!(err.to_string(), "Cache error: connection pool timeout");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::IoError(ref msg) if msg == "missing"));
    }
}
