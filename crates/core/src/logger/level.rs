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

use tracing::Level;

/// 日志级别名称与 tracing 级别的对照表。
/// tracing 没有 dpanic/panic/fatal，这三个都落到 ERROR。
const LEVEL_TABLE: [(&str, Level); 8] = [
    ("trace", Level::TRACE),
    ("debug", Level::DEBUG),
    ("info", Level::INFO),
    ("warn", Level::WARN),
    ("error", Level::ERROR),
    ("dpanic", Level::ERROR),
    ("panic", Level::ERROR),
    ("fatal", Level::ERROR),
];

/// 解析级别名称（忽略大小写），无法识别时回落到 INFO
pub fn parse_level(name: &str) -> Level {
    let name = name.trim().to_lowercase();
    LEVEL_TABLE
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, level)| *level)
        .unwrap_or(Level::INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_levels() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("fatal"), Level::ERROR);
        assert_eq!(parse_level("dpanic"), Level::ERROR);
    }

    #[test]
    fn test_level_names_are_case_insensitive() {
        assert_eq!(parse_level("Debug"), Level::DEBUG);
        assert_eq!(parse_level("ERROR"), Level::ERROR);
        assert_eq!(parse_level(" Warn "), Level::WARN);
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        assert_eq!(parse_level("verbose"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }
}
