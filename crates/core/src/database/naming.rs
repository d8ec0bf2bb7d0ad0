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

/// 表名命名策略
///
/// 默认使用单数表名：模型 `User` 对应表 `user`，而不是 `users`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingStrategy {
    pub table_prefix: String,
    pub singular_table: bool,
}

impl Default for NamingStrategy {
    fn default() -> Self {
        Self {
            table_prefix: String::new(),
            singular_table: true,
        }
    }
}

impl NamingStrategy {
    pub fn table_name(&self, model: &str) -> String {
        let mut name = to_snake_case(model);
        if !self.singular_table && !name.is_empty() {
            name.push('s');
        }
        format!("{}{}", self.table_prefix, name)
    }
}

fn to_snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && (prev_lower || (prev_upper && next_lower)) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_table_names() {
        let naming = NamingStrategy::default();
        assert_eq!(naming.table_name("User"), "user");
        assert_eq!(naming.table_name("OrderItem"), "order_item");
        assert_eq!(naming.table_name("HTTPLog"), "http_log");
    }

    #[test]
    fn test_plural_and_prefix() {
        let naming = NamingStrategy {
            table_prefix: "pre_".to_string(),
            singular_table: false,
        };
        assert_eq!(naming.table_name("User"), "pre_users");
    }
}
