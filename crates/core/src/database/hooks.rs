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

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use crate::types::{CoreError, Result};

/// 语句所属的操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Query,
    Update,
    Delete,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Create,
        OperationKind::Query,
        OperationKind::Update,
        OperationKind::Delete,
    ];

    /// 根据 SQL 的首个关键字判断操作类型，无法识别的语句返回 `None`
    pub fn classify(sql: &str) -> Option<Self> {
        let keyword = sql
            .trim_start_matches(|c: char| c.is_whitespace() || c == '(')
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()?
            .to_ascii_uppercase();

        match keyword.as_str() {
            "INSERT" | "REPLACE" => Some(OperationKind::Create),
            "SELECT" | "SHOW" | "WITH" => Some(OperationKind::Query),
            "UPDATE" => Some(OperationKind::Update),
            "DELETE" => Some(OperationKind::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Create => write!(f, "create"),
            OperationKind::Query => write!(f, "query"),
            OperationKind::Update => write!(f, "update"),
            OperationKind::Delete => write!(f, "delete"),
        }
    }
}

/// 一条已执行语句的快照，参数已内联到 SQL 中
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementEvent {
    pub kind: OperationKind,
    pub sql: String,
    pub error: Option<String>,
}

/// 语句执行完成后的回调
pub trait StatementHook: Send + Sync {
    fn after(&self, event: &StatementEvent);
}

/// 默认回调：把执行过的语句写入日志
#[derive(Debug, Clone)]
pub struct SqlLogHook {
    log_name: String,
}

impl SqlLogHook {
    pub fn new(log_name: impl Into<String>) -> Self {
        Self {
            log_name: log_name.into(),
        }
    }
}

impl StatementHook for SqlLogHook {
    fn after(&self, event: &StatementEvent) {
        match &event.error {
            Some(err) => error!(log_name = %self.log_name, error = %err, "{}", event.sql),
            None => info!(log_name = %self.log_name, "[ SQL: {} ]", event.sql),
        }
    }
}

struct RegisteredHook {
    kind: OperationKind,
    name: String,
    hook: Arc<dyn StatementHook>,
}

/// 按操作类型登记的回调表
#[derive(Default)]
pub struct HookRegistry {
    hooks: RwLock<Vec<RegisteredHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记回调；同一操作类型下名称重复时返回错误，已登记的回调保持不变
    pub fn register(
        &self,
        kind: OperationKind,
        name: impl Into<String>,
        hook: Arc<dyn StatementHook>,
    ) -> Result<()> {
        let name = name.into();
        let mut hooks = self.hooks.write();

        if hooks.iter().any(|h| h.kind == kind && h.name == name) {
            return Err(CoreError::InternalError(format!(
                "hook '{}' already registered for {}",
                name, kind
            )));
        }

        hooks.push(RegisteredHook { kind, name, hook });
        Ok(())
    }

    pub fn is_registered(&self, kind: OperationKind, name: &str) -> bool {
        self.hooks
            .read()
            .iter()
            .any(|h| h.kind == kind && h.name == name)
    }

    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.read().is_empty()
    }

    pub fn fire(&self, event: &StatementEvent) {
        // 先复制出回调，避免在回调里持有锁
        let matching: Vec<Arc<dyn StatementHook>> = self
            .hooks
            .read()
            .iter()
            .filter(|h| h.kind == event.kind)
            .map(|h| h.hook.clone())
            .collect();

        for hook in matching {
            hook.after(event);
        }
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks = self.hooks.read();
        f.debug_list()
            .entries(hooks.iter().map(|h| format!("{}:{}", h.kind, h.name)))
            .finish()
    }
}
