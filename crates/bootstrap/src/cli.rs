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

use anyhow::Context;
use clap::Parser;
use corex_core::config::Config;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "corex", version, about = "Bring up logger, database and cache clients")]
pub struct Cli {
    /// TOML 配置文件路径
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// 只校验配置，不建立连接
    #[arg(long)]
    pub check: bool,
}

impl Cli {
    /// 配置文件存在时必须能解析；文件不存在时依次尝试环境变量和默认配置
    pub fn load_config(&self) -> anyhow::Result<Config> {
        if self.config.exists() {
            return Config::load_from_file(&self.config)
                .with_context(|| format!("failed to load {}", self.config.display()));
        }

        match Config::load_from_env() {
            Ok(config) => Ok(config),
            Err(e) => {
                eprintln!("Invalid environment configuration, using defaults: {}", e);
                Ok(Config::default())
            }
        }
    }
}
