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
use corex_bootstrap::{AppContext, Cli};
use corex_core::fatal;
use corex_core::logger::{init_logger, shutdown_logger};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    let logger = init_logger(config.logging.options()).context("failed to initialize logger")?;

    info!("Starting corex bootstrap");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(sink = %logger.sink(), level = %logger.level(), "Logger initialized");

    if let Err(e) = config.validate() {
        fatal!("Invalid configuration: {}", e);
    }

    if cli.check {
        info!("Configuration is valid");
        shutdown_logger();
        return Ok(());
    }

    // 数据库连接失败直接退出，不重试
    let ctx = match AppContext::connect(&config).await {
        Ok(ctx) => ctx,
        Err(e) => fatal!("{}", e),
    };

    match ctx.health_check().await {
        Ok(()) => info!("Database and cache are reachable"),
        Err(e) => warn!("Health check failed: {}", e),
    }

    ctx.close().await.context("failed to close database")?;
    info!("Shutdown complete");
    shutdown_logger();

    Ok(())
}
