pub mod cache;
pub mod config;
pub mod database;
pub mod logger;
pub mod types;

pub use cache::*;
pub use config::*;
pub use database::*;
pub use logger::{init_logger, shutdown_logger, LogMode, LoggerHandle, LoggerOptions, SinkKind};
pub use types::*;

// 供 `fatal!` / `log_panic!` 宏使用，调用方也可以直接用它的 debug!/info!/warn!/error!
pub use tracing;
pub use tracing::{debug, error, info, warn};
