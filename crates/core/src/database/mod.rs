mod connection;
mod hooks;
mod naming;

pub use connection::{
    DataSource, Database, DatabaseOptions, DEFAULT_CONN_MAX_LIFETIME, DEFAULT_LOG_NAME,
    DEFAULT_MAX_IDLE_CONN, DEFAULT_MAX_OPEN_CONN, DEFAULT_TABLE_OPTIONS, DRIVER_MYSQL,
};
pub use hooks::{HookRegistry, OperationKind, SqlLogHook, StatementEvent, StatementHook};
pub use naming::NamingStrategy;
