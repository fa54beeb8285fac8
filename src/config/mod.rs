//! Configuration for threads-mcp.
//!
//! ## config.kdl - User preferences
//!
//! Located at `~/.config/threads-mcp/config.kdl` by default (see
//! [`resolver`] for the override chain).
//!
//! Contains:
//! - `data-dir` - Directory holding `threads.json` and its backup
//! - `log-level` - Default tracing level when `RUST_LOG` is unset
//!
//! ## Precedence
//!
//! CLI flag > environment variable > config.kdl > defaults. Every resolved
//! value remembers its [`ValueSource`] so `config show` can explain it.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_PATH_ENV, ConfigOverrides, DATA_DIR_ENV, LOG_ENV, Resolved, ResolvedConfig,
    ValueSource, resolve_config, resolve_config_with_env,
};
pub use schema::ThreadsConfig;
