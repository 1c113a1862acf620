//! Configuration for the tether agent service.
//!
//! A single TOML file with `[server]`, `[pool]`, `[agent]`, `[backend]` and
//! `[models]` sections. Every field has a default, so an empty or missing
//! file yields a working local setup. `TETHER_*` environment variables
//! override individual fields after the file is read.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    EnvLookup, apply_env_overrides, load_config, load_config_file, load_config_with_env,
    xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
