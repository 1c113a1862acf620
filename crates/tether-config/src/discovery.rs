//! Config file discovery and environment overrides.
//!
//! The first file found wins:
//! 1. An explicit path (must exist)
//! 2. `./tether.toml`
//! 3. `~/.config/tether/config.toml` (platform config dir)
//!
//! With no file, defaults apply. `TETHER_*` variables are layered on top.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{ConfigError, Result, TetherConfig};

/// Project-local config filename.
const PROJECT_CONFIG_FILE: &str = "tether.toml";

/// Config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for config directory resolution.
const APP_NAME: &str = "tether";

/// Environment variable lookup, injectable for tests.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Per-user config directory for tether, if the platform has one.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Path of the per-user config file.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Load config from a specific file path.
pub fn load_config_file(path: &Path) -> Result<TetherConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    TetherConfig::from_toml(&contents)
}

/// Discover and load the configuration, applying process environment overrides.
///
/// Returns the config and the file it was read from, if any.
pub fn load_config(explicit: Option<&Path>) -> Result<(TetherConfig, Option<PathBuf>)> {
    load_config_with_env(explicit, &|name| std::env::var(name).ok())
}

/// Discover and load the configuration with a custom environment lookup.
pub fn load_config_with_env(
    explicit: Option<&Path>,
    env: EnvLookup<'_>,
) -> Result<(TetherConfig, Option<PathBuf>)> {
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover(),
    };

    let mut config = match &source {
        Some(path) => load_config_file(path)?,
        None => TetherConfig::new(),
    };
    apply_env_overrides(&mut config, env)?;
    config.validate()?;

    Ok((config, source))
}

fn discover() -> Option<PathBuf> {
    let project = PathBuf::from(PROJECT_CONFIG_FILE);
    if project.is_file() {
        return Some(project);
    }
    xdg_config_path().filter(|p| p.is_file())
}

/// Apply `TETHER_*` overrides to a loaded config.
///
/// | Variable | Field |
/// |---|---|
/// | `TETHER_BIND` | `server.bind` |
/// | `TETHER_TTL_MINUTES` | `pool.ttl_minutes` |
/// | `TETHER_MAX_AGENTS` | `pool.max_agents` |
/// | `TETHER_WINDOW_SIZE` | `agent.window_size` |
/// | `TETHER_SESSION_DIR` | `agent.session_dir` |
///
/// Empty values are ignored.
pub fn apply_env_overrides(config: &mut TetherConfig, env: EnvLookup<'_>) -> Result<()> {
    let var = |name: &str| env(name).filter(|v| !v.is_empty());

    if let Some(bind) = var("TETHER_BIND") {
        config.server.bind = bind;
    }
    if let Some(ttl) = var("TETHER_TTL_MINUTES") {
        config.pool.ttl_minutes = parse_env("TETHER_TTL_MINUTES", &ttl, "minutes")?;
    }
    if let Some(max) = var("TETHER_MAX_AGENTS") {
        config.pool.max_agents = parse_env("TETHER_MAX_AGENTS", &max, "a count")?;
    }
    if let Some(size) = var("TETHER_WINDOW_SIZE") {
        config.agent.window_size = parse_env("TETHER_WINDOW_SIZE", &size, "a count")?;
    }
    if let Some(dir) = var("TETHER_SESSION_DIR") {
        config.agent.session_dir = PathBuf::from(dir);
    }

    Ok(())
}

fn parse_env<T: FromStr>(var: &str, value: &str, expected: &'static str) -> Result<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
        expected,
    })
}
