//! CLI commands for replaying and inspecting the protective put overlay.

pub mod replay;
pub mod select;
pub mod show_config;

pub use replay::{run_replay, ReplayArgs};
pub use select::{run_select, SelectArgs};
pub use show_config::{run_show_config, ShowConfigArgs};

use anyhow::{Context, Result};
use put_overlay_core::{AppConfig, ConfigLoader};

/// Loads the layered configuration, then applies `key=value` overrides.
fn load_config(path: &str, profile: Option<&str>, params: &[String]) -> Result<AppConfig> {
    let mut config = ConfigLoader::load_from(path, profile)?;
    for param in params {
        config
            .apply_assignment(param)
            .with_context(|| format!("Invalid --param {param}"))?;
    }
    config.validate()?;
    Ok(config)
}
