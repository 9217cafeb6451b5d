mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `[watchmode] api_key`.
pub const API_KEY_ENV: &str = "WATCHMODE_API_KEY";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    resolve_database_path(&mut config, path.parent());
    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Expand `~` and anchor a relative database path at `base`.
fn resolve_database_path(config: &mut Config, base: Option<&Path>) {
    let raw = config.database.path.to_string_lossy().into_owned();
    let expanded = PathBuf::from(shellexpand::tilde(&raw).as_ref());

    config.database.path = match base {
        Some(base) if expanded.is_relative() && !base.as_os_str().is_empty() => {
            base.join(expanded)
        }
        _ => expanded,
    };
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./wishlist.toml",
        "~/.config/wishlist/config.toml",
        "/etc/wishlist/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.watchmode.api_key = key.trim().to_string();
        }
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.watchmode.requests_per_second == 0 {
        anyhow::bail!("watchmode.requests_per_second must be at least 1");
    }

    if config.graphql.similar_titles_concurrency == 0 {
        anyhow::bail!("graphql.similar_titles_concurrency must be at least 1");
    }

    if config.graphql.request_timeout_secs == 0 {
        anyhow::bail!("graphql.request_timeout_secs must be at least 1");
    }

    if config.graphql.max_depth == 0 || config.graphql.max_complexity == 0 {
        anyhow::bail!("graphql.max_depth and graphql.max_complexity must be at least 1");
    }

    if config.watchmode.api_key.is_empty() {
        tracing::warn!(
            "No WatchMode API key configured; title queries will fail (set {})",
            API_KEY_ENV
        );
    }

    Ok(())
}
