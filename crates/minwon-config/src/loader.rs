// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/minwon/minwon.toml` < `~/.config/minwon/minwon.toml`
//! < `./minwon.toml`, with `MINWON_` environment variable overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MinwonConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/minwon/minwon.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "minwon.toml";

/// Sections that `MINWON_<SECTION>_<KEY>` variables may address.
pub(crate) const ENV_SECTIONS: &[&str] = &["agent", "anthropic", "storage", "server", "relay", "kakao"];

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("minwon").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/minwon/minwon.toml`
/// 3. `~/.config/minwon/minwon.toml`
/// 4. `./minwon.toml`
/// 5. `MINWON_*` environment variables
pub fn load_config() -> Result<MinwonConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MinwonConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MinwonConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MinwonConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MinwonConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MinwonConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `MINWON_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that keys containing
/// underscores survive: `MINWON_RELAY_PAUSED_DELAY_SECS` must become
/// `relay.paused_delay_secs`.
fn env_provider() -> Env {
    Env::prefixed("MINWON_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
