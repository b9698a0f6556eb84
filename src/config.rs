/*
 *  config.rs
 *
 *  pixedit - plugin driven image editing
 *  (c) 2026 pixedit contributors
 *
 *  YAML configuration layered with command line overrides
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::registry::DuplicatePolicy;

/// Environment override for the plugins directory
pub const PLUGIN_PATH_ENV: &str = "PIXEDIT_PLUGIN_PATH";

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub plugins: Option<PluginsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PluginsConfig {
    pub dir: Option<PathBuf>,
    pub on_duplicate: Option<DuplicatePolicy>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "pixedit", about = "Plugin driven image editor", version)]
pub struct Cli {
    /// Image to open at startup
    #[arg(value_hint = ValueHint::FilePath)]
    pub image: Option<PathBuf>,
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Shorthand for --log-level debug
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// Directory scanned for editing modules
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub plugins_dir: Option<PathBuf>,
    /// Duplicate module names: shadow | reject
    #[arg(long, value_parser = ["shadow", "reject"])]
    pub on_duplicate: Option<String>,
    /// Read commands from a file instead of stdin
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub script: Option<PathBuf>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Read YAML, merge CLI overrides, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

impl Config {
    /// Effective log filter
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.plugins
            .as_ref()
            .and_then(|p| p.on_duplicate)
            .unwrap_or_default()
    }

    /// Plugins directory: config/CLI, then `$PIXEDIT_PLUGIN_PATH`, then
    /// `plugins/` next to the executable.
    pub fn plugins_dir(&self) -> PathBuf {
        if let Some(dir) = self.plugins.as_ref().and_then(|p| p.dir.clone()) {
            return dir;
        }
        if let Ok(path) = env::var(PLUGIN_PATH_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join("plugins")))
            .unwrap_or_else(|| PathBuf::from("plugins"))
    }
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/pixedit/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/pixedit/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/pixedit.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["pixedit.yaml", "config/pixedit.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    match (&mut dst.plugins, src.plugins) {
        (None, Some(p)) => dst.plugins = Some(p),
        (Some(d), Some(s)) => merge_plugins(d, s),
        _ => {}
    }
}

fn merge_plugins(dst: &mut PluginsConfig, src: PluginsConfig) {
    if src.dir.is_some()            { dst.dir = src.dir; }
    if src.on_duplicate.is_some()   { dst.on_duplicate = src.on_duplicate; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    if cli.debug                     { cfg.log_level = Some("debug".to_string()); }

    let any_plugins = cli.plugins_dir.is_some() || cli.on_duplicate.is_some();
    if any_plugins && cfg.plugins.is_none() {
        cfg.plugins = Some(PluginsConfig::default());
    }
    if let Some(plugins) = cfg.plugins.as_mut() {
        if cli.plugins_dir.is_some()  { plugins.dir = cli.plugins_dir.clone(); }
        match cli.on_duplicate.as_deref() {
            Some("reject") => plugins.on_duplicate = Some(DuplicatePolicy::Reject),
            Some("shadow") => plugins.on_duplicate = Some(DuplicatePolicy::Shadow),
            _ => {}
        }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(level) = cfg.log_level.as_deref() {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "log_level must be one of {}",
                LOG_LEVELS.join("|")
            )));
        }
    }
    if let Some(dir) = cfg.plugins.as_ref().and_then(|p| p.dir.as_ref()) {
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("plugins dir must not be empty".into()));
        }
    }
    Ok(())
}
