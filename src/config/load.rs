//! The main config loading module for lfr.
//!
//! Handles loading and deserializing settings from `lfr.toml`.
//!
//! Provides the main [Config] struct, as well as the internal [RawConfig] used for parsing.
//! A missing or broken file is never fatal: lfr logs a warning and runs on the internal
//! defaults.

use crate::config::input::{Bindings, Keys};
use crate::config::options::Options;
use crate::utils::get_home;

use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

/// Raw configuration as read from the toml file.
///
/// Deserialized directly from the file and then converted into the main [Config] struct.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub(crate) struct RawConfig {
    options: Options,
    keys: Bindings,
    cmd_keys: Bindings,
}

/// Main configuration struct for lfr.
#[derive(Debug, Default, Clone)]
pub struct Config {
    options: Options,
    keys: Keys,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            options: raw.options,
            keys: Keys::new(raw.keys, raw.cmd_keys),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the file does not exist or fails to parse, returns the default configuration.
    pub fn load() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            log::info!("no config file at {}, using defaults", path.display());
            return Self::default();
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific file, falling back to defaults on error.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                log::warn!("error parsing config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("reading config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse configuration text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawConfig>(content).map(Config::from)
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Consumes the config, handing out the options for the application state.
    pub fn into_parts(self) -> (Options, Keys) {
        (self.options, self.keys)
    }

    /// Determine the default configuration file path.
    /// Checks the LFR_CONFIG environment variable first,
    /// Checks for XDG_CONFIG_HOME after,
    /// then defaults to ~/.config/lfr/lfr.toml,
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("LFR_CONFIG") {
            return PathBuf::from(path);
        }

        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("lfr/lfr.toml");
        }

        if let Some(home) = get_home() {
            return home.join(".config/lfr/lfr.toml");
        }
        PathBuf::from("lfr.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::SortMethod;
    use tempfile::tempdir;

    #[test]
    fn parses_all_tables() -> Result<(), Box<dyn std::error::Error>> {
        let cfg = Config::parse(
            r#"
            [options]
            hidden = true
            sortby = "ext"
            scrolloff = 3

            [keys]
            x = "delete"

            [cmd_keys]
            "<c-g>" = "cmd-escape"
            "#,
        )?;
        assert!(cfg.options().hidden);
        assert_eq!(cfg.options().sortby, SortMethod::Ext);
        assert_eq!(cfg.options().scrolloff, 3);
        assert_eq!(cfg.keys().normal().get("x").map(String::as_str), Some("delete"));
        assert_eq!(
            cfg.keys().command().get("<c-g>").map(String::as_str),
            Some("cmd-escape")
        );
        Ok(())
    }

    #[test]
    fn broken_file_falls_back_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("lfr.toml");
        fs::write(&path, "[options\nhidden = ")?;

        let cfg = Config::load_from(&path);
        assert!(!cfg.options().hidden);
        assert!(cfg.keys().normal().is_empty());

        let missing = Config::load_from(&dir.path().join("nope.toml"));
        assert!(missing.options().dirfirst);
        Ok(())
    }

    #[test]
    fn unknown_sort_method_is_a_parse_error() {
        assert!(Config::parse("[options]\nsortby = \"random\"").is_err());
    }
}
