//! Key binding configuration for lfr.
//!
//! Defines the default normal-mode and command-mode key tables (in lf key notation, bound to
//! command text) and the [Keys] table read from the `[keys]` and `[cmd_keys]` sections of
//! `lfr.toml`. A user entry replaces the default for the same key; an empty command text
//! removes the binding.

use serde::Deserialize;

use std::collections::BTreeMap;

/// Default normal-mode bindings.
#[rustfmt::skip]
pub const DEFAULT_KEYS: &[(&str, &str)] = &[
    ("k", "up"),
    ("<up>", "up"),
    ("<c-u>", "half-up"),
    ("<c-b>", "page-up"),
    ("<pgup>", "page-up"),
    ("<c-y>", "scroll-up"),
    ("j", "down"),
    ("<down>", "down"),
    ("<c-d>", "half-down"),
    ("<c-f>", "page-down"),
    ("<pgdn>", "page-down"),
    ("<c-e>", "scroll-down"),
    ("h", "updir"),
    ("<left>", "updir"),
    ("l", "open"),
    ("<right>", "open"),
    ("q", "quit"),
    ("gg", "top"),
    ("<home>", "top"),
    ("G", "bottom"),
    ("<end>", "bottom"),
    ("H", "high"),
    ("M", "middle"),
    ("L", "low"),
    ("[", "jump-prev"),
    ("]", "jump-next"),
    ("<space>", ":toggle; down"),
    ("v", "invert"),
    ("u", "unselect"),
    ("y", "copy"),
    ("d", "cut"),
    ("c", "clear"),
    ("p", "paste"),
    ("<delete>", "delete"),
    ("r", "rename"),
    ("<c-l>", "redraw"),
    ("<c-r>", "reload"),
    (":", "read"),
    ("$", "shell"),
    ("%", "shell-pipe"),
    ("!", "shell-wait"),
    ("&", "shell-async"),
    ("f", "find"),
    ("F", "find-back"),
    (";", "find-next"),
    (",", "find-prev"),
    ("/", "search"),
    ("?", "search-back"),
    ("n", "search-next"),
    ("N", "search-prev"),
    ("m", "mark-save"),
    ("'", "mark-load"),
    ("\"", "mark-remove"),
    ("t", "tag-toggle"),
    ("zh", "set hidden!"),
    ("zr", "set reverse!"),
    ("zn", "set info"),
    ("zs", "set info size"),
    ("zt", "set info time"),
    ("za", "set info size:time"),
    ("sn", ":set sortby natural; set info"),
    ("ss", ":set sortby size; set info size"),
    ("st", ":set sortby time; set info time"),
    ("sa", ":set sortby atime; set info atime"),
    ("sc", ":set sortby ctime; set info ctime"),
    ("se", ":set sortby ext; set info"),
    ("gh", "cd ~"),
];

/// Default command-mode bindings.
#[rustfmt::skip]
pub const DEFAULT_CMD_KEYS: &[(&str, &str)] = &[
    ("<esc>", "cmd-escape"),
    ("<tab>", "cmd-complete"),
    ("<c-n>", "cmd-menu-complete"),
    ("<c-p>", "cmd-menu-complete-back"),
    ("<enter>", "cmd-enter"),
    ("<c-j>", "cmd-enter"),
    ("<c-c>", "cmd-interrupt"),
    ("<down>", "cmd-history-next"),
    ("<up>", "cmd-history-prev"),
    ("<left>", "cmd-left"),
    ("<c-b>", "cmd-left"),
    ("<right>", "cmd-right"),
    ("<c-f>", "cmd-right"),
    ("<home>", "cmd-home"),
    ("<c-a>", "cmd-home"),
    ("<end>", "cmd-end"),
    ("<c-e>", "cmd-end"),
    ("<delete>", "cmd-delete"),
    ("<c-d>", "cmd-delete"),
    ("<backspace>", "cmd-delete-back"),
    ("<c-h>", "cmd-delete-back"),
    ("<c-u>", "cmd-delete-home"),
    ("<c-k>", "cmd-delete-end"),
    ("<c-w>", "cmd-delete-unix-word"),
    ("<c-y>", "cmd-yank"),
    ("<c-t>", "cmd-transpose"),
    ("<a-t>", "cmd-transpose-word"),
    ("<a-f>", "cmd-word"),
    ("<a-b>", "cmd-word-back"),
    ("<a-d>", "cmd-delete-word"),
    ("<a-c>", "cmd-capitalize-word"),
    ("<a-u>", "cmd-uppercase-word"),
    ("<a-l>", "cmd-lowercase-word"),
];

/// Key to command text, as written in the config file.
pub type Bindings = BTreeMap<String, String>;

/// Key binding tables from `lfr.toml`.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct Keys {
    keys: Bindings,
    cmd_keys: Bindings,
}

impl Keys {
    pub fn new(keys: Bindings, cmd_keys: Bindings) -> Self {
        Keys { keys, cmd_keys }
    }

    #[inline]
    pub fn normal(&self) -> &Bindings {
        &self.keys
    }

    #[inline]
    pub fn command(&self) -> &Bindings {
        &self.cmd_keys
    }

    /// Defaults merged with the user's normal-mode table.
    pub fn merged_normal(&self) -> Vec<(String, String)> {
        merge(DEFAULT_KEYS, &self.keys)
    }

    /// Defaults merged with the user's command-mode table.
    pub fn merged_command(&self) -> Vec<(String, String)> {
        merge(DEFAULT_CMD_KEYS, &self.cmd_keys)
    }
}

fn merge(defaults: &[(&str, &str)], user: &Bindings) -> Vec<(String, String)> {
    let mut table: BTreeMap<String, String> = defaults
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    for (key, text) in user {
        if text.trim().is_empty() {
            table.remove(key);
        } else {
            table.insert(key.clone(), text.clone());
        }
    }
    table.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::words::CMD_WORDS;

    #[test]
    fn defaults_name_catalogued_commands() {
        for (_, text) in DEFAULT_KEYS.iter().chain(DEFAULT_CMD_KEYS) {
            let first = text
                .trim_start_matches(':')
                .split_whitespace()
                .next()
                .unwrap_or_default();
            assert!(CMD_WORDS.contains(&first), "{text} is not a known command");
        }
    }

    #[test]
    fn user_bindings_override_and_remove() -> Result<(), Box<dyn std::error::Error>> {
        let keys: Keys = toml::from_str(
            r#"
            [keys]
            q = ""
            x = "delete"
            gg = "bottom"

            [cmd_keys]
            "<c-g>" = "cmd-escape"
            "#,
        )?;

        let normal = keys.merged_normal();
        assert!(!normal.iter().any(|(k, _)| k == "q"));
        assert!(normal.contains(&("x".to_string(), "delete".to_string())));
        assert!(normal.contains(&("gg".to_string(), "bottom".to_string())));

        let command = keys.merged_command();
        assert!(command.contains(&("<c-g>".to_string(), "cmd-escape".to_string())));
        assert!(command.contains(&("<tab>".to_string(), "cmd-complete".to_string())));
        Ok(())
    }
}
