//! Key binding tables and key sequence handling for lfr.
//!
//! Keys are written in lf notation: a printable character stands for itself, everything
//! else is bracketed (`<space>`, `<enter>`, `<c-f>`, `<a-b>`, `<f-1>`, `<lt>`). A binding
//! may span several keys (`gg`, `zh`). [key_string] turns crossterm key events into that
//! notation so that bindings from the config file and live input compare as strings.
//!
//! [Keymap] holds the normal-mode and command-mode tables. [KeyInput] accumulates typed keys
//! and a count prefix in normal mode until they resolve to a binding.

use crate::app::expr::{Expr, ListExpr};
use crate::app::parse::ExprParser;
use crate::config::Keys;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use std::collections::HashMap;

/// Converts a key event to lf key notation.
///
/// Returns `None` for keys lf has no name for (media keys, lone modifiers).
pub fn key_string(key: &KeyEvent) -> Option<String> {
    let mods = key.modifiers;
    let name = match key.code {
        KeyCode::Char(c) => {
            if mods.contains(KeyModifiers::CONTROL) {
                return Some(format!("<c-{}>", c.to_ascii_lowercase()));
            }
            if mods.contains(KeyModifiers::ALT) {
                return Some(format!("<a-{}>", c));
            }
            return Some(match c {
                ' ' => "<space>".to_string(),
                '<' => "<lt>".to_string(),
                '>' => "<gt>".to_string(),
                c => c.to_string(),
            });
        }
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => "backtab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Insert => "insert".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pgup".to_string(),
        KeyCode::PageDown => "pgdn".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::F(n) => format!("f-{}", n),
        _ => return None,
    };

    let prefix = if mods.contains(KeyModifiers::CONTROL) {
        "c-"
    } else if mods.contains(KeyModifiers::ALT) {
        "a-"
    } else if mods.contains(KeyModifiers::SHIFT) && key.code != KeyCode::BackTab {
        "s-"
    } else {
        ""
    };
    Some(format!("<{}{}>", prefix, name))
}

/// Splits a binding like `g<space>` into its keys: `["g", "<space>"]`.
///
/// A `<` without a closing `>` is taken literally. Bracketed names are lowercased.
pub fn parse_key_seq(s: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        if c == '<'
            && let Some(end) = rest.find('>')
            && end > 1
        {
            keys.push(rest[..=end].to_lowercase());
            rest = &rest[end + 1..];
            continue;
        }
        keys.push(c.to_string());
        rest = &rest[c.len_utf8()..];
    }
    keys
}

fn normalize(keys: &str) -> String {
    parse_key_seq(keys).concat()
}

/// The printable character a single key inserts in the command line, if any.
pub fn key_char(key: &str) -> Option<char> {
    match key {
        "<space>" => Some(' '),
        "<lt>" => Some('<'),
        "<gt>" => Some('>'),
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !c.is_control() => Some(c),
                _ => None,
            }
        }
    }
}

/// Normal-mode and command-mode binding tables.
#[derive(Debug, Default, Clone)]
pub struct Keymap {
    normal: HashMap<String, Expr>,
    command: HashMap<String, Expr>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds both tables from the defaults merged with the config file.
    ///
    /// Bindings whose text does not parse are logged and left out.
    pub fn from_keys(keys: &Keys, parser: &dyn ExprParser) -> Self {
        let mut map = Keymap::new();
        for (key, text) in keys.merged_normal() {
            if let Some(expr) = parse_binding(&key, &text, parser) {
                map.map_normal(&key, Some(expr));
            }
        }
        for (key, text) in keys.merged_command() {
            if let Some(expr) = parse_binding(&key, &text, parser) {
                map.map_command(&key, Some(expr));
            }
        }
        map
    }

    /// Installs or, with `None`, removes a normal-mode binding.
    pub fn map_normal(&mut self, keys: &str, expr: Option<Expr>) {
        let keys = normalize(keys);
        match expr {
            Some(expr) => {
                self.normal.insert(keys, expr);
            }
            None => {
                self.normal.remove(&keys);
            }
        }
    }

    /// Installs or, with `None`, removes a command-mode binding.
    pub fn map_command(&mut self, key: &str, expr: Option<Expr>) {
        let key = normalize(key);
        match expr {
            Some(expr) => {
                self.command.insert(key, expr);
            }
            None => {
                self.command.remove(&key);
            }
        }
    }

    #[inline]
    pub fn normal(&self, keys: &str) -> Option<&Expr> {
        self.normal.get(keys)
    }

    #[inline]
    pub fn command(&self, key: &str) -> Option<&Expr> {
        self.command.get(key)
    }

    /// Number of normal-mode bindings starting with `prefix`.
    pub fn normal_prefix_count(&self, prefix: &str) -> usize {
        self.normal.keys().filter(|k| k.starts_with(prefix)).count()
    }

    /// Normal-mode bindings sorted by key, for listing.
    pub fn normal_bindings(&self) -> Vec<(&str, &Expr)> {
        let mut out: Vec<_> = self.normal.iter().map(|(k, e)| (k.as_str(), e)).collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }
}

fn parse_binding(key: &str, text: &str, parser: &dyn ExprParser) -> Option<Expr> {
    match parser.parse(text) {
        Ok(mut exprs) if exprs.len() == 1 => exprs.pop(),
        Ok(exprs) if !exprs.is_empty() => Some(Expr::List(ListExpr { exprs, count: 1 })),
        Ok(_) => None,
        Err(e) => {
            log::warn!("binding {}: {}", key, e);
            None
        }
    }
}

/// Outcome of feeding one key in normal mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult {
    /// A binding completed; the expression already carries the count prefix.
    Bound(Expr),
    /// More keys are needed.
    Pending,
    /// The typed sequence matches no binding.
    Unbound(String),
}

/// Keys typed so far in normal mode.
#[derive(Debug, Default, Clone)]
pub struct KeyInput {
    seq: String,
    count: String,
}

impl KeyInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one key (in lf notation) to the pending sequence.
    ///
    /// Digits typed before any other key form the count prefix.
    pub fn feed(&mut self, key: &str, keymap: &Keymap) -> KeyResult {
        if self.seq.is_empty()
            && key.len() == 1
            && key.chars().all(|c| c.is_ascii_digit())
        {
            self.count.push_str(key);
            return KeyResult::Pending;
        }

        self.seq.push_str(key);
        let candidates = keymap.normal_prefix_count(&self.seq);
        match keymap.normal(&self.seq) {
            Some(expr) if candidates == 1 => {
                let expr = match self.count.parse::<usize>() {
                    Ok(n) if n > 0 => expr.with_count(n),
                    _ => expr.clone(),
                };
                self.reset();
                KeyResult::Bound(expr)
            }
            _ if candidates > 0 => KeyResult::Pending,
            _ => {
                let seq = std::mem::take(&mut self.seq);
                self.count.clear();
                KeyResult::Unbound(seq)
            }
        }
    }

    /// Keys waiting for completion, count first.
    pub fn pending(&self) -> String {
        format!("{}{}", self.count, self.seq)
    }

    pub fn is_pending(&self) -> bool {
        !self.seq.is_empty() || !self.count.is_empty()
    }

    pub fn reset(&mut self) {
        self.seq.clear();
        self.count.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::parse::LineParser;
    use crate::config::Keys;

    fn ev(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn converts_key_events() {
        let none = KeyModifiers::NONE;
        assert_eq!(key_string(&ev(KeyCode::Char('j'), none)).as_deref(), Some("j"));
        assert_eq!(
            key_string(&ev(KeyCode::Char('G'), KeyModifiers::SHIFT)).as_deref(),
            Some("G")
        );
        assert_eq!(
            key_string(&ev(KeyCode::Char('f'), KeyModifiers::CONTROL)).as_deref(),
            Some("<c-f>")
        );
        assert_eq!(key_string(&ev(KeyCode::Char(' '), none)).as_deref(), Some("<space>"));
        assert_eq!(key_string(&ev(KeyCode::Enter, none)).as_deref(), Some("<enter>"));
        assert_eq!(key_string(&ev(KeyCode::F(2), none)).as_deref(), Some("<f-2>"));
        assert_eq!(
            key_string(&ev(KeyCode::Up, KeyModifiers::ALT)).as_deref(),
            Some("<a-up>")
        );
    }

    #[test]
    fn splits_sequences() {
        assert_eq!(parse_key_seq("gg"), vec!["g", "g"]);
        assert_eq!(parse_key_seq("g<space>"), vec!["g", "<space>"]);
        assert_eq!(parse_key_seq("<C-F>"), vec!["<c-f>"]);
        assert_eq!(parse_key_seq("<"), vec!["<"]);
        assert_eq!(parse_key_seq("<>"), vec!["<", ">"]);
    }

    #[test]
    fn key_chars() {
        assert_eq!(key_char("a"), Some('a'));
        assert_eq!(key_char("<space>"), Some(' '));
        assert_eq!(key_char("<c-a>"), None);
    }

    #[test]
    fn resolves_multi_key_bindings_with_counts() {
        let keymap = Keymap::from_keys(&Keys::default(), &LineParser);
        let mut input = KeyInput::new();

        assert_eq!(input.feed("g", &keymap), KeyResult::Pending);
        assert_eq!(input.feed("g", &keymap), KeyResult::Bound(Expr::call("top", &[])));

        assert_eq!(input.feed("3", &keymap), KeyResult::Pending);
        assert_eq!(input.pending(), "3");
        assert_eq!(
            input.feed("j", &keymap),
            KeyResult::Bound(Expr::call("down", &[]).with_count(3))
        );

        assert_eq!(input.feed("x", &keymap), KeyResult::Unbound("x".into()));
        assert!(!input.is_pending());
    }

    #[test]
    fn map_and_unmap() {
        let mut keymap = Keymap::new();
        keymap.map_normal("<C-X>", Some(Expr::call("quit", &[])));
        assert!(keymap.normal("<c-x>").is_some());
        keymap.map_normal("<c-x>", None);
        assert!(keymap.normal("<c-x>").is_none());

        keymap.map_command("<tab>", Some(Expr::call("cmd-complete", &[])));
        keymap.map_command("<tab>", Some(Expr::call("cmd-menu-complete", &[])));
        assert_eq!(
            keymap.command("<tab>"),
            Some(&Expr::call("cmd-menu-complete", &[]))
        );
    }
}
