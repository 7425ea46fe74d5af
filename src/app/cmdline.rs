//! The command line editor.
//!
//! [CmdLine] is the single-line input used by `read`, the shell prompts, search, find,
//! filter and rename. It implements the `cmd-*` editing commands readline style: a yank
//! buffer filled by the deleting commands, word motions, per-prompt history and tab
//! completion (inline or cycling through a menu).

use crate::core::complete::{LineContext, complete_line};
use crate::core::ShellMode;

/// What the command line is collecting input for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Read,
    Shell(ShellMode),
    Search { forward: bool },
    Find { forward: bool },
    Filter,
    Rename,
}

impl Prompt {
    /// Text shown in front of the input.
    pub fn label(self) -> &'static str {
        match self {
            Prompt::Read => ":",
            Prompt::Shell(ShellMode::Sync) => "$",
            Prompt::Shell(ShellMode::Pipe) => "%",
            Prompt::Shell(ShellMode::Wait) => "!",
            Prompt::Shell(ShellMode::Async) => "&",
            Prompt::Search { forward: true } => "/",
            Prompt::Search { forward: false } => "?",
            Prompt::Find { forward: true } => "find: ",
            Prompt::Find { forward: false } => "find-back: ",
            Prompt::Filter => "filter: ",
            Prompt::Rename => "rename: ",
        }
    }

    fn keeps_history(self) -> bool {
        matches!(self, Prompt::Read | Prompt::Shell(_))
    }
}

#[derive(Debug, Clone)]
struct Menu {
    head: String,
    matches: Vec<String>,
    ind: Option<usize>,
}

/// Editable input line.
#[derive(Debug, Default, Clone)]
pub struct CmdLine {
    prompt: Option<Prompt>,
    buf: Vec<char>,
    cursor: usize,
    yank: Vec<char>,
    history: Vec<(Prompt, String)>,
    hist_pos: Option<usize>,
    menu: Option<Menu>,
}

impl CmdLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts collecting input for `prompt` with `text` already typed.
    pub fn open(&mut self, prompt: Prompt, text: &str) {
        self.prompt = Some(prompt);
        self.buf = text.chars().collect();
        self.cursor = self.buf.len();
        self.hist_pos = None;
        self.menu = None;
    }

    /// Closes the line without accepting it.
    pub fn close(&mut self) -> Option<Prompt> {
        self.buf.clear();
        self.cursor = 0;
        self.hist_pos = None;
        self.menu = None;
        self.prompt.take()
    }

    /// Closes the line and returns what was typed. History is updated for `read` and the
    /// shell prompts.
    pub fn accept(&mut self) -> Option<(Prompt, String)> {
        let prompt = self.prompt?;
        let text: String = self.buf.iter().collect();
        if prompt.keeps_history() && !text.trim().is_empty() {
            self.history.retain(|(p, t)| !(*p == prompt && *t == text));
            self.history.push((prompt, text.clone()));
        }
        self.close();
        Some((prompt, text))
    }

    // Accessors

    #[inline]
    pub fn prompt(&self) -> Option<Prompt> {
        self.prompt
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn text(&self) -> String {
        self.buf.iter().collect()
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn yanked(&self) -> String {
        self.yank.iter().collect()
    }

    pub fn menu_matches(&self) -> &[String] {
        self.menu.as_ref().map_or(&[], |m| &m.matches)
    }

    /// Replaces the line, cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.buf = text.chars().collect();
        self.cursor = self.buf.len();
    }

    pub fn insert(&mut self, c: char) {
        self.menu = None;
        self.buf.insert(self.cursor, c);
        self.cursor += 1;
    }

    // Motion

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buf.len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buf.len();
    }

    /// Moves past the end of the next word.
    pub fn word(&mut self) {
        self.cursor = self.word_end();
    }

    /// Moves to the start of the previous word.
    pub fn word_back(&mut self) {
        self.cursor = self.word_start();
    }

    fn word_end(&self) -> usize {
        let mut i = self.cursor;
        while i < self.buf.len() && !is_word(self.buf[i]) {
            i += 1;
        }
        while i < self.buf.len() && is_word(self.buf[i]) {
            i += 1;
        }
        i
    }

    fn word_start(&self) -> usize {
        let mut i = self.cursor;
        while i > 0 && !is_word(self.buf[i - 1]) {
            i -= 1;
        }
        while i > 0 && is_word(self.buf[i - 1]) {
            i -= 1;
        }
        i
    }

    // Deletion

    pub fn delete(&mut self) {
        if self.cursor < self.buf.len() {
            self.buf.remove(self.cursor);
        }
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.buf.remove(self.cursor);
        }
    }

    pub fn delete_home(&mut self) {
        self.yank = self.buf.drain(..self.cursor).collect();
        self.cursor = 0;
    }

    pub fn delete_end(&mut self) {
        self.yank = self.buf.drain(self.cursor..).collect();
    }

    /// Deletes back to the previous whitespace.
    pub fn delete_unix_word(&mut self) {
        let mut i = self.cursor;
        while i > 0 && self.buf[i - 1].is_whitespace() {
            i -= 1;
        }
        while i > 0 && !self.buf[i - 1].is_whitespace() {
            i -= 1;
        }
        self.yank = self.buf.drain(i..self.cursor).collect();
        self.cursor = i;
    }

    /// Deletes to the end of the next word.
    pub fn delete_word(&mut self) {
        let end = self.word_end();
        self.yank = self.buf.drain(self.cursor..end).collect();
    }

    /// Inserts the yank buffer at the cursor.
    pub fn yank(&mut self) {
        let yank = self.yank.clone();
        for c in yank {
            self.insert(c);
        }
    }

    // Transformation

    /// Swaps the characters around the cursor; at the end of the line the last two.
    pub fn transpose(&mut self) {
        if self.buf.len() < 2 || self.cursor == 0 {
            return;
        }
        if self.cursor == self.buf.len() {
            self.buf.swap(self.cursor - 2, self.cursor - 1);
        } else {
            self.buf.swap(self.cursor - 1, self.cursor);
            self.cursor += 1;
        }
    }

    /// Swaps the word before the cursor with the word after it.
    pub fn transpose_word(&mut self) {
        let words = word_spans(&self.buf);
        if words.len() < 2 {
            return;
        }
        // second word: first one starting at or after the cursor, else the last
        let second = words
            .iter()
            .position(|&(s, _)| s >= self.cursor)
            .unwrap_or(words.len() - 1)
            .max(1);
        let (a0, a1) = words[second - 1];
        let (b0, b1) = words[second];

        let mut out: Vec<char> = self.buf[..a0].to_vec();
        out.extend_from_slice(&self.buf[b0..b1]);
        out.extend_from_slice(&self.buf[a1..b0]);
        out.extend_from_slice(&self.buf[a0..a1]);
        out.extend_from_slice(&self.buf[b1..]);
        self.buf = out;
        self.cursor = b1;
    }

    pub fn capitalize_word(&mut self) {
        self.map_word(|i, c| {
            if i == 0 {
                c.to_uppercase().collect()
            } else {
                c.to_lowercase().collect()
            }
        });
    }

    pub fn uppercase_word(&mut self) {
        self.map_word(|_, c| c.to_uppercase().collect());
    }

    pub fn lowercase_word(&mut self) {
        self.map_word(|_, c| c.to_lowercase().collect());
    }

    /// Rewrites the next word char by char and moves past it.
    fn map_word(&mut self, f: impl Fn(usize, char) -> Vec<char>) {
        let mut start = self.cursor;
        while start < self.buf.len() && !is_word(self.buf[start]) {
            start += 1;
        }
        let end = self.word_end();
        let word: Vec<char> = self.buf[start..end]
            .iter()
            .enumerate()
            .flat_map(|(i, &c)| f(i, c))
            .collect();
        let new_end = start + word.len();
        self.buf.splice(start..end, word);
        self.cursor = new_end;
    }

    // History

    /// Previous history entry of the same prompt kind.
    pub fn history_prev(&mut self) {
        let Some(prompt) = self.prompt else { return };
        let upto = self.hist_pos.unwrap_or(self.history.len());
        if let Some(i) = self.history[..upto].iter().rposition(|(p, _)| *p == prompt) {
            self.hist_pos = Some(i);
            let text = self.history[i].1.clone();
            self.set_text(&text);
        }
    }

    /// Next history entry of the same prompt kind; past the newest the line is cleared.
    pub fn history_next(&mut self) {
        let (Some(prompt), Some(pos)) = (self.prompt, self.hist_pos) else {
            return;
        };
        match self.history[pos + 1..].iter().position(|(p, _)| *p == prompt) {
            Some(off) => {
                self.hist_pos = Some(pos + 1 + off);
                let text = self.history[pos + 1 + off].1.clone();
                self.set_text(&text);
            }
            None => {
                self.hist_pos = None;
                self.set_text("");
            }
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(|(_, t)| t.as_str())
    }

    // Completion

    /// The text left of the cursor as `complete_line` sees it, with the shell prefix.
    fn completion_input(&self) -> Option<String> {
        let left: String = self.buf[..self.cursor].iter().collect();
        match self.prompt? {
            Prompt::Read => Some(left),
            Prompt::Shell(mode) => Some(format!("{}{}", mode.prefix(), left)),
            _ => None,
        }
    }

    /// Completes the word before the cursor inline. Returns the candidates.
    pub fn complete(&mut self, ctx: &LineContext) -> Vec<String> {
        self.menu = None;
        let Some(input) = self.completion_input() else {
            return Vec::new();
        };
        let shell = matches!(self.prompt, Some(Prompt::Shell(_)));
        let done = complete_line(&input, ctx);
        let line = if shell {
            done.line.chars().skip(1).collect::<String>()
        } else {
            done.line
        };
        let rest: Vec<char> = self.buf[self.cursor..].to_vec();
        self.buf = line.chars().collect();
        self.cursor = self.buf.len();
        self.buf.extend(rest);
        done.matches
    }

    /// Cycles through the candidates for the word before the cursor.
    pub fn menu_complete(&mut self, ctx: &LineContext, forward: bool) {
        if self.menu.is_none() {
            let Some(input) = self.completion_input() else { return };
            let matches = complete_line(&input, ctx).matches;
            if matches.is_empty() {
                return;
            }
            let left: String = self.buf[..self.cursor].iter().collect();
            let cut = left
                .char_indices()
                .rev()
                .find(|(_, c)| c.is_whitespace())
                .map_or(0, |(i, c)| i + c.len_utf8());
            self.menu = Some(Menu {
                head: left[..cut].to_string(),
                matches,
                ind: None,
            });
        }

        let Some(menu) = self.menu.as_mut() else { return };
        let len = menu.matches.len();
        let ind = match (menu.ind, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        menu.ind = Some(ind);
        let line = format!("{}{}", menu.head, menu.matches[ind]);
        self.buf = line.chars().collect();
        self.cursor = self.buf.len();
    }

    /// Keeps the menu choice and closes the menu.
    pub fn menu_accept(&mut self) {
        self.menu = None;
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn word_spans(buf: &[char]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut i = 0;
    while i < buf.len() {
        if is_word(buf[i]) {
            let start = i;
            while i < buf.len() && is_word(buf[i]) {
                i += 1;
            }
            spans.push((start, i));
        } else {
            i += 1;
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, cursor: usize) -> CmdLine {
        let mut cl = CmdLine::new();
        cl.open(Prompt::Read, text);
        cl.cursor = cursor;
        cl
    }

    #[test]
    fn editing_and_yank() {
        let mut cl = line("echo hello world", 16);
        cl.delete_unix_word();
        assert_eq!(cl.text(), "echo hello ");
        assert_eq!(cl.yanked(), "world");

        cl.home();
        cl.delete_word();
        assert_eq!(cl.text(), " hello ");
        cl.end();
        cl.yank();
        assert_eq!(cl.text(), " hello echo");

        cl.cursor = 1;
        cl.delete_end();
        assert_eq!(cl.text(), " ");
        assert_eq!(cl.yanked(), "hello echo");
        cl.delete_back();
        assert_eq!(cl.text(), "");
        cl.delete_back();
        assert_eq!(cl.cursor(), 0);
    }

    #[test]
    fn word_motion_and_case() {
        let mut cl = line("foo bar-baz", 0);
        cl.word();
        assert_eq!(cl.cursor(), 3);
        cl.word();
        assert_eq!(cl.cursor(), 7);
        cl.word_back();
        assert_eq!(cl.cursor(), 4);

        cl.home();
        cl.capitalize_word();
        assert_eq!(cl.text(), "Foo bar-baz");
        cl.uppercase_word();
        assert_eq!(cl.text(), "Foo BAR-baz");
        assert_eq!(cl.cursor(), 7);
        cl.home();
        cl.lowercase_word();
        assert_eq!(cl.text(), "foo BAR-baz");
    }

    #[test]
    fn transposition() {
        let mut cl = line("ab", 2);
        cl.transpose();
        assert_eq!(cl.text(), "ba");

        let mut cl = line("abc", 1);
        cl.transpose();
        assert_eq!(cl.text(), "bac");
        assert_eq!(cl.cursor(), 2);

        let mut cl = line("one two", 3);
        cl.transpose_word();
        assert_eq!(cl.text(), "two one");
        assert_eq!(cl.cursor(), 7);
    }

    #[test]
    fn history_per_prompt() {
        let mut cl = CmdLine::new();
        cl.open(Prompt::Read, "cd /tmp");
        assert_eq!(cl.accept(), Some((Prompt::Read, "cd /tmp".to_string())));
        cl.open(Prompt::Shell(ShellMode::Sync), "ls");
        cl.accept();
        cl.open(Prompt::Read, "quit");
        cl.accept();
        cl.open(Prompt::Search { forward: true }, "foo");
        cl.accept();

        cl.open(Prompt::Read, "");
        cl.history_prev();
        assert_eq!(cl.text(), "quit");
        cl.history_prev();
        assert_eq!(cl.text(), "cd /tmp");
        cl.history_prev();
        assert_eq!(cl.text(), "cd /tmp");
        cl.history_next();
        assert_eq!(cl.text(), "quit");
        cl.history_next();
        assert_eq!(cl.text(), "");
        assert_eq!(cl.history().count(), 3);
    }

    #[test]
    fn inline_and_menu_completion() {
        let ctx = LineContext::default();
        let mut cl = line("se", 2);
        let matches = cl.complete(&ctx);
        assert!(matches.iter().any(|m| m == "set"));

        let mut cl = line("set nohid", 9);
        cl.complete(&ctx);
        assert_eq!(cl.text(), "set nohidden ");

        let mut cl = line("set sort", 8);
        let _ = cl.complete(&ctx);
        assert_eq!(cl.text(), "set sortby ");

        let mut cl = line("qu", 2);
        cl.menu_complete(&ctx, true);
        assert_eq!(cl.text(), "quit");
        assert_eq!(cl.menu_matches().to_vec(), vec!["quit".to_string()]);
        cl.menu_accept();
        assert!(cl.menu_matches().is_empty());
    }

    #[test]
    fn labels() {
        assert_eq!(Prompt::Shell(ShellMode::Pipe).label(), "%");
        assert_eq!(Prompt::Search { forward: false }.label(), "?");
    }
}
