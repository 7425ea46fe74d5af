//! Key and command line handler methods for lfr.
//!
//! This module implements the [AppState] methods that route key presses: mark keys after
//! `mark-*`, command-mode bindings and text input while the command line is open, and
//! normal-mode key sequences otherwise. It also accepts the command line and runs what
//! was typed according to the prompt.

use crate::app::cmdline::{CmdLine, Prompt};
use crate::app::keymap::{KeyResult, key_char, key_string, parse_key_seq};
use crate::app::state::{AppState, KeypressResult, MarkAction};
use crate::core::complete::{FileCandidate, LineContext};
use crate::core::CmdError;

use crossterm::event::KeyEvent;

impl AppState {
    /// Handles a terminal key event.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeypressResult {
        match key_string(&key) {
            Some(name) => self.handle_key_str(&name),
            None => KeypressResult::Continue,
        }
    }

    /// Handles one key in lf notation.
    pub fn handle_key_str(&mut self, key: &str) -> KeypressResult {
        if let Some(action) = self.mark_pending.take() {
            if key != "<esc>"
                && let Some(mark) = key_char(key)
            {
                let res = match action {
                    MarkAction::Save => {
                        self.mark_save(mark);
                        Ok(())
                    }
                    MarkAction::Load => self.mark_load(mark),
                    MarkAction::Remove => self.mark_remove(mark),
                };
                if let Err(e) = res {
                    self.report(e);
                }
            }
            return self.keypress_result();
        }

        if self.cmdline.is_active() {
            self.handle_command_key(key);
            return self.keypress_result();
        }

        match self.key_input.feed(key, &self.keymap) {
            KeyResult::Bound(expr) => self.eval(&expr),
            KeyResult::Pending => {}
            KeyResult::Unbound(seq) => {
                self.report(CmdError::Other(format!("unknown mapping: {}", seq)));
                return KeypressResult::Continue;
            }
        }
        self.keypress_result()
    }

    /// Feeds every key of a sequence written in lf notation, as `push` does.
    pub fn push_keys(&mut self, keys: &str) {
        for key in parse_key_seq(keys) {
            if self.handle_key_str(&key) == KeypressResult::Quit {
                break;
            }
        }
    }

    fn keypress_result(&self) -> KeypressResult {
        if self.quit {
            KeypressResult::Quit
        } else {
            KeypressResult::Consumed
        }
    }

    fn handle_command_key(&mut self, key: &str) {
        if let Some(expr) = self.keymap.command(key).cloned() {
            self.eval(&expr);
            return;
        }
        if let Some(c) = key_char(key) {
            self.cmdline.insert(c);
            self.after_cmdline_edit(true);
        }
    }

    /// Waits for a mark key.
    pub fn start_mark(&mut self, action: MarkAction) {
        self.mark_pending = Some(action);
    }

    // Command line

    /// Opens the command line for `prompt`.
    pub fn open_prompt(&mut self, prompt: Prompt, text: &str) {
        self.inc_origin = self.current_dir().map(|d| d.name().to_string());
        self.cmdline.open(prompt, text);
    }

    /// Applies incremental search and filter, and accepts find once the pattern is long
    /// enough (`findlen`, or a unique match when it is 0).
    pub(super) fn after_cmdline_edit(&mut self, typed: bool) {
        let text = self.cmdline.text();
        match self.cmdline.prompt() {
            Some(Prompt::Find { .. }) if typed => {
                let accept = if self.opts.findlen == 0 {
                    self.current_dir()
                        .is_some_and(|d| d.find_count(&text, &self.opts) == 1)
                } else {
                    text.chars().count() >= self.opts.findlen
                };
                if accept && let Err(e) = self.cmd_enter() {
                    self.report(e);
                }
            }
            Some(Prompt::Search { forward }) if self.opts.incsearch => {
                self.restore_origin();
                if !text.is_empty() {
                    if let Err(e) = self.search_step(&text, forward) {
                        log::debug!("incremental search: {}", e);
                    }
                }
            }
            Some(Prompt::Filter) if self.opts.incfilter => {
                self.set_filter(split_patterns(&text));
            }
            _ => {}
        }
    }

    fn restore_origin(&mut self) {
        let Some(name) = self.inc_origin.clone() else {
            return;
        };
        let (height, scrolloff) = (self.height, self.opts.scrolloff);
        if let Some(dir) = self.dirs.get_mut(&self.cwd) {
            dir.sel(&name, height, scrolloff);
        }
    }

    /// `cmd-enter`: closes the command line and runs its text.
    pub fn cmd_enter(&mut self) -> Result<(), CmdError> {
        let Some((prompt, text)) = self.cmdline.accept() else {
            return Ok(());
        };
        if matches!(prompt, Prompt::Search { .. }) && self.opts.incsearch {
            self.restore_origin();
        }
        self.inc_origin = None;
        match prompt {
            Prompt::Read => self.run_text(&text),
            Prompt::Shell(mode) => self.run_shell(mode, &text, &[]),
            Prompt::Search { forward } => self.search(&text, forward),
            Prompt::Find { forward } => self.find(&text, forward),
            Prompt::Filter => {
                self.set_filter(split_patterns(&text));
                Ok(())
            }
            Prompt::Rename => self.rename(&text),
        }
    }

    /// `cmd-escape`: closes the command line, undoing incremental search and filter.
    pub fn cmd_escape(&mut self) {
        let prompt = self.cmdline.close();
        match prompt {
            Some(Prompt::Search { .. }) if self.opts.incsearch => self.restore_origin(),
            Some(Prompt::Filter) if self.opts.incfilter => {
                self.set_filter(Vec::new());
                self.restore_origin();
            }
            _ => {}
        }
        self.inc_origin = None;
    }

    /// Candidates for command line completion.
    pub fn line_context(&self) -> LineContext {
        let files = self
            .current_dir()
            .map(|d| {
                d.files()
                    .iter()
                    .map(|f| FileCandidate {
                        name: f.name().to_string(),
                        is_dir: f.is_dir(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        LineContext {
            user_cmds: self.user_command_names(),
            files,
        }
    }

    /// `cmd-complete`: inline completion; several candidates are shown in the message line.
    pub fn cmd_complete(&mut self) {
        let ctx = self.line_context();
        let matches = self.cmdline.complete(&ctx);
        if matches.len() > 1 {
            self.echo(matches.join(" "));
        }
    }

    pub fn cmd_menu_complete(&mut self, forward: bool) {
        let ctx = self.line_context();
        self.cmdline.menu_complete(&ctx, forward);
        let matches = self.cmdline.menu_matches();
        if matches.len() > 1 {
            let msg = matches.join(" ");
            self.echo(msg);
        }
    }

    /// Runs an editing operation on the command line and refreshes incremental prompts.
    pub(super) fn edit_cmdline(&mut self, edit: impl FnOnce(&mut CmdLine)) {
        edit(&mut self.cmdline);
        self.after_cmdline_edit(false);
    }
}

fn split_patterns(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}
