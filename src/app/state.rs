//! Application state and main controller module for lfr.
//!
//! This module defines the [AppState] struct, the context every expression is evaluated
//! against. It holds:
//! - The options and the current directory with its cached [Directory] listings
//! - Key binding tables, user defined commands and the command line
//! - Selections, marks, tags and the clipboard
//! - The shell and parser collaborators
//! - Communication with worker threads via crossbeam_channel
//! - The current message and error
//!
//! Navigation and file actions live in `actions.rs`, key and command line handling in
//! `handlers.rs`. Both are `impl AppState` blocks over the fields declared here.

use crate::app::cmdline::CmdLine;
use crate::app::expr::Expr;
use crate::app::keymap::{KeyInput, Keymap};
use crate::app::nav::Directory;
use crate::app::parse::{ExprParser, LineParser};
use crate::config::{Config, Options, SortMethod, affects_listing};
use crate::core::fm::FileEntry;
use crate::core::worker::{WorkerResponse, Workers};
use crate::core::{CmdError, ShellMode, ShellOutcome, ShellRequest, ShellRunner, SystemShell};

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Viewport height used until the terminal reports one.
pub const DEFAULT_HEIGHT: usize = 20;

/// Result of processing one key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypressResult {
    Continue,
    Consumed,
    Quit,
}

/// Which keys the next key press goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Command,
    Mark(MarkAction),
}

/// What the key after `mark-save`, `mark-load` or `mark-remove` is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkAction {
    Save,
    Load,
    Remove,
}

/// Files copied or cut, waiting for `paste`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Clipboard {
    pub paths: Vec<PathBuf>,
    pub cut: bool,
}

/// Main struct which holds the central application state of lfr.
///
/// Functions are provided for evaluating commands, key handling, directory navigation,
/// worker requests and message management.
pub struct AppState {
    pub(super) opts: Options,
    pub(super) height: usize,

    pub(super) cwd: PathBuf,
    pub(super) dirs: HashMap<PathBuf, Directory>,
    pub(super) jumps: Vec<PathBuf>,
    pub(super) jump_ind: usize,

    pub(super) keymap: Keymap,
    pub(super) key_input: KeyInput,
    pub(super) user_cmds: HashMap<String, Expr>,
    pub(super) cmdline: CmdLine,
    pub(super) mark_pending: Option<MarkAction>,
    /// Entry under the cursor when an incremental search or filter prompt opened.
    pub(super) inc_origin: Option<String>,

    /// Selected paths with their selection order.
    pub(super) selections: HashMap<PathBuf, usize>,
    pub(super) sel_counter: usize,
    pub(super) marks: HashMap<char, PathBuf>,
    pub(super) tags: HashMap<PathBuf, String>,
    pub(super) clipboard: Clipboard,

    pub(super) last_search: Option<(String, bool)>,
    pub(super) last_find: Option<(String, bool)>,

    pub(super) message: Option<String>,
    pub(super) errors: Vec<String>,

    pub(super) shell: Box<dyn ShellRunner>,
    pub(super) parser: Option<Box<dyn ExprParser>>,
    pub(super) workers: Option<Workers>,
    pub(super) request_id: u64,
    /// Latest load request per directory; older answers are dropped.
    pub(super) load_requests: HashMap<PathBuf, u64>,
    /// Nesting of command calls currently being evaluated.
    pub(super) call_depth: usize,

    pub(super) quit: bool,
    pub(super) redraw: bool,
}

impl AppState {
    /// State rooted at the process working directory.
    pub fn new(config: Config) -> io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::from_dir(config, &cwd))
    }

    /// State rooted at `path`, with the default shell and parser and no worker threads.
    ///
    /// Falls back to the process working directory when `path` is not a directory.
    pub fn from_dir(config: Config, path: &Path) -> Self {
        let (opts, keys) = config.into_parts();
        let parser = LineParser;
        let keymap = Keymap::from_keys(&keys, &parser);

        let cwd = if path.is_dir() {
            path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
        } else {
            std::env::current_dir().unwrap_or_else(|_| path.to_path_buf())
        };

        let mut app = AppState {
            opts,
            height: DEFAULT_HEIGHT,
            cwd: cwd.clone(),
            dirs: HashMap::new(),
            jumps: vec![cwd],
            jump_ind: 0,
            keymap,
            key_input: KeyInput::new(),
            user_cmds: HashMap::new(),
            cmdline: CmdLine::new(),
            mark_pending: None,
            inc_origin: None,
            selections: HashMap::new(),
            sel_counter: 0,
            marks: HashMap::new(),
            tags: HashMap::new(),
            clipboard: Clipboard::default(),
            last_search: None,
            last_find: None,
            message: None,
            errors: Vec::new(),
            shell: Box::new(SystemShell),
            parser: Some(Box::new(parser)),
            workers: None,
            request_id: 0,
            load_requests: HashMap::new(),
            call_depth: 0,
            quit: false,
            redraw: false,
        };
        app.load_current();
        app
    }

    /// Moves directory loads, size calculations and file operations to worker threads.
    pub fn with_workers(mut self) -> Self {
        self.workers = Some(Workers::spawn());
        self
    }

    pub fn with_shell(mut self, shell: Box<dyn ShellRunner>) -> Self {
        self.shell = shell;
        self
    }

    /// Replaces the parser; `None` makes `source` and typed command lines fail with
    /// [CmdError::NoParser].
    pub fn with_parser(mut self, parser: Option<Box<dyn ExprParser>>) -> Self {
        self.parser = parser;
        self
    }

    // Getters / accessors

    #[inline]
    pub fn options(&self) -> &Options {
        &self.opts
    }

    #[inline]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    #[inline]
    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    #[inline]
    pub fn cmdline(&self) -> &CmdLine {
        &self.cmdline
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn last_error(&self) -> Option<&str> {
        self.errors.last().map(String::as_str)
    }

    /// Every error reported since start, oldest first.
    #[inline]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[inline]
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Returns and clears the redraw request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    #[inline]
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    #[inline]
    pub fn marks(&self) -> &HashMap<char, PathBuf> {
        &self.marks
    }

    pub fn tag_of(&self, path: &Path) -> Option<&str> {
        self.tags.get(path).map(String::as_str)
    }

    pub fn mode(&self) -> Mode {
        if let Some(action) = self.mark_pending {
            Mode::Mark(action)
        } else if self.cmdline.is_active() {
            Mode::Command
        } else {
            Mode::Normal
        }
    }

    /// Selected paths in the order they were selected.
    pub fn selections(&self) -> Vec<PathBuf> {
        let mut sel: Vec<(&PathBuf, &usize)> = self.selections.iter().collect();
        sel.sort_by_key(|(_, order)| **order);
        sel.into_iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.selections.contains_key(path)
    }

    /// Listing of the current directory, if loaded.
    pub fn current_dir(&self) -> Option<&Directory> {
        self.dirs.get(&self.cwd)
    }

    pub fn dir(&self, path: &Path) -> Option<&Directory> {
        self.dirs.get(path)
    }

    /// Entry under the cursor.
    pub fn current_entry(&self) -> Option<Arc<FileEntry>> {
        self.current_dir().and_then(|d| d.current()).cloned()
    }

    /// Changes the viewport height and re-applies it to every cached directory.
    pub fn set_height(&mut self, height: usize) {
        self.height = height.max(1);
        let (height, scrolloff) = (self.height, self.opts.scrolloff);
        for dir in self.dirs.values_mut() {
            let name = dir.name().to_string();
            dir.sel(&name, height, scrolloff);
        }
    }

    // Evaluation context

    /// Stores an error as the current error message.
    pub fn report(&mut self, err: CmdError) {
        log::debug!("command error: {}", err);
        self.errors.push(err.to_string());
    }

    /// Sets the message line.
    pub fn echo(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    pub fn user_command(&self, name: &str) -> Option<&Expr> {
        self.user_cmds.get(name)
    }

    /// Names of the user defined commands, sorted.
    pub fn user_command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.user_cmds.keys().cloned().collect();
        names.sort();
        names
    }

    /// Installs, replaces or (with `None`) removes a user command.
    pub fn define_command(&mut self, name: &str, expr: Option<Expr>) {
        match expr {
            Some(expr) => {
                self.user_cmds.insert(name.to_string(), expr);
            }
            None => {
                self.user_cmds.remove(name);
            }
        }
    }

    /// Applies `set opt val` and re-sorts the cached directories when the listing depends
    /// on the option.
    pub fn set_option(&mut self, opt: &str, val: &str) -> Result<(), CmdError> {
        self.opts.set(opt, val)?;
        if affects_listing(opt) {
            self.resort_all();
        }
        Ok(())
    }

    pub(super) fn resort_all(&mut self) {
        let height = self.height;
        for dir in self.dirs.values_mut() {
            if dir.needs_sort(&self.opts) {
                dir.sort(&self.opts, height);
            }
        }
    }

    /// Hands a shell command to the shell runner.
    ///
    /// Pipe output ends up in the message line. Commands that run in the foreground may
    /// change the directory, so it is loaded again afterwards.
    pub fn run_shell(&mut self, mode: ShellMode, text: &str, args: &[String]) -> Result<(), CmdError> {
        let req = ShellRequest {
            mode,
            text: text.to_string(),
            args: args.to_vec(),
            shell: self.opts.shell.clone(),
            shellflag: self.opts.shellflag.clone(),
            shellopts: self.opts.shellopts.clone(),
            dir: self.cwd.clone(),
            current: self.current_entry().map(|e| e.path().to_path_buf()),
            selections: self.selections(),
            filesep: self.opts.filesep.clone(),
        };
        log::debug!("running {} {}", mode.command_name(), text);
        let outcome = self.shell.run(&req)?;

        if let ShellOutcome::Finished { status, output } = &outcome {
            if let Some(last) = output.last() {
                self.echo(last.clone());
            }
            if mode != ShellMode::Async {
                let cwd = self.cwd.clone();
                self.reload_dir(&cwd);
            }
            if !outcome.success() {
                return Err(CmdError::Shell(match status {
                    Some(code) => format!("'{}' exited with status {}", text, code),
                    None => format!("'{}' was terminated", text),
                }));
            }
        }
        Ok(())
    }

    /// Parses `text` with the configured parser and evaluates every expression, reporting
    /// failures and going on with the next one.
    pub fn run_text(&mut self, text: &str) -> Result<(), CmdError> {
        let parser = self.parser.as_ref().ok_or_else(|| CmdError::NoParser(text.to_string()))?;
        let exprs = parser.parse(text)?;
        for expr in exprs {
            self.eval(&expr);
        }
        Ok(())
    }

    /// Evaluates one expression, reporting a failure instead of returning it.
    pub fn eval(&mut self, expr: &Expr) {
        if let Err(err) = expr.eval(self, &[]) {
            self.report(err);
        }
    }

    /// The heart of the app: applies finished worker results.
    ///
    /// Returns true when something changed and the screen needs drawing.
    pub fn tick(&mut self) -> bool {
        let Some(workers) = self.workers.as_ref() else {
            return false;
        };
        let responses: Vec<WorkerResponse> = workers.response_rx().try_iter().collect();
        let changed = !responses.is_empty();
        for response in responses {
            self.apply_response(response);
        }
        changed
    }

    pub(super) fn apply_response(&mut self, response: WorkerResponse) {
        let height = self.height;
        match response {
            WorkerResponse::DirectoryLoaded {
                path,
                entries,
                request_id,
            } => self.apply_load(path, Ok(entries), request_id),
            WorkerResponse::DirectoryFailed {
                path,
                error,
                request_id,
            } => self.apply_load(path, Err(error), request_id),
            WorkerResponse::DirSizeComputed { computed, .. } => {
                log::debug!("computed {} directory sizes", computed);
                for dir in self.dirs.values_mut() {
                    if dir.sort_spec().method == SortMethod::Size {
                        dir.sort(&self.opts, height);
                    }
                }
            }
            WorkerResponse::OperationComplete {
                message,
                errors,
                reload,
                focus,
                ..
            } => {
                self.echo(message);
                for err in errors {
                    self.report(CmdError::Other(err));
                }
                for path in reload {
                    if self.dirs.contains_key(&path) || path == self.cwd {
                        self.reload_dir(&path);
                    }
                }
                if let Some(name) = focus
                    && let Some(dir) = self.dirs.get_mut(&self.cwd)
                    && !dir.loading()
                {
                    dir.sel(&name, height, self.opts.scrolloff);
                }
            }
        }
    }

    fn apply_load(&mut self, path: PathBuf, result: io::Result<Vec<FileEntry>>, request_id: u64) {
        if self.load_requests.get(&path) != Some(&request_id) {
            log::debug!("dropping stale listing of {}", path.display());
            return;
        }
        self.load_requests.remove(&path);
        let height = self.height;
        let dir = self
            .dirs
            .entry(path.clone())
            .or_insert_with(|| Directory::new(path, &self.opts));
        dir.apply_read(result, &self.opts, height);
    }
}
