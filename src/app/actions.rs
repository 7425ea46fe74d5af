//! Navigation and file action methods for lfr.
//!
//! This module implements the [AppState] methods behind the built-in commands: changing
//! directory, cursor movement, the jump list, selections, marks, tags, the clipboard, file
//! operations, search, find and filtering. Directory loads and file operations go to the
//! worker threads when they are running and are done in place otherwise.

use crate::app::nav::Directory;
use crate::app::state::{AppState, Clipboard};
use crate::core::fm;
use crate::core::search::glob_match;
use crate::core::worker::{FileOperation, WorkerResponse, WorkerTask, execute_file_op};
use crate::core::CmdError;
use crate::utils::expand_home_path;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A cursor movement in the current directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Up(usize),
    Down(usize),
    ScrollUp(usize),
    ScrollDown(usize),
    Top,
    Bottom,
    High,
    Middle,
    Low,
}

impl AppState {
    // Loading

    pub(super) fn next_request_id(&mut self) -> u64 {
        self.request_id = self.request_id.wrapping_add(1);
        self.request_id
    }

    /// Loads the current directory unless it is cached.
    pub(super) fn load_current(&mut self) {
        if !self.dirs.contains_key(&self.cwd) {
            let cwd = self.cwd.clone();
            self.reload_dir(&cwd);
        }
    }

    /// Reads `path` again, on a worker if there is one.
    pub(super) fn reload_dir(&mut self, path: &Path) {
        let height = self.height;
        if self.workers.is_some() {
            let request_id = self.next_request_id();
            self.dirs
                .entry(path.to_path_buf())
                .or_insert_with(|| Directory::new(path.to_path_buf(), &self.opts))
                .set_loading();
            self.load_requests.insert(path.to_path_buf(), request_id);
            if let Some(workers) = &self.workers {
                workers.submit(WorkerTask::LoadDirectory {
                    path: path.to_path_buf(),
                    dircounts: self.opts.dircounts,
                    request_id,
                });
            }
            return;
        }

        let result = fm::read_dir(path, self.opts.dircounts);
        self.dirs
            .entry(path.to_path_buf())
            .or_insert_with(|| Directory::new(path.to_path_buf(), &self.opts))
            .apply_read(result, &self.opts, height);
    }

    /// Reloads the current directory if it changed on disk since it was read.
    pub fn load(&mut self) {
        let cwd = self.cwd.clone();
        let stale = match (self.dirs.get(&cwd), fs::metadata(&cwd).and_then(|m| m.modified())) {
            (Some(dir), Ok(mtime)) => !dir.loading() && mtime > dir.load_time(),
            (None, _) => true,
            (Some(_), Err(_)) => false,
        };
        if stale {
            self.reload_dir(&cwd);
        }
    }

    /// Reads every cached directory again; directories that vanished are dropped.
    pub fn reload(&mut self) {
        let paths: Vec<PathBuf> = self.dirs.keys().cloned().collect();
        for path in paths {
            if path.is_dir() {
                self.reload_dir(&path);
            } else {
                self.dirs.remove(&path);
            }
        }
        self.load_current();
    }

    // Directory changes

    /// Resolves a user typed path against the current directory.
    fn resolve_path(&self, target: &str) -> PathBuf {
        let path = expand_home_path(target);
        if path.is_absolute() {
            path
        } else {
            self.cwd.join(path)
        }
    }

    /// `cd`: an empty target goes home.
    pub fn cd(&mut self, target: &str) -> Result<(), CmdError> {
        let target = if target.is_empty() { "~" } else { target };
        let path = self.resolve_path(target);
        let path = path
            .canonicalize()
            .map_err(|e| CmdError::filesystem(&path, e))?;
        if !path.is_dir() {
            return Err(CmdError::filesystem(
                &path,
                io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }
        self.change_dir(path, true);
        Ok(())
    }

    /// Makes `path` the current directory. The previous one is kept as the `'` mark.
    pub(super) fn change_dir(&mut self, path: PathBuf, record_jump: bool) {
        if path == self.cwd {
            return;
        }
        let old = std::mem::replace(&mut self.cwd, path.clone());
        self.marks.insert('\'', old);

        if record_jump {
            self.jumps.truncate(self.jump_ind + 1);
            self.jumps.push(path.clone());
            self.jump_ind = self.jumps.len() - 1;
        }

        if !self.opts.dircache {
            self.dirs.remove(&path);
        }
        match self.dirs.get_mut(&path) {
            Some(dir) if dir.needs_sort(&self.opts) => dir.sort(&self.opts, self.height),
            Some(_) => {}
            None => self.reload_dir(&path),
        }
    }

    /// Goes to the parent directory with the cursor on the directory just left.
    pub fn updir(&mut self) {
        let Some(parent) = self.cwd.parent().map(Path::to_path_buf) else {
            return;
        };
        let name = self
            .cwd
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        self.change_dir(parent, true);
        if let Some(name) = name {
            self.sel_in_current(&name);
        }
    }

    /// Enters the directory under the cursor. Files need a user defined `open` command.
    pub fn open(&mut self) -> Result<(), CmdError> {
        let Some(entry) = self.current_entry() else {
            return Ok(());
        };
        if entry.is_dir() {
            let path = entry
                .path()
                .canonicalize()
                .map_err(|e| CmdError::filesystem(entry.path(), e))?;
            self.change_dir(path, true);
        } else {
            log::info!("no open command defined for {}", entry.path().display());
        }
        Ok(())
    }

    /// `select`: goes to the directory containing `target` and puts the cursor on it.
    pub fn select(&mut self, target: &str) -> Result<(), CmdError> {
        let path = self.resolve_path(target);
        fs::symlink_metadata(&path).map_err(|e| CmdError::filesystem(&path, e))?;
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return Err(CmdError::Other(format!("select: invalid path {}", path.display())));
        };
        let parent = parent
            .canonicalize()
            .map_err(|e| CmdError::filesystem(parent, e))?;
        let name = name.to_string_lossy().into_owned();
        self.change_dir(parent, true);
        self.sel_in_current(&name);
        Ok(())
    }

    fn sel_in_current(&mut self, name: &str) {
        let (height, scrolloff) = (self.height, self.opts.scrolloff);
        if let Some(dir) = self.dirs.get_mut(&self.cwd)
            && !dir.loading()
        {
            dir.sel(name, height, scrolloff);
        }
    }

    /// Walks the jump list of visited directories.
    pub fn jump(&mut self, forward: bool) -> Result<(), CmdError> {
        let ind = if forward {
            if self.jump_ind + 1 >= self.jumps.len() {
                return Ok(());
            }
            self.jump_ind + 1
        } else {
            if self.jump_ind == 0 {
                return Ok(());
            }
            self.jump_ind - 1
        };
        let path = self.jumps[ind].clone();
        if !path.is_dir() {
            self.jumps.remove(ind);
            self.jump_ind = self.jump_ind.min(self.jumps.len().saturating_sub(1));
            return Err(CmdError::filesystem(
                &path,
                io::Error::new(io::ErrorKind::NotFound, "directory no longer exists"),
            ));
        }
        self.jump_ind = ind;
        self.change_dir(path, false);
        Ok(())
    }

    // Movement

    /// Moves the cursor in the current directory. Returns true if it moved.
    pub fn navigate(&mut self, motion: Motion) -> bool {
        let height = self.height;
        let opts = &self.opts;
        let Some(dir) = self.dirs.get_mut(&self.cwd) else {
            return false;
        };
        match motion {
            Motion::Up(n) => dir.up(n, height, opts),
            Motion::Down(n) => dir.down(n, height, opts),
            Motion::ScrollUp(n) => dir.scroll_up(n, height, opts),
            Motion::ScrollDown(n) => dir.scroll_down(n, height, opts),
            Motion::Top => dir.top(),
            Motion::Bottom => dir.bottom(height),
            Motion::High => dir.high(height, opts),
            Motion::Middle => dir.middle(height),
            Motion::Low => dir.low(height, opts),
        }
    }

    // Selections

    /// Selections if there are any, otherwise the entry under the cursor.
    pub fn targets(&self) -> Vec<PathBuf> {
        let sel = self.selections();
        if !sel.is_empty() {
            return sel;
        }
        self.current_entry()
            .map(|e| vec![e.path().to_path_buf()])
            .unwrap_or_default()
    }

    fn toggle_path(&mut self, path: PathBuf) {
        if self.selections.remove(&path).is_none() {
            self.sel_counter += 1;
            self.selections.insert(path, self.sel_counter);
        }
    }

    pub fn toggle(&mut self) {
        if let Some(entry) = self.current_entry() {
            self.toggle_path(entry.path().to_path_buf());
        }
    }

    /// Toggles the selection of every visible entry.
    pub fn invert(&mut self) {
        let paths: Vec<PathBuf> = self
            .current_dir()
            .map(|d| d.files().iter().map(|f| f.path().to_path_buf()).collect())
            .unwrap_or_default();
        for path in paths {
            self.toggle_path(path);
        }
    }

    pub fn unselect(&mut self) {
        self.selections.clear();
    }

    /// Selects (or unselects) the visible entries whose name matches a glob.
    pub fn glob_select(&mut self, pattern: &str, select: bool) -> Result<(), CmdError> {
        let mut matched = Vec::new();
        if let Some(dir) = self.current_dir() {
            for f in dir.files() {
                if glob_match(pattern, f.name())? {
                    matched.push(f.path().to_path_buf());
                }
            }
        }
        for path in matched {
            if select {
                if !self.selections.contains_key(&path) {
                    self.sel_counter += 1;
                    self.selections.insert(path, self.sel_counter);
                }
            } else {
                self.selections.remove(&path);
            }
        }
        Ok(())
    }

    // Marks and tags

    pub fn mark_save(&mut self, mark: char) {
        self.marks.insert(mark, self.cwd.clone());
    }

    pub fn mark_load(&mut self, mark: char) -> Result<(), CmdError> {
        let path = self
            .marks
            .get(&mark)
            .cloned()
            .ok_or_else(|| CmdError::Other(format!("mark-load: no such mark: {}", mark)))?;
        if !path.is_dir() {
            return Err(CmdError::filesystem(
                &path,
                io::Error::new(io::ErrorKind::NotFound, "marked directory no longer exists"),
            ));
        }
        self.change_dir(path, true);
        Ok(())
    }

    pub fn mark_remove(&mut self, mark: char) -> Result<(), CmdError> {
        self.marks
            .remove(&mark)
            .map(|_| ())
            .ok_or_else(|| CmdError::Other(format!("mark-remove: no such mark: {}", mark)))
    }

    /// Tags the targets with `text`; an empty text removes their tags.
    pub fn tag(&mut self, text: &str) {
        for path in self.targets() {
            if text.is_empty() {
                self.tags.remove(&path);
            } else {
                self.tags.insert(path, text.to_string());
            }
        }
    }

    /// Toggles `text` (default `*`) on every target.
    pub fn tag_toggle(&mut self, text: &str) {
        let text = if text.is_empty() { "*" } else { text };
        for path in self.targets() {
            if self.tags.get(&path).is_some_and(|t| t == text) {
                self.tags.remove(&path);
            } else {
                self.tags.insert(path, text.to_string());
            }
        }
    }

    // Clipboard and file operations

    /// Puts the targets in the clipboard and clears the selections.
    pub fn copy(&mut self, cut: bool) -> Result<(), CmdError> {
        let paths = self.targets();
        if paths.is_empty() {
            return Err(CmdError::Other("no file selected".to_string()));
        }
        self.echo(format!(
            "{} {} item(s)",
            if cut { "cut" } else { "copied" },
            paths.len()
        ));
        self.clipboard = Clipboard { paths, cut };
        self.selections.clear();
        Ok(())
    }

    pub fn clear_clipboard(&mut self) {
        self.clipboard = Clipboard::default();
    }

    /// Copies or moves the clipboard into the current directory. A cut clipboard is emptied.
    pub fn paste(&mut self) -> Result<(), CmdError> {
        if self.clipboard.paths.is_empty() {
            return Err(CmdError::Other("clipboard is empty".to_string()));
        }
        let Clipboard { paths, cut } = self.clipboard.clone();
        if cut {
            self.clear_clipboard();
        }
        self.file_op(FileOperation::Paste {
            src: paths,
            dest: self.cwd.clone(),
            cut,
        });
        Ok(())
    }

    pub fn delete(&mut self) -> Result<(), CmdError> {
        let paths = self.targets();
        if paths.is_empty() {
            return Err(CmdError::Other("no file selected".to_string()));
        }
        for p in &paths {
            self.tags.remove(p);
        }
        self.selections.clear();
        self.file_op(FileOperation::Delete(paths));
        Ok(())
    }

    /// Renames the entry under the cursor; `name` may be a path relative to the directory.
    pub fn rename(&mut self, name: &str) -> Result<(), CmdError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CmdError::Other("rename: empty name".to_string()));
        }
        let entry = self
            .current_entry()
            .ok_or_else(|| CmdError::Other("rename: no file selected".to_string()))?;
        let new = self.resolve_path(name);
        if new == entry.path() {
            return Ok(());
        }
        self.file_op(FileOperation::Rename {
            old: entry.path().to_path_buf(),
            new,
        });
        Ok(())
    }

    fn file_op(&mut self, op: FileOperation) {
        let request_id = self.next_request_id();
        if let Some(workers) = &self.workers {
            workers.submit(WorkerTask::FileOp { op, request_id });
            return;
        }
        let response = execute_file_op(op, request_id);
        self.apply_response(response);
    }

    /// Computes the size of the selected directories, or of the one under the cursor.
    pub fn calc_dir_size(&mut self) {
        let Some(dir) = self.current_dir() else {
            return;
        };
        let selected: Vec<_> = dir
            .files()
            .iter()
            .filter(|f| self.selections.contains_key(f.path()))
            .cloned()
            .collect();
        let entries: Vec<Arc<fm::FileEntry>> = if selected.is_empty() {
            dir.current().cloned().into_iter().collect()
        } else {
            selected
        };
        let entries: Vec<_> = entries.into_iter().filter(|e| e.is_dir()).collect();
        if entries.is_empty() {
            return;
        }

        let request_id = self.next_request_id();
        if let Some(workers) = &self.workers {
            workers.submit(WorkerTask::CalcDirSize {
                entries,
                request_id,
            });
            return;
        }

        let mut computed = 0;
        for entry in &entries {
            match fm::calc_dir_size(entry.path()) {
                Ok(size) => {
                    entry.set_dir_size(size);
                    computed += 1;
                }
                Err(e) => log::info!("calculating size of {}: {}", entry.path().display(), e),
            }
        }
        self.apply_response(WorkerResponse::DirSizeComputed {
            computed,
            request_id,
        });
    }

    // Search, find and filter

    /// Moves to the next entry matching a search pattern and remembers it for
    /// `search-next`/`search-prev`.
    pub fn search(&mut self, pattern: &str, forward: bool) -> Result<(), CmdError> {
        self.last_search = Some((pattern.to_string(), forward));
        self.search_step(pattern, forward)
    }

    /// Repeats the last search; `reverse` flips its direction.
    pub fn search_again(&mut self, reverse: bool) -> Result<(), CmdError> {
        let Some((pattern, forward)) = self.last_search.clone() else {
            return Ok(());
        };
        self.search_step(&pattern, forward != reverse)
    }

    pub(super) fn search_step(&mut self, pattern: &str, forward: bool) -> Result<(), CmdError> {
        let Some(dir) = self.current_dir() else {
            return Ok(());
        };
        match dir.search_index(pattern, forward, &self.opts)? {
            Some(i) => {
                self.move_cursor_to(i);
                Ok(())
            }
            None => Err(CmdError::Other(format!("search: pattern not found: {}", pattern))),
        }
    }

    pub fn find(&mut self, pattern: &str, forward: bool) -> Result<(), CmdError> {
        self.last_find = Some((pattern.to_string(), forward));
        self.find_step(pattern, forward)
    }

    pub fn find_again(&mut self, reverse: bool) -> Result<(), CmdError> {
        let Some((pattern, forward)) = self.last_find.clone() else {
            return Ok(());
        };
        self.find_step(&pattern, forward != reverse)
    }

    fn find_step(&mut self, pattern: &str, forward: bool) -> Result<(), CmdError> {
        let Some(dir) = self.current_dir() else {
            return Ok(());
        };
        match dir.find_index(pattern, forward, &self.opts) {
            Some(i) => {
                self.move_cursor_to(i);
                Ok(())
            }
            None => Err(CmdError::Other(format!("find: pattern not found: {}", pattern))),
        }
    }

    fn move_cursor_to(&mut self, i: usize) {
        let height = self.height;
        if let Some(dir) = self.dirs.get_mut(&self.cwd) {
            dir.move_to(i, height, &self.opts);
        }
    }

    /// Replaces the filter of the current directory. No patterns clears it.
    pub fn set_filter(&mut self, patterns: Vec<String>) {
        let height = self.height;
        if let Some(dir) = self.dirs.get_mut(&self.cwd) {
            dir.set_filter(patterns, &self.opts, height);
        }
    }

    /// Runs every command of a file.
    pub fn source(&mut self, path: &str) -> Result<(), CmdError> {
        let path = self.resolve_path(path);
        let text = fs::read_to_string(&path).map_err(|e| CmdError::filesystem(&path, e))?;
        self.run_text(&text)
    }
}
