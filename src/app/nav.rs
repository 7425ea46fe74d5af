//! Directory navigation state for lfr.
//!
//! A [Directory] holds every entry of one directory (`all`) plus the visible subset
//! (`files`) produced by the last sort, and the cursor: `ind` indexes `files`, `pos` is the
//! row of the cursor inside the viewport, so the topmost visible entry is `ind - pos`.
//!
//! Movement follows lf's rules: the cursor keeps `scrolloff` rows of context above and below
//! it when the listing allows, and `wrapscroll` wraps `up`/`down` around the ends.
//!
//! Sorting remembers the options it was done with, so the application state can tell whether
//! a cached directory has to be sorted again after a `set`.

use crate::config::{Options, SortMethod};
use crate::core::fm::{self, FileEntry};
use crate::core::search::{find_match, fold_for_sort, glob_match, glob_match_path, natural_cmp, search_match};
use crate::core::CmdError;

use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// The sort options a directory was last sorted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub method: SortMethod,
    pub dirfirst: bool,
    pub reverse: bool,
    pub hidden: bool,
}

impl SortSpec {
    pub fn from_options(opts: &Options) -> Self {
        SortSpec {
            method: opts.sortby,
            dirfirst: opts.dirfirst,
            reverse: opts.reverse,
            hidden: opts.hidden,
        }
    }
}

/// Navigation state of a single directory.
#[derive(Debug)]
pub struct Directory {
    path: PathBuf,
    loading: bool,
    load_time: SystemTime,
    all: Vec<Arc<FileEntry>>,
    files: Vec<Arc<FileEntry>>,
    ind: usize,
    pos: usize,
    sort_spec: SortSpec,
    dironly: bool,
    hidden_patterns: Vec<String>,
    filter: Vec<String>,
    ignorecase: bool,
    ignoredia: bool,
    no_perm: bool,
}

impl Directory {
    /// An empty directory waiting for its entries.
    pub fn new(path: PathBuf, opts: &Options) -> Self {
        Directory {
            path,
            loading: true,
            load_time: SystemTime::now(),
            all: Vec::new(),
            files: Vec::new(),
            ind: 0,
            pos: 0,
            sort_spec: SortSpec::from_options(opts),
            dironly: opts.dironly,
            hidden_patterns: opts.hiddenfiles.clone(),
            filter: Vec::new(),
            ignorecase: opts.ignorecase,
            ignoredia: opts.ignoredia,
            no_perm: false,
        }
    }

    /// Reads `path` synchronously and sorts the result.
    ///
    /// A directory that cannot be read yields an empty listing; `no_perm` is set when the
    /// failure was a permission error.
    pub fn load(path: &Path, opts: &Options, height: usize) -> Self {
        let mut dir = Directory::new(path.to_path_buf(), opts);
        let result = fm::read_dir(path, opts.dircounts);
        dir.apply_read(result, opts, height);
        dir
    }

    /// Replaces the entries with the result of a directory read, keeping the cursor on the
    /// same name when it still exists.
    pub fn apply_read(&mut self, result: io::Result<Vec<FileEntry>>, opts: &Options, height: usize) {
        let entries = match result {
            Ok(entries) => {
                self.no_perm = false;
                entries
            }
            Err(e) => {
                log::info!("reading directory {}: {}", self.path.display(), e);
                self.no_perm = e.kind() == io::ErrorKind::PermissionDenied;
                Vec::new()
            }
        };
        self.all = entries.into_iter().map(Arc::new).collect();
        self.loading = false;
        self.load_time = SystemTime::now();
        self.sort(opts, height);
    }

    // Accessors

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self) {
        self.loading = true;
    }

    #[inline]
    pub fn load_time(&self) -> SystemTime {
        self.load_time
    }

    #[inline]
    pub fn all(&self) -> &[Arc<FileEntry>] {
        &self.all
    }

    #[inline]
    pub fn files(&self) -> &[Arc<FileEntry>] {
        &self.files
    }

    #[inline]
    pub fn ind(&self) -> usize {
        self.ind
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Index of the topmost visible entry.
    #[inline]
    pub fn scroll_top(&self) -> usize {
        self.ind - self.pos
    }

    #[inline]
    pub fn sort_spec(&self) -> &SortSpec {
        &self.sort_spec
    }

    #[inline]
    pub fn filter(&self) -> &[String] {
        &self.filter
    }

    #[inline]
    pub fn no_perm(&self) -> bool {
        self.no_perm
    }

    /// Name of the entry under the cursor, or an empty string for an empty listing.
    pub fn name(&self) -> &str {
        self.files.get(self.ind).map(|f| f.name()).unwrap_or("")
    }

    pub fn current(&self) -> Option<&Arc<FileEntry>> {
        self.files.get(self.ind)
    }

    /// True if the directory was sorted with options that differ from `opts`.
    pub fn needs_sort(&self, opts: &Options) -> bool {
        self.sort_spec != SortSpec::from_options(opts)
            || self.dironly != opts.dironly
            || self.hidden_patterns != opts.hiddenfiles
            || self.ignorecase != opts.ignorecase
            || self.ignoredia != opts.ignoredia
    }

    /// Puts the cursor on `name` if the current entry has a different name.
    ///
    /// `ind` is clamped first, then the first entry called `name` (if any) is selected and
    /// `pos` is derived from the viewport height and `scrolloff`.
    pub fn sel(&mut self, name: &str, height: usize, scrolloff: usize) {
        if self.files.is_empty() {
            self.ind = 0;
            self.pos = 0;
            return;
        }

        self.ind = self.ind.min(self.files.len() - 1);

        if self.files[self.ind].name() != name
            && let Some(i) = self.files.iter().position(|f| f.name() == name)
        {
            self.ind = i;
        }

        let edge = (height / 2)
            .min(scrolloff)
            .min(self.files.len() - self.ind - 1);
        self.pos = self.ind.min(height.saturating_sub(edge + 1));
    }

    /// Sorts `all` with the current options, rebuilds `files` and keeps the cursor on the
    /// same name.
    pub fn sort(&mut self, opts: &Options, height: usize) {
        let name = self.name().to_string();

        self.sort_spec = SortSpec::from_options(opts);
        self.dironly = opts.dironly;
        self.hidden_patterns = opts.hiddenfiles.clone();
        self.ignorecase = opts.ignorecase;
        self.ignoredia = opts.ignoredia;

        let (ic, id) = (opts.ignorecase, opts.ignoredia);
        let by_name = |a: &Arc<FileEntry>, b: &Arc<FileEntry>| {
            natural_cmp(&fold_for_sort(a.name(), ic, id), &fold_for_sort(b.name(), ic, id))
        };

        match opts.sortby {
            SortMethod::Natural => self.all.sort_by(by_name),
            SortMethod::Name => self.all.sort_by(|a, b| {
                fold_for_sort(a.name(), ic, id).cmp(&fold_for_sort(b.name(), ic, id))
            }),
            SortMethod::Size => self
                .all
                .sort_by(|a, b| a.total_size().cmp(&b.total_size()).then_with(|| by_name(a, b))),
            SortMethod::Time => self
                .all
                .sort_by(|a, b| a.modified().cmp(&b.modified()).then_with(|| by_name(a, b))),
            SortMethod::Atime => self
                .all
                .sort_by(|a, b| a.access_time().cmp(&b.access_time()).then_with(|| by_name(a, b))),
            SortMethod::Ctime => self
                .all
                .sort_by(|a, b| a.change_time().cmp(&b.change_time()).then_with(|| by_name(a, b))),
            SortMethod::Ext => self.all.sort_by(|a, b| {
                fold_for_sort(a.ext(), ic, id)
                    .cmp(&fold_for_sort(b.ext(), ic, id))
                    .then_with(|| by_name(a, b))
            }),
        }

        if opts.reverse {
            self.all.reverse();
        }

        if opts.dirfirst {
            // stable: keeps the order inside both groups
            self.all.sort_by_key(|f| !f.is_dir());
        }

        let filter = self.filter.clone();
        self.files = self
            .all
            .iter()
            .filter(|f| opts.hidden || !is_hidden(f, &self.path, &opts.hiddenfiles))
            .filter(|f| !opts.dironly || f.is_dir())
            .filter(|f| !is_filtered(f, &filter, opts))
            .cloned()
            .collect();

        self.sel(&name, height, opts.scrolloff);
    }

    /// Sets the filter patterns and rebuilds the visible list.
    pub fn set_filter(&mut self, filter: Vec<String>, opts: &Options, height: usize) {
        self.filter = filter;
        self.sort(opts, height);
    }

    // Movement

    /// Moves the cursor `dist` entries up. Returns true if it moved.
    pub fn up(&mut self, dist: usize, height: usize, opts: &Options) -> bool {
        let height = height.max(1);
        let old = self.ind;
        if self.files.is_empty() {
            return false;
        }
        if self.ind == 0 {
            if opts.wrapscroll {
                self.bottom(height);
            }
            return old != self.ind;
        }

        self.ind = self.ind.saturating_sub(dist);
        let edge = (height / 2).min(opts.scrolloff).min(self.ind);
        self.pos = self.pos.saturating_sub(dist).max(edge).min(self.ind);
        old != self.ind
    }

    /// Moves the cursor `dist` entries down. Returns true if it moved.
    pub fn down(&mut self, dist: usize, height: usize, opts: &Options) -> bool {
        let height = height.max(1);
        let old = self.ind;
        if self.files.is_empty() {
            return false;
        }
        let maxind = self.files.len() - 1;
        if self.ind >= maxind {
            if opts.wrapscroll {
                self.top();
            }
            return old != self.ind;
        }

        self.ind = (self.ind + dist).min(maxind);
        let edge = (height / 2)
            .min(opts.scrolloff)
            .min(maxind - self.ind)
            .min((height / 2 + height % 2).saturating_sub(1));
        self.pos = (self.pos + dist)
            .min(height - edge - 1)
            .min(self.ind);
        old != self.ind
    }

    /// Moves the viewport `dist` rows up, dragging the cursor along when it would leave
    /// the screen.
    pub fn scroll_up(&mut self, dist: usize, height: usize, opts: &Options) -> bool {
        let height = height.max(1);
        let top = self.scroll_top();
        if self.files.is_empty() || top == 0 {
            return false;
        }
        let new_top = top - dist.min(top);
        let edge = (height / 2).min(opts.scrolloff);
        let max_pos = height.saturating_sub(edge + 1);
        let max_ind = (self.files.len() - 1).min(new_top + max_pos);
        self.ind = self.ind.min(max_ind);
        self.pos = self.ind - new_top;
        true
    }

    /// Moves the viewport `dist` rows down, dragging the cursor along when it would leave
    /// the screen.
    pub fn scroll_down(&mut self, dist: usize, height: usize, opts: &Options) -> bool {
        let height = height.max(1);
        let top = self.scroll_top();
        let max_top = self.files.len().saturating_sub(height);
        if self.files.is_empty() || top >= max_top {
            return false;
        }
        let new_top = (top + dist).min(max_top);
        let edge = (height / 2).min(opts.scrolloff);
        let min_ind = (new_top + edge).min(self.files.len() - 1);
        self.ind = self.ind.max(min_ind);
        self.pos = self.ind - new_top;
        true
    }

    pub fn top(&mut self) -> bool {
        let old = self.ind;
        self.ind = 0;
        self.pos = 0;
        old != self.ind
    }

    pub fn bottom(&mut self, height: usize) -> bool {
        let old = self.ind;
        if self.files.is_empty() {
            return false;
        }
        self.ind = self.files.len() - 1;
        self.pos = self.ind.min(height.max(1) - 1);
        old != self.ind
    }

    /// Cursor to the first visible row, keeping `scrolloff` context.
    pub fn high(&mut self, height: usize, opts: &Options) -> bool {
        if self.files.is_empty() {
            return false;
        }
        let old = self.ind;
        let top = self.scroll_top();
        let edge = (height / 2).min(opts.scrolloff).min(top);
        let visible = (self.files.len() - top).min(height.max(1));
        let edge = edge.min(visible - 1);
        self.ind = top + edge;
        self.pos = edge;
        old != self.ind
    }

    /// Cursor to the middle of the visible rows.
    pub fn middle(&mut self, height: usize) -> bool {
        if self.files.is_empty() {
            return false;
        }
        let old = self.ind;
        let top = self.scroll_top();
        let end = (self.files.len() - 1 - top).min(height.max(1) - 1);
        let half = end / 2;
        self.ind = top + half;
        self.pos = half;
        old != self.ind
    }

    /// Cursor to the last visible row, keeping `scrolloff` context.
    pub fn low(&mut self, height: usize, opts: &Options) -> bool {
        if self.files.is_empty() {
            return false;
        }
        let old = self.ind;
        let top = self.scroll_top();
        let end = (self.files.len() - 1 - top).min(height.max(1) - 1);
        let edge = (height / 2)
            .min(opts.scrolloff)
            .min(self.files.len() - 1 - (top + end))
            .min(end);
        self.ind = top + end - edge;
        self.pos = end - edge;
        old != self.ind
    }

    /// Moves the cursor to index `i` with the `up`/`down` rules.
    pub fn move_to(&mut self, i: usize, height: usize, opts: &Options) -> bool {
        let mut no_wrap = opts.clone();
        no_wrap.wrapscroll = false;
        match i.cmp(&self.ind) {
            Ordering::Greater => self.down(i - self.ind, height, &no_wrap),
            Ordering::Less => self.up(self.ind - i, height, &no_wrap),
            Ordering::Equal => false,
        }
    }

    // Search and find

    /// Index of the next entry matching a search pattern, honouring `wrapscan`.
    pub fn search_index(&self, pattern: &str, forward: bool, opts: &Options) -> Result<Option<usize>, CmdError> {
        for i in scan_order(self.ind, self.files.len(), forward, opts.wrapscan) {
            if search_match(self.files[i].name(), pattern, opts)? {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Index of the next entry matching a find pattern, honouring `wrapscan`.
    pub fn find_index(&self, pattern: &str, forward: bool, opts: &Options) -> Option<usize> {
        scan_order(self.ind, self.files.len(), forward, opts.wrapscan)
            .find(|&i| find_match(self.files[i].name(), pattern, opts))
    }

    /// Number of entries a find pattern matches.
    pub fn find_count(&self, pattern: &str, opts: &Options) -> usize {
        self.files
            .iter()
            .filter(|f| find_match(f.name(), pattern, opts))
            .count()
    }
}

/// Indices after (or before) `ind`, wrapping around when `wrap` is set.
fn scan_order(ind: usize, len: usize, forward: bool, wrap: bool) -> Box<dyn Iterator<Item = usize>> {
    if len == 0 {
        return Box::new(std::iter::empty());
    }
    let steps = if wrap { len - 1 } else if forward { len - 1 - ind.min(len - 1) } else { ind.min(len - 1) };
    if forward {
        Box::new((1..=steps).map(move |k| (ind + k) % len))
    } else {
        Box::new((1..=steps).map(move |k| (ind + len - k) % len))
    }
}

/// True if `hiddenfiles` hides the entry. Later patterns override earlier ones; `!` negates.
pub fn is_hidden(entry: &FileEntry, dir: &Path, patterns: &[String]) -> bool {
    let mut hidden = false;
    for pattern in patterns {
        let (negated, pat) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern.as_str()),
        };
        let matched = if pat.contains('/') {
            glob_match_path(pat, &dir.join(entry.name()))
        } else {
            glob_match(pat, entry.name())
        };
        match matched {
            Ok(true) => hidden = !negated,
            Ok(false) => {}
            Err(e) => log::info!("hiddenfiles: {}", e),
        }
    }
    hidden
}

/// True if the filter removes the entry: a plain pattern must match, a `!` pattern must not.
pub fn is_filtered(entry: &FileEntry, filter: &[String], opts: &Options) -> bool {
    for pattern in filter {
        let (negated, pat) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern.as_str()),
        };
        match search_match(entry.name(), pat, opts) {
            Ok(matched) if matched == negated => return true,
            Ok(_) => {}
            Err(e) => log::info!("filter: {}", e),
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rng;
    use rand::seq::SliceRandom;
    use std::error;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn dir_with(names: &[&str]) -> Result<(tempfile::TempDir, Directory), Box<dyn error::Error>> {
        let tmp = tempdir()?;
        let mut shuffled = names.to_vec();
        shuffled.shuffle(&mut rng());
        for name in shuffled {
            if let Some(d) = name.strip_suffix('/') {
                fs::create_dir(tmp.path().join(d))?;
            } else {
                File::create(tmp.path().join(name))?;
            }
        }
        let dir = Directory::load(tmp.path(), &Options::default(), 10);
        Ok((tmp, dir))
    }

    fn names(dir: &Directory) -> Vec<&str> {
        dir.files().iter().map(|f| f.name()).collect()
    }

    #[test]
    fn empty_directory_selection() -> Result<(), Box<dyn error::Error>> {
        let (_tmp, mut dir) = dir_with(&[])?;
        dir.sel("anything", 10, 3);
        assert_eq!((dir.ind(), dir.pos()), (0, 0));
        assert_eq!(dir.name(), "");
        assert!(dir.current().is_none());
        Ok(())
    }

    #[test]
    fn default_sort_is_natural_dirs_first_no_hidden() -> Result<(), Box<dyn error::Error>> {
        let (_tmp, dir) = dir_with(&["file10", "file2", ".hidden", "zdir/", "adir/", "File1"])?;
        assert_eq!(names(&dir), vec!["adir", "zdir", "File1", "file2", "file10"]);
        assert_eq!(dir.all().len(), 6);
        Ok(())
    }

    #[test]
    fn sort_options_apply() -> Result<(), Box<dyn error::Error>> {
        let (_tmp, mut dir) = dir_with(&["b.rs", "a.toml", "c.md", "sub/", ".env"])?;

        let mut opts = Options {
            sortby: SortMethod::Ext,
            hidden: true,
            dirfirst: false,
            ..Options::default()
        };
        dir.sort(&opts, 10);
        // ".env" has the extension ".env", directories have none
        assert_eq!(names(&dir), vec!["sub", ".env", "c.md", "b.rs", "a.toml"]);

        opts.reverse = true;
        dir.sort(&opts, 10);
        assert_eq!(names(&dir), vec!["a.toml", "b.rs", "c.md", ".env", "sub"]);

        opts.dironly = true;
        dir.sort(&opts, 10);
        assert_eq!(names(&dir), vec!["sub"]);
        assert!(!dir.needs_sort(&opts));
        opts.dironly = false;
        assert!(dir.needs_sort(&opts));
        Ok(())
    }

    #[test]
    fn hiddenfiles_negation_and_paths() -> Result<(), Box<dyn error::Error>> {
        let (tmp, mut dir) = dir_with(&[".keep", ".git", "notes.bak", "main.rs"])?;
        let opts = Options {
            hiddenfiles: vec![
                ".*".to_string(),
                "!.keep".to_string(),
                format!("{}/*.bak", tmp.path().display()),
            ],
            dirfirst: false,
            ..Options::default()
        };
        dir.sort(&opts, 10);
        assert_eq!(names(&dir), vec![".keep", "main.rs"]);
        Ok(())
    }

    #[test]
    fn filter_patterns() -> Result<(), Box<dyn error::Error>> {
        let (_tmp, mut dir) = dir_with(&["alpha.rs", "beta.rs", "gamma.md"])?;
        let opts = Options::default();
        dir.set_filter(vec!["rs".to_string()], &opts, 10);
        assert_eq!(names(&dir), vec!["alpha.rs", "beta.rs"]);
        dir.set_filter(vec!["rs".to_string(), "!beta".to_string()], &opts, 10);
        assert_eq!(names(&dir), vec!["alpha.rs"]);
        dir.set_filter(Vec::new(), &opts, 10);
        assert_eq!(dir.files().len(), 3);
        Ok(())
    }

    #[test]
    fn selection_survives_resort() -> Result<(), Box<dyn error::Error>> {
        let (_tmp, mut dir) = dir_with(&["a", "b", "c", "d"])?;
        let opts = Options::default();
        dir.sel("c", 10, 0);
        assert_eq!(dir.name(), "c");
        let reversed = Options {
            reverse: true,
            ..Options::default()
        };
        dir.sort(&reversed, 10);
        assert_eq!(dir.name(), "c");
        assert_eq!(dir.ind(), 1);
        dir.sort(&opts, 10);
        assert_eq!(dir.ind(), 2);
        Ok(())
    }

    #[test]
    fn sel_respects_scrolloff() -> Result<(), Box<dyn error::Error>> {
        let names: Vec<String> = (0..20).map(|i| format!("f{i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let (_tmp, mut dir) = dir_with(&refs)?;

        dir.sel("f15", 10, 3);
        assert_eq!(dir.ind(), 15);
        // edge = min(5, 3, 4) = 3, pos = min(15, 10 - 3 - 1)
        assert_eq!(dir.pos(), 6);

        dir.sel("f19", 10, 3);
        assert_eq!(dir.pos(), 9);
        assert!(dir.ind() < dir.files().len());
        Ok(())
    }

    #[test]
    fn up_down_and_wrapscroll() -> Result<(), Box<dyn error::Error>> {
        let names: Vec<String> = (0..30).map(|i| format!("f{i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let (_tmp, mut dir) = dir_with(&refs)?;
        let mut opts = Options {
            scrolloff: 2,
            ..Options::default()
        };
        let h = 10;

        assert!(dir.down(1, h, &opts));
        assert_eq!((dir.ind(), dir.pos()), (1, 1));
        dir.down(10, h, &opts);
        assert_eq!(dir.ind(), 11);
        assert_eq!(dir.pos(), 7, "cursor keeps two rows below it");
        dir.up(3, h, &opts);
        assert_eq!((dir.ind(), dir.pos()), (8, 4));
        dir.up(100, h, &opts);
        assert_eq!((dir.ind(), dir.pos()), (0, 0));

        assert!(!dir.up(1, h, &opts), "no wrap by default");
        opts.wrapscroll = true;
        assert!(dir.up(1, h, &opts));
        assert_eq!((dir.ind(), dir.pos()), (29, 9));
        assert!(dir.down(1, h, &opts));
        assert_eq!((dir.ind(), dir.pos()), (0, 0));
        Ok(())
    }

    #[test]
    fn high_middle_low_and_scroll() -> Result<(), Box<dyn error::Error>> {
        let names: Vec<String> = (0..30).map(|i| format!("f{i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let (_tmp, mut dir) = dir_with(&refs)?;
        let opts = Options {
            scrolloff: 2,
            ..Options::default()
        };
        let h = 10;

        dir.down(15, h, &opts);
        let top = dir.scroll_top();
        dir.high(h, &opts);
        assert_eq!(dir.ind(), top + 2);
        dir.middle(h);
        assert_eq!(dir.ind(), top + 4);
        dir.low(h, &opts);
        assert_eq!(dir.ind(), top + 7);
        assert_eq!(dir.scroll_top(), top);

        assert!(dir.scroll_down(1, h, &opts));
        assert_eq!(dir.scroll_top(), top + 1);
        assert!(dir.scroll_up(5, h, &opts));
        assert_eq!(dir.scroll_top(), top - 4);
        assert!(dir.pos() <= h - 1 - 2);

        dir.top();
        assert!(!dir.scroll_up(1, h, &opts));
        dir.bottom(h);
        assert_eq!((dir.ind(), dir.pos()), (29, 9));
        assert!(!dir.scroll_down(1, h, &opts));
        Ok(())
    }

    #[test]
    fn search_and_find_wrap() -> Result<(), Box<dyn error::Error>> {
        let (_tmp, mut dir) = dir_with(&["apple", "banana", "cherry", "apricot"])?;
        let mut opts = Options {
            dirfirst: false,
            ..Options::default()
        };
        dir.sort(&opts, 10);
        assert_eq!(names(&dir), vec!["apple", "apricot", "banana", "cherry"]);

        assert_eq!(dir.search_index("an", true, &opts)?, Some(2));
        assert_eq!(dir.search_index("ap", true, &opts)?, Some(1));
        dir.move_to(3, 10, &opts);
        assert_eq!(dir.search_index("ap", true, &opts)?, Some(0));
        opts.wrapscan = false;
        assert_eq!(dir.search_index("ap", true, &opts)?, None);
        assert_eq!(dir.search_index("ap", false, &opts)?, Some(1));

        assert_eq!(dir.find_index("b", false, &opts), Some(2));
        assert_eq!(dir.find_count("ap", &opts), 2);
        opts.anchorfind = false;
        assert_eq!(dir.find_count("an", &opts), 1);
        Ok(())
    }

    #[test]
    fn unreadable_directory_is_empty() -> Result<(), Box<dyn error::Error>> {
        let tmp = tempdir()?;
        let dir = Directory::load(&tmp.path().join("missing"), &Options::default(), 10);
        assert!(dir.files().is_empty());
        assert!(!dir.no_perm());
        assert!(!dir.loading());
        Ok(())
    }

    #[test]
    fn permission_denied_is_flagged() -> Result<(), Box<dyn error::Error>> {
        let (_tmp, mut dir) = dir_with(&["a", "b", "c"])?;
        let opts = Options::default();
        dir.down(2, 10, &opts);
        assert_eq!(dir.ind(), 2);

        dir.apply_read(Err(io::Error::from(io::ErrorKind::PermissionDenied)), &opts, 10);
        assert!(dir.no_perm());
        assert!(dir.all().is_empty());
        assert!(dir.files().is_empty());
        assert_eq!((dir.ind(), dir.pos()), (0, 0));
        assert!(dir.current().is_none());

        dir.apply_read(Ok(Vec::new()), &opts, 10);
        assert!(!dir.no_perm());
        Ok(())
    }
}
