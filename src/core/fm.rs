//! Directory reading and file metadata for lfr.
//!
//! Provides the [FileEntry] struct which is used throughout lfr, and [read_dir] which builds
//! one entry per child of a directory.
//!
//! Entries are immutable once built, except for the lazily computed directory size and
//! directory entry count. Those live in write-once cells so a background worker can fill them
//! in while the entry is shared (via `Arc`) with the navigation state.

use once_cell::sync::OnceCell;

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Maximum number of children scanned when counting a directory.
pub const DIR_COUNT_LIMIT: usize = 1000;

/// Used to check the executable bits on unix.
#[cfg(unix)]
const EXEC_FLAG: u32 = 0o111;

/// Whether an entry is a symlink, and if so whether its target could be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    NotLink,
    Working,
    Broken,
}

/// Result of counting the children of a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirCount {
    /// Number of children, capped at [DIR_COUNT_LIMIT].
    Counted(usize),
    /// The directory could not be opened or listed.
    Unreadable,
}

/// A single filesystem object inside a listed directory.
///
/// For a working symlink the stored metadata is the target's, for a broken one it is the
/// link's own.
#[derive(Debug)]
pub struct FileEntry {
    name: String,
    path: PathBuf,
    link_state: LinkState,
    link_target: Option<PathBuf>,
    metadata: Metadata,
    modified: SystemTime,
    access_time: SystemTime,
    change_time: SystemTime,
    ext: String,
    dir_count: OnceCell<DirCount>,
    dir_size: OnceCell<u64>,
}

impl FileEntry {
    /// Builds an entry for a single path.
    ///
    /// Symlinks are resolved; an unreachable target yields [LinkState::Broken] instead of an
    /// error. When `dircounts` is set and the entry is a directory its children are counted
    /// right away.
    pub fn from_path(path: &Path, dircounts: bool) -> io::Result<FileEntry> {
        let lstat = fs::symlink_metadata(path)?;

        let (link_state, metadata) = if lstat.file_type().is_symlink() {
            match fs::metadata(path) {
                Ok(stat) => (LinkState::Working, stat),
                Err(_) => (LinkState::Broken, lstat),
            }
        } else {
            (LinkState::NotLink, lstat)
        };

        let link_target = if link_state != LinkState::NotLink {
            match fs::read_link(path) {
                Ok(target) => Some(target),
                Err(e) => {
                    log::info!("reading link target of {}: {}", path.display(), e);
                    None
                }
            }
        } else {
            None
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let access_time = metadata.accessed().unwrap_or(modified);
        let change_time = change_time(&metadata, modified);

        let ext = if metadata.is_dir() {
            String::new()
        } else {
            extension_of(&name).to_string()
        };

        let dir_count = OnceCell::new();
        if dircounts && metadata.is_dir() {
            let _ = dir_count.set(count_entries(path));
        }

        Ok(FileEntry {
            name,
            path: path.to_path_buf(),
            link_state,
            link_target,
            metadata,
            modified,
            access_time,
            change_time,
            ext,
            dir_count,
            dir_size: OnceCell::new(),
        })
    }

    // Accessors

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn link_state(&self) -> LinkState {
        self.link_state
    }

    #[inline]
    pub fn link_target(&self) -> Option<&Path> {
        self.link_target.as_deref()
    }

    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.link_state != LinkState::NotLink
    }

    /// Raw size in bytes as reported by the metadata.
    #[inline]
    pub fn size(&self) -> u64 {
        self.metadata.len()
    }

    #[inline]
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    #[inline]
    pub fn access_time(&self) -> SystemTime {
        self.access_time
    }

    #[inline]
    pub fn change_time(&self) -> SystemTime {
        self.change_time
    }

    #[inline]
    pub fn ext(&self) -> &str {
        &self.ext
    }

    #[inline]
    pub fn dir_count(&self) -> Option<DirCount> {
        self.dir_count.get().copied()
    }

    #[inline]
    pub fn dir_size(&self) -> Option<u64> {
        self.dir_size.get().copied()
    }

    /// Stores the computed directory size. Returns false if a size was already stored.
    pub fn set_dir_size(&self, size: u64) -> bool {
        self.dir_size.set(size).is_ok()
    }

    /// Stores the directory entry count. Returns false if a count was already stored.
    pub fn set_dir_count(&self, count: DirCount) -> bool {
        self.dir_count.set(count).is_ok()
    }

    /// Size used for sorting and display.
    ///
    /// Directories report their computed size, or 0 while it is unknown.
    pub fn total_size(&self) -> u64 {
        if self.is_dir() {
            return self.dir_size().unwrap_or(0);
        }
        self.size()
    }
}

/// Reads the contents of the provided directory and returns one [FileEntry] per child,
/// in the order the filesystem lists them.
///
/// Children that vanish between listing and stat are skipped silently, other per-child
/// failures are logged and skipped.
///
/// # Returns
/// A Result containing the entries or the error that prevented opening `path`.
pub fn read_dir(path: &Path, dircounts: bool) -> io::Result<Vec<FileEntry>> {
    let mut entries = Vec::with_capacity(256);

    for child in fs::read_dir(path)? {
        let child = match child {
            Ok(c) => c,
            Err(e) => {
                log::info!("listing {}: {}", path.display(), e);
                continue;
            }
        };

        let fpath = path.join(child.file_name());
        match FileEntry::from_path(&fpath, dircounts) {
            Ok(entry) => entries.push(entry),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                log::info!("getting file information of {}: {}", fpath.display(), e);
                continue;
            }
        }
    }
    Ok(entries)
}

/// Counts the children of `path`, scanning at most [DIR_COUNT_LIMIT] of them.
pub fn count_entries(path: &Path) -> DirCount {
    let Ok(children) = fs::read_dir(path) else {
        return DirCount::Unreadable;
    };
    let mut count = 0;
    for child in children.take(DIR_COUNT_LIMIT) {
        if child.is_err() {
            return DirCount::Unreadable;
        }
        count += 1;
    }
    DirCount::Counted(count)
}

/// Total size in bytes of everything below `path`. Symlinks are not followed.
///
/// Unreadable subdirectories are logged and left out of the total.
pub fn calc_dir_size(path: &Path) -> io::Result<u64> {
    let mut total = 0u64;
    for child in fs::read_dir(path)? {
        let Ok(child) = child else {
            continue;
        };
        let Ok(md) = child.metadata() else {
            continue;
        };
        if md.is_dir() {
            match calc_dir_size(&child.path()) {
                Ok(size) => total += size,
                Err(e) => log::info!("sizing {}: {}", child.path().display(), e),
            }
        } else {
            total += md.len();
        }
    }
    Ok(total)
}

/// Returns true if the metadata describes something the current platform would execute.
pub fn is_executable(md: &Metadata, name: &str) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = name;
        md.permissions().mode() & EXEC_FLAG != 0
    }
    #[cfg(windows)]
    {
        let _ = md;
        let ext = extension_of(name).trim_start_matches('.').to_lowercase();
        matches!(ext.as_str(), "exe" | "com" | "bat" | "cmd" | "ps1")
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (md, name);
        false
    }
}

/// The suffix of `name` starting at its last `.`, or an empty string.
///
/// # Examples
/// extension_of("archive.tar.gz") = ".gz"
/// extension_of(".bashrc") = ".bashrc"
pub fn extension_of(name: &str) -> &str {
    name.rfind('.').map(|i| &name[i..]).unwrap_or("")
}

/// Reads the inode change time where the platform has one.
fn change_time(md: &Metadata, modified: SystemTime) -> SystemTime {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let secs = md.ctime();
        let nanos = md.ctime_nsec();
        if secs >= 0 && (0..1_000_000_000).contains(&nanos) {
            return SystemTime::UNIX_EPOCH + Duration::new(secs as u64, nanos as u32);
        }
    }
    #[cfg(not(unix))]
    {
        let _ = md;
    }
    modified
}
