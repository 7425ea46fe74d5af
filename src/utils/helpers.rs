//! Helpers for lfr.
//!
//! Small filesystem and path utilities used by the file operations, the config loader and the
//! option store:
//! - Locating the home directory and expanding a leading `~`
//! - Displaying home directories as "~" in file paths
//! - Generating unused filenames to prevent accidental overwrite
//! - Copying directory trees

use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::{fs, io};

/// Home directory of the current user, if it can be determined.
pub fn get_home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Replaces a leading `~` with the home directory.
///
/// Anything else, including `~user`, is returned unchanged.
pub fn expand_home_path(path: &str) -> PathBuf {
    if path == "~" {
        return get_home().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path
        .strip_prefix("~/")
        .or_else(|| path.strip_prefix(&format!("~{MAIN_SEPARATOR}")))
        && let Some(home) = get_home()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Util function to shorten home directory to ~.
pub fn shorten_home_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    if let Some(home_dir) = get_home()
        && let Ok(stripped) = path.strip_prefix(&home_dir)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~{}{}", MAIN_SEPARATOR, stripped.display());
    }
    path.display().to_string()
}

/// Finds the next available filename by appending _1, _2, etc. if the target exists
///
/// Example: "notes.txt" -> "notes_1.txt"
pub fn get_unused_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let name = path.file_name().unwrap_or_default();

    let stem = Path::new(name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let ext = Path::new(name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let target = parent.join(format!("{}_{}{}", stem, counter, ext));
        if !target.exists() {
            return target;
        }
        counter += 1;
    }
}

/// Recursively copies files and directories from `src` to `dest`.
pub fn copy_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    if src.is_dir() {
        fs::create_dir_all(dest)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &dest.join(entry.file_name()))?;
        }
    } else {
        fs::copy(src, dest)?;
    }
    Ok(())
}

/// Moves `src` to `dest`, falling back to copy and remove across filesystems.
pub fn move_path(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_recursive(src, dest)?;
            remove_path(src)
        }
        Err(e) => Err(e),
    }
}

/// Removes a file, symlink or whole directory tree.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let md = fs::symlink_metadata(path)?;
    if md.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::error;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_path_collision_increments() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("data.csv");

        assert_eq!(get_unused_path(&path), path);

        File::create(&path)?;
        assert_eq!(get_unused_path(&path), dir.path().join("data_1.csv"));

        File::create(dir.path().join("data_1.csv"))?;
        assert_eq!(get_unused_path(&path), dir.path().join("data_2.csv"));
        Ok(())
    }

    #[test]
    fn test_hidden_file_collision() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join(".gitignore");

        File::create(&path)?;
        assert_eq!(get_unused_path(&path), dir.path().join(".gitignore_1"));
        Ok(())
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home_path("/tmp/x"), PathBuf::from("/tmp/x"));
        assert_eq!(expand_home_path("~user/x"), PathBuf::from("~user/x"));
        if let Some(home) = get_home() {
            assert_eq!(expand_home_path("~/bin"), home.join("bin"));
            assert_eq!(expand_home_path("~"), home);
            assert_eq!(shorten_home_path(home.join("bin")), format!("~{}bin", MAIN_SEPARATOR));
        }
    }

    #[test]
    fn test_copy_move_remove() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let src = dir.path().join("tree");
        fs::create_dir_all(src.join("nested"))?;
        fs::write(src.join("nested/leaf.txt"), "leaf")?;

        let copy = dir.path().join("copy");
        copy_recursive(&src, &copy)?;
        assert_eq!(fs::read_to_string(copy.join("nested/leaf.txt"))?, "leaf");

        let moved = dir.path().join("moved");
        move_path(&copy, &moved)?;
        assert!(!copy.exists());
        assert!(moved.join("nested/leaf.txt").exists());

        remove_path(&moved)?;
        assert!(!moved.exists());
        Ok(())
    }
}
