//! Display formatting for file entries in lfr.
//!
//! Builds the `info` columns (size, time, atime, ctime) shown next to each entry, the
//! permission string, and fixed-width entry lines with names truncated using the
//! `truncatechar` option. Used by the listing mode of the binary and by the application
//! state when it describes the current file.

use crate::config::{InfoField, Options};
use crate::core::fm::{DIR_COUNT_LIMIT, DirCount, FileEntry};

use chrono::{DateTime, Datelike, Local};
use humansize::{DECIMAL, format_size};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use std::fmt::Write;
use std::fs::Metadata;
use std::time::SystemTime;

const FALLBACK_TIME_FMT: &str = "%Y-%m-%d %H:%M";

/// Returns a string like 'drwxr-xr-x' on unix.
///
/// On Windows: a short string showing file type and attributes
/// (`d`, `l`, `h` for hidden, `s` for system, `a` for archive, `r` for read-only).
pub fn format_attributes(meta: &Metadata) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let file_type = meta.file_type();
        let first = if file_type.is_dir() {
            'd'
        } else if file_type.is_symlink() {
            'l'
        } else {
            '-'
        };
        let mode = meta.permissions().mode();
        let mut chars = [first, '-', '-', '-', '-', '-', '-', '-', '-', '-'];
        for (i, shift) in [6, 3, 0].into_iter().enumerate() {
            let base = 1 + i * 3;
            if (mode >> (shift + 2)) & 1 != 0 {
                chars[base] = 'r';
            }
            if (mode >> (shift + 1)) & 1 != 0 {
                chars[base + 1] = 'w';
            }
            if (mode >> shift) & 1 != 0 {
                chars[base + 2] = 'x';
            }
        }
        chars.iter().collect()
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        let attr = meta.file_attributes();
        let mut out = String::with_capacity(5);
        out.push(if attr & 0x10 != 0 {
            'd'
        } else if attr & 0x400 != 0 {
            'l'
        } else {
            '-'
        });
        out.push(if attr & 0x02 != 0 { 'h' } else { '-' });
        out.push(if attr & 0x04 != 0 { 's' } else { '-' });
        out.push(if attr & 0x20 != 0 { 'a' } else { '-' });
        out.push(if attr & 0x01 != 0 { 'r' } else { '-' });
        out
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = meta;
        String::from("-")
    }
}

/// Size column of an entry.
///
/// Directories show their entry count when `dircounts` is on, otherwise their computed size,
/// or `-` while it is unknown.
pub fn format_entry_size(entry: &FileEntry, dircounts: bool) -> String {
    if !entry.is_dir() {
        return format_size(entry.size(), DECIMAL);
    }
    if dircounts {
        return match entry.dir_count() {
            Some(DirCount::Counted(n)) if n >= DIR_COUNT_LIMIT => format!("{}+", DIR_COUNT_LIMIT - 1),
            Some(DirCount::Counted(n)) => n.to_string(),
            Some(DirCount::Unreadable) => "!".to_string(),
            None => "-".to_string(),
        };
    }
    entry
        .dir_size()
        .map(|sz| format_size(sz, DECIMAL))
        .unwrap_or_else(|| "-".to_string())
}

/// Formats a timestamp with `infotimefmtnew` for the current year, `infotimefmtold` otherwise.
pub fn format_info_time(time: SystemTime, opts: &Options) -> String {
    let dt: DateTime<Local> = DateTime::from(time);
    let fmt = if dt.year() == Local::now().year() {
        &opts.infotimefmtnew
    } else {
        &opts.infotimefmtold
    };
    format_time(&dt, fmt)
}

/// Formats a timestamp with the `timefmt` option.
pub fn format_full_time(time: SystemTime, opts: &Options) -> String {
    let dt: DateTime<Local> = DateTime::from(time);
    format_time(&dt, &opts.timefmt)
}

/// Writes `dt` with a strftime format, falling back to [FALLBACK_TIME_FMT] when the format
/// cannot be rendered (a config file can carry formats `set` would refuse).
fn format_time(dt: &DateTime<Local>, fmt: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", dt.format(fmt)).is_ok() {
        return out;
    }
    log::debug!("invalid time format '{}'", fmt);
    dt.format(FALLBACK_TIME_FMT).to_string()
}

/// The `info` columns of an entry, space separated, in the configured order.
pub fn info_columns(entry: &FileEntry, opts: &Options) -> String {
    opts.info
        .iter()
        .map(|field| match field {
            InfoField::Size => format!("{:>8}", format_entry_size(entry, opts.dircounts)),
            InfoField::Time => format_info_time(entry.modified(), opts),
            InfoField::Atime => format_info_time(entry.access_time(), opts),
            InfoField::Ctime => format_info_time(entry.change_time(), opts),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cuts `name` down to `width` columns, marking the cut with `truncatechar`.
///
/// The extension is kept when there is room for it.
pub fn truncate_name(name: &str, width: usize, truncatechar: &str) -> String {
    if name.width() <= width {
        return name.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mark_w = truncatechar.width();
    if width <= mark_w {
        return take_width(truncatechar, width);
    }

    let ext = match name.rfind('.') {
        Some(i) if i > 0 => &name[i..],
        _ => "",
    };
    let ext_w = ext.width();
    if !ext.is_empty() && ext_w + mark_w < width {
        let head = take_width(&name[..name.len() - ext.len()], width - mark_w - ext_w);
        return format!("{}{}{}", head, truncatechar, ext);
    }
    format!("{}{}", take_width(name, width - mark_w), truncatechar)
}

/// Longest prefix of `s` that fits in `width` columns.
fn take_width(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut w = 0;
    for c in s.chars() {
        let cw = c.width().unwrap_or(0);
        if w + cw > width {
            break;
        }
        out.push(c);
        w += cw;
    }
    out
}

/// Cleans `line` to exactly `width` columns by dropping control characters, expanding tabs
/// to `tabstop` and padding or truncating.
pub fn sanitize_to_exact_width(line: &str, width: usize, tabstop: usize) -> String {
    let tabstop = tabstop.max(1);
    let mut out = String::with_capacity(width);
    let mut current_w = 0;

    for c in line.chars() {
        if c == '\t' {
            let spaces = tabstop - (current_w % tabstop);
            if current_w + spaces > width {
                break;
            }
            out.push_str(&" ".repeat(spaces));
            current_w += spaces;
            continue;
        }
        if c.is_control() {
            continue;
        }
        let w = c.width().unwrap_or(0);
        if current_w + w > width {
            break;
        }
        out.push(c);
        current_w += w;
    }

    if current_w < width {
        out.push_str(&" ".repeat(width - current_w));
    }
    out
}

/// One listing line: the name (with `/` for directories and `@` for symlinks) truncated to
/// leave room for the info columns, which are right aligned.
pub fn format_entry_line(entry: &FileEntry, width: usize, opts: &Options) -> String {
    let mut name = entry.name().to_string();
    if entry.is_dir() {
        name.push('/');
    } else if entry.is_symlink() {
        name.push('@');
    }

    let info = info_columns(entry, opts);
    let info_w = info.width();
    if info.is_empty() || info_w + 2 > width {
        return sanitize_to_exact_width(&truncate_name(&name, width, &opts.truncatechar), width, opts.tabstop);
    }

    let name_w = width - info_w - 1;
    let name = sanitize_to_exact_width(&truncate_name(&name, name_w, &opts.truncatechar), name_w, opts.tabstop);
    format!("{} {}", name, info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fm::read_dir;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn truncation_keeps_extension() {
        assert_eq!(truncate_name("short.txt", 20, "~"), "short.txt");
        assert_eq!(truncate_name("a-very-long-name.txt", 10, "~"), "a-ver~.txt");
        assert_eq!(truncate_name("a-very-long-name", 8, "~"), "a-very-~");
        assert_eq!(truncate_name("name", 0, "~"), "");
        assert_eq!(truncate_name(".bashrc_backup", 6, "~"), ".bash~");
    }

    #[test]
    fn truncation_counts_wide_chars() {
        let out = truncate_name("日本語のファイル", 7, "~");
        assert!(out.width() <= 7, "{out} too wide");
        assert!(out.ends_with('~'));
    }

    #[test]
    fn sanitize_pads_and_expands_tabs() {
        assert_eq!(sanitize_to_exact_width("a\tb", 6, 4), "a   b ");
        assert_eq!(sanitize_to_exact_width("abc\x07def", 4, 8), "abcd");
    }

    #[test]
    fn sizes_and_lines() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("data.bin"), vec![0u8; 2000])?;
        fs::create_dir(dir.path().join("sub"))?;
        fs::write(dir.path().join("sub/x"), "x")?;

        let entries = read_dir(dir.path(), true)?;
        let file = entries.iter().find(|e| e.name() == "data.bin").ok_or("no file")?;
        let sub = entries.iter().find(|e| e.name() == "sub").ok_or("no dir")?;

        assert_eq!(format_entry_size(file, false), "2 kB");
        assert_eq!(format_entry_size(sub, true), "1");
        assert_eq!(format_entry_size(sub, false), "-");
        sub.set_dir_size(1);
        assert_eq!(format_entry_size(sub, false), "1 B");

        let opts = Options {
            info: vec![InfoField::Size],
            ..Options::default()
        };
        let line = format_entry_line(file, 30, &opts);
        assert_eq!(line.width(), 30);
        assert!(line.starts_with("data.bin"));
        assert!(line.ends_with("2 kB"));

        let dir_line = format_entry_line(sub, 10, &Options::default());
        assert_eq!(dir_line, "sub/      ");
        Ok(())
    }

    #[test]
    fn bad_time_formats_fall_back() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("f"), "x")?;
        let entries = read_dir(dir.path(), false)?;
        let entry = entries.first().ok_or("no entry")?;

        let opts = Options {
            info: vec![InfoField::Time],
            infotimefmtnew: "%Q".to_string(),
            infotimefmtold: "%Q".to_string(),
            timefmt: "%Q".to_string(),
            ..Options::default()
        };
        let cols = info_columns(entry, &opts);
        assert_eq!(cols.len(), "2024-01-01 00:00".len());
        assert!(!format_full_time(entry.modified(), &opts).is_empty());
        Ok(())
    }
}
