//! Completion engine for the command line.
//!
//! [complete] prefix-matches a partial token against one of the word catalogs or against the
//! executables found on `PATH`. The returned [Completion] holds every match plus the longest
//! shared extension, which the command line uses to fill in text inline.
//!
//! [complete_line] works on a whole command line: it picks the domain from the context of the
//! last token (command name, option after `set`, executable after a shell prefix, file
//! otherwise) and returns the line with the completion applied.

use crate::core::fm::is_executable;
use crate::core::words::{CMD_WORDS, OPT_WORDS};
use crate::core::CmdError;

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io;

/// What a partial token is completed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Commands,
    Options,
    Executables,
}

/// Result of a completion query.
///
/// `longest` is what the token can be replaced with: the shared prefix of all matches,
/// the single match followed by a space, or the unchanged token when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub matches: Vec<String>,
    pub longest: String,
}

/// A file name offered for completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub is_dir: bool,
}

/// Context needed by [complete_line] beyond the static catalogs.
#[derive(Debug, Clone, Default)]
pub struct LineContext {
    pub user_cmds: Vec<String>,
    pub files: Vec<FileCandidate>,
}

/// Result of completing a whole command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineCompletion {
    pub matches: Vec<String>,
    pub line: String,
}

/// Completes `token` against the given domain. Never fails.
pub fn complete(token: &str, domain: Domain) -> Completion {
    match domain {
        Domain::Commands => match_word(token, CMD_WORDS),
        Domain::Options => match_word(token, OPT_WORDS),
        Domain::Executables => match_exec(token),
    }
}

/// Longest common prefix of two strings, compared char by char.
pub fn match_longest<'a>(a: &'a str, b: &str) -> &'a str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()));
    &a[..end]
}

/// Matches `s` against a word list, keeping the list order.
pub fn match_word<S: AsRef<str>>(s: &str, words: &[S]) -> Completion {
    let mut matches = Vec::new();
    let mut longest: Option<String> = None;

    for word in words {
        let word = word.as_ref();
        if !word.starts_with(s) {
            continue;
        }
        matches.push(word.to_string());

        longest = Some(match longest {
            Some(prev) => match_longest(&prev, word).to_string(),
            None if !s.is_empty() => format!("{word} "),
            None => word.to_string(),
        });
    }

    Completion {
        matches,
        longest: longest.unwrap_or_else(|| s.to_string()),
    }
}

/// Matches `s` against the executables on the process `PATH`.
pub fn match_exec(s: &str) -> Completion {
    let search_path = env::var_os("PATH").unwrap_or_default();
    match_exec_in(s, &search_path)
}

/// Matches `s` against the executables found in a `PATH`-style list of directories.
///
/// Directories that do not exist are skipped silently. Directories or files that cannot be
/// read are logged and skipped; the scan always covers the remaining entries.
pub fn match_exec_in(s: &str, search_path: &OsStr) -> Completion {
    let mut words = Vec::new();
    let mut scanned = 0;
    let mut failed = 0;

    for dir in env::split_paths(search_path) {
        if let Err(e) = fs::metadata(&dir)
            && e.kind() == io::ErrorKind::NotFound
        {
            continue;
        }
        scanned += 1;

        let children = match fs::read_dir(&dir) {
            Ok(children) => children,
            Err(e) => {
                log::info!("reading path {}: {}", dir.display(), e);
                failed += 1;
                continue;
            }
        };

        for child in children.flatten() {
            let name = child.file_name().to_string_lossy().into_owned();
            if !name.starts_with(s) {
                continue;
            }

            let md = match fs::metadata(child.path()) {
                Ok(md) => md,
                Err(e) => {
                    log::info!("getting file information of {}: {}", child.path().display(), e);
                    continue;
                }
            };

            if !md.is_file() || !is_executable(&md, &name) {
                continue;
            }
            words.push(name);
        }
    }

    if failed > 0 {
        log::warn!(
            "{}",
            CmdError::PartialScan {
                failed,
                total: scanned
            }
        );
    }

    words.sort();
    words.dedup();
    match_word(s, &words)
}

/// Completes the last token of a command line and returns the updated line.
pub fn complete_line(line: &str, ctx: &LineContext) -> LineCompletion {
    let (shell, body) = match line.chars().next() {
        Some(c @ ('$' | '%' | '!' | '&')) => (true, &line[c.len_utf8()..]),
        _ => (false, line),
    };

    let mut tokens: Vec<&str> = body.split_whitespace().collect();
    if tokens.is_empty() || body.ends_with(char::is_whitespace) {
        tokens.push("");
    }
    let last = tokens[tokens.len() - 1];

    let completion = if shell {
        if tokens.len() == 1 {
            match_exec(last)
        } else {
            match_files(last, &ctx.files, false)
        }
    } else {
        match (tokens[0], tokens.len()) {
            (_, 1) => match_word(last, &command_words(ctx)),
            ("set", 2) => match_word(last, OPT_WORDS),
            ("map", 3) | ("cmap", 3) => match_word(last, &command_words(ctx)),
            ("cmd", _) | ("map", 2) | ("cmap", 2) => Completion {
                matches: Vec::new(),
                longest: last.to_string(),
            },
            ("cd", _) => match_files(last, &ctx.files, true),
            _ => match_files(last, &ctx.files, false),
        }
    };

    let head = &line[..line.len() - last.len()];
    LineCompletion {
        matches: completion.matches,
        line: format!("{}{}", head, completion.longest),
    }
}

/// Catalog commands followed by user commands not already in the catalog.
fn command_words(ctx: &LineContext) -> Vec<&str> {
    let mut words: Vec<&str> = CMD_WORDS.to_vec();
    let mut extra: Vec<&str> = ctx
        .user_cmds
        .iter()
        .map(String::as_str)
        .filter(|c| !CMD_WORDS.contains(c))
        .collect();
    extra.sort_unstable();
    extra.dedup();
    words.extend(extra);
    words
}

fn match_files(s: &str, files: &[FileCandidate], dirs_only: bool) -> Completion {
    let mut names: Vec<&str> = files
        .iter()
        .filter(|f| !dirs_only || f.is_dir)
        .map(|f| f.name.as_str())
        .collect();
    names.sort_unstable();
    names.dedup();
    match_word(s, &names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn two_matches_share_prefix() {
        let c = match_word("up", &["up", "updir"]);
        assert_eq!(c.matches, vec!["up", "updir"]);
        assert_eq!(c.longest, "up");
    }

    #[test]
    fn single_match_gets_trailing_space() {
        let c = match_word("qu", &["quit"]);
        assert_eq!(c.matches, vec!["quit"]);
        assert_eq!(c.longest, "quit ");
    }

    #[test]
    fn no_match_keeps_token() {
        let c = match_word("zz", &["quit", "up"]);
        assert!(c.matches.is_empty());
        assert_eq!(c.longest, "zz");
    }

    #[test]
    fn empty_token_matches_everything() {
        let c = match_word("", &["half-up", "half-down"]);
        assert_eq!(c.matches.len(), 2);
        assert_eq!(c.longest, "half-");

        let single = match_word("", &["quit"]);
        assert_eq!(single.longest, "quit", "no space without a typed token");
    }

    #[test]
    fn catalog_order_is_preserved() {
        let c = complete("cmd-delete", Domain::Commands);
        assert_eq!(
            c.matches,
            vec![
                "cmd-delete",
                "cmd-delete-back",
                "cmd-delete-home",
                "cmd-delete-end",
                "cmd-delete-unix-word",
                "cmd-delete-word",
            ]
        );
        assert_eq!(c.longest, "cmd-delete");
    }

    #[test]
    fn option_forms_complete() {
        let c = complete("hidden", Domain::Options);
        assert_eq!(c.matches, vec!["hidden", "hidden!", "hiddenfiles"]);
        assert_eq!(c.longest, "hidden");
    }

    #[test]
    fn longest_is_char_aware() {
        assert_eq!(match_longest("café", "cafè"), "caf");
        assert_eq!(match_longest("ab", "abc"), "ab");
    }

    #[cfg(unix)]
    #[test]
    fn executables_are_sorted_and_unique() -> Result<(), Box<dyn std::error::Error>> {
        use std::os::unix::fs::PermissionsExt;

        let first = tempdir()?;
        let second = tempdir()?;
        for (dir, name) in [
            (first.path(), "zz-tool"),
            (first.path(), "zz-alpha"),
            (second.path(), "zz-tool"),
        ] {
            let path = dir.join(name);
            File::create(&path)?;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        }
        File::create(first.path().join("zz-plain"))?;
        fs::create_dir(first.path().join("zz-dir"))?;

        let missing = first.path().join("does-not-exist");
        let search_path = env::join_paths([missing.as_path(), first.path(), second.path()])?;

        let c = match_exec_in("zz-", &search_path);
        assert_eq!(c.matches, vec!["zz-alpha", "zz-tool"]);
        assert_eq!(c.longest, "zz-");

        let none = match_exec_in("nothing-here", &search_path);
        assert!(none.matches.is_empty());
        assert_eq!(none.longest, "nothing-here");
        Ok(())
    }

    #[test]
    fn line_completion_picks_domain() {
        let ctx = LineContext {
            user_cmds: vec!["trash".to_string()],
            files: vec![
                FileCandidate {
                    name: "src".into(),
                    is_dir: true,
                },
                FileCandidate {
                    name: "setup.py".into(),
                    is_dir: false,
                },
            ],
        };

        let first = complete_line("tr", &ctx);
        assert_eq!(first.matches, vec!["trash"]);
        assert_eq!(first.line, "trash ");

        let opt = complete_line("set dirf", &ctx);
        assert_eq!(opt.line, "set dirfirst");

        let cd = complete_line("cd s", &ctx);
        assert_eq!(cd.matches, vec!["src"]);
        assert_eq!(cd.line, "cd src ");

        let file = complete_line("rename s", &ctx);
        assert_eq!(file.matches, vec!["setup.py", "src"]);
        assert_eq!(file.line, "rename s");
    }
}
