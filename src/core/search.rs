//! Name matching helpers shared by search, find, filter and sorting.
//!
//! Every function here works on local copies: stored entry names are never changed.
//! Case and diacritic folding follow the `ignorecase`/`smartcase` and `ignoredia`/`smartdia`
//! options, globbing follows `globsearch`.

use crate::config::Options;
use crate::core::CmdError;

use glob::{MatchOptions, Pattern};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use std::borrow::Cow;
use std::cmp::Ordering;
use std::path::Path;

/// Strips combining marks: "Café" becomes "Cafe".
pub fn remove_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

/// Folds `name` and `pattern` for a user typed pattern.
///
/// Folding is skipped when the smart variant is on and folding would change the pattern,
/// since the user then typed the case (or accents) on purpose.
pub fn fold_for_match<'a>(
    name: &'a str,
    pattern: &'a str,
    opts: &Options,
) -> (Cow<'a, str>, Cow<'a, str>) {
    let mut name = Cow::Borrowed(name);
    let mut pattern = Cow::Borrowed(pattern);

    if opts.ignorecase {
        let lowered = pattern.to_lowercase();
        if !opts.smartcase || lowered == *pattern {
            pattern = Cow::Owned(lowered);
            name = Cow::Owned(name.to_lowercase());
        }
    }
    if opts.ignoredia {
        let stripped = remove_diacritics(&pattern);
        if !opts.smartdia || stripped == *pattern {
            pattern = Cow::Owned(stripped);
            name = Cow::Owned(remove_diacritics(&name));
        }
    }
    (name, pattern)
}

/// Folds both strings unconditionally, used for ordering names.
pub fn fold_for_sort<'a>(s: &'a str, ignorecase: bool, ignoredia: bool) -> Cow<'a, str> {
    let mut out = Cow::Borrowed(s);
    if ignorecase {
        out = Cow::Owned(out.to_lowercase());
    }
    if ignoredia {
        out = Cow::Owned(remove_diacritics(&out));
    }
    out
}

/// Matches a name against a search pattern.
///
/// Uses glob matching when `globsearch` is set, substring containment otherwise.
/// An invalid glob is reported as [CmdError::Pattern].
pub fn search_match(name: &str, pattern: &str, opts: &Options) -> Result<bool, CmdError> {
    let (name, pattern) = fold_for_match(name, pattern, opts);
    if opts.globsearch {
        return glob_match(&pattern, &name);
    }
    Ok(name.contains(&*pattern))
}

/// Matches a name against a find pattern: a prefix with `anchorfind`, anywhere otherwise.
pub fn find_match(name: &str, pattern: &str, opts: &Options) -> bool {
    let (name, pattern) = fold_for_match(name, pattern, opts);
    if opts.anchorfind {
        name.starts_with(&*pattern)
    } else {
        name.contains(&*pattern)
    }
}

/// Whole-string glob match.
pub fn glob_match(pattern: &str, name: &str) -> Result<bool, CmdError> {
    let compiled = compile(pattern)?;
    Ok(compiled.matches(name))
}

/// Glob match against a full path; `*` does not cross separators.
pub fn glob_match_path(pattern: &str, path: &Path) -> Result<bool, CmdError> {
    let compiled = compile(pattern)?;
    let opts = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    Ok(compiled.matches_path_with(path, opts))
}

fn compile(pattern: &str) -> Result<Pattern, CmdError> {
    Pattern::new(pattern).map_err(|e| CmdError::Pattern {
        pattern: pattern.to_string(),
        reason: e.msg.to_string(),
    })
}

/// Orders strings so that runs of digits compare by value: "file2" < "file10".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    loop {
        match (i >= a.len(), j >= b.len()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }

        let digit_a = a[i].is_ascii_digit();
        let digit_b = b[j].is_ascii_digit();

        let start_a = i;
        while i < a.len() && a[i].is_ascii_digit() == digit_a {
            i += 1;
        }
        let start_b = j;
        while j < b.len() && b[j].is_ascii_digit() == digit_b {
            j += 1;
        }

        let chunk_a = &a[start_a..i];
        let chunk_b = &b[start_b..j];
        if chunk_a == chunk_b {
            continue;
        }

        if digit_a && digit_b {
            let ord = cmp_digits(chunk_a, chunk_b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        return chunk_a.cmp(chunk_b);
    }
}

/// Compares two ascii digit runs by value without parsing them.
fn cmp_digits(a: &[u8], b: &[u8]) -> Ordering {
    let trim = |s: &[u8]| -> usize { s.iter().take_while(|&&c| c == b'0').count() };
    let a = &a[trim(a)..];
    let b = &b[trim(b)..];
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(ignorecase: bool, smartcase: bool, ignoredia: bool, smartdia: bool) -> Options {
        Options {
            ignorecase,
            smartcase,
            ignoredia,
            smartdia,
            ..Options::default()
        }
    }

    #[test]
    fn case_and_diacritics_fold() -> Result<(), Box<dyn std::error::Error>> {
        let o = opts(true, false, true, false);
        assert!(search_match("Café", "cafe", &o)?);
        assert!(search_match("Café", "CAFÉ", &o)?);

        let strict = opts(false, false, false, false);
        assert!(!search_match("Café", "cafe", &strict)?);
        Ok(())
    }

    #[test]
    fn smartcase_skips_folding_for_mixed_case() -> Result<(), Box<dyn std::error::Error>> {
        let o = opts(true, true, false, false);
        // "Café" lowers to "café", so the user typed case on purpose
        assert!(!search_match("café au lait", "Café", &o)?);
        assert!(search_match("Café au lait", "Café", &o)?);
        // an all-lowercase pattern still folds
        assert!(search_match("CAFÉ", "café", &o)?);
        Ok(())
    }

    #[test]
    fn smartdia_skips_folding_for_accented_pattern() -> Result<(), Box<dyn std::error::Error>> {
        let o = opts(false, false, true, true);
        assert!(!search_match("cafe", "café", &o)?);
        assert!(search_match("café", "cafe", &o)?);
        Ok(())
    }

    #[test]
    fn glob_search_and_bad_pattern() -> Result<(), Box<dyn std::error::Error>> {
        let o = Options {
            globsearch: true,
            ..opts(true, false, false, false)
        };
        assert!(search_match("Main.rs", "*.rs", &o)?);
        assert!(!search_match("main.rs", "*.toml", &o)?);
        assert!(!search_match("main.rs", "main", &o)?, "globs match whole names");

        let err = search_match("main.rs", "[", &o);
        assert!(matches!(err, Err(CmdError::Pattern { .. })));
        Ok(())
    }

    #[test]
    fn find_honours_anchor() {
        let mut o = opts(true, false, false, false);
        assert!(find_match("Readme.md", "re", &o));
        assert!(!find_match("ignore.md", "re", &o));
        o.anchorfind = false;
        assert!(find_match("ignore.md", "re", &o));
    }

    #[test]
    fn natural_order() {
        let mut names = vec!["file10", "file2", "file1", "a", "file2a"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["a", "file1", "file2", "file2a", "file10"]);
        assert_eq!(natural_cmp("img007", "img7"), Ordering::Less);
        assert_eq!(natural_cmp("x9", "x9"), Ordering::Equal);
    }

    #[test]
    fn diacritics_keep_base_letters() {
        assert_eq!(remove_diacritics("Crème brûlée"), "Creme brulee");
        assert_eq!(remove_diacritics("plain"), "plain");
    }
}
