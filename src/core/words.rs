//! Static word catalogs.
//!
//! [CMD_WORDS] lists every command name the command line understands (including the `set`,
//! `map`, `cmap` and `cmd` keywords), [OPT_WORDS] every option name accepted by `set`.
//! Boolean options appear three times: plain, `no`-prefixed and `!`-suffixed.
//!
//! Both lists are used for validation and as completion candidates, so their order is the
//! order completions are offered in. Adding a command or option means adding its name here.

/// Command names in completion order.
#[rustfmt::skip]
pub const CMD_WORDS: &[&str] = &[
    "set",
    "map",
    "cmap",
    "cmd",
    "quit",
    "up",
    "half-up",
    "page-up",
    "scroll-up",
    "down",
    "half-down",
    "page-down",
    "scroll-down",
    "updir",
    "open",
    "jump-next",
    "jump-prev",
    "top",
    "bottom",
    "high",
    "middle",
    "low",
    "toggle",
    "invert",
    "unselect",
    "glob-select",
    "glob-unselect",
    "calcdirsize",
    "copy",
    "cut",
    "paste",
    "clear",
    "sync",
    "draw",
    "redraw",
    "load",
    "reload",
    "echo",
    "echomsg",
    "echoerr",
    "cd",
    "select",
    "delete",
    "rename",
    "source",
    "push",
    "read",
    "shell",
    "shell-pipe",
    "shell-wait",
    "shell-async",
    "find",
    "find-back",
    "find-next",
    "find-prev",
    "search",
    "search-back",
    "search-next",
    "search-prev",
    "filter",
    "setfilter",
    "mark-save",
    "mark-load",
    "mark-remove",
    "tag",
    "tag-toggle",
    "cmd-escape",
    "cmd-complete",
    "cmd-menu-complete",
    "cmd-menu-complete-back",
    "cmd-menu-accept",
    "cmd-enter",
    "cmd-interrupt",
    "cmd-history-next",
    "cmd-history-prev",
    "cmd-left",
    "cmd-right",
    "cmd-home",
    "cmd-end",
    "cmd-delete",
    "cmd-delete-back",
    "cmd-delete-home",
    "cmd-delete-end",
    "cmd-delete-unix-word",
    "cmd-yank",
    "cmd-transpose",
    "cmd-transpose-word",
    "cmd-word",
    "cmd-word-back",
    "cmd-delete-word",
    "cmd-capitalize-word",
    "cmd-uppercase-word",
    "cmd-lowercase-word",
];

/// Option names in completion order.
#[rustfmt::skip]
pub const OPT_WORDS: &[&str] = &[
    "anchorfind",
    "noanchorfind",
    "anchorfind!",
    "autoquit",
    "noautoquit",
    "autoquit!",
    "cursorfmt",
    "cursorpreviewfmt",
    "dircache",
    "nodircache",
    "dircache!",
    "dircounts",
    "nodircounts",
    "dircounts!",
    "dirfirst",
    "nodirfirst",
    "dirfirst!",
    "dironly",
    "nodironly",
    "dironly!",
    "dirpreviews",
    "nodirpreviews",
    "dirpreviews!",
    "drawbox",
    "nodrawbox",
    "drawbox!",
    "globsearch",
    "noglobsearch",
    "globsearch!",
    "hidden",
    "nohidden",
    "hidden!",
    "icons",
    "noicons",
    "icons!",
    "ignorecase",
    "noignorecase",
    "ignorecase!",
    "ignoredia",
    "noignoredia",
    "ignoredia!",
    "incsearch",
    "noincsearch",
    "incsearch!",
    "incfilter",
    "noincfilter",
    "incfilter!",
    "mouse",
    "nomouse",
    "mouse!",
    "number",
    "nonumber",
    "number!",
    "preview",
    "nopreview",
    "preview!",
    "relativenumber",
    "norelativenumber",
    "relativenumber!",
    "reverse",
    "noreverse",
    "reverse!",
    "smartcase",
    "nosmartcase",
    "smartcase!",
    "smartdia",
    "nosmartdia",
    "smartdia!",
    "waitmsg",
    "wrapscan",
    "nowrapscan",
    "wrapscan!",
    "wrapscroll",
    "nowrapscroll",
    "wrapscroll!",
    "findlen",
    "period",
    "scrolloff",
    "tabstop",
    "errorfmt",
    "filesep",
    "hiddenfiles",
    "history",
    "ifs",
    "info",
    "previewer",
    "cleaner",
    "promptfmt",
    "ratios",
    "selmode",
    "shell",
    "shellflag",
    "shellopts",
    "sortby",
    "timefmt",
    "tempmarks",
    "tagfmt",
    "infotimefmtnew",
    "infotimefmtold",
    "truncatechar",
];

/// Keywords that start an expression instead of naming a callable command.
pub const KEYWORDS: &[&str] = &["set", "map", "cmap", "cmd"];

/// Returns true if `name` is a catalogued option name in any of its forms.
pub fn is_option_word(name: &str) -> bool {
    OPT_WORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalogs_have_no_duplicates() {
        let cmds: HashSet<_> = CMD_WORDS.iter().collect();
        assert_eq!(cmds.len(), CMD_WORDS.len());

        let opts: HashSet<_> = OPT_WORDS.iter().collect();
        assert_eq!(opts.len(), OPT_WORDS.len());
    }

    #[test]
    fn boolean_options_carry_all_three_forms() {
        for word in OPT_WORDS.iter().filter(|w| w.ends_with('!')) {
            let base = word.trim_end_matches('!');
            assert!(is_option_word(base), "missing plain form of {word}");
            assert!(
                is_option_word(&format!("no{base}")),
                "missing negated form of {word}"
            );
        }
    }

    #[test]
    fn keywords_are_catalogued() {
        for kw in KEYWORDS {
            assert!(CMD_WORDS.contains(kw));
        }
    }
}
