//! Runtime options for lfr.
//!
//! [Options] holds every value that `set` can change. It is deserialized from the `[options]`
//! table of `lfr.toml` and afterwards only modified through [Options::set], which validates the
//! option name against the catalog and coerces the textual value to the option's type.
//!
//! Boolean options accept three spellings: `set hidden` (or `set hidden true`),
//! `set nohidden` and `set hidden!` to toggle.

use crate::core::CmdError;
use crate::core::words::is_option_word;
use crate::utils::expand_home_path;

use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use unicode_width::UnicodeWidthStr;

use std::fmt;
use std::str::FromStr;

/// Value type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptKind {
    Bool,
    Int,
    Str,
    List,
    Enum,
}

/// Option kinds keyed by plain option name.
pub static OPTION_KINDS: phf::Map<&'static str, OptKind> = phf::phf_map! {
    "anchorfind" => OptKind::Bool,
    "autoquit" => OptKind::Bool,
    "dircache" => OptKind::Bool,
    "dircounts" => OptKind::Bool,
    "dirfirst" => OptKind::Bool,
    "dironly" => OptKind::Bool,
    "dirpreviews" => OptKind::Bool,
    "drawbox" => OptKind::Bool,
    "globsearch" => OptKind::Bool,
    "hidden" => OptKind::Bool,
    "history" => OptKind::Bool,
    "icons" => OptKind::Bool,
    "ignorecase" => OptKind::Bool,
    "ignoredia" => OptKind::Bool,
    "incfilter" => OptKind::Bool,
    "incsearch" => OptKind::Bool,
    "mouse" => OptKind::Bool,
    "number" => OptKind::Bool,
    "preview" => OptKind::Bool,
    "relativenumber" => OptKind::Bool,
    "reverse" => OptKind::Bool,
    "smartcase" => OptKind::Bool,
    "smartdia" => OptKind::Bool,
    "wrapscan" => OptKind::Bool,
    "wrapscroll" => OptKind::Bool,
    "findlen" => OptKind::Int,
    "period" => OptKind::Int,
    "scrolloff" => OptKind::Int,
    "tabstop" => OptKind::Int,
    "cleaner" => OptKind::Str,
    "cursorfmt" => OptKind::Str,
    "cursorpreviewfmt" => OptKind::Str,
    "errorfmt" => OptKind::Str,
    "filesep" => OptKind::Str,
    "ifs" => OptKind::Str,
    "infotimefmtnew" => OptKind::Str,
    "infotimefmtold" => OptKind::Str,
    "previewer" => OptKind::Str,
    "promptfmt" => OptKind::Str,
    "shell" => OptKind::Str,
    "shellflag" => OptKind::Str,
    "tagfmt" => OptKind::Str,
    "tempmarks" => OptKind::Str,
    "timefmt" => OptKind::Str,
    "truncatechar" => OptKind::Str,
    "waitmsg" => OptKind::Str,
    "hiddenfiles" => OptKind::List,
    "info" => OptKind::List,
    "ratios" => OptKind::List,
    "shellopts" => OptKind::List,
    "selmode" => OptKind::Enum,
    "sortby" => OptKind::Enum,
};

/// Ordering applied to directory listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMethod {
    #[default]
    Natural,
    Name,
    Size,
    Time,
    Atime,
    Ctime,
    Ext,
}

impl FromStr for SortMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "natural" => Ok(SortMethod::Natural),
            "name" => Ok(SortMethod::Name),
            "size" => Ok(SortMethod::Size),
            "time" => Ok(SortMethod::Time),
            "atime" => Ok(SortMethod::Atime),
            "ctime" => Ok(SortMethod::Ctime),
            "ext" => Ok(SortMethod::Ext),
            _ => Err(
                "value should either be 'natural', 'name', 'size', 'time', 'atime', 'ctime' or 'ext'"
                    .to_string(),
            ),
        }
    }
}

/// Which entries `selmode` considers when acting on selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelMode {
    #[default]
    All,
    Dir,
}

impl FromStr for SelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SelMode::All),
            "dir" => Ok(SelMode::Dir),
            _ => Err("value should either be 'all' or 'dir'".to_string()),
        }
    }
}

/// A column of the `info` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoField {
    Size,
    Time,
    Atime,
    Ctime,
}

impl FromStr for InfoField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "size" => Ok(InfoField::Size),
            "time" => Ok(InfoField::Time),
            "atime" => Ok(InfoField::Atime),
            "ctime" => Ok(InfoField::Ctime),
            _ => Err(format!(
                "should consist of 'size', 'time', 'atime' or 'ctime' separated with colon, got '{s}'"
            )),
        }
    }
}

impl fmt::Display for SortMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortMethod::Natural => "natural",
            SortMethod::Name => "name",
            SortMethod::Size => "size",
            SortMethod::Time => "time",
            SortMethod::Atime => "atime",
            SortMethod::Ctime => "ctime",
            SortMethod::Ext => "ext",
        };
        f.write_str(s)
    }
}

/// Every option settable with `set`, with lf's defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    pub anchorfind: bool,
    pub autoquit: bool,
    pub dircache: bool,
    pub dircounts: bool,
    pub dirfirst: bool,
    pub dironly: bool,
    pub dirpreviews: bool,
    pub drawbox: bool,
    pub globsearch: bool,
    pub hidden: bool,
    pub history: bool,
    pub icons: bool,
    pub ignorecase: bool,
    pub ignoredia: bool,
    pub incfilter: bool,
    pub incsearch: bool,
    pub mouse: bool,
    pub number: bool,
    pub preview: bool,
    pub relativenumber: bool,
    pub reverse: bool,
    pub smartcase: bool,
    pub smartdia: bool,
    pub wrapscan: bool,
    pub wrapscroll: bool,

    pub findlen: usize,
    pub period: u64,
    pub scrolloff: usize,
    pub tabstop: usize,

    pub cleaner: String,
    pub cursorfmt: String,
    pub cursorpreviewfmt: String,
    pub errorfmt: String,
    pub filesep: String,
    pub ifs: String,
    pub infotimefmtnew: String,
    pub infotimefmtold: String,
    pub previewer: String,
    pub promptfmt: String,
    pub shell: String,
    pub shellflag: String,
    pub tagfmt: String,
    pub tempmarks: String,
    pub timefmt: String,
    pub truncatechar: String,
    pub waitmsg: String,

    pub hiddenfiles: Vec<String>,
    pub info: Vec<InfoField>,
    pub ratios: Vec<usize>,
    pub shellopts: Vec<String>,

    pub selmode: SelMode,
    pub sortby: SortMethod,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            anchorfind: true,
            autoquit: false,
            dircache: true,
            dircounts: false,
            dirfirst: true,
            dironly: false,
            dirpreviews: false,
            drawbox: false,
            globsearch: false,
            hidden: false,
            history: true,
            icons: false,
            ignorecase: true,
            ignoredia: true,
            incfilter: false,
            incsearch: false,
            mouse: false,
            number: false,
            preview: true,
            relativenumber: false,
            reverse: false,
            smartcase: true,
            smartdia: false,
            wrapscan: true,
            wrapscroll: false,

            findlen: 1,
            period: 0,
            scrolloff: 0,
            tabstop: 8,

            cleaner: String::new(),
            cursorfmt: "\x1b[7m".to_string(),
            cursorpreviewfmt: "\x1b[4m".to_string(),
            errorfmt: "\x1b[7;31;47m".to_string(),
            filesep: "\n".to_string(),
            ifs: String::new(),
            infotimefmtnew: "%b %d %H:%M".to_string(),
            infotimefmtold: "%b %d  %Y".to_string(),
            previewer: String::new(),
            promptfmt: "\x1b[32;1m%u@%h\x1b[0m:\x1b[34;1m%d\x1b[0m\x1b[1m%f\x1b[0m".to_string(),
            shell: default_shell().to_string(),
            shellflag: default_shellflag().to_string(),
            tagfmt: "\x1b[31m".to_string(),
            tempmarks: String::new(),
            timefmt: "%a %b %e %H:%M:%S %Y".to_string(),
            truncatechar: "~".to_string(),
            waitmsg: "Press any key to continue".to_string(),

            hiddenfiles: vec![".*".to_string()],
            info: Vec::new(),
            ratios: vec![1, 2, 3],
            shellopts: Vec::new(),

            selmode: SelMode::All,
            sortby: SortMethod::Natural,
        }
    }
}

#[cfg(windows)]
fn default_shell() -> &'static str {
    "cmd"
}

#[cfg(not(windows))]
fn default_shell() -> &'static str {
    "sh"
}

#[cfg(windows)]
fn default_shellflag() -> &'static str {
    "/c"
}

#[cfg(not(windows))]
fn default_shellflag() -> &'static str {
    "-c"
}

impl Options {
    /// Applies `set name value`.
    ///
    /// `name` may be any catalogued spelling. Surrounding whitespace of `value` is ignored.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), CmdError> {
        if !is_option_word(name) {
            return Err(CmdError::UnknownOption(name.to_string()));
        }
        let value = value.trim();

        if let Some(base) = name.strip_suffix('!') {
            if !value.is_empty() {
                return Err(CmdError::invalid_value(name, "unexpected value"));
            }
            let current = self.flag(base).ok_or_else(|| unknown(name))?;
            return self.set_flag(base, !current);
        }

        match OPTION_KINDS.get(name) {
            Some(OptKind::Bool) => {
                let on = match value {
                    "" | "true" => true,
                    "false" => false,
                    _ => return Err(CmdError::invalid_value(name, "value should be empty, 'true' or 'false'")),
                };
                self.set_flag(name, on)
            }
            Some(OptKind::Int) => self.set_int(name, value),
            Some(OptKind::Str) => self.set_str(name, value),
            Some(OptKind::List) => self.set_list(name, value),
            Some(OptKind::Enum) => self.set_enum(name, value),
            None => {
                let base = name.strip_prefix("no").ok_or_else(|| unknown(name))?;
                if OPTION_KINDS.get(base) != Some(&OptKind::Bool) {
                    return Err(unknown(name));
                }
                if !value.is_empty() {
                    return Err(CmdError::invalid_value(name, "unexpected value"));
                }
                self.set_flag(base, false)
            }
        }
    }

    /// Current value of a boolean option.
    pub fn flag(&self, name: &str) -> Option<bool> {
        let v = match name {
            "anchorfind" => self.anchorfind,
            "autoquit" => self.autoquit,
            "dircache" => self.dircache,
            "dircounts" => self.dircounts,
            "dirfirst" => self.dirfirst,
            "dironly" => self.dironly,
            "dirpreviews" => self.dirpreviews,
            "drawbox" => self.drawbox,
            "globsearch" => self.globsearch,
            "hidden" => self.hidden,
            "history" => self.history,
            "icons" => self.icons,
            "ignorecase" => self.ignorecase,
            "ignoredia" => self.ignoredia,
            "incfilter" => self.incfilter,
            "incsearch" => self.incsearch,
            "mouse" => self.mouse,
            "number" => self.number,
            "preview" => self.preview,
            "relativenumber" => self.relativenumber,
            "reverse" => self.reverse,
            "smartcase" => self.smartcase,
            "smartdia" => self.smartdia,
            "wrapscan" => self.wrapscan,
            "wrapscroll" => self.wrapscroll,
            _ => return None,
        };
        Some(v)
    }

    fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        let field = match name {
            "anchorfind" => &mut self.anchorfind,
            "autoquit" => &mut self.autoquit,
            "dircache" => &mut self.dircache,
            "dircounts" => &mut self.dircounts,
            "dirfirst" => &mut self.dirfirst,
            "dironly" => &mut self.dironly,
            "dirpreviews" => &mut self.dirpreviews,
            "drawbox" => &mut self.drawbox,
            "globsearch" => &mut self.globsearch,
            "hidden" => &mut self.hidden,
            "history" => &mut self.history,
            "icons" => &mut self.icons,
            "ignorecase" => &mut self.ignorecase,
            "ignoredia" => &mut self.ignoredia,
            "incfilter" => &mut self.incfilter,
            "incsearch" => &mut self.incsearch,
            "mouse" => &mut self.mouse,
            "number" => &mut self.number,
            "preview" => &mut self.preview,
            "relativenumber" => &mut self.relativenumber,
            "reverse" => &mut self.reverse,
            "smartcase" => &mut self.smartcase,
            "smartdia" => &mut self.smartdia,
            "wrapscan" => &mut self.wrapscan,
            "wrapscroll" => &mut self.wrapscroll,
            _ => return None,
        };
        Some(field)
    }

    fn set_flag(&mut self, name: &str, on: bool) -> Result<(), CmdError> {
        let field = self.flag_mut(name).ok_or_else(|| unknown(name))?;
        *field = on;
        Ok(())
    }

    fn set_int(&mut self, name: &str, value: &str) -> Result<(), CmdError> {
        let n: usize = value
            .parse()
            .map_err(|_| CmdError::invalid_value(name, format!("expected a non-negative integer, got '{value}'")))?;
        match name {
            "findlen" => self.findlen = n,
            "period" => self.period = n as u64,
            "scrolloff" => self.scrolloff = n,
            "tabstop" => {
                if n == 0 {
                    return Err(CmdError::invalid_value(name, "value should be a positive number"));
                }
                self.tabstop = n;
            }
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn set_str(&mut self, name: &str, value: &str) -> Result<(), CmdError> {
        let value = value.to_string();
        match name {
            "cleaner" => self.cleaner = expand_home_path(&value).to_string_lossy().into_owned(),
            "previewer" => self.previewer = expand_home_path(&value).to_string_lossy().into_owned(),
            "cursorfmt" => self.cursorfmt = value,
            "cursorpreviewfmt" => self.cursorpreviewfmt = value,
            "errorfmt" => self.errorfmt = value,
            "filesep" => self.filesep = value,
            "ifs" => self.ifs = value,
            "infotimefmtnew" => self.infotimefmtnew = time_format(name, value)?,
            "infotimefmtold" => self.infotimefmtold = time_format(name, value)?,
            "promptfmt" => self.promptfmt = value,
            "shell" => self.shell = value,
            "shellflag" => self.shellflag = value,
            "tagfmt" => self.tagfmt = value,
            "tempmarks" => self.tempmarks = value,
            "timefmt" => self.timefmt = time_format(name, value)?,
            "waitmsg" => self.waitmsg = value,
            "truncatechar" => {
                if value.width() != 1 {
                    return Err(CmdError::invalid_value(name, "value should be 1 character long"));
                }
                self.truncatechar = value;
            }
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn set_list(&mut self, name: &str, value: &str) -> Result<(), CmdError> {
        let items: Vec<&str> = if value.is_empty() {
            Vec::new()
        } else {
            value.split(':').collect()
        };

        match name {
            "hiddenfiles" => self.hiddenfiles = items.iter().map(|s| s.to_string()).collect(),
            "shellopts" => self.shellopts = items.iter().map(|s| s.to_string()).collect(),
            "info" => {
                self.info = items
                    .iter()
                    .map(|s| s.parse::<InfoField>())
                    .collect::<Result<_, _>>()
                    .map_err(|reason| CmdError::invalid_value(name, reason))?;
            }
            "ratios" => {
                let ratios = items
                    .iter()
                    .map(|s| s.parse::<usize>().ok().filter(|n| *n > 0))
                    .collect::<Option<Vec<_>>>()
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| {
                        CmdError::invalid_value(name, "value should be a list of positive numbers separated with colon")
                    })?;
                if self.preview && ratios.len() < 2 {
                    return Err(CmdError::invalid_value(name, "preview needs at least two ratios"));
                }
                self.ratios = ratios;
            }
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn set_enum(&mut self, name: &str, value: &str) -> Result<(), CmdError> {
        match name {
            "sortby" => {
                self.sortby = value
                    .parse()
                    .map_err(|reason: String| CmdError::invalid_value(name, reason))?
            }
            "selmode" => {
                self.selmode = value
                    .parse()
                    .map_err(|reason: String| CmdError::invalid_value(name, reason))?
            }
            _ => return Err(unknown(name)),
        }
        Ok(())
    }
}

/// True if changing `name` changes which entries are listed or their order.
pub fn affects_listing(name: &str) -> bool {
    let base = name.trim_end_matches('!');
    let base = if OPTION_KINDS.contains_key(base) {
        base
    } else {
        base.strip_prefix("no").unwrap_or(base)
    };
    matches!(
        base,
        "dirfirst"
            | "dironly"
            | "hidden"
            | "hiddenfiles"
            | "ignorecase"
            | "ignoredia"
            | "reverse"
            | "sortby"
    )
}

/// Accepts a strftime format only if chrono can render every item of it.
fn time_format(name: &str, value: String) -> Result<String, CmdError> {
    if StrftimeItems::new(&value).any(|item| matches!(item, Item::Error)) {
        return Err(CmdError::invalid_value(name, format!("invalid time format '{}'", value)));
    }
    Ok(value)
}

fn unknown(name: &str) -> CmdError {
    CmdError::UnknownOption(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::words::OPT_WORDS;

    #[test]
    fn every_catalogued_option_has_a_kind() {
        for word in OPT_WORDS {
            let base = word.trim_end_matches('!');
            let known = OPTION_KINDS.contains_key(base)
                || base
                    .strip_prefix("no")
                    .is_some_and(|b| OPTION_KINDS.get(b) == Some(&OptKind::Bool));
            assert!(known, "{word} has no kind");
        }
    }

    #[test]
    fn boolean_spellings() -> Result<(), CmdError> {
        let mut opts = Options::default();
        assert!(!opts.hidden);

        opts.set("hidden", "")?;
        assert!(opts.hidden);
        opts.set("nohidden", "")?;
        assert!(!opts.hidden);
        opts.set("hidden!", "")?;
        assert!(opts.hidden);
        opts.set("hidden", "false")?;
        assert!(!opts.hidden);
        opts.set("hidden", "   ")?;
        assert!(opts.hidden, "whitespace-only value counts as empty");
        Ok(())
    }

    #[test]
    fn rejects_bad_values() {
        let mut opts = Options::default();
        assert!(matches!(
            opts.set("hidden", "yes"),
            Err(CmdError::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            opts.set("nohidden", "true"),
            Err(CmdError::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            opts.set("scrolloff", "-1"),
            Err(CmdError::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            opts.set("tabstop", "0"),
            Err(CmdError::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            opts.set("sortby", "random"),
            Err(CmdError::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            opts.set("truncatechar", "ab"),
            Err(CmdError::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            opts.set("nosortby", ""),
            Err(CmdError::UnknownOption(_))
        ));
        assert!(matches!(
            opts.set("colour", "red"),
            Err(CmdError::UnknownOption(_))
        ));

        let err = opts.set("info", "size:owner");
        match err {
            Err(CmdError::InvalidOptionValue { option, .. }) => assert_eq!(option, "info"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn typed_values() -> Result<(), CmdError> {
        let mut opts = Options::default();
        opts.set("scrolloff", " 4 ")?;
        assert_eq!(opts.scrolloff, 4);
        opts.set("sortby", "size")?;
        assert_eq!(opts.sortby, SortMethod::Size);
        opts.set("selmode", "dir")?;
        assert_eq!(opts.selmode, SelMode::Dir);
        opts.set("info", "size:time")?;
        assert_eq!(opts.info, vec![InfoField::Size, InfoField::Time]);
        opts.set("info", "")?;
        assert!(opts.info.is_empty());
        opts.set("hiddenfiles", ".*:*.bak")?;
        assert_eq!(opts.hiddenfiles, vec![".*", "*.bak"]);
        opts.set("ratios", "1:3")?;
        assert_eq!(opts.ratios, vec![1, 3]);
        opts.set("truncatechar", "…")?;
        assert_eq!(opts.truncatechar, "…");
        Ok(())
    }

    #[test]
    fn time_formats_are_validated() -> Result<(), CmdError> {
        let mut opts = Options::default();
        opts.set("infotimefmtnew", "%d.%m. %H:%M")?;
        assert_eq!(opts.infotimefmtnew, "%d.%m. %H:%M");

        for name in ["infotimefmtnew", "infotimefmtold", "timefmt"] {
            assert!(matches!(
                opts.set(name, "%Q"),
                Err(CmdError::InvalidOptionValue { .. })
            ));
        }
        assert_eq!(opts.infotimefmtnew, "%d.%m. %H:%M");
        assert_eq!(opts.timefmt, Options::default().timefmt);
        Ok(())
    }

    #[test]
    fn listing_options_are_flagged() {
        assert!(affects_listing("sortby"));
        assert!(affects_listing("nohidden"));
        assert!(affects_listing("dirfirst!"));
        assert!(!affects_listing("scrolloff"));
        assert!(!affects_listing("number"));
    }

    #[test]
    fn deserializes_partial_table() -> Result<(), Box<dyn std::error::Error>> {
        let opts: Options = toml::from_str("hidden = true\nsortby = \"time\"\ninfo = [\"size\"]")?;
        assert!(opts.hidden);
        assert_eq!(opts.sortby, SortMethod::Time);
        assert_eq!(opts.info, vec![InfoField::Size]);
        assert!(opts.dirfirst);
        Ok(())
    }
}
