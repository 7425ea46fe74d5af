//! Built-in command registry.
//!
//! Every command name of the catalog except the `set`, `map`, `cmap` and `cmd` keywords maps
//! to a [Builtin]. Names resolve exactly or by a unique prefix (`upd` is `updir`), in
//! catalog order. [Builtin::run] performs the command against the application state.

use crate::app::actions::Motion;
use crate::app::cmdline::Prompt;
use crate::app::state::{AppState, MarkAction};
use crate::core::words::{CMD_WORDS, KEYWORDS};
use crate::core::{CmdError, ShellMode};

use phf::phf_map;

/// A built-in command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Quit,
    Up,
    HalfUp,
    PageUp,
    ScrollUp,
    Down,
    HalfDown,
    PageDown,
    ScrollDown,
    Updir,
    Open,
    JumpNext,
    JumpPrev,
    Top,
    Bottom,
    High,
    Middle,
    Low,
    Toggle,
    Invert,
    Unselect,
    GlobSelect,
    GlobUnselect,
    CalcDirSize,
    Copy,
    Cut,
    Paste,
    Clear,
    Sync,
    Draw,
    Redraw,
    Load,
    Reload,
    Echo,
    EchoMsg,
    EchoErr,
    Cd,
    Select,
    Delete,
    Rename,
    Source,
    Push,
    Read,
    Shell(ShellMode),
    Find { forward: bool },
    FindNext,
    FindPrev,
    Search { forward: bool },
    SearchNext,
    SearchPrev,
    Filter,
    SetFilter,
    Mark(MarkAction),
    Tag,
    TagToggle,
    CmdEscape,
    CmdComplete,
    CmdMenuComplete,
    CmdMenuCompleteBack,
    CmdMenuAccept,
    CmdEnter,
    CmdInterrupt,
    CmdHistoryNext,
    CmdHistoryPrev,
    CmdLeft,
    CmdRight,
    CmdHome,
    CmdEnd,
    CmdDelete,
    CmdDeleteBack,
    CmdDeleteHome,
    CmdDeleteEnd,
    CmdDeleteUnixWord,
    CmdYank,
    CmdTranspose,
    CmdTransposeWord,
    CmdWord,
    CmdWordBack,
    CmdDeleteWord,
    CmdCapitalizeWord,
    CmdUppercaseWord,
    CmdLowercaseWord,
}

static BUILTINS: phf::Map<&'static str, Builtin> = phf_map! {
    "quit" => Builtin::Quit,
    "up" => Builtin::Up,
    "half-up" => Builtin::HalfUp,
    "page-up" => Builtin::PageUp,
    "scroll-up" => Builtin::ScrollUp,
    "down" => Builtin::Down,
    "half-down" => Builtin::HalfDown,
    "page-down" => Builtin::PageDown,
    "scroll-down" => Builtin::ScrollDown,
    "updir" => Builtin::Updir,
    "open" => Builtin::Open,
    "jump-next" => Builtin::JumpNext,
    "jump-prev" => Builtin::JumpPrev,
    "top" => Builtin::Top,
    "bottom" => Builtin::Bottom,
    "high" => Builtin::High,
    "middle" => Builtin::Middle,
    "low" => Builtin::Low,
    "toggle" => Builtin::Toggle,
    "invert" => Builtin::Invert,
    "unselect" => Builtin::Unselect,
    "glob-select" => Builtin::GlobSelect,
    "glob-unselect" => Builtin::GlobUnselect,
    "calcdirsize" => Builtin::CalcDirSize,
    "copy" => Builtin::Copy,
    "cut" => Builtin::Cut,
    "paste" => Builtin::Paste,
    "clear" => Builtin::Clear,
    "sync" => Builtin::Sync,
    "draw" => Builtin::Draw,
    "redraw" => Builtin::Redraw,
    "load" => Builtin::Load,
    "reload" => Builtin::Reload,
    "echo" => Builtin::Echo,
    "echomsg" => Builtin::EchoMsg,
    "echoerr" => Builtin::EchoErr,
    "cd" => Builtin::Cd,
    "select" => Builtin::Select,
    "delete" => Builtin::Delete,
    "rename" => Builtin::Rename,
    "source" => Builtin::Source,
    "push" => Builtin::Push,
    "read" => Builtin::Read,
    "shell" => Builtin::Shell(ShellMode::Sync),
    "shell-pipe" => Builtin::Shell(ShellMode::Pipe),
    "shell-wait" => Builtin::Shell(ShellMode::Wait),
    "shell-async" => Builtin::Shell(ShellMode::Async),
    "find" => Builtin::Find { forward: true },
    "find-back" => Builtin::Find { forward: false },
    "find-next" => Builtin::FindNext,
    "find-prev" => Builtin::FindPrev,
    "search" => Builtin::Search { forward: true },
    "search-back" => Builtin::Search { forward: false },
    "search-next" => Builtin::SearchNext,
    "search-prev" => Builtin::SearchPrev,
    "filter" => Builtin::Filter,
    "setfilter" => Builtin::SetFilter,
    "mark-save" => Builtin::Mark(MarkAction::Save),
    "mark-load" => Builtin::Mark(MarkAction::Load),
    "mark-remove" => Builtin::Mark(MarkAction::Remove),
    "tag" => Builtin::Tag,
    "tag-toggle" => Builtin::TagToggle,
    "cmd-escape" => Builtin::CmdEscape,
    "cmd-complete" => Builtin::CmdComplete,
    "cmd-menu-complete" => Builtin::CmdMenuComplete,
    "cmd-menu-complete-back" => Builtin::CmdMenuCompleteBack,
    "cmd-menu-accept" => Builtin::CmdMenuAccept,
    "cmd-enter" => Builtin::CmdEnter,
    "cmd-interrupt" => Builtin::CmdInterrupt,
    "cmd-history-next" => Builtin::CmdHistoryNext,
    "cmd-history-prev" => Builtin::CmdHistoryPrev,
    "cmd-left" => Builtin::CmdLeft,
    "cmd-right" => Builtin::CmdRight,
    "cmd-home" => Builtin::CmdHome,
    "cmd-end" => Builtin::CmdEnd,
    "cmd-delete" => Builtin::CmdDelete,
    "cmd-delete-back" => Builtin::CmdDeleteBack,
    "cmd-delete-home" => Builtin::CmdDeleteHome,
    "cmd-delete-end" => Builtin::CmdDeleteEnd,
    "cmd-delete-unix-word" => Builtin::CmdDeleteUnixWord,
    "cmd-yank" => Builtin::CmdYank,
    "cmd-transpose" => Builtin::CmdTranspose,
    "cmd-transpose-word" => Builtin::CmdTransposeWord,
    "cmd-word" => Builtin::CmdWord,
    "cmd-word-back" => Builtin::CmdWordBack,
    "cmd-delete-word" => Builtin::CmdDeleteWord,
    "cmd-capitalize-word" => Builtin::CmdCapitalizeWord,
    "cmd-uppercase-word" => Builtin::CmdUppercaseWord,
    "cmd-lowercase-word" => Builtin::CmdLowercaseWord,
};

impl Builtin {
    /// Looks up a built-in by exact name or unique prefix.
    pub fn resolve(name: &str) -> Result<Builtin, CmdError> {
        if let Some(builtin) = BUILTINS.get(name) {
            return Ok(*builtin);
        }
        let candidates: Vec<&str> = CMD_WORDS
            .iter()
            .copied()
            .filter(|w| !KEYWORDS.contains(w) && w.starts_with(name))
            .collect();
        match candidates.as_slice() {
            [only] => BUILTINS
                .get(*only)
                .copied()
                .ok_or_else(|| CmdError::UnknownCommand(name.to_string())),
            [] => Err(CmdError::UnknownCommand(name.to_string())),
            _ => Err(CmdError::AmbiguousCommand {
                name: name.to_string(),
                candidates: candidates.iter().map(|c| c.to_string()).collect(),
            }),
        }
    }

    /// Runs the command once.
    pub fn run(self, app: &mut AppState, args: &[String]) -> Result<(), CmdError> {
        let height = app.height();
        let half = (height / 2).max(1);
        let joined = args.join(" ");

        match self {
            Builtin::Quit => app.quit = true,

            Builtin::Up => {
                app.navigate(Motion::Up(1));
            }
            Builtin::HalfUp => {
                app.navigate(Motion::Up(half));
            }
            Builtin::PageUp => {
                app.navigate(Motion::Up(height));
            }
            Builtin::ScrollUp => {
                app.navigate(Motion::ScrollUp(1));
            }
            Builtin::Down => {
                app.navigate(Motion::Down(1));
            }
            Builtin::HalfDown => {
                app.navigate(Motion::Down(half));
            }
            Builtin::PageDown => {
                app.navigate(Motion::Down(height));
            }
            Builtin::ScrollDown => {
                app.navigate(Motion::ScrollDown(1));
            }
            Builtin::Top => {
                app.navigate(Motion::Top);
            }
            Builtin::Bottom => {
                app.navigate(Motion::Bottom);
            }
            Builtin::High => {
                app.navigate(Motion::High);
            }
            Builtin::Middle => {
                app.navigate(Motion::Middle);
            }
            Builtin::Low => {
                app.navigate(Motion::Low);
            }

            Builtin::Updir => app.updir(),
            Builtin::Open => app.open()?,
            Builtin::JumpNext => app.jump(true)?,
            Builtin::JumpPrev => app.jump(false)?,
            Builtin::Cd => app.cd(first(args))?,
            Builtin::Select => app.select(required(args, "select")?)?,

            Builtin::Toggle => app.toggle(),
            Builtin::Invert => app.invert(),
            Builtin::Unselect => app.unselect(),
            Builtin::GlobSelect => app.glob_select(required(args, "glob-select")?, true)?,
            Builtin::GlobUnselect => app.glob_select(required(args, "glob-unselect")?, false)?,

            Builtin::CalcDirSize => app.calc_dir_size(),
            Builtin::Copy => app.copy(false)?,
            Builtin::Cut => app.copy(true)?,
            Builtin::Paste => app.paste()?,
            Builtin::Clear => app.clear_clipboard(),
            Builtin::Delete => app.delete()?,
            Builtin::Rename => {
                if args.is_empty() {
                    let name = app.current_dir().map(|d| d.name().to_string()).unwrap_or_default();
                    app.open_prompt(Prompt::Rename, &name);
                } else {
                    app.rename(&joined)?;
                }
            }

            Builtin::Sync | Builtin::Draw | Builtin::Redraw => app.redraw = true,
            Builtin::Load => app.load(),
            Builtin::Reload => app.reload(),

            Builtin::Echo => app.echo(joined),
            Builtin::EchoMsg => {
                log::info!("{}", joined);
                app.echo(joined);
            }
            Builtin::EchoErr => return Err(CmdError::Other(joined)),

            Builtin::Source => app.source(required(args, "source")?)?,
            Builtin::Push => app.push_keys(required(args, "push")?),
            Builtin::Read => app.open_prompt(Prompt::Read, &joined),
            Builtin::Shell(mode) => app.open_prompt(Prompt::Shell(mode), &joined),

            Builtin::Find { forward } => {
                if args.is_empty() {
                    app.open_prompt(Prompt::Find { forward }, "");
                } else {
                    app.find(&joined, forward)?;
                }
            }
            Builtin::FindNext => app.find_again(false)?,
            Builtin::FindPrev => app.find_again(true)?,
            Builtin::Search { forward } => {
                if args.is_empty() {
                    app.open_prompt(Prompt::Search { forward }, "");
                } else {
                    app.search(&joined, forward)?;
                }
            }
            Builtin::SearchNext => app.search_again(false)?,
            Builtin::SearchPrev => app.search_again(true)?,
            Builtin::Filter => {
                let current = app.current_dir().map(|d| d.filter().join(" ")).unwrap_or_default();
                app.open_prompt(Prompt::Filter, &current);
            }
            Builtin::SetFilter => app.set_filter(args.to_vec()),

            Builtin::Mark(action) => match args.first().and_then(|a| a.chars().next()) {
                Some(mark) => match action {
                    MarkAction::Save => app.mark_save(mark),
                    MarkAction::Load => app.mark_load(mark)?,
                    MarkAction::Remove => app.mark_remove(mark)?,
                },
                None => app.start_mark(action),
            },
            Builtin::Tag => app.tag(&joined),
            Builtin::TagToggle => app.tag_toggle(&joined),

            Builtin::CmdEscape | Builtin::CmdInterrupt => app.cmd_escape(),
            Builtin::CmdEnter => app.cmd_enter()?,
            Builtin::CmdComplete => app.cmd_complete(),
            Builtin::CmdMenuComplete => app.cmd_menu_complete(true),
            Builtin::CmdMenuCompleteBack => app.cmd_menu_complete(false),
            Builtin::CmdMenuAccept => app.cmdline.menu_accept(),
            Builtin::CmdHistoryNext => app.edit_cmdline(|c| c.history_next()),
            Builtin::CmdHistoryPrev => app.edit_cmdline(|c| c.history_prev()),
            Builtin::CmdLeft => app.cmdline.left(),
            Builtin::CmdRight => app.cmdline.right(),
            Builtin::CmdHome => app.cmdline.home(),
            Builtin::CmdEnd => app.cmdline.end(),
            Builtin::CmdWord => app.cmdline.word(),
            Builtin::CmdWordBack => app.cmdline.word_back(),
            Builtin::CmdDelete => app.edit_cmdline(|c| c.delete()),
            Builtin::CmdDeleteBack => app.edit_cmdline(|c| c.delete_back()),
            Builtin::CmdDeleteHome => app.edit_cmdline(|c| c.delete_home()),
            Builtin::CmdDeleteEnd => app.edit_cmdline(|c| c.delete_end()),
            Builtin::CmdDeleteUnixWord => app.edit_cmdline(|c| c.delete_unix_word()),
            Builtin::CmdDeleteWord => app.edit_cmdline(|c| c.delete_word()),
            Builtin::CmdYank => app.edit_cmdline(|c| c.yank()),
            Builtin::CmdTranspose => app.edit_cmdline(|c| c.transpose()),
            Builtin::CmdTransposeWord => app.edit_cmdline(|c| c.transpose_word()),
            Builtin::CmdCapitalizeWord => app.edit_cmdline(|c| c.capitalize_word()),
            Builtin::CmdUppercaseWord => app.edit_cmdline(|c| c.uppercase_word()),
            Builtin::CmdLowercaseWord => app.edit_cmdline(|c| c.lowercase_word()),
        }
        Ok(())
    }
}

fn first(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("")
}

fn required<'a>(args: &'a [String], cmd: &str) -> Result<&'a str, CmdError> {
    args.first()
        .map(String::as_str)
        .ok_or_else(|| CmdError::Other(format!("{}: requires an argument", cmd)))
}
