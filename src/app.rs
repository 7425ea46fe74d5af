//! Application layer for lfr.
//!
//! Holds the interactive state and everything that drives it:
//! - [expr]: the expression tree produced by the parser and its evaluation.
//! - [parse]: the [ExprParser] seam and the line based [LineParser].
//! - [commands]: the builtin command table.
//! - [state], [actions], [handlers]: [AppState] with its accessors, its commands and its key
//!   handling.
//! - [nav]: the cached [Directory] listing with cursor, sort and filter.
//! - [keymap] and [cmdline]: key bindings, count prefixes and the editable command line.

pub mod actions;
pub mod cmdline;
pub mod commands;
pub mod expr;
pub mod handlers;
pub mod keymap;
pub mod nav;
pub mod parse;
pub mod state;

pub use actions::Motion;
pub use cmdline::{CmdLine, Prompt};
pub use commands::Builtin;
pub use expr::Expr;
pub use keymap::{KeyInput, KeyResult, Keymap};
pub use nav::Directory;
pub use parse::{ExprParser, LineParser};
pub use state::{AppState, KeypressResult, MarkAction, Mode};
