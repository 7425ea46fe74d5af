//! Core runtime logic for lfr.
//!
//! This module contains the non-interactive engine pieces:
//! - [words]: the static command and option catalogs.
//! - [complete]: prefix completion against the catalogs and the executables on `PATH`.
//! - [fm]: directory reading and file metadata (see [read_dir] and [FileEntry]).
//! - [search]: case and diacritic folding, glob matching and natural ordering of names.
//! - [formatter]: the `info` columns and fixed-width entry lines.
//! - [worker]: background work and message passing back into the app state.
//! - [proc]: the shell collaborator used by shell commands.
//! - [error]: the [CmdError] type returned by every command.

pub mod complete;
pub mod error;
pub mod fm;
pub mod formatter;
pub mod proc;
pub mod search;
pub mod words;
pub mod worker;

pub use complete::{Completion, Domain, complete};
pub use error::CmdError;
pub use fm::{DirCount, FileEntry, LinkState, read_dir};
pub use proc::{ShellMode, ShellOutcome, ShellRequest, ShellRunner, SystemShell};
pub use search::search_match;
