//! Configuration for lfr.
//!
//! - [options]: the [Options] store changed at runtime with `set`
//! - [input]: default key bindings and the user's `[keys]`/`[cmd_keys]` tables
//! - [load]: reading `lfr.toml` into a [Config]

pub mod input;
pub mod load;
pub mod options;

pub use input::{DEFAULT_CMD_KEYS, DEFAULT_KEYS, Keys};
pub use load::Config;
pub use options::{InfoField, OptKind, Options, SelMode, SortMethod, affects_listing};
