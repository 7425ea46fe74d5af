//! Miscellaneous utility functions for lfr.
//!
//! This module holds the [helpers] submodule (home directory handling, unused path generation
//! and recursive copy/move/remove used by the file operations) and the [cli] submodule which
//! parses the binary's arguments.

pub mod cli;
pub mod helpers;

pub use helpers::{
    copy_recursive, expand_home_path, get_home, get_unused_path, move_path, remove_path,
    shorten_home_path,
};
