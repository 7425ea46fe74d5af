//! Internal library crate for lfr.
//!
//! The shipped application is the `lfr` binary (`src/main.rs`).
//!
//! This library shares the command language, completion engine and directory model between
//! the binary and the integration tests. It is not considered a stable API for external use.

pub mod app;
pub mod config;
pub mod core;
pub mod utils;
