//! main.rs
//! Entry point for lfr

pub(crate) mod app;
pub(crate) mod config;
pub(crate) mod core;
pub(crate) mod utils;

use crate::app::AppState;
use crate::config::Config;
use crate::core::formatter::format_entry_line;
use crate::core::{Completion, Domain, complete};
use crate::utils::cli::{CliAction, handle_args};
use crate::utils::{expand_home_path, shorten_home_path};

use std::process::ExitCode;

const DEFAULT_WIDTH: usize = 80;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match handle_args() {
        CliAction::Exit => ExitCode::SUCCESS,
        CliAction::CompleteCmd(token) => print_completion(complete(&token, Domain::Commands)),
        CliAction::CompleteOpt(token) => print_completion(complete(&token, Domain::Options)),
        CliAction::CompleteExec(token) => print_completion(complete(&token, Domain::Executables)),
        CliAction::List { path, commands } => run_listing(path, &commands),
    }
}

fn print_completion(comp: Completion) -> ExitCode {
    println!("{}", comp.matches.join(" "));
    println!("{}", comp.longest);
    ExitCode::SUCCESS
}

fn run_listing(path: Option<String>, commands: &[String]) -> ExitCode {
    let config = Config::load();
    let mut app = match path {
        Some(p) => {
            let target = expand_home_path(&p);
            if !target.is_dir() {
                eprintln!("[lfr] Error: Path '{}' cannot be opened.", p);
                return ExitCode::FAILURE;
            }
            AppState::from_dir(config, &target)
        }
        None => match AppState::new(config) {
            Ok(app) => app,
            Err(e) => {
                eprintln!("[lfr] Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    let width = crossterm::terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(DEFAULT_WIDTH);

    for cmd in commands {
        if let Err(e) = app.run_text(cmd) {
            app.report(e);
        }
        if app.should_quit() {
            break;
        }
    }

    for err in app.errors() {
        eprintln!("[lfr] {}", err);
    }
    if let Some(msg) = app.message() {
        eprintln!("{}", msg);
    }

    println!("{}", shorten_home_path(app.cwd()));
    if let Some(dir) = app.current_dir() {
        let cursor = dir.ind();
        for (i, entry) in dir.files().iter().enumerate() {
            let mark = if i == cursor {
                '>'
            } else if app.is_selected(entry.path()) {
                '*'
            } else {
                ' '
            };
            println!("{} {}", mark, format_entry_line(entry, width.saturating_sub(2), app.options()));
        }
    }

    if app.errors().is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
