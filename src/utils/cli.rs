//! Command-line argument parsing and help for lfr.
//!
//! The binary has no interactive screen of its own. It answers completion queries, which
//! lets shells and editors reuse lfr's catalogs, and prints directory listings after running
//! an optional list of commands against the loaded state.

use crate::config::Config;

pub(crate) enum CliAction {
    /// List the directory (or the current one) after running `commands`.
    List {
        path: Option<String>,
        commands: Vec<String>,
    },
    CompleteCmd(String),
    CompleteOpt(String),
    CompleteExec(String),
    Exit,
}

pub(crate) fn handle_args() -> CliAction {
    let args: Vec<String> = std::env::args().skip(1).collect();
    parse_args(&args)
}

fn parse_args(args: &[String]) -> CliAction {
    let mut path = None;
    let mut commands = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--version" | "-v" => {
                print_version();
                return CliAction::Exit;
            }
            "-h" | "--help" => {
                print_help();
                return CliAction::Exit;
            }
            "--config-path" => {
                println!("{}", Config::default_path().display());
                return CliAction::Exit;
            }
            flag @ ("--complete-cmd" | "--complete-opt" | "--complete-exec") => {
                let token = iter.next().cloned().unwrap_or_default();
                return match flag {
                    "--complete-cmd" => CliAction::CompleteCmd(token),
                    "--complete-opt" => CliAction::CompleteOpt(token),
                    _ => CliAction::CompleteExec(token),
                };
            }
            "-c" | "--command" => match iter.next() {
                Some(cmd) => commands.push(cmd.clone()),
                None => {
                    eprintln!("Error: {} expects a command", arg);
                    return CliAction::Exit;
                }
            },
            a if !a.starts_with('-') && !a.trim().is_empty() => {
                if path.is_some() {
                    eprintln!("Error: lfr accepts only one path.");
                    eprintln!("Usage: lfr [OPTIONS] [PATH]");
                    return CliAction::Exit;
                }
                path = Some(a.to_string());
            }
            a => {
                eprintln!("Unknown argument: {}", a);
                eprintln!("Try --help for available options");
                return CliAction::Exit;
            }
        }
    }

    CliAction::List { path, commands }
}

fn print_version() {
    println!("lfr {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    println!(
        r#"lfr - the command language and directory model of a terminal file manager

USAGE:
  lfr [OPTIONS] [PATH]

PATH:
  Directory to list (defaults to current directory)

OPTIONS:
  -c, --command <CMDS>      Run lf commands before listing, e.g. -c 'set hidden; bottom'
      --complete-cmd <TOK>  Print the commands matching TOK and the completed token
      --complete-opt <TOK>  Print the options matching TOK and the completed token
      --complete-exec <TOK> Print the executables on PATH matching TOK
      --config-path         Print the config file location
  -h, --help                Print help information
  -v, --version             Display the current installed version of lfr

ENVIRONMENT:
  LFR_CONFIG                Override the default config path
  RUST_LOG                  Log filter (default: warn)
"#
    );
}
