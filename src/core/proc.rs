//! The lfr processes module.
//!
//! Shell commands are run through the [ShellRunner] trait so the command evaluator never
//! spawns processes itself. [SystemShell] is the default runner: it locates the configured
//! `shell` with the `which` crate and runs the command text as
//! `<shell> [-o opt]... <shellflag> <text> -- <args>...` with the current file (`$f`), the
//! selections (`$fs`) and the files acted on (`$fx`) exported in the environment.
//!
//! The four [ShellMode]s match the four shell prefixes:
//! - `$` [ShellMode::Sync]: run attached to the terminal and wait
//! - `%` [ShellMode::Pipe]: capture the standard output line by line
//! - `!` [ShellMode::Wait]: like sync, the UI waits for a key press afterwards
//! - `&` [ShellMode::Async]: run detached in the background

use crate::core::CmdError;

use std::ffi::OsString;
use std::fmt;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

/// How a shell command is attached to lfr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellMode {
    Sync,
    Pipe,
    Wait,
    Async,
}

impl ShellMode {
    /// The prefix character used in command text.
    pub fn prefix(self) -> char {
        match self {
            ShellMode::Sync => '$',
            ShellMode::Pipe => '%',
            ShellMode::Wait => '!',
            ShellMode::Async => '&',
        }
    }

    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            '$' => Some(ShellMode::Sync),
            '%' => Some(ShellMode::Pipe),
            '!' => Some(ShellMode::Wait),
            '&' => Some(ShellMode::Async),
            _ => None,
        }
    }

    /// The command (`shell`, `shell-pipe`, ...) that reads a command line in this mode.
    pub fn command_name(self) -> &'static str {
        match self {
            ShellMode::Sync => "shell",
            ShellMode::Pipe => "shell-pipe",
            ShellMode::Wait => "shell-wait",
            ShellMode::Async => "shell-async",
        }
    }
}

impl fmt::Display for ShellMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Everything a runner needs to start one shell command.
#[derive(Debug, Clone)]
pub struct ShellRequest {
    pub mode: ShellMode,
    pub text: String,
    pub args: Vec<String>,
    pub shell: String,
    pub shellflag: String,
    pub shellopts: Vec<String>,
    /// Working directory of the command.
    pub dir: PathBuf,
    /// Exported as `$f`.
    pub current: Option<PathBuf>,
    /// Exported as `$fs`, joined with `filesep`.
    pub selections: Vec<PathBuf>,
    pub filesep: String,
}

impl ShellRequest {
    /// Files acted on: the selections if any, otherwise the current file.
    pub fn targets(&self) -> Vec<PathBuf> {
        if self.selections.is_empty() {
            self.current.iter().cloned().collect()
        } else {
            self.selections.clone()
        }
    }

    fn join(&self, paths: &[PathBuf]) -> OsString {
        let mut out = OsString::new();
        for (i, p) in paths.iter().enumerate() {
            if i > 0 {
                out.push(&self.filesep);
            }
            out.push(p.as_os_str());
        }
        out
    }
}

/// What happened after a request was handed to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellOutcome {
    /// The command ran to completion. `output` is only filled in pipe mode.
    Finished {
        status: Option<i32>,
        output: Vec<String>,
    },
    /// The command was started in the background.
    Spawned,
}

impl ShellOutcome {
    pub fn success(&self) -> bool {
        match self {
            ShellOutcome::Finished { status, .. } => *status == Some(0),
            ShellOutcome::Spawned => true,
        }
    }
}

/// Runs shell commands on behalf of the evaluator.
pub trait ShellRunner: Send {
    fn run(&mut self, req: &ShellRequest) -> Result<ShellOutcome, CmdError>;
}

/// Runner that starts real processes.
#[derive(Debug, Default)]
pub struct SystemShell;

impl SystemShell {
    fn command(req: &ShellRequest) -> Result<Command, CmdError> {
        let program = which::which(&req.shell)
            .map_err(|e| CmdError::Shell(format!("{}: {}", req.shell, e)))?;

        let mut cmd = Command::new(program);
        for opt in &req.shellopts {
            cmd.arg("-o").arg(opt);
        }
        if !req.shellflag.is_empty() {
            cmd.arg(&req.shellflag);
        }
        cmd.arg(&req.text);
        if cfg!(unix) {
            cmd.arg("--");
        }
        cmd.args(&req.args);

        let targets = req.targets();
        cmd.current_dir(&req.dir)
            .env("f", req.current.as_deref().unwrap_or(Path::new("")))
            .env("fs", req.join(&req.selections))
            .env("fx", req.join(&targets))
            .env("PWD", &req.dir);
        Ok(cmd)
    }
}

impl ShellRunner for SystemShell {
    fn run(&mut self, req: &ShellRequest) -> Result<ShellOutcome, CmdError> {
        let mut cmd = Self::command(req)?;
        let spawn_err = |e: std::io::Error| CmdError::Shell(format!("running shell: {}", e));

        match req.mode {
            ShellMode::Sync | ShellMode::Wait => {
                let status = cmd.status().map_err(spawn_err)?;
                Ok(ShellOutcome::Finished {
                    status: status.code(),
                    output: Vec::new(),
                })
            }
            ShellMode::Pipe => {
                let mut child = cmd
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::inherit())
                    .spawn()
                    .map_err(spawn_err)?;

                let mut output = Vec::new();
                if let Some(stdout) = child.stdout.take() {
                    for line in BufReader::new(stdout).lines() {
                        match line {
                            Ok(line) => output.push(line),
                            Err(e) => {
                                log::info!("reading shell output: {}", e);
                                break;
                            }
                        }
                    }
                }
                let status = child.wait().map_err(spawn_err)?;
                Ok(ShellOutcome::Finished {
                    status: status.code(),
                    output,
                })
            }
            ShellMode::Async => {
                let mut child = cmd
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .map_err(spawn_err)?;
                // reap in the background so the child does not linger as a zombie
                thread::spawn(move || {
                    if let Err(e) = child.wait() {
                        log::info!("waiting for async shell: {}", e);
                    }
                });
                Ok(ShellOutcome::Spawned)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sh_available() -> bool {
        which::which("sh").is_ok()
    }

    macro_rules! skip_if_no_sh {
        () => {
            if !cfg!(unix) || !sh_available() {
                return Ok(());
            }
        };
    }

    fn request(mode: ShellMode, text: &str, dir: PathBuf) -> ShellRequest {
        ShellRequest {
            mode,
            text: text.to_string(),
            args: Vec::new(),
            shell: "sh".to_string(),
            shellflag: "-c".to_string(),
            shellopts: Vec::new(),
            dir,
            current: None,
            selections: Vec::new(),
            filesep: "\n".to_string(),
        }
    }

    #[test]
    fn prefixes_round_trip() {
        for mode in [
            ShellMode::Sync,
            ShellMode::Pipe,
            ShellMode::Wait,
            ShellMode::Async,
        ] {
            assert_eq!(ShellMode::from_prefix(mode.prefix()), Some(mode));
        }
        assert_eq!(ShellMode::from_prefix(':'), None);
    }

    #[test]
    fn pipe_captures_output_and_args() -> Result<(), Box<dyn std::error::Error>> {
        skip_if_no_sh!();
        let dir = tempdir()?;
        let mut req = request(ShellMode::Pipe, "echo \"$1\"; echo \"$f\"", dir.path().to_path_buf());
        req.args = vec!["first".to_string()];
        req.current = Some(dir.path().join("a.txt"));

        let outcome = SystemShell.run(&req)?;
        let expected_f = dir.path().join("a.txt").display().to_string();
        assert_eq!(
            outcome,
            ShellOutcome::Finished {
                status: Some(0),
                output: vec!["first".to_string(), expected_f],
            }
        );
        Ok(())
    }

    #[test]
    fn fx_prefers_selections() -> Result<(), Box<dyn std::error::Error>> {
        skip_if_no_sh!();
        let dir = tempdir()?;
        let mut req = request(ShellMode::Pipe, "printf '%s\\n' \"$fx\"", dir.path().to_path_buf());
        req.current = Some(dir.path().join("cur"));
        req.selections = vec![dir.path().join("one"), dir.path().join("two")];

        match SystemShell.run(&req)? {
            ShellOutcome::Finished { output, .. } => {
                assert_eq!(output.len(), 2);
                assert!(output[0].ends_with("one"));
                assert!(output[1].ends_with("two"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn exit_status_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        skip_if_no_sh!();
        let dir = tempdir()?;
        let outcome = SystemShell.run(&request(ShellMode::Pipe, "exit 3", dir.path().to_path_buf()))?;
        assert!(!outcome.success());
        assert_eq!(
            outcome,
            ShellOutcome::Finished {
                status: Some(3),
                output: Vec::new()
            }
        );
        Ok(())
    }

    #[test]
    fn missing_shell_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let mut req = request(ShellMode::Sync, "true", dir.path().to_path_buf());
        req.shell = "definitely-not-a-shell-binary".to_string();
        assert!(matches!(SystemShell.run(&req), Err(CmdError::Shell(_))));
        Ok(())
    }
}
