//! The command expression language of lfr.
//!
//! Every user action (a typed command line, a key binding, a line of a config file) is an
//! [Expr]. Expressions render back to text with `Display` and run against the application
//! state with [Expr::eval].
//!
//! Evaluation never ends the program: failures come back as [CmdError] and the caller decides
//! whether to report them. A [ListExpr] reports the errors of its children itself and keeps
//! going, so one bad command in a sequence does not stop the rest.

use crate::app::commands::Builtin;
use crate::app::state::AppState;
use crate::core::{CmdError, ShellMode};

use std::fmt;

/// Calls may nest through user commands, `push` and `source` up to this depth.
const MAX_CALL_DEPTH: usize = 32;

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Call(CallExpr),
    Set(SetExpr),
    Map(MapExpr),
    Cmap(CmapExpr),
    Cmd(CmdExpr),
    Exec(ExecExpr),
    List(ListExpr),
}

/// Invocation of a built-in or user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<String>,
    pub count: usize,
}

/// `set opt val`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetExpr {
    pub opt: String,
    pub val: String,
}

/// `map keys expr`; an empty body removes the binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapExpr {
    pub keys: String,
    pub expr: Option<Box<Expr>>,
}

/// `cmap key expr`; an empty body removes the binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmapExpr {
    pub key: String,
    pub expr: Option<Box<Expr>>,
}

/// `cmd name expr`; an empty body removes the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdExpr {
    pub name: String,
    pub expr: Option<Box<Expr>>,
}

/// Shell command text with its mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecExpr {
    pub prefix: ShellMode,
    pub value: String,
}

/// A sequence of expressions run `count` times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListExpr {
    pub exprs: Vec<Expr>,
    pub count: usize,
}

impl CallExpr {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        CallExpr {
            name: name.into(),
            args,
            count: 1,
        }
    }
}

impl Expr {
    /// Shorthand for a call without a count.
    pub fn call(name: &str, args: &[&str]) -> Expr {
        Expr::Call(CallExpr::new(name, args.iter().map(|a| a.to_string()).collect()))
    }

    /// Runs the expression. `args` are the arguments of an enclosing user command call; they
    /// reach shell commands as positional parameters.
    pub fn eval(&self, app: &mut AppState, args: &[String]) -> Result<(), CmdError> {
        match self {
            Expr::Call(call) => call.eval(app),
            Expr::Set(set) => app.set_option(&set.opt, &set.val),
            Expr::Map(map) => {
                app.keymap_mut().map_normal(&map.keys, map.expr.as_deref().cloned());
                Ok(())
            }
            Expr::Cmap(cmap) => {
                app.keymap_mut().map_command(&cmap.key, cmap.expr.as_deref().cloned());
                Ok(())
            }
            Expr::Cmd(cmd) => {
                app.define_command(&cmd.name, cmd.expr.as_deref().cloned());
                Ok(())
            }
            Expr::Exec(exec) => app.run_shell(exec.prefix, &exec.value, args),
            Expr::List(list) => {
                for _ in 0..list.count.max(1) {
                    for expr in &list.exprs {
                        if let Err(err) = expr.eval(app, args) {
                            app.report(err);
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Returns a copy with the repeat count multiplied by `count`.
    ///
    /// Used for count prefixes typed before a key binding.
    pub fn with_count(&self, count: usize) -> Expr {
        let count = count.max(1);
        match self {
            Expr::Call(call) => Expr::Call(CallExpr {
                count: call.count.max(1) * count,
                ..call.clone()
            }),
            Expr::List(list) => Expr::List(ListExpr {
                count: list.count.max(1) * count,
                ..list.clone()
            }),
            other => other.clone(),
        }
    }
}

impl CallExpr {
    /// User commands shadow built-ins; built-ins resolve by exact name or unique prefix.
    fn eval(&self, app: &mut AppState) -> Result<(), CmdError> {
        if app.call_depth >= MAX_CALL_DEPTH {
            return Err(CmdError::Other(format!("command recursion too deep: {}", self.name)));
        }
        app.call_depth += 1;
        let res = self.eval_nested(app);
        app.call_depth -= 1;
        res
    }

    fn eval_nested(&self, app: &mut AppState) -> Result<(), CmdError> {
        let count = self.count.max(1);

        if let Some(body) = app.user_command(&self.name).cloned() {
            for _ in 0..count {
                body.eval(app, &self.args)?;
            }
            return Ok(());
        }

        let builtin = Builtin::resolve(&self.name)?;
        for _ in 0..count {
            builtin.run(app, &self.args)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Call(e) => e.fmt(f),
            Expr::Set(e) => e.fmt(f),
            Expr::Map(e) => e.fmt(f),
            Expr::Cmap(e) => e.fmt(f),
            Expr::Cmd(e) => e.fmt(f),
            Expr::Exec(e) => e.fmt(f),
            Expr::List(e) => e.fmt(f),
        }
    }
}

impl fmt::Display for CallExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- [{}]", self.name, self.args.join(" "))
    }
}

impl fmt::Display for SetExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "set {} {}", self.opt, self.val)
    }
}

fn write_body(f: &mut fmt::Formatter<'_>, head: &str, body: &Option<Box<Expr>>) -> fmt::Result {
    match body {
        Some(expr) => write!(f, "{} {}", head, expr),
        None => f.write_str(head),
    }
}

impl fmt::Display for MapExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_body(f, &format!("map {}", self.keys), &self.expr)
    }
}

impl fmt::Display for CmapExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_body(f, &format!("cmap {}", self.key), &self.expr)
    }
}

impl fmt::Display for CmdExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_body(f, &format!("cmd {}", self.name), &self.expr)
    }
}

impl fmt::Display for ExecExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{{ ", self.prefix.prefix())?;

        let multiline = self.value.split('\n').count() > 1;
        if let Some(first) = self
            .value
            .split('\n')
            .map(str::trim)
            .find(|line| !line.is_empty())
        {
            f.write_str(first)?;
            if multiline {
                f.write_str(" ...")?;
            }
        }

        f.write_str(" }}")
    }
}

impl fmt::Display for ListExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(":{{ ")?;
        for expr in &self.exprs {
            write!(f, "{}; ", expr)?;
        }
        f.write_str("}}")
    }
}
