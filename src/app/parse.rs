//! Turning command text into expressions.
//!
//! The evaluator only depends on the [ExprParser] trait. [LineParser] is the built-in parser
//! used for typed command lines, key binding texts from `lfr.toml` and `source`d files. It
//! understands one command per line:
//! - `# comment` and blank lines are skipped
//! - `$text`, `%text`, `!text`, `&text` are shell commands (the rest of the line is the text)
//! - `:a; b; c` (or any line containing `;`) is a list
//! - `set opt value`, `map keys command`, `cmap key command`, `cmd name command`
//! - anything else is a call: `name arg...`, where single or double quotes group an argument

use crate::app::expr::{CallExpr, CmapExpr, CmdExpr, ExecExpr, Expr, ListExpr, MapExpr, SetExpr};
use crate::core::{CmdError, ShellMode};

/// Parses command text into expressions.
pub trait ExprParser: Send {
    fn parse(&self, text: &str) -> Result<Vec<Expr>, CmdError>;
}

/// Line oriented parser for the simple command syntax.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineParser;

impl ExprParser for LineParser {
    fn parse(&self, text: &str) -> Result<Vec<Expr>, CmdError> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(parse_statement)
            .collect()
    }
}

/// Parses a single statement.
pub fn parse_statement(line: &str) -> Result<Expr, CmdError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CmdError::Parse("empty command".to_string()));
    }

    if let Some(c) = line.chars().next()
        && let Some(mode) = ShellMode::from_prefix(c)
    {
        return Ok(Expr::Exec(ExecExpr {
            prefix: mode,
            value: line[c.len_utf8()..].trim().to_string(),
        }));
    }

    let (is_list, body) = match line.strip_prefix(':') {
        Some(rest) => (true, rest),
        None => (false, line),
    };

    let (head, _) = split_word(body);
    let is_binding = matches!(head, "map" | "cmap" | "cmd");
    if is_list || (!is_binding && body.contains(';')) {
        let exprs = body
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(parse_statement)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Expr::List(ListExpr { exprs, count: 1 }));
    }

    parse_simple(body)
}

fn parse_simple(line: &str) -> Result<Expr, CmdError> {
    let (head, rest) = split_word(line);
    match head {
        "set" => {
            let (opt, val) = split_word(rest);
            if opt.is_empty() {
                return Err(CmdError::Parse("set: missing option name".to_string()));
            }
            Ok(Expr::Set(SetExpr {
                opt: opt.to_string(),
                val: unquote(val.trim()),
            }))
        }
        "map" | "cmap" | "cmd" => {
            let (name, body) = split_word(rest);
            if name.is_empty() {
                return Err(CmdError::Parse(format!("{head}: missing name")));
            }
            let expr = if body.trim().is_empty() {
                None
            } else {
                Some(Box::new(parse_statement(body)?))
            };
            let name = name.to_string();
            Ok(match head {
                "map" => Expr::Map(MapExpr { keys: name, expr }),
                "cmap" => Expr::Cmap(CmapExpr { key: name, expr }),
                _ => Expr::Cmd(CmdExpr { name, expr }),
            })
        }
        _ => {
            let mut words = tokenize(line)?;
            let name = words.remove(0);
            Ok(Expr::Call(CallExpr::new(name, words)))
        }
    }
}

/// Splits off the first whitespace separated word.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

/// Splits a line into words, honouring single and double quotes and backslash escapes.
pub fn tokenize(line: &str) -> Result<Vec<String>, CmdError> {
    let mut words = Vec::new();
    let mut cur = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') | (None, '\\') => {
                if let Some(next) = chars.next() {
                    cur.push(next);
                }
                in_word = true;
            }
            (Some(_), c) => cur.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut cur));
                    in_word = false;
                }
            }
            (None, c) => {
                cur.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(CmdError::Parse(format!("unterminated {q} quote")));
    }
    if in_word {
        words.push(cur);
    }
    if words.is_empty() {
        return Err(CmdError::Parse("empty command".to_string()));
    }
    Ok(words)
}

fn unquote(s: &str) -> String {
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}
