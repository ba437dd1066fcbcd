//! Lexer and parser for the template language.
//!
//! Grammar (a subset of Go's `text/template`):
//!
//! ```text
//! template  := (text | "{{" ["- "] pipeline [" -"] "}}")*
//! pipeline  := command ("|" command)*
//! command   := operand | function operand*
//! operand   := "." | .Field[.Field]* | "string" | `raw` | integer | true | false
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::funcs::{self, Func};

/// One token inside an action.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Dot,
    Field(Vec<String>),
    Str(String),
    Int(i64),
    Ident(String),
    Pipe,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Dot,
    Field(Vec<String>),
    Str(String),
    Int(i64),
    Bool(bool),
}

#[derive(Debug, Clone)]
pub(crate) enum Command {
    Value(Operand),
    Call {
        name: String,
        func: Func,
        args: Vec<Operand>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Pipeline {
    pub(crate) commands: Vec<Command>,
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Text(String),
    Action(Pipeline),
}

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"(?P<ws>\s+)",
        r"|(?P<field>(?:\.[A-Za-z_][A-Za-z0-9_]*)+)",
        r"|(?P<dot>\.)",
        r#"|(?P<str>"(?:[^"\\\n]|\\.)*")"#,
        r"|(?P<raw>`[^`]*`)",
        r"|(?P<int>-?[0-9]+)",
        r"|(?P<ident>[A-Za-z_][A-Za-z0-9_]*)",
        r"|(?P<pipe>\|)",
        r")",
    ))
    .expect("valid regex")
});

static TRIM_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+-\}\}").expect("valid regex"));

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Parse template source into nodes. Errors are plain messages; the caller
/// attaches the template name.
pub(crate) fn parse(source: &str) -> Result<Vec<Node>, String> {
    let mut nodes = Vec::new();
    let mut pos = 0;
    let mut trim_next = false;

    while pos < source.len() {
        let rest = &source[pos..];
        let text_end = rest.find(OPEN).unwrap_or(rest.len());
        let mut text = &rest[..text_end];
        if trim_next {
            text = text.trim_start();
            trim_next = false;
        }

        pos += text_end;
        if pos >= source.len() {
            push_text(&mut nodes, text);
            break;
        }

        // Left trim marker: "{{-" followed by whitespace.
        pos += OPEN.len();
        let after_open = &source[pos..];
        if after_open.starts_with('-')
            && after_open[1..].starts_with(|c: char| c.is_whitespace())
        {
            text = text.trim_end();
            pos += 1;
        }
        push_text(&mut nodes, text);

        let (tokens, consumed, trim_right) = lex_action(&source[pos..])?;
        pos += consumed;
        trim_next = trim_right;

        nodes.push(Node::Action(parse_pipeline(tokens)?));
    }

    Ok(nodes)
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

/// Lex one action body up to and including its closing delimiter.
///
/// Returns the tokens, the number of bytes consumed and whether a right trim
/// marker was present.
fn lex_action(input: &str) -> Result<(Vec<Token>, usize, bool), String> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    loop {
        let rest = &input[pos..];
        if rest.starts_with(CLOSE) {
            return Ok((tokens, pos + CLOSE.len(), false));
        }
        if let Some(m) = TRIM_CLOSE_RE.find(rest) {
            return Ok((tokens, pos + m.end(), true));
        }
        if rest.is_empty() {
            return Err("unclosed action".to_string());
        }

        let caps = TOKEN_RE.captures(rest).ok_or_else(|| {
            let c = rest.chars().next().unwrap_or_default();
            format!("unexpected {c:?} in command")
        })?;
        let whole = caps.get(0).map_or("", |m| m.as_str());
        pos += whole.len();

        if caps.name("ws").is_some() {
            continue;
        }

        let token = if let Some(m) = caps.name("field") {
            Token::Field(
                m.as_str()
                    .split('.')
                    .skip(1)
                    .map(String::from)
                    .collect(),
            )
        } else if caps.name("dot").is_some() {
            Token::Dot
        } else if let Some(m) = caps.name("str") {
            Token::Str(unquote(m.as_str())?)
        } else if let Some(m) = caps.name("raw") {
            let raw = m.as_str();
            Token::Str(raw[1..raw.len() - 1].to_string())
        } else if let Some(m) = caps.name("int") {
            let value = m
                .as_str()
                .parse()
                .map_err(|e| format!("bad number {}: {e}", m.as_str()))?;
            Token::Int(value)
        } else if let Some(m) = caps.name("ident") {
            Token::Ident(m.as_str().to_string())
        } else {
            Token::Pipe
        };

        tokens.push(token);
    }
}

/// Decode a double-quoted string literal.
fn unquote(quoted: &str) -> Result<String, String> {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => return Err(format!("invalid escape \\{other} in {quoted}")),
            None => return Err(format!("unterminated quoted string {quoted}")),
        }
    }

    Ok(out)
}

fn parse_pipeline(tokens: Vec<Token>) -> Result<Pipeline, String> {
    if tokens.is_empty() {
        return Err("missing value for command".to_string());
    }

    let mut commands = Vec::new();
    for (stage, group) in tokens.split(|t| *t == Token::Pipe).enumerate() {
        let command = parse_command(group)?;
        if stage > 0 && matches!(command, Command::Value(_)) {
            return Err(format!("non executable command in pipeline stage {}", stage + 1));
        }
        commands.push(command);
    }

    Ok(Pipeline { commands })
}

fn parse_command(tokens: &[Token]) -> Result<Command, String> {
    let (first, rest) = tokens
        .split_first()
        .ok_or_else(|| "missing command".to_string())?;

    if let Token::Ident(name) = first {
        if let Some(func) = funcs::lookup(name) {
            let args = rest.iter().map(operand).collect::<Result<Vec<_>, _>>()?;
            return Ok(Command::Call {
                name: name.clone(),
                func,
                args,
            });
        }
        if name != "true" && name != "false" {
            return Err(format!("function {name:?} not defined"));
        }
    }

    if !rest.is_empty() {
        return Err("can't give argument to non-function".to_string());
    }

    Ok(Command::Value(operand(first)?))
}

fn operand(token: &Token) -> Result<Operand, String> {
    Ok(match token {
        Token::Dot => Operand::Dot,
        Token::Field(path) => Operand::Field(path.clone()),
        Token::Str(s) => Operand::Str(s.clone()),
        Token::Int(n) => Operand::Int(*n),
        Token::Ident(name) if name == "true" => Operand::Bool(true),
        Token::Ident(name) if name == "false" => Operand::Bool(false),
        Token::Ident(name) => {
            return Err(format!("function {name:?} must be the first word of a command"));
        }
        Token::Pipe => return Err("unexpected \"|\"".to_string()),
    })
}
