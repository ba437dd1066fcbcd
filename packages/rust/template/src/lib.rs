//! Path template expansion.
//!
//! Output and archive paths are written in a small template language modeled
//! on Go's `text/template`: `{{.Name}}`, `{{.Version}}`, `{{.Os}}`, `{{.Arch}}`
//! and `{{.Ext}}` substitute fields of a [`TemplateContext`], and pipelines
//! such as `{{ .Name | upper }}` apply string helpers.
//!
//! Any `Serialize` value can serve as a context; its serialized object keys
//! are the available fields.

mod funcs;
mod parse;

use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use xk6bundler_shared::{BundlerError, PlatformTarget, Result};

use crate::parse::{Command, Node, Operand, Pipeline};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Per-platform fields available to path templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateContext {
    pub name: String,
    pub version: String,
    pub os: String,
    pub arch: String,
    /// Executable suffix, derived from `os` alone.
    pub ext: String,
}

impl TemplateContext {
    pub fn new(name: &str, version: &str, platform: &PlatformTarget) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            os: platform.os.clone(),
            arch: platform.arch.clone(),
            ext: platform.executable_extension().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// A parsed template, reusable across contexts.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse `source`. `name` only appears in error messages.
    pub fn parse(name: &str, source: &str) -> Result<Self> {
        let nodes = parse::parse(source).map_err(|msg| BundlerError::template_syntax(name, msg))?;
        Ok(Self {
            name: name.to_string(),
            nodes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute the template against `context`.
    pub fn render<C: Serialize>(&self, context: &C) -> Result<String> {
        let data = serde_json::to_value(context)
            .map_err(|e| BundlerError::template_render(&self.name, e.to_string()))?;

        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Action(pipeline) => {
                    let value = self
                        .eval_pipeline(pipeline, &data)
                        .map_err(|msg| BundlerError::template_render(&self.name, msg))?;
                    out.push_str(&funcs::to_text(&value));
                }
            }
        }

        trace!(template = %self.name, rendered = %out, "template rendered");
        Ok(out)
    }

    fn eval_pipeline(&self, pipeline: &Pipeline, data: &Value) -> std::result::Result<Value, String> {
        let mut piped: Option<Value> = None;

        for command in &pipeline.commands {
            let value = match command {
                Command::Value(operand) => eval_operand(operand, data)?,
                Command::Call { name, func, args } => {
                    let mut values = args
                        .iter()
                        .map(|a| eval_operand(a, data))
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    values.extend(piped.take());
                    func(&values).map_err(|e| format!("error calling {name}: {e}"))?
                }
            };
            piped = Some(value);
        }

        Ok(piped.unwrap_or(Value::Null))
    }
}

fn eval_operand(operand: &Operand, data: &Value) -> std::result::Result<Value, String> {
    Ok(match operand {
        Operand::Dot => data.clone(),
        Operand::Str(s) => Value::String(s.clone()),
        Operand::Int(n) => Value::from(*n),
        Operand::Bool(b) => Value::Bool(*b),
        Operand::Field(path) => {
            let mut current = data;
            for field in path {
                current = match current {
                    Value::Object(map) => map
                        .get(field)
                        .ok_or_else(|| format!("can't evaluate field {field}"))?,
                    other => {
                        return Err(format!("can't evaluate field {field} in {}", kind(other)));
                    }
                };
            }
            current.clone()
        }
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Parse and render `source` in one step.
pub fn expand<C: Serialize>(name: &str, source: &str, context: &C) -> Result<String> {
    Template::parse(name, source)?.render(context)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
