//! String helper functions available inside templates.
//!
//! Names and argument order follow the sprig library, so a piped value always
//! lands in the last parameter: `{{ .Name | trimPrefix "xk6-" }}`.

use serde_json::Value;

pub(crate) type Func = fn(&[Value]) -> Result<Value, String>;

pub(crate) fn lookup(name: &str) -> Option<Func> {
    let func: Func = match name {
        "upper" => upper,
        "lower" => lower,
        "title" => title,
        "trim" => trim,
        "trimPrefix" => trim_prefix,
        "trimSuffix" => trim_suffix,
        "replace" => replace,
        "trunc" => trunc,
        "default" => default,
        _ => return None,
    };
    Some(func)
}

/// Render a value the way it appears in template output.
pub(crate) fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn arity(args: &[Value], expected: usize) -> Result<(), String> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(format!(
            "wrong number of args: want {expected} got {}",
            args.len()
        ))
    }
}

fn int_arg(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| format!("{n} is not an integer")),
        Value::String(s) => s.parse().map_err(|_| format!("{s:?} is not an integer")),
        other => Err(format!("{other} is not an integer")),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn unary(args: &[Value], f: impl Fn(&str) -> String) -> Result<Value, String> {
    arity(args, 1)?;
    Ok(Value::String(f(&to_text(&args[0]))))
}

fn binary(args: &[Value], f: impl Fn(&str, &str) -> String) -> Result<Value, String> {
    arity(args, 2)?;
    Ok(Value::String(f(&to_text(&args[0]), &to_text(&args[1]))))
}

// ---------------------------------------------------------------------------
// Case and whitespace
// ---------------------------------------------------------------------------

fn upper(args: &[Value]) -> Result<Value, String> {
    unary(args, str::to_uppercase)
}

fn lower(args: &[Value]) -> Result<Value, String> {
    unary(args, str::to_lowercase)
}

fn title(args: &[Value]) -> Result<Value, String> {
    unary(args, |s| {
        let mut out = String::with_capacity(s.len());
        let mut at_word_start = true;
        for c in s.chars() {
            if at_word_start && c.is_alphabetic() {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = !c.is_alphanumeric();
        }
        out
    })
}

fn trim(args: &[Value]) -> Result<Value, String> {
    unary(args, |s| s.trim().to_string())
}

fn trim_prefix(args: &[Value]) -> Result<Value, String> {
    binary(args, |prefix, s| s.strip_prefix(prefix).unwrap_or(s).to_string())
}

fn trim_suffix(args: &[Value]) -> Result<Value, String> {
    binary(args, |suffix, s| s.strip_suffix(suffix).unwrap_or(s).to_string())
}

// ---------------------------------------------------------------------------
// Substitution
// ---------------------------------------------------------------------------

fn replace(args: &[Value]) -> Result<Value, String> {
    arity(args, 3)?;
    let (old, new, s) = (to_text(&args[0]), to_text(&args[1]), to_text(&args[2]));
    Ok(Value::String(s.replace(&old, &new)))
}

fn trunc(args: &[Value]) -> Result<Value, String> {
    arity(args, 2)?;
    let n = int_arg(&args[0])?;
    let chars: Vec<char> = to_text(&args[1]).chars().collect();
    let len = chars.len();
    let kept: String = if n >= 0 {
        chars[..len.min(n.unsigned_abs() as usize)].iter().collect()
    } else {
        chars[len.saturating_sub(n.unsigned_abs() as usize)..].iter().collect()
    };
    Ok(Value::String(kept))
}

fn default(args: &[Value]) -> Result<Value, String> {
    match args {
        [fallback] => Ok(fallback.clone()),
        [fallback, given] if is_empty(given) => Ok(fallback.clone()),
        [_, given] => Ok(given.clone()),
        _ => Err(format!("wrong number of args: want 1 or 2 got {}", args.len())),
    }
}
