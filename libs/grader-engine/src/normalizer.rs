/// Output Normalizer
///
/// Recovers a typed value from the console text of an accepted run. The
/// function is total: malformed text degrades through a fallback ladder and
/// finally comes back as an opaque string.
///
/// **Ladder:**
/// 1. empty / whitespace-only → null
/// 2. strict JSON decoding of the trimmed text
/// 3. `true` / `false` → boolean, numeric text → number,
///    `[ ... ]` → top-level comma split with per-element numeric parsing
/// 4. the trimmed text as a string

use serde_json::{Number, Value};

pub fn normalize(raw: &str) -> Value {
    let text = raw.trim();
    if text.is_empty() {
        return Value::Null;
    }

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return value;
    }

    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Some(number) = parse_number(text) {
        return number;
    }

    if let Some(interior) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        return Value::Array(split_top_level(interior).into_iter().map(element).collect());
    }

    Value::String(text.to_string())
}

fn element(token: &str) -> Value {
    parse_number(token).unwrap_or_else(|| Value::String(token.to_string()))
}

/// Integers keep their exact value; NaN and infinities are not numbers here
fn parse_number(text: &str) -> Option<Value> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::from(int));
    }
    let float = text.parse::<f64>().ok().filter(|f| f.is_finite())?;
    Number::from_f64(float).map(Value::Number)
}

/// Split on commas that are not nested inside brackets, braces or parentheses
fn split_top_level(interior: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    if interior.trim().is_empty() {
        return tokens;
    }

    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in interior.char_indices() {
        match c {
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                tokens.push(interior[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    tokens.push(interior[start..].trim());
    tokens
}
