/// Harness Generator
///
/// **Responsibility:**
/// Wrap submitted source in a runnable program that calls the solution entry
/// point with one test case's input and prints a single serialized result.
///
/// **Adapters:**
/// - `FunctionStyle` (javascript): free function, errors reported in-band on stdout
/// - `MethodStyle` (python): `Solution` object method, errors on stderr + exit 1
/// - `TypedCompiled` (java): hard-coded typed call built from source literals
///
/// The entry point is taken from the signature registry, never probed.

mod java;
mod javascript;
mod literal;
mod python;

use crate::error::HarnessError;
use crate::signature::{self, Param, SignatureSpec, ValueKind};
use grader_common::types::{Language, ProblemSignature};
use serde_json::{Map, Value};

pub use javascript::HARNESS_ERROR_KEY;

/// Node chains longer than this are treated as cyclic by the harness
pub(crate) const MAX_LIST_NODES: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    FunctionStyle,
    MethodStyle,
    TypedCompiled,
}

impl Adapter {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::JavaScript => Adapter::FunctionStyle,
            Language::Python => Adapter::MethodStyle,
            Language::Java => Adapter::TypedCompiled,
        }
    }

    pub fn render(
        &self,
        source_code: &str,
        spec: &SignatureSpec,
        input: &Value,
    ) -> Result<String, HarnessError> {
        let args = bind_arguments(spec, input)?;
        let program = match self {
            Adapter::FunctionStyle => javascript::render(source_code, spec, &args),
            Adapter::MethodStyle => python::render(source_code, spec, &args),
            Adapter::TypedCompiled => java::render(source_code, spec, &args)?,
        };
        Ok(program)
    }
}

/// Build the complete harness program for one test case
pub fn generate(
    source_code: &str,
    language: Language,
    signature: ProblemSignature,
    input: &Value,
) -> Result<String, HarnessError> {
    Adapter::for_language(language).render(source_code, signature::spec(signature), input)
}

/// How a runtime marks comments, for spotting declarations in submitted source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommentSyntax {
    /// `#` to end of line
    Hash,
    /// `//` to end of line and `/* ... */` blocks
    CLike,
}

const DECLARATION_MODIFIERS: &[&str] = &[
    "public", "private", "protected", "static", "final", "abstract", "export",
];

/// Whether the source declares `name` with one of `keywords` outside comments
///
/// Only declarations that start a line (after modifiers) count.
pub(crate) fn declares_type(
    source_code: &str,
    syntax: CommentSyntax,
    keywords: &[&str],
    name: &str,
) -> bool {
    let mut in_block = false;
    source_code.lines().any(|line| {
        let code = match syntax {
            CommentSyntax::Hash => line.split('#').next().unwrap_or_default().to_string(),
            CommentSyntax::CLike => strip_c_comments(line, &mut in_block),
        };
        declares_on_line(&code, keywords, name)
    })
}

fn strip_c_comments(line: &str, in_block: &mut bool) -> String {
    let mut code = String::new();
    let mut rest = line;
    loop {
        if *in_block {
            match rest.find("*/") {
                Some(end) => {
                    rest = &rest[end + 2..];
                    *in_block = false;
                }
                None => return code,
            }
        }
        match (rest.find("/*"), rest.find("//")) {
            (Some(block), line_comment) if line_comment.map_or(true, |l| block < l) => {
                code.push_str(&rest[..block]);
                code.push(' ');
                rest = &rest[block + 2..];
                *in_block = true;
            }
            (_, Some(line_comment)) => {
                code.push_str(&rest[..line_comment]);
                return code;
            }
            _ => {
                code.push_str(rest);
                return code;
            }
        }
    }
}

fn declares_on_line(code: &str, keywords: &[&str], name: &str) -> bool {
    let mut tokens = code
        .split_whitespace()
        .skip_while(|token| DECLARATION_MODIFIERS.contains(token));
    match (tokens.next(), tokens.next()) {
        (Some(keyword), Some(ident)) if keywords.contains(&keyword) => ident
            .strip_prefix(name)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_')),
        _ => false,
    }
}

/// Argument value validated against its declared kind
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Arg {
    Int(i64),
    Bool(bool),
    Ints(Vec<i64>),
    Str(String),
    Tree(Vec<Option<i64>>),
}

impl Arg {
    pub(crate) fn to_json(&self) -> Value {
        match self {
            Arg::Int(v) => Value::from(*v),
            Arg::Bool(v) => Value::Bool(*v),
            Arg::Ints(values) => Value::Array(values.iter().map(|v| Value::from(*v)).collect()),
            Arg::Str(s) => Value::String(s.clone()),
            Arg::Tree(values) => Value::Array(
                values
                    .iter()
                    .map(|v| v.map(Value::from).unwrap_or(Value::Null))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Bound {
    pub param: Param,
    pub arg: Arg,
}

/// Object holding only the declared parameters, in declaration order
pub(crate) fn input_object(args: &[Bound]) -> Value {
    let mut map = Map::new();
    for bound in args {
        map.insert(bound.param.name.to_string(), bound.arg.to_json());
    }
    Value::Object(map)
}

fn bind_arguments(spec: &SignatureSpec, input: &Value) -> Result<Vec<Bound>, HarnessError> {
    let map = input
        .as_object()
        .ok_or_else(|| HarnessError::InputNotObject(kind_name(input).to_string()))?;

    spec.params
        .iter()
        .map(|param| {
            let arg = match map.get(param.name) {
                Some(value) if !value.is_null() => bind(param, value)?,
                _ if param.kind.is_sequence() => empty_sequence(param.kind),
                _ => return Err(HarnessError::MissingArgument(param.name.to_string())),
            };
            Ok(Bound { param: *param, arg })
        })
        .collect()
}

fn empty_sequence(kind: ValueKind) -> Arg {
    match kind {
        ValueKind::BinaryTree => Arg::Tree(Vec::new()),
        _ => Arg::Ints(Vec::new()),
    }
}

fn bind(param: &Param, value: &Value) -> Result<Arg, HarnessError> {
    let invalid = || HarnessError::InvalidArgument {
        name: param.name.to_string(),
        expected: param.kind.describe(),
        found: kind_name(value).to_string(),
    };

    match param.kind {
        ValueKind::Int => value.as_i64().map(Arg::Int).ok_or_else(invalid),
        ValueKind::Bool => value.as_bool().map(Arg::Bool).ok_or_else(invalid),
        ValueKind::Str => value
            .as_str()
            .map(|s| Arg::Str(s.to_string()))
            .ok_or_else(invalid),
        ValueKind::IntArray | ValueKind::LinkedList => {
            let items = value.as_array().ok_or_else(invalid)?;
            items
                .iter()
                .map(|item| item.as_i64().ok_or_else(invalid))
                .collect::<Result<Vec<_>, _>>()
                .map(Arg::Ints)
        }
        ValueKind::BinaryTree => {
            let items = value.as_array().ok_or_else(invalid)?;
            items
                .iter()
                .map(|item| match item {
                    Value::Null => Ok(None),
                    other => other.as_i64().map(Some).ok_or_else(invalid),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Arg::Tree)
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "an integer",
        Value::Number(_) => "a float",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
