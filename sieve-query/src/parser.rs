//! Filter-code parser.
//!
//! A filter code is a dot-separated relation path ending in a field name
//! with an optional operator suffix:
//!
//! ```text
//! status                       equality / IN / IS NULL by value shape
//! age@gte                      comparison
//! price@!                      not-equal / NOT IN / IS NOT NULL by value shape
//! name@ilike                   case-insensitive contains
//! tags@?  tags@?! tags@?|      JSON containment: all / none / any
//! settings@#notify,email@gte   JSON dive, optionally chained with a suffix
//! team.name                    to-one/to-many relation hop
//! !tags.label                  negated hop (NOT EXISTS)
//! roles_pivot.level@gte        pivot-addressed hop
//! ```
//!
//! The grammar is versioned and final: `@?` is ALL-containment, `@?|` is
//! ANY, `@?!` is absence. Anything else after an `@` is a fatal
//! [`CompileError::UnresolvableOperator`] — malformed codes fail at compile
//! time instead of leaking into SQL.

use crate::error::{CompileError, CompileResult};

/// One relation hop in a parsed filter code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// Relation name.
    pub name: String,
    /// The hop addresses the pivot entity (`_pivot` suffix).
    pub pivot: bool,
    /// The hop is negated (leading `!`).
    pub negated: bool,
}

/// Operator carried by the terminal field of a filter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// No suffix: dispatch on value shape (null / list / scalar).
    Default,
    /// `@gte`
    Gte,
    /// `@lte`
    Lte,
    /// `@gt`
    Gt,
    /// `@lt`
    Lt,
    /// `@!`: not-equal / NOT IN / IS NOT NULL by value shape.
    NotEq,
    /// `@like`: case-sensitive contains.
    Like,
    /// `@ilike`: case-insensitive contains.
    ILike,
    /// `@?`: JSON containment, ALL semantics.
    JsonHasAll,
    /// `@?!`: JSON absence of all listed values.
    JsonLacksAll,
    /// `@?|`: JSON containment, ANY semantics.
    JsonHasAny,
}

/// The parsed form of a filter code.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFilter {
    /// Relation hops, outermost first.
    pub segments: Vec<PathSegment>,
    /// Terminal field name.
    pub field: String,
    /// JSON keys from an `@#` dive, outermost first.
    pub json_path: Vec<String>,
    /// Terminal operator.
    pub op: FilterOp,
}

/// Parse a filter code into its path, field, JSON path and operator.
pub fn parse(code: &str) -> CompileResult<ParsedFilter> {
    let mut raw_segments: Vec<&str> = code.split('.').collect();
    let terminal = raw_segments.pop().unwrap_or_default();

    let mut segments = Vec::with_capacity(raw_segments.len());
    for raw in raw_segments {
        let (negated, rest) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (pivot, name) = match rest.strip_suffix("_pivot") {
            Some(name) => (true, name),
            None => (false, rest),
        };
        if name.is_empty() {
            return Err(unresolvable(code, "empty path segment"));
        }
        segments.push(PathSegment {
            name: name.to_string(),
            pivot,
            negated,
        });
    }

    let (field, json_path, op) = parse_terminal(code, terminal)?;

    Ok(ParsedFilter {
        segments,
        field,
        json_path,
        op,
    })
}

fn parse_terminal(code: &str, terminal: &str) -> CompileResult<(String, Vec<String>, FilterOp)> {
    if terminal.is_empty() {
        return Err(unresolvable(code, "empty field name"));
    }

    // JSON dive binds tighter than any other suffix, since path keys may be
    // followed by a chained comparison operator.
    if let Some(idx) = terminal.find("@#") {
        let field = &terminal[..idx];
        if field.is_empty() {
            return Err(unresolvable(code, "JSON path without a field"));
        }
        let rest = &terminal[idx + 2..];
        let (path_str, suffix) = match rest.find('@') {
            Some(at) => (&rest[..at], &rest[at..]),
            None => (rest, ""),
        };
        if path_str.is_empty() {
            return Err(unresolvable(code, "empty JSON path"));
        }
        let json_path: Vec<String> = path_str.split(',').map(str::to_string).collect();
        if json_path.iter().any(String::is_empty) {
            return Err(unresolvable(code, "empty JSON path key"));
        }
        let op = match suffix {
            "" => FilterOp::Default,
            _ => parse_suffix(code, suffix)?,
        };
        return Ok((field.to_string(), json_path, op));
    }

    match terminal.find('@') {
        Some(idx) => {
            let field = &terminal[..idx];
            if field.is_empty() {
                return Err(unresolvable(code, "operator without a field"));
            }
            let op = parse_suffix(code, &terminal[idx..])?;
            Ok((field.to_string(), Vec::new(), op))
        }
        None => Ok((terminal.to_string(), Vec::new(), FilterOp::Default)),
    }
}

fn parse_suffix(code: &str, suffix: &str) -> CompileResult<FilterOp> {
    match suffix {
        "@gte" => Ok(FilterOp::Gte),
        "@lte" => Ok(FilterOp::Lte),
        "@gt" => Ok(FilterOp::Gt),
        "@lt" => Ok(FilterOp::Lt),
        "@!" => Ok(FilterOp::NotEq),
        "@like" => Ok(FilterOp::Like),
        "@ilike" => Ok(FilterOp::ILike),
        "@?" => Ok(FilterOp::JsonHasAll),
        "@?!" => Ok(FilterOp::JsonLacksAll),
        "@?|" => Ok(FilterOp::JsonHasAny),
        _ => Err(unresolvable(
            code,
            format!("unknown operator suffix `{}`", suffix),
        )),
    }
}

fn unresolvable(code: &str, reason: impl Into<String>) -> CompileError {
    CompileError::UnresolvableOperator {
        code: code.to_string(),
        reason: reason.into(),
    }
}
