//! The free-text search compiler.
//!
//! Expands one query string across a server-defined list of searchable
//! field specs into OR-combined case-insensitive substring conditions,
//! recursing through relation paths and matching enum fields by display
//! label instead of raw value.

use sieve_schema::{EntityDef, SchemaGraph};

use crate::condition::{Condition, Subquery};
use crate::error::CompileResult;
use crate::value::FilterValue;

use super::relation_hop;

/// Compile a free-text query over searchable field specs.
///
/// Each spec is a field name, a dotted relation path, or a `|`-separated
/// group of alternatives on the same row context. An empty query or an
/// empty spec list compiles to no condition at all.
pub fn compile_search<S: AsRef<str>>(
    graph: &SchemaGraph,
    entity: &EntityDef,
    query: &str,
    fields: &[S],
    locale: &str,
) -> CompileResult<Condition> {
    if query.is_empty() || fields.is_empty() {
        return Ok(Condition::None);
    }

    let mut branches = Vec::with_capacity(fields.len());
    for field in fields {
        branches.push(compile_field(graph, entity, field.as_ref(), query, locale, false)?);
    }
    Ok(Condition::or(branches))
}

fn compile_field(
    graph: &SchemaGraph,
    entity: &EntityDef,
    field: &str,
    query: &str,
    locale: &str,
    qualified: bool,
) -> CompileResult<Condition> {
    if let Some((head, rest)) = field.split_once('.') {
        let hop = relation_hop(graph, entity, head, false)?;
        let inner = compile_field(graph, hop.context, rest, query, locale, true)?;
        return Ok(Condition::Exists {
            subquery: Subquery {
                table: hop.table,
                joins: hop.joins,
                correlation: hop.correlation,
                condition: Box::new(inner),
            },
            negated: false,
        });
    }

    let mut alternatives = Vec::new();
    for name in field.split('|') {
        alternatives.push(compile_leaf(graph, entity, name, query, locale, qualified)?);
    }
    Ok(Condition::or(alternatives))
}

fn compile_leaf(
    graph: &SchemaGraph,
    entity: &EntityDef,
    field: &str,
    query: &str,
    locale: &str,
    qualified: bool,
) -> CompileResult<Condition> {
    let column = if qualified {
        format!("{}.{}", entity.table, field)
    } else {
        field.to_string()
    };

    // Enum fields match by label text, compiled down to a membership test on
    // the raw values whose label contains the query. Zero matches stay an
    // empty IN, which renders always-false.
    if let Some(enum_name) = entity
        .field_def(field)
        .and_then(|def| def.field_type.enum_name())
    {
        let enum_def = graph.enum_def(enum_name)?;
        let values = enum_def.values_with_label_containing(locale, query)?;
        return Ok(Condition::In {
            field: column.into(),
            values: values
                .into_iter()
                .map(|value| FilterValue::String(value.to_string()))
                .collect(),
        });
    }

    Ok(Condition::Like {
        field: column.into(),
        value: query.to_string(),
        case_insensitive: true,
    })
}
