//! The filter, order-by and free-text search compilers.
//!
//! Each compiler is a pure function from (schema graph, entity context,
//! input) to a compiled form. Relation traversal is shared: every hop
//! becomes a correlated EXISTS subquery whose shape depends only on the
//! relation's kind and join keys.

pub mod filters;
pub mod order;
pub mod search;

pub use filters::compile_filter;
pub use order::{OrderExpr, OrderSelect, compile_sort};
pub use search::compile_search;

use sieve_schema::{EntityDef, RelationKind, SchemaError, SchemaGraph};

use crate::condition::Join;
use crate::error::{CompileError, CompileResult};

/// The resolved pieces of one relation hop: the entity context the rest of
/// the path compiles against, and the subquery skeleton for the hop.
pub(crate) struct RelationHop<'g> {
    /// Entity context for the remainder of the path.
    pub context: &'g EntityDef,
    /// Subquery FROM table.
    pub table: String,
    /// Joins inside the subquery.
    pub joins: Vec<Join>,
    /// Correlation predicate: inner column = outer column.
    pub correlation: (String, String),
}

/// Resolve one hop of a relation path against the owning entity.
///
/// `pivot_addressed` is the `_pivot` form: the subquery runs over the pivot
/// table itself and the remainder of the path compiles against the pivot
/// entity.
pub(crate) fn relation_hop<'g>(
    graph: &'g SchemaGraph,
    outer: &EntityDef,
    name: &str,
    pivot_addressed: bool,
) -> CompileResult<RelationHop<'g>> {
    let relation = outer
        .relation_def(name)
        .ok_or_else(|| CompileError::UnknownRelation {
            entity: outer.name.to_string(),
            relation: name.to_string(),
        })?;

    let missing_pivot = || {
        CompileError::Schema(SchemaError::MissingPivot {
            entity: outer.name.to_string(),
            relation: name.to_string(),
        })
    };

    if pivot_addressed {
        let pivot = relation.pivot.as_ref().ok_or_else(missing_pivot)?;
        let pivot_entity = graph.entity(&pivot.entity)?;
        return Ok(RelationHop {
            context: pivot_entity,
            table: pivot_entity.table.to_string(),
            joins: Vec::new(),
            correlation: (
                format!("{}.{}", pivot_entity.table, pivot.parent_key),
                format!("{}.{}", outer.table, outer.primary_key),
            ),
        });
    }

    let target = graph.entity(&relation.target)?;
    match relation.kind {
        RelationKind::ToOne | RelationKind::ToMany => Ok(RelationHop {
            context: target,
            table: target.table.to_string(),
            joins: Vec::new(),
            correlation: (
                format!("{}.{}", target.table, relation.foreign_key),
                format!("{}.{}", outer.table, relation.local_key),
            ),
        }),
        RelationKind::ManyToMany => {
            let pivot = relation.pivot.as_ref().ok_or_else(missing_pivot)?;
            let pivot_entity = graph.entity(&pivot.entity)?;
            Ok(RelationHop {
                context: target,
                table: target.table.to_string(),
                joins: vec![Join {
                    table: pivot_entity.table.to_string(),
                    left: format!("{}.{}", pivot_entity.table, pivot.related_key),
                    right: format!("{}.{}", target.table, target.primary_key),
                }],
                correlation: (
                    format!("{}.{}", pivot_entity.table, pivot.parent_key),
                    format!("{}.{}", outer.table, outer.primary_key),
                ),
            })
        }
    }
}
