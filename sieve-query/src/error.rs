//! Compile-time error taxonomy.
//!
//! Every error here is deterministic: it depends only on the filter input
//! and the schema graph, never on data-store state. All of them surface
//! during `build()`, before any I/O, and none are retried.

use std::collections::BTreeMap;

use thiserror::Error;

use sieve_schema::SchemaError;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors raised while compiling filters, sorts, searches or cache plans.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A filter/sort/search path references a relation the entity does not
    /// define.
    #[error("unknown relation `{relation}` on entity `{entity}`")]
    UnknownRelation {
        /// Entity context the lookup ran against.
        entity: String,
        /// The missing relation name.
        relation: String,
    },

    /// A sort path traverses a to-many relation; row multiplicity makes
    /// single-row ordering ill-defined.
    #[error("cannot sort by `{path}`: relation `{relation}` is to-many")]
    InvalidSortRelation {
        /// The full sort path.
        path: String,
        /// The offending relation segment.
        relation: String,
    },

    /// A filter code carries a malformed operator suffix combination.
    #[error("unresolvable operator in filter code `{code}`: {reason}")]
    UnresolvableOperator {
        /// The offending filter code.
        code: String,
        /// What could not be resolved.
        reason: String,
    },

    /// A cache plan requests invalidation but carries zero tags, so its
    /// entries could never be flushed.
    #[error("cache plan has no tags; entries would be impossible to invalidate")]
    CacheTagMissing,

    /// Input shape violates declared rules.
    #[error("validation failed: {message}")]
    Validation {
        /// Human-readable summary.
        message: String,
        /// Field-level messages.
        bag: BTreeMap<String, Vec<String>>,
    },

    /// Schema graph lookup or configuration failure.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl CompileError {
    /// Create a validation error for a single field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut bag = BTreeMap::new();
        bag.insert(field.into(), vec![message.clone()]);
        Self::Validation { message, bag }
    }

    /// Stable machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownRelation { .. } => "unknown_relation_exception",
            Self::InvalidSortRelation { .. } => "invalid_sort_relation_exception",
            Self::UnresolvableOperator { .. } => "unresolvable_operator_exception",
            Self::CacheTagMissing => "invalid_cache_tag_exception",
            Self::Validation { .. } => "validation_exception",
            Self::Schema(_) => "schema_exception",
        }
    }

    /// The field-level error bag, if any.
    pub fn bag(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            Self::Validation { bag, .. } => Some(bag),
            _ => None,
        }
    }
}
