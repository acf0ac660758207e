//! Schema configuration errors.
//!
//! All of these are deterministic configuration mistakes: a relation naming
//! an entity that was never registered, an enum field with no matching enum
//! definition, and so on. They surface at registration/validation time or at
//! compile time, never during query execution.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building or querying the schema graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// An entity name is not registered in the graph.
    #[error("unknown entity `{0}`")]
    UnknownEntity(String),

    /// A relation name is not defined on the entity.
    #[error("unknown relation `{relation}` on entity `{entity}`")]
    UnknownRelation {
        /// Entity the lookup ran against.
        entity: String,
        /// The missing relation name.
        relation: String,
    },

    /// A field name is not defined on the entity.
    #[error("unknown field `{field}` on entity `{entity}`")]
    UnknownField {
        /// Entity the lookup ran against.
        entity: String,
        /// The missing field name.
        field: String,
    },

    /// An enum name is not registered in the graph.
    #[error("unknown enum `{0}`")]
    UnknownEnum(String),

    /// A many-to-many relation was declared without a pivot definition.
    #[error("relation `{relation}` on entity `{entity}` is many-to-many but has no pivot")]
    MissingPivot {
        /// Entity owning the relation.
        entity: String,
        /// The relation missing its pivot.
        relation: String,
    },

    /// An enum has no label table for the requested locale.
    #[error("enum `{name}` has no labels for locale `{locale}`")]
    LabelsMissing {
        /// The enum name.
        name: String,
        /// The requested locale.
        locale: String,
    },

    /// A relation definition is internally inconsistent.
    #[error("invalid relation `{relation}` on entity `{entity}`: {reason}")]
    InvalidRelation {
        /// Entity owning the relation.
        entity: String,
        /// The offending relation name.
        relation: String,
        /// What is wrong with it.
        reason: String,
    },
}
