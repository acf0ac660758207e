//! Entity and field definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::relation::RelationDef;

/// The storage type of a field, as far as the compiler cares.
///
/// The compiler does not coerce values; it only uses the type to pick the
/// right condition shape (JSON-array null handling, enum label lookups).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Text column.
    String,
    /// Integer column.
    Int,
    /// Floating-point column.
    Float,
    /// Boolean column.
    Bool,
    /// Date/time column.
    DateTime,
    /// UUID column.
    Uuid,
    /// JSON object column.
    Json,
    /// JSON column holding an array; null filters compare against the
    /// empty-array/empty-object representations as well as SQL NULL.
    JsonArray,
    /// Enum-typed column; the name references a registered [`crate::EnumDef`].
    Enum(SmolStr),
}

impl FieldType {
    /// Check if this is an enum-typed field.
    pub fn is_enum(&self) -> bool {
        matches!(self, Self::Enum(_))
    }

    /// Get the enum name, if this is an enum-typed field.
    pub fn enum_name(&self) -> Option<&str> {
        match self {
            Self::Enum(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Check if this is a JSON array field.
    pub fn is_json_array(&self) -> bool {
        matches!(self, Self::JsonArray)
    }
}

/// Definition of a single entity field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Column name.
    pub name: SmolStr,
    /// Storage type.
    pub field_type: FieldType,
    /// Whether the field may appear in filter codes.
    pub filterable: bool,
    /// Whether the field may appear in sort specifications.
    pub sortable: bool,
}

impl FieldDef {
    /// Create a field definition.
    pub fn new(name: impl Into<SmolStr>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            filterable: true,
            sortable: true,
        }
    }

    /// Create a string field.
    pub fn string(name: impl Into<SmolStr>) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Create an integer field.
    pub fn int(name: impl Into<SmolStr>) -> Self {
        Self::new(name, FieldType::Int)
    }

    /// Create a float field.
    pub fn float(name: impl Into<SmolStr>) -> Self {
        Self::new(name, FieldType::Float)
    }

    /// Create a boolean field.
    pub fn bool(name: impl Into<SmolStr>) -> Self {
        Self::new(name, FieldType::Bool)
    }

    /// Create a date/time field.
    pub fn date_time(name: impl Into<SmolStr>) -> Self {
        Self::new(name, FieldType::DateTime)
    }

    /// Create a UUID field.
    pub fn uuid(name: impl Into<SmolStr>) -> Self {
        Self::new(name, FieldType::Uuid)
    }

    /// Create a JSON object field.
    pub fn json(name: impl Into<SmolStr>) -> Self {
        Self::new(name, FieldType::Json)
    }

    /// Create a JSON array field.
    pub fn json_array(name: impl Into<SmolStr>) -> Self {
        Self::new(name, FieldType::JsonArray)
    }

    /// Create an enum-typed field referencing a registered enum.
    pub fn enumeration(name: impl Into<SmolStr>, enum_name: impl Into<SmolStr>) -> Self {
        Self::new(name, FieldType::Enum(enum_name.into()))
    }

    /// Exclude the field from filtering.
    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Exclude the field from sorting.
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

/// Definition of an entity: a table plus its fields and relations.
#[derive(Debug, Clone, Default)]
pub struct EntityDef {
    /// Logical entity name (e.g. `User`).
    pub name: SmolStr,
    /// Backing table name (e.g. `users`).
    pub table: SmolStr,
    /// Primary key column.
    pub primary_key: SmolStr,
    fields: IndexMap<SmolStr, FieldDef>,
    relations: IndexMap<SmolStr, RelationDef>,
}

impl EntityDef {
    /// Create an entity definition with the default `id` primary key.
    pub fn new(name: impl Into<SmolStr>, table: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            primary_key: SmolStr::new_static("id"),
            fields: IndexMap::new(),
            relations: IndexMap::new(),
        }
    }

    /// Override the primary key column.
    pub fn primary_key(mut self, key: impl Into<SmolStr>) -> Self {
        self.primary_key = key.into();
        self
    }

    /// Add a field.
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Add a relation.
    pub fn relation(mut self, relation: RelationDef) -> Self {
        self.relations.insert(relation.name.clone(), relation);
        self
    }

    /// Look up a field by name.
    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Look up a relation by name.
    pub fn relation_def(&self, name: &str) -> Option<&RelationDef> {
        self.relations.get(name)
    }

    /// Iterate over all fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    /// Iterate over all relations in declaration order.
    pub fn relations(&self) -> impl Iterator<Item = &RelationDef> {
        self.relations.values()
    }
}
