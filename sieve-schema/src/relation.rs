//! Relation definitions between entities.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Single related record (belongs-to / has-one).
    ToOne,
    /// Multiple related records keyed directly on the target (has-many).
    ToMany,
    /// Multiple related records mediated by a pivot table.
    ManyToMany,
}

impl RelationKind {
    /// Check if this relation can return multiple records.
    pub fn is_many(&self) -> bool {
        matches!(self, Self::ToMany | Self::ManyToMany)
    }

    /// Check if this relation returns at most one record.
    pub fn is_one(&self) -> bool {
        matches!(self, Self::ToOne)
    }
}

/// Pivot table description for a many-to-many relation.
///
/// The pivot is itself a registered entity, so filters addressed at the
/// pivot (`roles_pivot.level`) can resolve its fields — and, for deeper
/// paths, its own relations — exactly like any other entity context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotDef {
    /// Name of the registered pivot entity.
    pub entity: SmolStr,
    /// Pivot column referencing the owning entity's primary key.
    pub parent_key: SmolStr,
    /// Pivot column referencing the target entity's primary key.
    pub related_key: SmolStr,
}

impl PivotDef {
    /// Create a pivot definition.
    pub fn new(
        entity: impl Into<SmolStr>,
        parent_key: impl Into<SmolStr>,
        related_key: impl Into<SmolStr>,
    ) -> Self {
        Self {
            entity: entity.into(),
            parent_key: parent_key.into(),
            related_key: related_key.into(),
        }
    }
}

/// Definition of a relation from one entity to another.
///
/// Join-key semantics by kind:
/// - `ToOne`: `owner.local_key = target.foreign_key` (a belongs-to style
///   hop; model has-one by putting the owning column on the target).
/// - `ToMany`: `target.foreign_key = owner.local_key`, where `local_key`
///   is normally the owner's primary key.
/// - `ManyToMany`: keys live on the pivot; see [`PivotDef`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relation name as used in filter codes and sort paths.
    pub name: SmolStr,
    /// Target entity name.
    pub target: SmolStr,
    /// Cardinality.
    pub kind: RelationKind,
    /// Join column on the owning entity.
    pub local_key: SmolStr,
    /// Join column on the target entity.
    pub foreign_key: SmolStr,
    /// Pivot description for many-to-many relations.
    pub pivot: Option<PivotDef>,
}

impl RelationDef {
    /// Create a to-one relation.
    pub fn to_one(name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::ToOne,
            local_key: SmolStr::new_static("id"),
            foreign_key: SmolStr::new_static("id"),
            pivot: None,
        }
    }

    /// Create a to-many relation.
    pub fn to_many(name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::ToMany,
            local_key: SmolStr::new_static("id"),
            foreign_key: SmolStr::new_static("id"),
            pivot: None,
        }
    }

    /// Create a many-to-many relation through a pivot entity.
    pub fn many_to_many(
        name: impl Into<SmolStr>,
        target: impl Into<SmolStr>,
        pivot: PivotDef,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::ManyToMany,
            local_key: SmolStr::new_static("id"),
            foreign_key: SmolStr::new_static("id"),
            pivot: Some(pivot),
        }
    }

    /// Set the join columns: `local_key` on the owner, `foreign_key` on the
    /// target.
    pub fn keys(mut self, local_key: impl Into<SmolStr>, foreign_key: impl Into<SmolStr>) -> Self {
        self.local_key = local_key.into();
        self.foreign_key = foreign_key.into();
        self
    }
}
