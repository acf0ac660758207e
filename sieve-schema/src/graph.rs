//! The schema graph registry and its validation pass.

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::entity::EntityDef;
use crate::enum_def::EnumDef;
use crate::error::{SchemaError, SchemaResult};
use crate::relation::RelationKind;

/// Registry of entity and enum definitions.
///
/// A graph is built once at application startup and shared immutably by all
/// query compilations. Lookups are fail-fast: an unknown name is a
/// configuration error, never an empty result.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    entities: IndexMap<SmolStr, EntityDef>,
    enums: IndexMap<SmolStr, EnumDef>,
}

impl SchemaGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity, replacing any previous definition of the same name.
    pub fn register_entity(&mut self, entity: EntityDef) -> &mut Self {
        debug!(entity = %entity.name, table = %entity.table, "registering entity");
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    /// Register an enum, replacing any previous definition of the same name.
    pub fn register_enum(&mut self, enum_def: EnumDef) -> &mut Self {
        self.enums.insert(enum_def.name.clone(), enum_def);
        self
    }

    /// Look up an entity by name.
    pub fn entity(&self, name: &str) -> SchemaResult<&EntityDef> {
        self.entities
            .get(name)
            .ok_or_else(|| SchemaError::UnknownEntity(name.to_string()))
    }

    /// Look up an enum by name.
    pub fn enum_def(&self, name: &str) -> SchemaResult<&EnumDef> {
        self.enums
            .get(name)
            .ok_or_else(|| SchemaError::UnknownEnum(name.to_string()))
    }

    /// Iterate over registered entities in registration order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityDef> {
        self.entities.values()
    }

    /// Cross-reference every definition in the graph.
    ///
    /// Checks that relation targets and pivot entities are registered, that
    /// pivot key columns exist on the pivot entity, that many-to-many
    /// relations carry a pivot, and that every enum-typed field references a
    /// registered enum. Returns all problems found, not just the first.
    pub fn validate(&self) -> Result<(), Vec<SchemaError>> {
        let mut errors = Vec::new();

        for entity in self.entities.values() {
            for field in entity.fields() {
                if let Some(enum_name) = field.field_type.enum_name()
                    && !self.enums.contains_key(enum_name)
                {
                    errors.push(SchemaError::UnknownEnum(enum_name.to_string()));
                }
            }

            for relation in entity.relations() {
                if !self.entities.contains_key(relation.target.as_str()) {
                    errors.push(SchemaError::UnknownEntity(relation.target.to_string()));
                }

                match (&relation.kind, &relation.pivot) {
                    (RelationKind::ManyToMany, None) => {
                        errors.push(SchemaError::MissingPivot {
                            entity: entity.name.to_string(),
                            relation: relation.name.to_string(),
                        });
                    }
                    (RelationKind::ManyToMany, Some(pivot)) => {
                        match self.entities.get(pivot.entity.as_str()) {
                            None => {
                                errors.push(SchemaError::UnknownEntity(pivot.entity.to_string()));
                            }
                            Some(pivot_entity) => {
                                for key in [&pivot.parent_key, &pivot.related_key] {
                                    if pivot_entity.field_def(key).is_none() {
                                        errors.push(SchemaError::UnknownField {
                                            entity: pivot_entity.name.to_string(),
                                            field: key.to_string(),
                                        });
                                    }
                                }
                            }
                        }
                    }
                    (_, Some(_)) => {
                        errors.push(SchemaError::InvalidRelation {
                            entity: entity.name.to_string(),
                            relation: relation.name.to_string(),
                            reason: "only many-to-many relations take a pivot".to_string(),
                        });
                    }
                    _ => {}
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
