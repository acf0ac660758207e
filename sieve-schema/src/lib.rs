//! # sieve-schema
//!
//! Schema graph for the Sieve query compiler.
//!
//! The compiler in `sieve-query` is a pure transformer: it never inspects a
//! live database. Everything it needs to know about the data model — which
//! fields an entity has, how entities relate to each other, which join keys
//! tie a pivot table to its endpoints, what an enum's display labels are —
//! is registered up front in a [`SchemaGraph`] and passed explicitly into
//! every compile call.
//!
//! ## Building a graph
//!
//! ```rust
//! use sieve_schema::{EntityDef, FieldDef, RelationDef, SchemaGraph};
//!
//! let mut graph = SchemaGraph::new();
//! graph.register_entity(
//!     EntityDef::new("User", "users")
//!         .field(FieldDef::uuid("id"))
//!         .field(FieldDef::string("name"))
//!         .field(FieldDef::uuid("team_id"))
//!         .relation(RelationDef::to_one("team", "Team").keys("team_id", "id")),
//! );
//! graph.register_entity(
//!     EntityDef::new("Team", "teams")
//!         .field(FieldDef::uuid("id"))
//!         .field(FieldDef::string("name")),
//! );
//! assert!(graph.validate().is_ok());
//! ```

pub mod entity;
pub mod enum_def;
pub mod error;
pub mod graph;
pub mod relation;

pub use entity::{EntityDef, FieldDef, FieldType};
pub use enum_def::EnumDef;
pub use error::{SchemaError, SchemaResult};
pub use graph::SchemaGraph;
pub use relation::{PivotDef, RelationDef, RelationKind};
