//! # Sieve
//!
//! A declarative list-query compiler for REST APIs: flat filter maps,
//! dotted sort paths and free-text search compiled into SQL condition
//! trees, with offset pagination and a tag-addressable result cache.
//!
//! Sieve is split into two crates, re-exported here:
//! - [`schema`] — the schema graph: entities, fields, relations (including
//!   many-to-many pivots) and enums with per-locale display labels.
//! - [`query`] — the compiler core: filter-code parsing, condition/order/
//!   search compilation, pagination, the cache layer, the list-request wire
//!   format and the response envelope.
//!
//! ## Quick Start
//!
//! ```rust
//! use sieve::prelude::*;
//! use sieve::schema::{EntityDef, FieldDef, RelationDef, SchemaGraph};
//!
//! let mut graph = SchemaGraph::new();
//! graph.register_entity(
//!     EntityDef::new("User", "users")
//!         .field(FieldDef::uuid("id"))
//!         .field(FieldDef::string("status"))
//!         .field(FieldDef::uuid("team_id"))
//!         .relation(RelationDef::to_one("team", "Team").keys("team_id", "id")),
//! );
//! graph.register_entity(
//!     EntityDef::new("Team", "teams")
//!         .field(FieldDef::uuid("id"))
//!         .field(FieldDef::string("name")),
//! );
//!
//! let compiled = ListQuery::new(&graph, "User")
//!     .unwrap()
//!     .filter("status", "active")
//!     .filter("team.name", "Eng")
//!     .build()
//!     .unwrap();
//!
//! assert!(compiled.sql.contains("EXISTS (SELECT 1 FROM teams"));
//! ```

pub use sieve_query as query;
pub use sieve_schema as schema;

pub use sieve_query::{
    CacheDirective, CacheStore, CacheTag, CachedExecutor, CompileError, CompiledQuery, Condition,
    Dialect, ErrorEnvelope, Executor, FilterValue, ListQuery, ListRequest, MemoryStore, PageMeta,
    Pagination, SortDirection, SortSpec, SuccessEnvelope,
};
pub use sieve_schema::{EntityDef, EnumDef, FieldDef, RelationDef, SchemaGraph};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sieve_query::prelude::*;
    pub use sieve_schema::{
        EntityDef, EnumDef, FieldDef, FieldType, PivotDef, RelationDef, RelationKind, SchemaGraph,
    };
}
