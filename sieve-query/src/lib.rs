//! # sieve-query
//!
//! The Sieve list-query compiler: flat filter maps, dotted sort paths and
//! free-text search compiled into SQL condition trees against a
//! [`sieve_schema::SchemaGraph`], with offset pagination and a
//! tag-addressable result cache.
//!
//! ## Filter codes
//!
//! Filter map keys encode a relation path, a field and an operator:
//!
//! ```text
//! status            equality / IN / IS NULL by value shape
//! age@gte           comparison
//! team.name         relation hop (EXISTS subquery)
//! !tags.label       negated hop (NOT EXISTS)
//! roles_pivot.level pivot-addressed hop
//! tags@?|           JSON containment (ANY)
//! ```
//!
//! ## Building a query
//!
//! ```rust
//! use sieve_query::{ListQuery, SortDirection};
//! use sieve_schema::{EntityDef, FieldDef, SchemaGraph};
//!
//! let mut graph = SchemaGraph::new();
//! graph.register_entity(
//!     EntityDef::new("User", "users")
//!         .field(FieldDef::uuid("id"))
//!         .field(FieldDef::string("status"))
//!         .field(FieldDef::int("age")),
//! );
//!
//! let compiled = ListQuery::new(&graph, "User")
//!     .unwrap()
//!     .filter("status", "active")
//!     .filter("age@gte", 18i64)
//!     .order_by("age", SortDirection::Desc)
//!     .page(1)
//!     .per_page(25)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     compiled.sql,
//!     "SELECT * FROM users WHERE (status = $1 AND age >= $2) ORDER BY age DESC LIMIT 25"
//! );
//! ```
//!
//! Execution stays outside this crate: [`CompiledQuery`] is handed to an
//! [`Executor`] implementation, optionally decorated by [`CachedExecutor`]
//! for read-through caching with tag invalidation.

pub mod builder;
pub mod cache;
pub mod compiler;
pub mod condition;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod logging;
pub mod pagination;
pub mod parser;
pub mod request;
pub mod sql;
pub mod value;

pub use builder::{CompiledQuery, ListQuery};
pub use cache::{
    CacheConfig, CacheDirective, CacheKey, CacheLifetime, CacheStore, CacheTag, MemoryStore,
    NoopStore,
};
pub use compiler::order::{OrderExpr, SortDirection, SortSpec};
pub use compiler::{compile_filter, compile_search, compile_sort};
pub use condition::{CompareOp, Condition, FieldRef, Join, Subquery};
pub use envelope::{ErrorEnvelope, ListContent, SuccessEnvelope, paginated};
pub use error::{CompileError, CompileResult};
pub use executor::{CachedExecutor, ExecError, Executor, Row};
pub use pagination::{PageMeta, Pagination};
pub use parser::{FilterOp, ParsedFilter, PathSegment, parse};
pub use request::ListRequest;
pub use sql::Dialect;
pub use value::FilterValue;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::{CompiledQuery, ListQuery};
    pub use crate::cache::{CacheDirective, CacheStore, CacheTag, MemoryStore};
    pub use crate::compiler::order::{SortDirection, SortSpec};
    pub use crate::condition::Condition;
    pub use crate::envelope::{ErrorEnvelope, SuccessEnvelope, paginated};
    pub use crate::error::{CompileError, CompileResult};
    pub use crate::executor::{CachedExecutor, Executor};
    pub use crate::pagination::{PageMeta, Pagination};
    pub use crate::request::ListRequest;
    pub use crate::sql::Dialect;
    pub use crate::value::FilterValue;
}
