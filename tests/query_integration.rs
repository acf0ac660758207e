//! Integration tests for the list-query compiler.
//!
//! These tests drive the full pipeline: schema graph registration, filter/
//! sort/search compilation, SQL rendering per dialect, pagination, and the
//! cached execution seam.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use sieve::query::{ExecError, Row};
use sieve::{
    CacheTag, CachedExecutor, Dialect, EntityDef, EnumDef, ErrorEnvelope, Executor, FieldDef,
    FilterValue, ListQuery, ListRequest, MemoryStore, PageMeta, RelationDef, SchemaGraph,
    SortDirection,
};
use sieve::schema::PivotDef;

/// A schema graph with every relation kind the compiler handles.
fn graph() -> SchemaGraph {
    let mut graph = SchemaGraph::new();
    graph.register_enum(
        EnumDef::new("Status")
            .values(["active", "blocked", "pending"])
            .labels(
                "en",
                [
                    ("active", "Active"),
                    ("blocked", "Blocked"),
                    ("pending", "Pending review"),
                ],
            ),
    );
    graph.register_entity(
        EntityDef::new("User", "users")
            .field(FieldDef::uuid("id"))
            .field(FieldDef::string("name"))
            .field(FieldDef::string("email"))
            .field(FieldDef::int("age"))
            .field(FieldDef::enumeration("status", "Status"))
            .field(FieldDef::json_array("badges"))
            .field(FieldDef::uuid("team_id"))
            .field(FieldDef::uuid("manager_id"))
            .relation(RelationDef::to_one("team", "Team").keys("team_id", "id"))
            .relation(RelationDef::to_one("manager", "Manager").keys("manager_id", "id"))
            .relation(RelationDef::to_many("posts", "Post").keys("id", "author_id"))
            .relation(RelationDef::many_to_many(
                "tags",
                "Tag",
                PivotDef::new("TagUser", "user_id", "tag_id"),
            ))
            .relation(RelationDef::many_to_many(
                "roles",
                "Role",
                PivotDef::new("RoleUser", "user_id", "role_id"),
            )),
    );
    graph.register_entity(
        EntityDef::new("Team", "teams")
            .field(FieldDef::uuid("id"))
            .field(FieldDef::string("name")),
    );
    graph.register_entity(
        EntityDef::new("Manager", "managers")
            .field(FieldDef::uuid("id"))
            .field(FieldDef::date_time("created_at")),
    );
    graph.register_entity(
        EntityDef::new("Post", "posts")
            .field(FieldDef::uuid("id"))
            .field(FieldDef::uuid("author_id"))
            .field(FieldDef::string("title")),
    );
    graph.register_entity(
        EntityDef::new("Tag", "tags")
            .field(FieldDef::uuid("id"))
            .field(FieldDef::string("label")),
    );
    graph.register_entity(
        EntityDef::new("Role", "roles")
            .field(FieldDef::uuid("id"))
            .field(FieldDef::string("name")),
    );
    graph.register_entity(
        EntityDef::new("TagUser", "tag_user")
            .field(FieldDef::uuid("user_id"))
            .field(FieldDef::uuid("tag_id")),
    );
    graph.register_entity(
        EntityDef::new("RoleUser", "role_user")
            .field(FieldDef::uuid("user_id"))
            .field(FieldDef::uuid("role_id"))
            .field(FieldDef::int("level")),
    );
    graph.validate().expect("fixture graph must validate");
    graph
}

#[test]
fn test_scalar_and_comparison_filters() {
    let graph = graph();
    let compiled = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("status", "active")
        .filter("age@gte", 18i64)
        .build()
        .unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT * FROM users WHERE (status = $1 AND age >= $2)"
    );
    assert_eq!(
        compiled.params,
        vec![FilterValue::String("active".into()), FilterValue::Int(18)]
    );
}

#[test]
fn test_to_one_relation_filter() {
    let graph = graph();
    let compiled = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("team.name", "Eng")
        .build()
        .unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT * FROM users WHERE \
         EXISTS (SELECT 1 FROM teams WHERE teams.id = users.team_id AND teams.name = $1)"
    );
    assert_eq!(compiled.params, vec![FilterValue::String("Eng".into())]);
}

#[test]
fn test_negated_to_many_relation_filter() {
    let graph = graph();
    let compiled = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("!tags.label", "x")
        .build()
        .unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT * FROM users WHERE \
         NOT EXISTS (SELECT 1 FROM tags JOIN tag_user ON tag_user.tag_id = tags.id \
         WHERE tag_user.user_id = users.id AND tags.label = $1)"
    );
}

#[test]
fn test_sort_through_to_one_relation() {
    let graph = graph();
    let compiled = ListQuery::new(&graph, "User")
        .unwrap()
        .order_by("manager.created_at", SortDirection::Desc)
        .build()
        .unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT * FROM users ORDER BY \
         (SELECT created_at FROM managers WHERE managers.id = users.manager_id) DESC"
    );
}

#[test]
fn test_free_text_search_over_fields() {
    let graph = graph();
    let compiled = ListQuery::new(&graph, "User")
        .unwrap()
        .search("smith", ["name", "email"])
        .build()
        .unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT * FROM users WHERE (name ILIKE $1 OR email ILIKE $2)"
    );
    assert_eq!(
        compiled.params,
        vec![
            FilterValue::String("%smith%".into()),
            FilterValue::String("%smith%".into()),
        ]
    );
}

#[test]
fn test_pivot_addressed_filter() {
    let graph = graph();
    let compiled = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("roles_pivot.level@gte", 3i64)
        .build()
        .unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT * FROM users WHERE \
         EXISTS (SELECT 1 FROM role_user WHERE role_user.user_id = users.id \
         AND role_user.level >= $1)"
    );
    assert_eq!(compiled.params, vec![FilterValue::Int(3)]);
}

#[test]
fn test_enum_sort_and_search_by_label() {
    let graph = graph();
    let compiled = ListQuery::new(&graph, "User")
        .unwrap()
        .order_by("status", SortDirection::Asc)
        .search("pend", ["status"])
        .build()
        .unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT * FROM users WHERE status IN ($1) ORDER BY \
         CASE status WHEN 'active' THEN 'Active' WHEN 'blocked' THEN 'Blocked' \
         WHEN 'pending' THEN 'Pending review' ELSE status END ASC"
    );
    assert_eq!(compiled.params, vec![FilterValue::String("pending".into())]);
}

#[test]
fn test_json_array_null_filter() {
    let graph = graph();
    let compiled = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("badges", FilterValue::Null)
        .build()
        .unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT * FROM users WHERE \
         (badges::jsonb IN ('[]'::jsonb, '{}'::jsonb) OR badges IS NULL)"
    );
}

#[test]
fn test_everything_combined_with_pagination() {
    let graph = graph();
    let compiled = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("status", "active")
        .filter("team.name", "Eng")
        .search("smith", ["name", "email"])
        .order_by("age", SortDirection::Desc)
        .page(2)
        .per_page(25)
        .build()
        .unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT * FROM users WHERE (status = $1 AND \
         EXISTS (SELECT 1 FROM teams WHERE teams.id = users.team_id AND teams.name = $2) AND \
         (name ILIKE $3 OR email ILIKE $4)) \
         ORDER BY age DESC LIMIT 25 OFFSET 25"
    );
    assert_eq!(compiled.params.len(), 4);
}

#[test]
fn test_count_query_matches_filters_only() {
    let graph = graph();
    let query = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("status", "active")
        .order_by("age", SortDirection::Desc)
        .page(2)
        .per_page(25);

    let count = query.build_count().unwrap();
    assert_eq!(count.sql, "SELECT COUNT(*) FROM users WHERE status = $1");
}

#[test]
fn test_mysql_dialect_end_to_end() {
    let graph = graph();
    let compiled = ListQuery::new(&graph, "User")
        .unwrap()
        .dialect(Dialect::MySql)
        .filter("team.name", "Eng")
        .search("smith", ["name"])
        .build()
        .unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT * FROM users WHERE \
         (EXISTS (SELECT 1 FROM teams WHERE teams.id = users.team_id AND teams.name = ?) AND \
         LOWER(name) LIKE LOWER(?))"
    );
}

#[test]
fn test_from_request_end_to_end() {
    let graph = graph();
    let request = ListRequest::from_json(
        r#"{
            "page": 2,
            "per_page": 10,
            "sort": [{"sort": "name", "by": "asc"}],
            "filters": {"status": "active", "age@gte": 21},
            "q": "smith"
        }"#,
    )
    .unwrap();

    let compiled = ListQuery::new(&graph, "User")
        .unwrap()
        .from_request(&request, &["name", "email"])
        .build()
        .unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT * FROM users WHERE (status = $1 AND age >= $2 AND \
         (name ILIKE $3 OR email ILIKE $4)) ORDER BY name ASC LIMIT 10 OFFSET 10"
    );
    assert_eq!(compiled.pagination.offset(), Some(10));
}

#[test]
fn test_build_errors_surface_before_execution() {
    let graph = graph();

    let err = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("squad.name", "Eng")
        .build()
        .unwrap_err();
    assert_eq!(err.code(), "unknown_relation_exception");

    let err = ListQuery::new(&graph, "User")
        .unwrap()
        .order_by("posts.title", SortDirection::Asc)
        .build()
        .unwrap_err();
    assert_eq!(err.code(), "invalid_sort_relation_exception");

    let err = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("age@between", 5i64)
        .build()
        .unwrap_err();
    assert_eq!(err.code(), "unresolvable_operator_exception");
}

#[test]
fn test_error_envelope_from_build_error() {
    let graph = graph();
    let err = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("squad.name", "Eng")
        .build()
        .unwrap_err();

    let envelope = serde_json::to_value(ErrorEnvelope::from_error(&err)).unwrap();
    assert_eq!(envelope["error"], json!(true));
    assert_eq!(envelope["errorCode"], json!("unknown_relation_exception"));
}

#[test]
fn test_build_is_idempotent_across_calls() {
    let graph = graph();
    let query = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("!tags.label", "x")
        .filter("roles_pivot.level@gte", 3i64)
        .order_by("status", SortDirection::Asc)
        .search("smith", ["name|email"]);

    assert_eq!(query.build().unwrap(), query.build().unwrap());
}

struct StubExecutor {
    fetches: AtomicUsize,
}

impl StubExecutor {
    fn new() -> Self {
        Self {
            fetches: AtomicUsize::new(0),
        }
    }
}

impl Executor for StubExecutor {
    async fn fetch_rows(&self, _sql: &str, _params: &[FilterValue]) -> Result<Vec<Row>, ExecError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            json!({"id": 1, "name": "Alice Smith"}),
            json!({"id": 2, "name": "Bob Smith"}),
        ])
    }

    async fn count(&self, _sql: &str, _params: &[FilterValue]) -> Result<u64, ExecError> {
        Ok(2)
    }
}

#[tokio::test]
async fn test_cached_execution_round_trip() {
    let graph = graph();
    let compiled = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("status", "active")
        .cache_for(Duration::from_secs(60))
        .build()
        .unwrap();
    assert!(compiled.cache.tags.contains(&CacheTag::entity("User")));

    let executor = CachedExecutor::new(StubExecutor::new(), MemoryStore::new());

    let first = executor.fetch_list(&compiled).await.unwrap();
    let second = executor.fetch_list(&compiled).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(executor.inner().fetches.load(Ordering::SeqCst), 1);

    // A mutation on the entity flushes its tagged entries.
    let removed = executor.invalidate_entity("User").await.unwrap();
    assert_eq!(removed, 1);
    executor.fetch_list(&compiled).await.unwrap();
    assert_eq!(executor.inner().fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_paginated_envelope_from_execution() {
    let graph = graph();
    let query = ListQuery::new(&graph, "User")
        .unwrap()
        .filter("status", "active")
        .page(1)
        .per_page(25);
    let compiled = query.build().unwrap();
    let count = query.build_count().unwrap();

    let executor = CachedExecutor::new(StubExecutor::new(), MemoryStore::new());
    let rows = executor.fetch_list(&compiled).await.unwrap();
    let total = executor.fetch_count(&count).await.unwrap();

    let meta = PageMeta::from_total(total, compiled.pagination);
    let envelope = sieve::query::paginated(rows, meta, json!({"status": "active"}));
    let rendered = serde_json::to_value(&envelope).unwrap();

    assert_eq!(rendered["error"], json!(false));
    assert_eq!(rendered["content"]["data"][0]["name"], json!("Alice Smith"));
    assert_eq!(rendered["content"]["meta"]["total"], json!(2));
    assert_eq!(rendered["content"]["meta"]["last_page"], json!(1));
    assert_eq!(rendered["content"]["filter"]["status"], json!("active"));
}
