//! Integration tests for configuration surfaces: cache directives and keys,
//! the list-request wire format, and the response envelopes.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use sieve::query::cache::{CacheConfig, CacheKey, CacheLifetime};
use sieve::query::{CacheStore, NoopStore};
use sieve::{
    CacheDirective, CacheTag, CompileError, ErrorEnvelope, FilterValue, ListRequest, MemoryStore,
    PageMeta, Pagination, SortDirection, SortSpec,
};

#[test]
fn test_cache_config_defaults() {
    let config = CacheConfig::default();
    assert_eq!(config.default_ttl, Duration::from_secs(300));
    assert_eq!(config.prefix, "sieve");

    let config = config
        .with_default_ttl(Duration::from_secs(60))
        .with_prefix("crm");
    assert_eq!(config.default_ttl, Duration::from_secs(60));
    assert_eq!(config.prefix, "crm");
}

#[test]
fn test_cache_directive_three_states() {
    assert!(!CacheDirective::disabled().is_enabled());

    let bounded = CacheDirective::ttl(Duration::from_secs(120));
    assert!(bounded.is_enabled());
    assert_eq!(bounded.lifetime.ttl(), Some(Duration::from_secs(120)));

    let unbounded = CacheDirective::forever();
    assert!(unbounded.is_enabled());
    assert_eq!(unbounded.lifetime, CacheLifetime::Forever);
    assert_eq!(unbounded.lifetime.ttl(), None);
}

#[test]
fn test_cache_directive_without_tags_is_rejected() {
    let directive = CacheDirective::forever().with_key("landing");
    let err = directive.validate().unwrap_err();
    assert_eq!(err.code(), "invalid_cache_tag_exception");

    let tagged = CacheDirective::forever().with_tag(CacheTag::entity("User"));
    assert!(tagged.validate().is_ok());
}

#[test]
fn test_cache_key_derivation_is_stable() {
    let params = vec![FilterValue::String("active".into()), FilterValue::Int(18)];
    let first = CacheKey::for_query("sieve", "User", "SELECT * FROM users", &params);
    let second = CacheKey::for_query("sieve", "User", "SELECT * FROM users", &params);
    assert_eq!(first, second);

    let other_sql = CacheKey::for_query("sieve", "User", "SELECT id FROM users", &params);
    assert_ne!(first, other_sql);

    let other_params =
        CacheKey::for_query("sieve", "User", "SELECT * FROM users", &[FilterValue::Int(1)]);
    assert_ne!(first, other_params);
}

#[test]
fn test_cache_key_format() {
    let key = CacheKey::explicit("crm", "Deal", "pipeline-board");
    assert_eq!(key.as_str(), "crm:Deal:pipeline-board");
    assert_eq!(key.entity(), "Deal");
}

#[test]
fn test_cache_tag_constructors() {
    assert_eq!(CacheTag::entity("Deal").value(), "entity:Deal");
    assert_eq!(CacheTag::record("Deal", 7).value(), "record:Deal:7");
    assert_eq!(CacheTag::new("reports:weekly").value(), "reports:weekly");
}

#[tokio::test]
async fn test_memory_store_honors_config_prefix() {
    let store = MemoryStore::new();
    let key = CacheKey::explicit("crm", "Deal", "board");
    store
        .put(&key, &vec![1, 2], None, &[CacheTag::entity("Deal")])
        .await
        .unwrap();

    // A different prefix is a different namespace.
    let other: Option<Vec<i32>> = store
        .get(&CacheKey::explicit("sieve", "Deal", "board"))
        .await
        .unwrap();
    assert!(other.is_none());

    let hit: Option<Vec<i32>> = store.get(&key).await.unwrap();
    assert_eq!(hit, Some(vec![1, 2]));
}

#[tokio::test]
async fn test_noop_store_never_caches() {
    let store = NoopStore;
    let key = CacheKey::explicit("sieve", "Deal", "board");
    store.put(&key, &vec![1], None, &[]).await.unwrap();
    let got: Option<Vec<i32>> = store.get(&key).await.unwrap();
    assert!(got.is_none());
}

#[test]
fn test_list_request_sort_map_shape() {
    let request = ListRequest::from_json(
        r#"{"sort": {"created_at": "desc", "name": "asc"}}"#,
    )
    .unwrap();

    assert_eq!(
        request.sort,
        vec![SortSpec::desc("created_at"), SortSpec::asc("name")]
    );
}

#[test]
fn test_list_request_sort_list_shape() {
    let request = ListRequest::from_json(
        r#"{"sort": [{"sort": "stage", "by": "asc"}, {"sort": "value", "by": "desc"}]}"#,
    )
    .unwrap();

    assert_eq!(
        request.sort,
        vec![
            SortSpec::new("stage", SortDirection::Asc),
            SortSpec::new("value", SortDirection::Desc),
        ]
    );
}

#[test]
fn test_list_request_filters_preserve_order_and_shape() {
    let request = ListRequest::from_json(
        r#"{"filters": {"stage": ["lead", "won"], "value@gte": 1000, "closed_at": null}}"#,
    )
    .unwrap();

    let filters = request.filter_values();
    let codes: Vec<_> = filters.keys().cloned().collect();
    assert_eq!(codes, vec!["stage", "value@gte", "closed_at"]);
    assert!(filters["stage"].is_list());
    assert_eq!(filters["value@gte"], FilterValue::Int(1000));
    assert!(filters["closed_at"].is_null());
}

#[test]
fn test_list_request_rejects_malformed_sort() {
    assert!(ListRequest::from_json(r#"{"sort": {"name": "upwards"}}"#).is_err());
    assert!(ListRequest::from_json(r#"{"sort": [{"sort": "name"}]}"#).is_err());
}

#[test]
fn test_list_request_defaults_are_empty() {
    let request = ListRequest::from_json("{}").unwrap();
    assert_eq!(request.page, None);
    assert_eq!(request.per_page, None);
    assert!(request.sort.is_empty());
    assert!(request.filters.is_empty());
    assert!(request.q.is_empty());
}

#[test]
fn test_success_envelope_shape() {
    let envelope = sieve::query::paginated(
        vec![json!({"id": 1, "title": "Big deal"})],
        PageMeta::from_total(41, Pagination::new().page(2).per_page(20)),
        json!({"stage": "won"}),
    );
    let rendered = serde_json::to_value(&envelope).unwrap();

    assert_eq!(rendered["error"], json!(false));
    assert_eq!(rendered["content"]["data"][0]["title"], json!("Big deal"));
    assert_eq!(rendered["content"]["meta"]["total"], json!(41));
    assert_eq!(rendered["content"]["meta"]["current_page"], json!(2));
    assert_eq!(rendered["content"]["meta"]["last_page"], json!(3));
    assert_eq!(rendered["content"]["filter"]["stage"], json!("won"));
}

#[test]
fn test_error_envelope_carries_stable_code_and_bag() {
    let err = CompileError::validation("per_page", "must be a positive integer");
    let rendered = serde_json::to_value(ErrorEnvelope::from_error(&err)).unwrap();

    assert_eq!(rendered["error"], json!(true));
    assert_eq!(rendered["errorCode"], json!("validation_exception"));
    assert_eq!(
        rendered["errorBag"]["per_page"][0],
        json!("must be a positive integer")
    );
}
