//! The list-query builder: the orchestrating entry point.

use indexmap::IndexMap;
use tracing::debug;

use sieve_schema::{EntityDef, SchemaGraph};

use crate::cache::{CacheDirective, CacheLifetime, CacheTag};
use crate::compiler::order::{SortDirection, SortSpec};
use crate::compiler::{compile_filter, compile_search, compile_sort};
use crate::condition::Condition;
use crate::error::CompileResult;
use crate::pagination::Pagination;
use crate::request::ListRequest;
use crate::sql::Dialect;
use crate::value::FilterValue;

/// A fully compiled, executable list query.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Entity the query selects from.
    pub entity: String,
    /// The rendered SQL.
    pub sql: String,
    /// Bind parameters in placeholder order.
    pub params: Vec<FilterValue>,
    /// The pagination that was applied.
    pub pagination: Pagination,
    /// The cache plan for this cycle.
    pub cache: CacheDirective,
}

/// Builder assembling one list query from filters, sorts, search,
/// pagination and a cache directive.
///
/// One builder instance serves exactly one logical query construction;
/// compilation is pure and synchronous, so building twice yields
/// structurally identical output.
#[derive(Debug, Clone)]
pub struct ListQuery<'g> {
    graph: &'g SchemaGraph,
    entity: &'g EntityDef,
    dialect: Dialect,
    locale: String,
    filters: IndexMap<String, FilterValue>,
    sorts: Vec<SortSpec>,
    search: Option<(String, Vec<String>)>,
    pagination: Pagination,
    cache: CacheDirective,
    extra: Vec<Condition>,
}

impl<'g> ListQuery<'g> {
    /// Start a list query against an entity.
    pub fn new(graph: &'g SchemaGraph, entity: &str) -> CompileResult<Self> {
        let entity = graph.entity(entity)?;
        Ok(Self {
            graph,
            entity,
            dialect: Dialect::default(),
            locale: "en".to_string(),
            filters: IndexMap::new(),
            sorts: Vec::new(),
            search: None,
            pagination: Pagination::new(),
            cache: CacheDirective::disabled(),
            extra: Vec::new(),
        })
    }

    /// Set the target dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the locale used for enum label sorting and searching.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Add one filter entry. Entries AND-compose in insertion order.
    pub fn filter(mut self, code: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(code.into(), value.into());
        self
    }

    /// Add multiple filter entries.
    pub fn filters(
        mut self,
        filters: impl IntoIterator<Item = (impl Into<String>, impl Into<FilterValue>)>,
    ) -> Self {
        for (code, value) in filters {
            self.filters.insert(code.into(), value.into());
        }
        self
    }

    /// Add one sort. No unique-key tiebreaker is appended automatically;
    /// append one yourself when deterministic ordering matters.
    pub fn order_by(mut self, path: impl Into<String>, direction: SortDirection) -> Self {
        self.sorts.push(SortSpec::new(path, direction));
        self
    }

    /// Add multiple sorts.
    pub fn sorts(mut self, sorts: impl IntoIterator<Item = SortSpec>) -> Self {
        self.sorts.extend(sorts);
        self
    }

    /// Set the free-text query and the server-defined searchable fields.
    pub fn search(
        mut self,
        query: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.search = Some((query.into(), fields.into_iter().map(Into::into).collect()));
        self
    }

    /// Set the 1-based page number.
    pub fn page(mut self, page: u64) -> Self {
        self.pagination = self.pagination.page(page);
        self
    }

    /// Set the page size.
    pub fn per_page(mut self, per_page: u64) -> Self {
        self.pagination = self.pagination.per_page(per_page);
        self
    }

    /// Cache the result with a bounded TTL.
    pub fn cache_for(mut self, ttl: std::time::Duration) -> Self {
        self.cache.lifetime = CacheLifetime::Ttl(ttl);
        self
    }

    /// Cache the result without expiry.
    pub fn cache_forever(mut self) -> Self {
        self.cache.lifetime = CacheLifetime::Forever;
        self
    }

    /// Do not cache the result.
    pub fn dont_cache(mut self) -> Self {
        self.cache.lifetime = CacheLifetime::Disabled;
        self
    }

    /// Add a custom cache tag.
    pub fn cache_tag(mut self, tag: impl Into<CacheTag>) -> Self {
        self.cache.tags.push(tag.into());
        self
    }

    /// Add custom cache tags.
    pub fn cache_tags(mut self, tags: impl IntoIterator<Item = CacheTag>) -> Self {
        self.cache.tags.extend(tags);
        self
    }

    /// Override the derived cache key.
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache.key = Some(key.into());
        self
    }

    /// Append a pre-built condition, AND-composed with the filters.
    pub fn condition(mut self, condition: Condition) -> Self {
        self.extra.push(condition);
        self
    }

    /// Apply filters, sorting, search and pagination from a parsed list
    /// request, with the searchable fields supplied by the server.
    pub fn from_request(mut self, request: &ListRequest, searchable_fields: &[&str]) -> Self {
        if let Some(page) = request.page {
            self = self.page(page);
        }
        if let Some(per_page) = request.per_page {
            self = self.per_page(per_page);
        }
        for (code, value) in request.filter_values() {
            self.filters.insert(code, value);
        }
        self.sorts.extend(request.sort.iter().cloned());
        if !request.q.is_empty() && !searchable_fields.is_empty() {
            self = self.search(request.q.clone(), searchable_fields.iter().copied());
        }
        self
    }

    /// Compile the query into SQL plus its cache plan.
    ///
    /// All taxonomy errors surface here, before any I/O happens.
    pub fn build(&self) -> CompileResult<CompiledQuery> {
        let select = format!("SELECT * FROM {}", self.entity.table);
        let mut compiled = self.build_from(select)?;

        if !self.sorts.is_empty() {
            compiled.sql.push_str(" ORDER BY ");
            for (i, sort) in self.sorts.iter().enumerate() {
                if i > 0 {
                    compiled.sql.push_str(", ");
                }
                let expr =
                    compile_sort(self.graph, self.entity, &sort.path, sort.direction, &self.locale)?;
                expr.write_sql(&mut compiled.sql);
            }
        }

        if !self.pagination.is_empty() {
            compiled.sql.push(' ');
            self.pagination.write_sql(&mut compiled.sql);
        }

        debug!(
            entity = %self.entity.name,
            filters = self.filters.len(),
            sorts = self.sorts.len(),
            sql = %compiled.sql,
            "compiled list query"
        );
        Ok(compiled)
    }

    /// Compile the matching COUNT query: same conditions, no ordering or
    /// pagination.
    pub fn build_count(&self) -> CompileResult<CompiledQuery> {
        let select = format!("SELECT COUNT(*) FROM {}", self.entity.table);
        self.build_from(select)
    }

    fn build_from(&self, select: String) -> CompileResult<CompiledQuery> {
        let mut conditions = Vec::with_capacity(self.filters.len() + self.extra.len() + 1);
        for (code, value) in &self.filters {
            conditions.push(compile_filter(self.graph, self.entity, code, value)?);
        }
        if let Some((query, fields)) = &self.search {
            conditions.push(compile_search(
                self.graph,
                self.entity,
                query,
                fields,
                &self.locale,
            )?);
        }
        conditions.extend(self.extra.iter().cloned());

        let condition = Condition::and(conditions);
        let mut sql = select;
        let mut params = Vec::new();
        if !condition.is_none() {
            let (where_sql, where_params) = condition.to_sql(self.dialect, 0);
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
            params = where_params;
        }

        let mut cache = self.cache.clone();
        if cache.is_enabled() {
            let base_tag = CacheTag::entity(&self.entity.name);
            if !cache.tags.contains(&base_tag) {
                cache.tags.push(base_tag);
            }
        }
        cache.validate()?;

        Ok(CompiledQuery {
            entity: self.entity.name.to_string(),
            sql,
            params,
            pagination: self.pagination,
            cache,
        })
    }
}
