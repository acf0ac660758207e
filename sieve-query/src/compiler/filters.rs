//! The condition compiler: one filter-map entry to one condition tree.

use sieve_schema::{EntityDef, SchemaGraph};
use tracing::trace;

use crate::condition::{CompareOp, Condition, FieldRef, Subquery};
use crate::error::{CompileError, CompileResult};
use crate::parser::{FilterOp, ParsedFilter, PathSegment, parse};
use crate::value::FilterValue;

use super::relation_hop;

/// Compile a single filter entry against an entity context.
///
/// Relation hops become correlated EXISTS subqueries (NOT EXISTS when the
/// segment is negated); the terminal field dispatches on its operator
/// suffix and, for the default operator, on the shape of the value.
pub fn compile_filter(
    graph: &SchemaGraph,
    entity: &EntityDef,
    code: &str,
    value: &FilterValue,
) -> CompileResult<Condition> {
    let parsed = parse(code)?;
    trace!(code, entity = %entity.name, "compiling filter");
    compile_path(graph, entity, &parsed.segments, &parsed, value, false)
}

fn compile_path(
    graph: &SchemaGraph,
    entity: &EntityDef,
    segments: &[PathSegment],
    parsed: &ParsedFilter,
    value: &FilterValue,
    qualified: bool,
) -> CompileResult<Condition> {
    let Some((segment, rest)) = segments.split_first() else {
        return compile_leaf(graph, entity, parsed, value, qualified);
    };

    let hop = relation_hop(graph, entity, &segment.name, segment.pivot)?;
    let inner = compile_path(graph, hop.context, rest, parsed, value, true)?;

    Ok(Condition::Exists {
        subquery: Subquery {
            table: hop.table,
            joins: hop.joins,
            correlation: hop.correlation,
            condition: Box::new(inner),
        },
        negated: segment.negated,
    })
}

fn compile_leaf(
    graph: &SchemaGraph,
    entity: &EntityDef,
    parsed: &ParsedFilter,
    value: &FilterValue,
    qualified: bool,
) -> CompileResult<Condition> {
    if let Some(def) = entity.field_def(&parsed.field)
        && !def.filterable
    {
        return Err(CompileError::validation(
            parsed.field.clone(),
            "field is not filterable",
        ));
    }

    let column = if qualified {
        format!("{}.{}", entity.table, parsed.field)
    } else {
        parsed.field.clone()
    };
    let field = FieldRef::column(column).with_json_path(parsed.json_path.clone());

    let condition = match parsed.op {
        FilterOp::Gte => compare(field, CompareOp::Gte, value),
        FilterOp::Lte => compare(field, CompareOp::Lte, value),
        FilterOp::Gt => compare(field, CompareOp::Gt, value),
        FilterOp::Lt => compare(field, CompareOp::Lt, value),

        FilterOp::NotEq => match value {
            FilterValue::List(items) => Condition::NotIn {
                field,
                values: items.clone(),
            },
            FilterValue::Null => Condition::IsNotNull { field },
            scalar => compare(field, CompareOp::Ne, scalar),
        },

        FilterOp::Like => Condition::Like {
            field,
            value: value.as_text(),
            case_insensitive: false,
        },
        FilterOp::ILike => Condition::Like {
            field,
            value: value.as_text(),
            case_insensitive: true,
        },

        FilterOp::JsonHasAll => Condition::JsonContainsAll {
            field,
            values: value.clone().into_list(),
        },
        FilterOp::JsonLacksAll => Condition::JsonLacksAll {
            field,
            values: value.clone().into_list(),
        },
        FilterOp::JsonHasAny => Condition::JsonContainsAny {
            field,
            values: value.clone().into_list(),
        },

        FilterOp::Default => match value {
            FilterValue::List(items) => Condition::In {
                field,
                values: items.clone(),
            },
            FilterValue::Null => return compile_null_leaf(graph, entity, parsed, field),
            scalar => compare(field, CompareOp::Eq, scalar),
        },
    };

    Ok(condition)
}

fn compare(field: FieldRef, op: CompareOp, value: &FilterValue) -> Condition {
    Condition::Compare {
        field,
        op,
        value: value.clone(),
    }
}

/// Null with the default operator is context-sensitive: "has no value" means
/// different things for JSON arrays, to-many relations and plain columns.
fn compile_null_leaf(
    graph: &SchemaGraph,
    entity: &EntityDef,
    parsed: &ParsedFilter,
    field: FieldRef,
) -> CompileResult<Condition> {
    if parsed.json_path.is_empty() {
        if let Some(def) = entity.field_def(&parsed.field)
            && def.field_type.is_json_array()
        {
            return Ok(Condition::JsonEmptyOrNull { field });
        }

        // The filter key names a to-many relation: "no such associations"
        // compiles to zero related rows, not to a column null check.
        if let Some(relation) = entity.relation_def(&parsed.field)
            && relation.kind.is_many()
        {
            let hop = relation_hop(graph, entity, &parsed.field, false)?;
            return Ok(Condition::Exists {
                subquery: Subquery {
                    table: hop.table,
                    joins: hop.joins,
                    correlation: hop.correlation,
                    condition: Box::new(Condition::None),
                },
                negated: true,
            });
        }
    }

    Ok(Condition::IsNull { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::Dialect;
    use sieve_schema::{EntityDef, EnumDef, FieldDef, PivotDef, RelationDef};

    fn graph() -> SchemaGraph {
        let mut graph = SchemaGraph::new();
        graph.register_enum(
            EnumDef::new("Status")
                .values(["active", "blocked"])
                .labels("en", [("active", "Active"), ("blocked", "Blocked")]),
        );
        graph.register_entity(
            EntityDef::new("User", "users")
                .field(FieldDef::uuid("id"))
                .field(FieldDef::string("name"))
                .field(FieldDef::int("age"))
                .field(FieldDef::enumeration("status", "Status"))
                .field(FieldDef::json_array("badges"))
                .field(FieldDef::json("settings"))
                .field(FieldDef::uuid("team_id"))
                .field(FieldDef::string("secret").not_filterable())
                .relation(RelationDef::to_one("team", "Team").keys("team_id", "id"))
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
                .field(FieldDef::string("name"))
                .relation(RelationDef::to_one("company", "Company").keys("company_id", "id")),
        );
        graph.register_entity(
            EntityDef::new("Company", "companies")
                .field(FieldDef::uuid("id"))
                .field(FieldDef::string("name")),
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
        graph
    }

    fn compile_sql(code: &str, value: FilterValue) -> (String, Vec<FilterValue>) {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        let condition = compile_filter(&graph, entity, code, &value).unwrap();
        condition.to_sql(Dialect::Postgres, 0)
    }

    #[test]
    fn test_scalar_equality() {
        let (sql, params) = compile_sql("status", "active".into());
        assert_eq!(sql, "status = $1");
        assert_eq!(params, vec![FilterValue::String("active".into())]);
    }

    #[test]
    fn test_list_becomes_in() {
        let (sql, params) = compile_sql("status", vec!["active", "blocked"].into());
        assert_eq!(sql, "status IN ($1, $2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_null_becomes_is_null() {
        let (sql, params) = compile_sql("name", FilterValue::Null);
        assert_eq!(sql, "name IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn test_null_on_json_array_field() {
        let (sql, _) = compile_sql("badges", FilterValue::Null);
        assert_eq!(
            sql,
            "(badges::jsonb IN ('[]'::jsonb, '{}'::jsonb) OR badges IS NULL)"
        );
    }

    #[test]
    fn test_null_on_to_many_relation_name() {
        let (sql, _) = compile_sql("tags", FilterValue::Null);
        assert_eq!(
            sql,
            "NOT EXISTS (SELECT 1 FROM tags JOIN tag_user ON tag_user.tag_id = tags.id \
             WHERE tag_user.user_id = users.id)"
        );
    }

    #[test]
    fn test_comparison_operator() {
        let (sql, params) = compile_sql("age@gte", 18i64.into());
        assert_eq!(sql, "age >= $1");
        assert_eq!(params, vec![FilterValue::Int(18)]);
    }

    #[test]
    fn test_not_operator_by_value_shape() {
        let (sql, _) = compile_sql("age@!", 18i64.into());
        assert_eq!(sql, "age != $1");

        let (sql, _) = compile_sql("status@!", vec!["a", "b"].into());
        assert_eq!(sql, "status NOT IN ($1, $2)");

        let (sql, _) = compile_sql("name@!", FilterValue::Null);
        assert_eq!(sql, "name IS NOT NULL");
    }

    #[test]
    fn test_to_one_relation_filter() {
        let (sql, params) = compile_sql("team.name", "Eng".into());
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM teams WHERE teams.id = users.team_id AND teams.name = $1)"
        );
        assert_eq!(params, vec![FilterValue::String("Eng".into())]);
    }

    #[test]
    fn test_nested_to_one_relation_filter() {
        let (sql, _) = compile_sql("team.company.name", "Acme".into());
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM teams WHERE teams.id = users.team_id AND \
             EXISTS (SELECT 1 FROM companies WHERE companies.id = teams.company_id AND \
             companies.name = $1))"
        );
    }

    #[test]
    fn test_negated_many_to_many_filter() {
        let (sql, params) = compile_sql("!tags.label", "x".into());
        assert_eq!(
            sql,
            "NOT EXISTS (SELECT 1 FROM tags JOIN tag_user ON tag_user.tag_id = tags.id \
             WHERE tag_user.user_id = users.id AND tags.label = $1)"
        );
        assert_eq!(params, vec![FilterValue::String("x".into())]);
    }

    #[test]
    fn test_pivot_addressed_filter() {
        let (sql, params) = compile_sql("roles_pivot.level@gte", 3i64.into());
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM role_user WHERE role_user.user_id = users.id AND \
             role_user.level >= $1)"
        );
        assert_eq!(params, vec![FilterValue::Int(3)]);
    }

    #[test]
    fn test_json_dive_with_suffix() {
        let (sql, _) = compile_sql("settings@#notify,email@!", "never".into());
        assert_eq!(sql, "settings->'notify'->>'email' != $1");
    }

    #[test]
    fn test_unknown_relation_is_fatal() {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        let err = compile_filter(&graph, entity, "squad.name", &"Eng".into()).unwrap_err();
        assert!(matches!(err, CompileError::UnknownRelation { .. }));
    }

    #[test]
    fn test_unfilterable_field_is_rejected() {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        let err = compile_filter(&graph, entity, "secret", &"x".into()).unwrap_err();
        assert_eq!(err.code(), "validation_exception");
    }

    #[test]
    fn test_compilation_is_idempotent() {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        let value: FilterValue = "x".into();
        let first = compile_filter(&graph, entity, "!tags.label", &value).unwrap();
        let second = compile_filter(&graph, entity, "!tags.label", &value).unwrap();
        assert_eq!(first, second);
    }
}
