//! The order-by compiler: dotted sort paths to ORDER BY expressions.

use serde::{Deserialize, Serialize};
use std::fmt;

use sieve_schema::{EntityDef, RelationKind, SchemaGraph};

use crate::condition::Join;
use crate::error::{CompileError, CompileResult};
use crate::sql::escape_string;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Get the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// One (path, direction) pair of a sort specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field name or dotted to-one relation path.
    pub path: String,
    /// Sort direction.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create a sort spec.
    pub fn new(path: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            path: path.into(),
            direction,
        }
    }

    /// Ascending sort on a path.
    pub fn asc(path: impl Into<String>) -> Self {
        Self::new(path, SortDirection::Asc)
    }

    /// Descending sort on a path.
    pub fn desc(path: impl Into<String>) -> Self {
        Self::new(path, SortDirection::Desc)
    }
}

/// The SELECT target of an order expression: a plain column or an enum
/// label CASE mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSelect {
    /// Order on the column value itself.
    Column(String),
    /// Order on the enum's display label via a CASE expression; stored
    /// values outside the table fall through to the raw value.
    EnumCase {
        /// The enum column.
        column: String,
        /// (raw value, label) pairs in enum declaration order.
        cases: Vec<(String, String)>,
    },
}

impl OrderSelect {
    fn write_sql(&self, sql: &mut String) {
        match self {
            Self::Column(column) => sql.push_str(column),
            Self::EnumCase { column, cases } => {
                sql.push_str("CASE ");
                sql.push_str(column);
                for (value, label) in cases {
                    sql.push_str(" WHEN '");
                    sql.push_str(&escape_string(value));
                    sql.push_str("' THEN '");
                    sql.push_str(&escape_string(label));
                    sql.push('\'');
                }
                sql.push_str(" ELSE ");
                sql.push_str(column);
                sql.push_str(" END");
            }
        }
    }
}

/// A compiled ORDER BY expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderExpr {
    /// Direct column (or enum CASE) ordering on the root table.
    Column {
        /// What to order on.
        select: OrderSelect,
        /// Sort direction.
        direction: SortDirection,
    },
    /// Correlated scalar subquery ordering through to-one hops.
    Subquery {
        /// Subquery FROM table (first hop's target).
        table: String,
        /// Joins for the remaining hops.
        joins: Vec<Join>,
        /// Correlation predicate: inner column = outer column.
        correlation: (String, String),
        /// What the subquery selects.
        select: OrderSelect,
        /// Sort direction.
        direction: SortDirection,
    },
}

impl OrderExpr {
    /// Render this expression for an ORDER BY list.
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();
        self.write_sql(&mut sql);
        sql
    }

    /// Write this expression into a buffer.
    pub fn write_sql(&self, sql: &mut String) {
        match self {
            Self::Column { select, direction } => {
                select.write_sql(sql);
                sql.push(' ');
                sql.push_str(direction.as_sql());
            }
            Self::Subquery {
                table,
                joins,
                correlation,
                select,
                direction,
            } => {
                sql.push_str("(SELECT ");
                select.write_sql(sql);
                sql.push_str(" FROM ");
                sql.push_str(table);
                for join in joins {
                    sql.push_str(" JOIN ");
                    sql.push_str(&join.table);
                    sql.push_str(" ON ");
                    sql.push_str(&join.left);
                    sql.push_str(" = ");
                    sql.push_str(&join.right);
                }
                sql.push_str(" WHERE ");
                sql.push_str(&correlation.0);
                sql.push_str(" = ");
                sql.push_str(&correlation.1);
                sql.push_str(") ");
                sql.push_str(direction.as_sql());
            }
        }
    }
}

/// Compile one sort path against an entity context.
///
/// Only to-one hops may appear in a dotted path; a to-many or many-to-many
/// hop is a hard error because row multiplicity makes single-row ordering
/// ill-defined. No tiebreaker is appended — callers needing determinism add
/// a unique-key sort themselves.
pub fn compile_sort(
    graph: &SchemaGraph,
    entity: &EntityDef,
    path: &str,
    direction: SortDirection,
    locale: &str,
) -> CompileResult<OrderExpr> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let field = segments.pop().unwrap_or_default();
    if field.is_empty() {
        return Err(CompileError::validation(path.to_string(), "empty sort path"));
    }

    if segments.is_empty() {
        let select = order_select(graph, entity, field, locale, None)?;
        return Ok(OrderExpr::Column { select, direction });
    }

    let mut context = entity;
    let mut table = String::new();
    let mut joins = Vec::new();
    let mut correlation = (String::new(), String::new());

    for (i, name) in segments.iter().enumerate() {
        let relation = context
            .relation_def(name)
            .ok_or_else(|| CompileError::UnknownRelation {
                entity: context.name.to_string(),
                relation: name.to_string(),
            })?;
        if relation.kind != RelationKind::ToOne {
            return Err(CompileError::InvalidSortRelation {
                path: path.to_string(),
                relation: name.to_string(),
            });
        }
        let target = graph.entity(&relation.target)?;
        if i == 0 {
            table = target.table.to_string();
            correlation = (
                format!("{}.{}", target.table, relation.foreign_key),
                format!("{}.{}", context.table, relation.local_key),
            );
        } else {
            joins.push(Join {
                table: target.table.to_string(),
                left: format!("{}.{}", target.table, relation.foreign_key),
                right: format!("{}.{}", context.table, relation.local_key),
            });
        }
        context = target;
    }

    // Qualify the selected column only when joins make it ambiguous.
    let qualify = if joins.is_empty() {
        None
    } else {
        Some(context.table.as_str())
    };
    let select = order_select(graph, context, field, locale, qualify)?;

    Ok(OrderExpr::Subquery {
        table,
        joins,
        correlation,
        select,
        direction,
    })
}

fn order_select(
    graph: &SchemaGraph,
    entity: &EntityDef,
    field: &str,
    locale: &str,
    qualify: Option<&str>,
) -> CompileResult<OrderSelect> {
    let def = entity.field_def(field);
    if let Some(def) = def
        && !def.sortable
    {
        return Err(CompileError::validation(
            field.to_string(),
            "field is not sortable",
        ));
    }

    let column = match qualify {
        Some(table) => format!("{}.{}", table, field),
        None => field.to_string(),
    };

    if let Some(enum_name) = def.and_then(|d| d.field_type.enum_name()) {
        let enum_def = graph.enum_def(enum_name)?;
        let labels = enum_def.labels_for(locale)?;
        let cases = enum_def
            .raw_values()
            .iter()
            .map(|value| {
                let label = labels
                    .get(value.as_str())
                    .cloned()
                    .unwrap_or_else(|| value.to_string());
                (value.to_string(), label)
            })
            .collect();
        return Ok(OrderSelect::EnumCase { column, cases });
    }

    Ok(OrderSelect::Column(column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_schema::{EntityDef, EnumDef, FieldDef, PivotDef, RelationDef};

    fn graph() -> SchemaGraph {
        let mut graph = SchemaGraph::new();
        graph.register_enum(
            EnumDef::new("Status")
                .values(["active", "blocked"])
                .labels("en", [("active", "Active"), ("blocked", "Blocked")])
                .labels("de", [("active", "Aktiv"), ("blocked", "Gesperrt")]),
        );
        graph.register_entity(
            EntityDef::new("User", "users")
                .field(FieldDef::uuid("id"))
                .field(FieldDef::string("name"))
                .field(FieldDef::enumeration("status", "Status"))
                .field(FieldDef::uuid("manager_id"))
                .relation(RelationDef::to_one("manager", "Manager").keys("manager_id", "id"))
                .relation(RelationDef::to_many("posts", "Post").keys("id", "author_id"))
                .relation(RelationDef::many_to_many(
                    "roles",
                    "Role",
                    PivotDef::new("RoleUser", "user_id", "role_id"),
                )),
        );
        graph.register_entity(
            EntityDef::new("Manager", "managers")
                .field(FieldDef::uuid("id"))
                .field(FieldDef::date_time("created_at"))
                .field(FieldDef::uuid("team_id"))
                .relation(RelationDef::to_one("team", "Team").keys("team_id", "id")),
        );
        graph.register_entity(
            EntityDef::new("Team", "teams")
                .field(FieldDef::uuid("id"))
                .field(FieldDef::string("name")),
        );
        graph.register_entity(
            EntityDef::new("Post", "posts")
                .field(FieldDef::uuid("id"))
                .field(FieldDef::uuid("author_id"))
                .field(FieldDef::string("title")),
        );
        graph.register_entity(EntityDef::new("Role", "roles").field(FieldDef::uuid("id")));
        graph.register_entity(
            EntityDef::new("RoleUser", "role_user")
                .field(FieldDef::uuid("user_id"))
                .field(FieldDef::uuid("role_id")),
        );
        graph
    }

    #[test]
    fn test_local_column_sort() {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        let expr = compile_sort(&graph, entity, "name", SortDirection::Asc, "en").unwrap();
        assert_eq!(expr.to_sql(), "name ASC");
    }

    #[test]
    fn test_enum_sort_uses_labels() {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        let expr = compile_sort(&graph, entity, "status", SortDirection::Asc, "en").unwrap();
        assert_eq!(
            expr.to_sql(),
            "CASE status WHEN 'active' THEN 'Active' WHEN 'blocked' THEN 'Blocked' \
             ELSE status END ASC"
        );
    }

    #[test]
    fn test_enum_sort_follows_locale() {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        let expr = compile_sort(&graph, entity, "status", SortDirection::Asc, "de").unwrap();
        assert!(expr.to_sql().contains("'Gesperrt'"));
    }

    #[test]
    fn test_to_one_path_sort() {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        let expr =
            compile_sort(&graph, entity, "manager.created_at", SortDirection::Desc, "en").unwrap();
        assert_eq!(
            expr.to_sql(),
            "(SELECT created_at FROM managers WHERE managers.id = users.manager_id) DESC"
        );
    }

    #[test]
    fn test_two_hop_path_sort() {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        let expr =
            compile_sort(&graph, entity, "manager.team.name", SortDirection::Asc, "en").unwrap();
        assert_eq!(
            expr.to_sql(),
            "(SELECT teams.name FROM managers JOIN teams ON teams.id = managers.team_id \
             WHERE managers.id = users.manager_id) ASC"
        );
    }

    #[test]
    fn test_to_many_hop_is_rejected() {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        for path in ["posts.title", "roles.name"] {
            let err = compile_sort(&graph, entity, path, SortDirection::Asc, "en").unwrap_err();
            assert!(matches!(err, CompileError::InvalidSortRelation { .. }), "{path}");
        }
    }

    #[test]
    fn test_unknown_relation_in_sort() {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        let err = compile_sort(&graph, entity, "squad.name", SortDirection::Asc, "en").unwrap_err();
        assert!(matches!(err, CompileError::UnknownRelation { .. }));
    }

    #[test]
    fn test_sort_shape_is_deterministic() {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        let first =
            compile_sort(&graph, entity, "manager.created_at", SortDirection::Desc, "en").unwrap();
        let second =
            compile_sort(&graph, entity, "manager.created_at", SortDirection::Desc, "en").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_enum_locale_is_fatal() {
        let graph = graph();
        let entity = graph.entity("User").unwrap();
        let err = compile_sort(&graph, entity, "status", SortDirection::Asc, "fr").unwrap_err();
        assert_eq!(err.code(), "schema_exception");
    }
}
