//! The compiled condition tree and its SQL rendering.
//!
//! A [`Condition`] is what the compilers produce: a tree of leaf predicates
//! bound to a field reference, composed with AND/OR/NOT and correlated
//! EXISTS subqueries for relation traversal. The tree is engine-agnostic;
//! [`Condition::to_sql`] renders it for a concrete [`Dialect`] while
//! collecting bind parameters.

use crate::sql::Dialect;
use crate::value::FilterValue;

/// A reference to a field, optionally diving into a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    /// Column expression, possibly table-qualified.
    pub column: String,
    /// JSON keys to traverse inside the column, outermost first.
    pub json_path: Vec<String>,
}

impl FieldRef {
    /// Reference a plain column.
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            column: name.into(),
            json_path: Vec::new(),
        }
    }

    /// Attach a JSON path.
    pub fn with_json_path(mut self, path: Vec<String>) -> Self {
        self.json_path = path;
        self
    }

    /// Render the reference for a dialect.
    pub fn render(&self, dialect: Dialect) -> String {
        if self.json_path.is_empty() {
            self.column.clone()
        } else {
            dialect.json_path(&self.column, &self.json_path)
        }
    }
}

impl From<&str> for FieldRef {
    fn from(name: &str) -> Self {
        Self::column(name)
    }
}

impl From<String> for FieldRef {
    fn from(name: String) -> Self {
        Self::column(name)
    }
}

/// Comparison operator for scalar predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
}

impl CompareOp {
    /// Get the SQL operator text.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

/// An inner join inside a correlated subquery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Table to join.
    pub table: String,
    /// Left side of the join condition (qualified column).
    pub left: String,
    /// Right side of the join condition (qualified column).
    pub right: String,
}

/// A correlated subquery over a related (or pivot) table.
#[derive(Debug, Clone, PartialEq)]
pub struct Subquery {
    /// Table the subquery selects from.
    pub table: String,
    /// Joins applied inside the subquery (pivot hops).
    pub joins: Vec<Join>,
    /// Correlation predicate: inner qualified column = outer qualified column.
    pub correlation: (String, String),
    /// Condition applied inside the subquery.
    pub condition: Box<Condition>,
}

/// A compiled WHERE-clause tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// No condition (always true).
    None,

    /// Scalar comparison. A null value with `Eq`/`Ne` renders as
    /// IS NULL / IS NOT NULL.
    Compare {
        /// Field reference.
        field: FieldRef,
        /// Comparison operator.
        op: CompareOp,
        /// Bound value.
        value: FilterValue,
    },

    /// Membership in a list. Empty lists render as always-false.
    In {
        /// Field reference.
        field: FieldRef,
        /// Allowed values.
        values: Vec<FilterValue>,
    },
    /// Exclusion from a list. Empty lists render as always-true.
    NotIn {
        /// Field reference.
        field: FieldRef,
        /// Excluded values.
        values: Vec<FilterValue>,
    },

    /// IS NULL check.
    IsNull {
        /// Field reference.
        field: FieldRef,
    },
    /// IS NOT NULL check.
    IsNotNull {
        /// Field reference.
        field: FieldRef,
    },

    /// Substring match; the needle is wrapped in `%` at render time.
    Like {
        /// Field reference.
        field: FieldRef,
        /// Raw needle text.
        value: String,
        /// Case-insensitive matching.
        case_insensitive: bool,
    },

    /// JSON containment: the field contains every listed value.
    JsonContainsAll {
        /// Field reference.
        field: FieldRef,
        /// Required values.
        values: Vec<FilterValue>,
    },
    /// JSON absence: the field contains none of the listed values.
    JsonLacksAll {
        /// Field reference.
        field: FieldRef,
        /// Forbidden values.
        values: Vec<FilterValue>,
    },
    /// JSON containment: the field contains at least one listed value.
    JsonContainsAny {
        /// Field reference.
        field: FieldRef,
        /// Candidate values.
        values: Vec<FilterValue>,
    },
    /// The JSON field is the empty array/object or SQL NULL.
    JsonEmptyOrNull {
        /// Field reference.
        field: FieldRef,
    },

    /// Correlated (NOT) EXISTS over a related table.
    Exists {
        /// The correlated subquery.
        subquery: Subquery,
        /// Render as NOT EXISTS.
        negated: bool,
    },

    /// Logical AND of subconditions.
    And(Vec<Condition>),
    /// Logical OR of subconditions.
    Or(Vec<Condition>),
    /// Logical negation.
    Not(Box<Condition>),
}

impl Condition {
    /// Create an empty condition (matches everything).
    pub fn none() -> Self {
        Self::None
    }

    /// Check if this condition is empty.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// AND-compose conditions, dropping empties and collapsing singletons.
    pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Self {
        let conditions: Vec<_> = conditions.into_iter().filter(|c| !c.is_none()).collect();
        match conditions.len() {
            0 => Self::None,
            1 => conditions.into_iter().next().unwrap_or(Self::None),
            _ => Self::And(conditions),
        }
    }

    /// OR-compose conditions, dropping empties and collapsing singletons.
    pub fn or(conditions: impl IntoIterator<Item = Condition>) -> Self {
        let conditions: Vec<_> = conditions.into_iter().filter(|c| !c.is_none()).collect();
        match conditions.len() {
            0 => Self::None,
            1 => conditions.into_iter().next().unwrap_or(Self::None),
            _ => Self::Or(conditions),
        }
    }

    /// Negate a condition; negating the empty condition stays empty.
    pub fn not(condition: Condition) -> Self {
        if condition.is_none() {
            return Self::None;
        }
        Self::Not(Box::new(condition))
    }

    /// Combine with another condition using AND.
    pub fn and_then(self, other: Condition) -> Self {
        if self.is_none() {
            return other;
        }
        if other.is_none() {
            return self;
        }
        match self {
            Self::And(mut conditions) => {
                conditions.push(other);
                Self::And(conditions)
            }
            _ => Self::And(vec![self, other]),
        }
    }

    /// Render the tree as SQL, returning the clause and its bind values.
    ///
    /// `param_offset` is the number of parameters already bound before this
    /// clause, so placeholder numbering continues correctly on dialects with
    /// positional placeholders.
    pub fn to_sql(&self, dialect: Dialect, param_offset: usize) -> (String, Vec<FilterValue>) {
        let mut params = Vec::new();
        let mut sql = String::new();
        self.write_sql(dialect, &mut sql, &mut params, param_offset);
        (sql, params)
    }

    fn write_sql(
        &self,
        dialect: Dialect,
        sql: &mut String,
        params: &mut Vec<FilterValue>,
        offset: usize,
    ) {
        match self {
            Self::None => sql.push_str("TRUE"),

            Self::Compare { field, op, value } => {
                let rendered = field.render(dialect);
                if value.is_null() && *op == CompareOp::Eq {
                    sql.push_str(&rendered);
                    sql.push_str(" IS NULL");
                } else if value.is_null() && *op == CompareOp::Ne {
                    sql.push_str(&rendered);
                    sql.push_str(" IS NOT NULL");
                } else {
                    sql.push_str(&rendered);
                    sql.push(' ');
                    sql.push_str(op.as_sql());
                    sql.push(' ');
                    sql.push_str(&bind(dialect, params, offset, value.clone()));
                }
            }

            Self::In { field, values } => {
                if values.is_empty() {
                    sql.push_str("FALSE");
                    return;
                }
                sql.push_str(&field.render(dialect));
                sql.push_str(" IN (");
                write_placeholders(dialect, sql, params, offset, values);
                sql.push(')');
            }
            Self::NotIn { field, values } => {
                if values.is_empty() {
                    sql.push_str("TRUE");
                    return;
                }
                sql.push_str(&field.render(dialect));
                sql.push_str(" NOT IN (");
                write_placeholders(dialect, sql, params, offset, values);
                sql.push(')');
            }

            Self::IsNull { field } => {
                sql.push_str(&field.render(dialect));
                sql.push_str(" IS NULL");
            }
            Self::IsNotNull { field } => {
                sql.push_str(&field.render(dialect));
                sql.push_str(" IS NOT NULL");
            }

            Self::Like {
                field,
                value,
                case_insensitive,
            } => {
                let rendered = field.render(dialect);
                let pattern = FilterValue::String(format!("%{}%", value));
                match (dialect, case_insensitive) {
                    (Dialect::Postgres, true) => {
                        sql.push_str(&rendered);
                        sql.push_str(" ILIKE ");
                        sql.push_str(&bind(dialect, params, offset, pattern));
                    }
                    (_, true) => {
                        sql.push_str("LOWER(");
                        sql.push_str(&rendered);
                        sql.push_str(") LIKE LOWER(");
                        sql.push_str(&bind(dialect, params, offset, pattern));
                        sql.push(')');
                    }
                    (_, false) => {
                        sql.push_str(&rendered);
                        sql.push_str(" LIKE ");
                        sql.push_str(&bind(dialect, params, offset, pattern));
                    }
                }
            }

            Self::JsonContainsAll { field, values } => {
                write_json_containment(dialect, sql, params, offset, field, values, false, false);
            }
            Self::JsonLacksAll { field, values } => {
                write_json_containment(dialect, sql, params, offset, field, values, true, false);
            }
            Self::JsonContainsAny { field, values } => {
                write_json_containment(dialect, sql, params, offset, field, values, false, true);
            }

            Self::JsonEmptyOrNull { field } => {
                let rendered = field.render(dialect);
                match dialect {
                    Dialect::Postgres => {
                        sql.push('(');
                        sql.push_str(&rendered);
                        sql.push_str("::jsonb IN ('[]'::jsonb, '{}'::jsonb) OR ");
                        sql.push_str(&rendered);
                        sql.push_str(" IS NULL)");
                    }
                    Dialect::MySql => {
                        sql.push_str(&format!(
                            "(JSON_LENGTH({}) = 0 OR {} IS NULL)",
                            rendered, rendered
                        ));
                    }
                    Dialect::Sqlite => {
                        sql.push_str(&format!(
                            "(json_array_length({}) = 0 OR {} IS NULL)",
                            rendered, rendered
                        ));
                    }
                }
            }

            Self::Exists { subquery, negated } => {
                if *negated {
                    sql.push_str("NOT ");
                }
                sql.push_str("EXISTS (SELECT 1 FROM ");
                sql.push_str(&subquery.table);
                for join in &subquery.joins {
                    sql.push_str(" JOIN ");
                    sql.push_str(&join.table);
                    sql.push_str(" ON ");
                    sql.push_str(&join.left);
                    sql.push_str(" = ");
                    sql.push_str(&join.right);
                }
                sql.push_str(" WHERE ");
                sql.push_str(&subquery.correlation.0);
                sql.push_str(" = ");
                sql.push_str(&subquery.correlation.1);
                if !subquery.condition.is_none() {
                    sql.push_str(" AND ");
                    subquery.condition.write_sql(dialect, sql, params, offset);
                }
                sql.push(')');
            }

            Self::And(conditions) => {
                if conditions.is_empty() {
                    sql.push_str("TRUE");
                    return;
                }
                sql.push('(');
                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(" AND ");
                    }
                    condition.write_sql(dialect, sql, params, offset);
                }
                sql.push(')');
            }
            Self::Or(conditions) => {
                if conditions.is_empty() {
                    sql.push_str("FALSE");
                    return;
                }
                sql.push('(');
                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(" OR ");
                    }
                    condition.write_sql(dialect, sql, params, offset);
                }
                sql.push(')');
            }
            Self::Not(condition) => {
                sql.push_str("NOT (");
                condition.write_sql(dialect, sql, params, offset);
                sql.push(')');
            }
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::None
    }
}

fn bind(
    dialect: Dialect,
    params: &mut Vec<FilterValue>,
    offset: usize,
    value: FilterValue,
) -> String {
    params.push(value);
    dialect.placeholder(offset + params.len())
}

fn write_placeholders(
    dialect: Dialect,
    sql: &mut String,
    params: &mut Vec<FilterValue>,
    offset: usize,
    values: &[FilterValue],
) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        let placeholder = bind(dialect, params, offset, value.clone());
        sql.push_str(&placeholder);
    }
}

/// Serialize a filter value to JSON text for containment parameters.
fn json_text(value: &FilterValue) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn write_json_containment(
    dialect: Dialect,
    sql: &mut String,
    params: &mut Vec<FilterValue>,
    offset: usize,
    field: &FieldRef,
    values: &[FilterValue],
    negated: bool,
    any: bool,
) {
    let rendered = field.render(dialect);

    match dialect {
        Dialect::Postgres if any => {
            // Key-existence over a text array: field ?| ARRAY[...]
            sql.push_str(&rendered);
            sql.push_str("::jsonb ?| ARRAY[");
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                let placeholder = bind(
                    dialect,
                    params,
                    offset,
                    FilterValue::String(value.as_text()),
                );
                sql.push_str(&placeholder);
            }
            sql.push(']');
        }
        Dialect::Postgres if negated => {
            // Absence of every listed value, so each element gets its own
            // NOT containment check. A single NOT over an array payload
            // would only mean "not all of them".
            sql.push('(');
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    sql.push_str(" AND ");
                }
                sql.push_str("NOT (");
                sql.push_str(&rendered);
                sql.push_str("::jsonb @> ");
                let placeholder =
                    bind(dialect, params, offset, FilterValue::String(json_text(value)));
                sql.push_str(&placeholder);
                sql.push_str("::jsonb)");
            }
            sql.push(')');
        }
        Dialect::Postgres => {
            sql.push_str(&rendered);
            sql.push_str("::jsonb @> ");
            let payload = if values.len() == 1 {
                json_text(&values[0])
            } else {
                json_text(&FilterValue::List(values.to_vec()))
            };
            let placeholder = bind(dialect, params, offset, FilterValue::String(payload));
            sql.push_str(&placeholder);
            sql.push_str("::jsonb");
        }
        Dialect::MySql => {
            let connector = if any { " OR " } else { " AND " };
            sql.push('(');
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    sql.push_str(connector);
                }
                if negated {
                    sql.push_str("NOT ");
                }
                sql.push_str("JSON_CONTAINS(");
                sql.push_str(&rendered);
                sql.push_str(", ");
                let placeholder =
                    bind(dialect, params, offset, FilterValue::String(json_text(value)));
                sql.push_str(&placeholder);
                sql.push(')');
            }
            sql.push(')');
        }
        Dialect::Sqlite => {
            let connector = if any { " OR " } else { " AND " };
            sql.push('(');
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    sql.push_str(connector);
                }
                if negated {
                    sql.push_str("NOT ");
                }
                sql.push_str("EXISTS (SELECT 1 FROM json_each(");
                sql.push_str(&rendered);
                sql.push_str(") WHERE json_each.value = ");
                let placeholder = bind(dialect, params, offset, value.clone());
                sql.push_str(&placeholder);
                sql.push(')');
            }
            sql.push(')');
        }
    }
}
