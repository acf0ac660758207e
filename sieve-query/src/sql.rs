//! SQL dialect handling and identifier utilities.

/// Target database dialect.
///
/// The condition tree is engine-agnostic; the dialect decides placeholder
/// style, case-insensitive matching and the JSON operator vocabulary at
/// render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// PostgreSQL: `$n` placeholders, native `ILIKE`, jsonb operators.
    #[default]
    Postgres,
    /// MySQL: `?` placeholders, `JSON_CONTAINS`.
    MySql,
    /// SQLite: `?` placeholders, `json_each` table-valued function.
    Sqlite,
}

impl Dialect {
    /// Get the parameter placeholder for a 1-based index.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${}", index),
            Self::MySql | Self::Sqlite => "?".to_string(),
        }
    }

    /// Render a JSON path expression diving into `column` by `keys`.
    ///
    /// The result compares as text, so comparison suffixes chained after a
    /// JSON dive keep their usual semantics.
    pub fn json_path(&self, column: &str, keys: &[String]) -> String {
        match self {
            Self::Postgres => {
                let mut expr = String::from(column);
                for (i, key) in keys.iter().enumerate() {
                    let arrow = if i + 1 == keys.len() { "->>" } else { "->" };
                    expr.push_str(arrow);
                    expr.push('\'');
                    expr.push_str(&escape_string(key));
                    expr.push('\'');
                }
                expr
            }
            Self::MySql | Self::Sqlite => {
                let mut path = String::from("$");
                for key in keys {
                    path.push('.');
                    path.push_str(key);
                }
                format!("JSON_EXTRACT({}, '{}')", column, escape_string(&path))
            }
        }
    }
}

/// Escape a string literal for embedding in SQL (single-quote doubling).
pub fn escape_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Escape an identifier by quoting it.
pub fn escape_identifier(name: &str) -> String {
    let escaped = name.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Check if an identifier needs quoting.
pub fn needs_quoting(name: &str) -> bool {
    let reserved = [
        "user", "order", "group", "select", "from", "where", "table", "index",
        "key", "primary", "foreign", "check", "default", "null", "not", "and",
        "or", "in", "is", "like", "between", "case", "when", "then", "else",
        "end", "as", "on", "join", "left", "right", "inner", "outer", "cross",
        "limit", "offset", "union", "having", "create", "alter", "drop",
        "insert", "update", "delete", "into", "values", "set",
    ];

    if reserved.contains(&name.to_lowercase().as_str()) {
        return true;
    }

    !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote an identifier if needed.
pub fn quote_identifier(name: &str) -> String {
    if needs_quoting(name) {
        escape_identifier(name)
    } else {
        name.to_string()
    }
}
