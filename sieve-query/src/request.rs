//! The list-request wire format.
//!
//! Clients send a flat JSON document: filter codes with values, sorting,
//! free-text query and pagination. Two historical sort shapes coexist on
//! the wire and both normalize to an ordered list of [`SortSpec`]s:
//!
//! ```json
//! { "sort": { "name": "asc", "created_at": "desc" } }
//! { "sort": [ { "sort": "name", "by": "asc" } ] }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::compiler::order::{SortDirection, SortSpec};
use crate::value::FilterValue;

/// A parsed list request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRequest {
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<u64>,
    /// Records per page.
    #[serde(default)]
    pub per_page: Option<u64>,
    /// Sort specifications, in request order.
    #[serde(default, deserialize_with = "deserialize_sort")]
    pub sort: Vec<SortSpec>,
    /// Filter map: filter code to wire value, in request order.
    #[serde(default)]
    pub filters: IndexMap<String, serde_json::Value>,
    /// Free-text query.
    #[serde(default)]
    pub q: String,
}

impl ListRequest {
    /// Parse a request from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The filter map converted to compiler values, preserving order.
    pub fn filter_values(&self) -> IndexMap<String, FilterValue> {
        self.filters
            .iter()
            .map(|(code, value)| (code.clone(), FilterValue::from_json(value.clone())))
            .collect()
    }
}

fn deserialize_sort<'de, D>(deserializer: D) -> Result<Vec<SortSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Entry {
        sort: String,
        by: SortDirection,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        List(Vec<Entry>),
        Map(IndexMap<String, SortDirection>),
    }

    let wire = Option::<Wire>::deserialize(deserializer)?;
    Ok(match wire {
        None => Vec::new(),
        Some(Wire::List(entries)) => entries
            .into_iter()
            .map(|entry| SortSpec::new(entry.sort, entry.by))
            .collect(),
        Some(Wire::Map(map)) => map
            .into_iter()
            .map(|(path, direction)| SortSpec::new(path, direction))
            .collect(),
    })
}
