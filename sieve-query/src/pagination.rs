//! Offset pagination and result-page metadata.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Page-based pagination, 1-indexed.
///
/// Pagination only applies when both the page number and the page size are
/// set and non-zero; otherwise the query runs unpaginated — there is no
/// implicit first-page default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Records per page.
    pub per_page: Option<u64>,
}

impl Pagination {
    /// Create an empty pagination (no limits).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page number.
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size.
    pub fn per_page(mut self, per_page: u64) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Check whether pagination applies.
    pub fn is_empty(&self) -> bool {
        !matches!(
            (self.page, self.per_page),
            (Some(page), Some(per_page)) if page > 0 && per_page > 0
        )
    }

    /// Number of records to skip, when pagination applies.
    pub fn offset(&self) -> Option<u64> {
        if self.is_empty() {
            return None;
        }
        match (self.page, self.per_page) {
            (Some(page), Some(per_page)) => Some((page - 1) * per_page),
            _ => None,
        }
    }

    /// Generate the LIMIT/OFFSET clause, or an empty string when
    /// pagination does not apply.
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();
        self.write_sql(&mut sql);
        sql
    }

    /// Write the LIMIT/OFFSET clause directly into a buffer.
    pub fn write_sql(&self, sql: &mut String) {
        let (Some(offset), Some(per_page)) = (self.offset(), self.per_page) else {
            return;
        };
        let _ = write!(sql, "LIMIT {}", per_page);
        if offset > 0 {
            let _ = write!(sql, " OFFSET {}", offset);
        }
    }
}

/// Metadata describing one page of a paginated result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Total number of matching records.
    pub total: u64,
    /// Records per page.
    pub per_page: u64,
    /// Current 1-based page number.
    pub current_page: u64,
    /// Last page number (at least 1).
    pub last_page: u64,
}

impl PageMeta {
    /// Compute metadata from a total count and the pagination that produced
    /// the page.
    pub fn from_total(total: u64, pagination: Pagination) -> Self {
        let per_page = pagination.per_page.filter(|p| *p > 0).unwrap_or(total.max(1));
        let current_page = pagination.page.filter(|p| *p > 0).unwrap_or(1);
        let last_page = total.div_ceil(per_page).max(1);
        Self {
            total,
            per_page,
            current_page,
            last_page,
        }
    }
}
