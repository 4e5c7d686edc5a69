//! Limit/offset pagination for listing queries.

use serde::{Deserialize, Serialize};

/// Default number of rows returned when the caller does not specify a limit.
const DEFAULT_LIMIT: i64 = 10;
/// Maximum number of rows per query.
const MAX_LIMIT: i64 = 100;

/// Limit/offset parameters for list queries.
///
/// A limit of zero (or an out-of-range value) falls back to the default
/// rather than returning an empty page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery {
    /// Maximum number of rows to return.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Number of rows to skip.
    #[serde(default)]
    pub offset: i64,
}

impl ListQuery {
    /// Create a list query, clamping out-of-range values.
    pub fn new(limit: i64, offset: i64) -> Self {
        let limit = if limit <= 0 {
            DEFAULT_LIMIT
        } else {
            limit.min(MAX_LIMIT)
        };
        Self {
            limit,
            offset: offset.max(0),
        }
    }

    /// The SQL `LIMIT` value.
    pub fn limit(&self) -> i64 {
        if self.limit <= 0 {
            DEFAULT_LIMIT
        } else {
            self.limit.min(MAX_LIMIT)
        }
    }

    /// The SQL `OFFSET` value.
    pub fn offset(&self) -> i64 {
        self.offset.max(0)
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// A page of rows together with the total row count across all pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T: Serialize> {
    /// The rows on this page.
    pub rows: Vec<T>,
    /// Total number of rows matching the query.
    pub total: i64,
}

impl<T: Serialize> Page<T> {
    /// Create a new page.
    pub fn new(rows: Vec<T>, total: i64) -> Self {
        Self { rows, total }
    }
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}
