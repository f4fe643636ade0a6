//! Cursor pagination types shared by repository contracts

use serde::{Deserialize, Serialize};

/// Default number of items fetched per page
pub const DEFAULT_LIMIT: u32 = 20;

/// Upper bound on items fetched per page
pub const MAX_LIMIT: u32 = 100;

/// Cursor-based pagination keyed by the last seen id
///
/// Listings are ordered by descending id. Walking `Forward` from a cursor
/// returns the ids strictly smaller than it; walking `Backward` returns the
/// ids strictly greater, still in descending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPagination {
    /// Last seen id; `None` starts from the newest item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    /// Number of items to fetch
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Direction of pagination
    #[serde(default)]
    pub direction: PaginationDirection,

    /// Include soft-deleted rows
    #[serde(default)]
    pub include_deleted: bool,
}

/// Direction for cursor-based pagination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationDirection {
    #[default]
    Forward,
    Backward,
}

impl Default for CursorPagination {
    fn default() -> Self {
        Self::first(DEFAULT_LIMIT)
    }
}

impl CursorPagination {
    /// First page of `limit` items
    pub fn first(limit: u32) -> Self {
        Self {
            cursor: None,
            limit: limit.clamp(1, MAX_LIMIT),
            direction: PaginationDirection::Forward,
            include_deleted: false,
        }
    }

    /// Continue after `cursor` in `direction`
    pub fn after(cursor: impl Into<String>, direction: PaginationDirection, limit: u32) -> Self {
        Self {
            cursor: Some(cursor.into()),
            limit: limit.clamp(1, MAX_LIMIT),
            direction,
            include_deleted: false,
        }
    }

    pub fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    pub fn is_forward(&self) -> bool {
        self.direction == PaginationDirection::Forward
    }

    /// Apply this page request to an unsorted collection
    ///
    /// Filtering of soft-deleted rows is the caller's job; this only orders,
    /// slices by cursor and computes `has_more`.
    pub fn apply<T, F>(&self, mut items: Vec<T>, id_of: F) -> CursorPage<T>
    where
        F: Fn(&T) -> &str,
    {
        let limit = self.limit.clamp(1, MAX_LIMIT) as usize;
        items.sort_by(|a, b| id_of(b).cmp(id_of(a)));

        if let Some(cursor) = self.cursor.as_deref() {
            items.retain(|item| match self.direction {
                PaginationDirection::Forward => id_of(item) < cursor,
                PaginationDirection::Backward => id_of(item) > cursor,
            });
        }

        let has_more = items.len() > limit;
        let items = match self.direction {
            PaginationDirection::Forward => {
                items.truncate(limit);
                items
            }
            // Nearest ids to the cursor are at the tail when walking backward
            PaginationDirection::Backward => {
                let skip = items.len().saturating_sub(limit);
                items.into_iter().skip(skip).collect()
            }
        };

        CursorPage { items, has_more }
    }
}

/// One page of a cursor listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    /// Items in descending id order
    pub items: Vec<T>,

    /// Whether more items exist past this page in the requested direction
    pub has_more: bool,
}

impl<T> CursorPage<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }

    /// Transform the items using a function
    pub fn map<U, F>(self, f: F) -> CursorPage<U>
    where
        F: FnMut(T) -> U,
    {
        CursorPage {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cursor for requesting the page after this one
    pub fn next_cursor<'a, F>(&'a self, id_of: F) -> Option<&'a str>
    where
        F: Fn(&'a T) -> &'a str,
    {
        self.items.last().map(id_of)
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}
