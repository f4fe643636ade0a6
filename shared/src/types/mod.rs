//! Type definitions shared across crates
//!
//! - `pagination` - Cursor pagination for repository listings

pub mod pagination;

pub use pagination::{CursorPage, CursorPagination, PaginationDirection};
