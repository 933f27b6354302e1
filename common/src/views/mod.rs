//! Output views for the various functions within ZACA.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

mod certificate;
pub use certificate::*;

mod ocsp;
pub use ocsp::*;

/// One page of a filtered listing.
///
/// `total` is the number of stored records matching the filter, regardless
/// of the page window. `skipped` is the number of rows on this page that were
/// dropped because they could not be decoded or presented, so `items.len()`
/// may be smaller than the window even on a full page.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ListResult<T> {
    pub items: Vec<T>,

    /// Number of records matching the filter across all pages.
    pub total: u64,

    /// Number of malformed rows dropped from this page.
    pub skipped: u64,

    /// The page that was requested. Zero or negative means the first page.
    pub page: i64,

    /// The page size the window was computed from.
    pub page_size: u64,
}

impl<T> ListResult<T> {
    /// Number of pages needed to walk all `total` records.
    pub fn pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }
}

/// Result of a create or update: the stored record and how many rows the
/// store reported as affected.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct Mutation<T> {
    pub record: T,
    pub rows_affected: u64,
}

/// Result of a delete.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct Deleted {
    pub rows_affected: u64,
}

/// An error response for an API endpoint. This is used to return errors to the
/// client in a consistent format.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// An optional error code that can be used to identify the type of error
    /// that occurred.
    pub code: Option<String>,

    /// A human-readable message describing the error that occurred.
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_rounds_up() {
        let result = ListResult::<u8> {
            items: vec![],
            total: 21,
            skipped: 0,
            page: 1,
            page_size: 10,
        };
        assert_eq!(result.pages(), 3);
    }

    #[test]
    fn test_pages_empty() {
        let result = ListResult::<u8> {
            items: vec![],
            total: 0,
            skipped: 0,
            page: 0,
            page_size: 20,
        };
        assert_eq!(result.pages(), 0);
    }
}
