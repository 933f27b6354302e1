//! Input parameters for the various functions within ZACA.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

mod certificate;
pub use certificate::*;

mod ocsp;
pub use ocsp::*;

/// Number of records returned per page when the caller does not ask for a
/// specific page size.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Parameters for paginating through a list of records. This is used by the
/// list endpoints that do not take any filter criteria.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// The page to return, starting at 1. Zero or negative values return the
    /// first page.
    pub page: Option<i64>,

    /// The maximum number of results to return per page.
    pub page_size: Option<u64>,

    /// Sort order, e.g. `expiry desc` or `serial_number asc, expiry desc`.
    pub order: Option<String>,
}

impl PaginationParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(0)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn order(&self) -> Option<&str> {
        non_empty(&self.order)
    }
}

/// Treats an empty string the same as an absent value, so that a blank query
/// parameter never turns into a "match the empty string" constraint.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
