use crate::error::DataError;

/// Largest page a caller may request. Larger sizes are clamped.
pub const MAX_PAGE_SIZE: u64 = 1000;

const MAX_OFFSET: u64 = i64::MAX as u64;

/// The `(offset, limit)` slice of a result set handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

/// A requested page. Pages are numbered from 1; zero or negative pages mean
/// the first page, never "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    page_size: u64,
}

impl Pagination {
    pub fn new(page: i64, page_size: u64) -> Result<Self, DataError> {
        if page_size == 0 {
            return Err(DataError::invalid_argument("page size must be greater than zero"));
        }
        Ok(Self {
            page,
            page_size: page_size.min(MAX_PAGE_SIZE),
        })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// The slice of results this page covers. The offset never exceeds
    /// `i64::MAX`, so pages past the end read as empty on every store.
    pub fn window(&self) -> Window {
        let offset = match u64::try_from(self.page) {
            Ok(page) if page > 0 => (page - 1).saturating_mul(self.page_size).min(MAX_OFFSET),
            _ => 0,
        };
        Window {
            offset,
            limit: self.page_size,
        }
    }
}
