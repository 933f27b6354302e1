use thiserror::Error;

use crate::storage::StoreError;

/// The taxonomy every data-access failure is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request carried a filter, key or option that could not be parsed.
    InvalidArgument,
    /// No record matched a keyed fetch, or a query failed.
    NotFound,
    InsertFailed,
    UpdateFailed,
    DeleteFailed,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("record not found")]
    NotFound,

    /// A query or keyed fetch failed at the store. Reported as
    /// [`ErrorKind::NotFound`], the cause is kept for diagnostics.
    #[error("query failed: {0}")]
    Lookup(#[source] StoreError),

    #[error("insert failed: {0}")]
    InsertFailed(#[source] StoreError),

    #[error("update failed: {0}")]
    UpdateFailed(#[source] StoreError),

    #[error("delete failed: {0}")]
    DeleteFailed(#[source] StoreError),
}

impl DataError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound | Self::Lookup(_) => ErrorKind::NotFound,
            Self::InsertFailed(_) => ErrorKind::InsertFailed,
            Self::UpdateFailed(_) => ErrorKind::UpdateFailed,
            Self::DeleteFailed(_) => ErrorKind::DeleteFailed,
        }
    }
}

/// Raised by a patch that would leave a record in an inconsistent state.
#[derive(Debug, Error)]
#[error("patch rejected: {0}")]
pub struct PatchError(pub String);
