//! Data access for the ZACA record store.
//!
//! Every record type goes through the same [`repository::Repository`], which
//! talks to a [`storage::RecordStore`] handle injected at construction time.
//! The certificate listing and detail views are composed on top of it in
//! [`certificates`].

pub mod certificates;
pub mod codec;
pub mod error;
pub mod models;
pub mod query;
pub mod repository;
pub mod storage;

pub use error::{DataError, ErrorKind};
