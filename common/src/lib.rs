//! Shared request parameters and response views for the ZACA record store.

pub mod params;
pub mod views;
