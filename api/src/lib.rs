//! ZACA record store API service.
//!
//! Serves the certificate and OCSP response records over REST. The backing
//! store is chosen at startup, see [`config::ZacaApiConfig`].

pub mod config;
pub mod server;

pub(crate) mod context;
pub(crate) mod error;
pub(crate) mod handlers;
