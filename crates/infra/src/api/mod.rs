//! Remote org client
//!
//! [`Session`] holds the credentials and performs authenticated HTTP calls.
//! The `rest` module implements the core `OrgApi` port on top of it and
//! [`AuthCodeConnector`] opens sessions into freshly provisioned
//! environments.

pub mod connector;
pub mod rest;
pub mod session;

pub use connector::AuthCodeConnector;
pub use session::Session;
