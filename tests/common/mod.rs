//! Common shared functionality for integration tests.

pub(crate) mod server;
