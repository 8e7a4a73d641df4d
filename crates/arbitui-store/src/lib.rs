//! # arbitui-store
//!
//! `SQLite`-backed lookup of rate definitions and volatility quoting
//! conventions, keyed by currency. Rate definitions are stored as JSON
//! blobs next to their kind tag; conventions rows reference them by name.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod store;

pub use connection::{ConnectionConfig, ConnectionPool, new_file, new_in_memory};
pub use errors::{Result, StoreError};
pub use migrations::run_migrations;
pub use store::Store;
