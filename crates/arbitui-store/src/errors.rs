//! Store error type.

/// Alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures raised by the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Could not check a connection out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Underlying `SQLite` failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored JSON blob did not match the expected shape.
    #[error("corrupt stored record: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// No row for the requested currency.
    #[error("no {what} stored for currency {currency:?}")]
    NotFound {
        /// What was looked up (e.g. `vol conventions`).
        what: &'static str,
        /// The currency key.
        currency: String,
    },
}

impl StoreError {
    pub(crate) fn not_found(what: &'static str, currency: &str) -> Self {
        StoreError::NotFound {
            what,
            currency: currency.to_owned(),
        }
    }
}
