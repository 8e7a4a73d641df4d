//! Schema setup.

use rusqlite::Connection;
use tracing::info;

use crate::errors::Result;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS rate (
        currency TEXT NOT NULL,
        name TEXT NOT NULL,
        js JSON NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('libor_rate', 'swap_rate')),
        PRIMARY KEY (currency, name, type)
    );

    CREATE TABLE IF NOT EXISTS vol_conventions (
        currency TEXT PRIMARY KEY,
        libor_rate TEXT NOT NULL,
        swap_rate TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS generic_conventions (
        currency TEXT PRIMARY KEY,
        boundary_tenor TEXT NOT NULL
    );
";

/// Create all tables if they do not exist. Idempotent.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    info!("initializing database schema");
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
