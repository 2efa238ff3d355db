pub mod migrations;
pub mod queries;
pub mod repository;

pub use repository::{BookingRepository, SqliteBookingRepository};

use anyhow::Context;
use rusqlite::Connection;

/// Opens the booking database at `path` (`:memory:` works) and brings its
/// schema up to date.
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open booking database at {path}"))?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")
        .context("failed to configure booking database")?;

    migrations::run_migrations(&conn).context("failed to migrate booking database")?;

    let bookings: i64 = conn
        .query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))
        .context("failed to count stored bookings")?;
    tracing::info!(path, bookings, "booking database ready");

    Ok(conn)
}
