//! Database query modules.
//!
//! - clients: Client accounts
//! - profiles: Viewing profiles owned by clients
//! - movies: Locally saved movies

pub mod clients;
pub mod movies;
pub mod profiles;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;

/// Parse an RFC 3339 timestamp column, reporting a conversion failure on the
/// given column index instead of panicking.
pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Map a constraint violation to `InvalidInput` and everything else to a
/// database error.
pub(crate) fn map_write_error(e: rusqlite::Error, what: &str) -> wishlist_common::Error {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        wishlist_common::Error::invalid_input(format!("{what} already exists"))
    } else if message.contains("FOREIGN KEY constraint failed") {
        wishlist_common::Error::invalid_input(format!("{what} references a missing row"))
    } else {
        wishlist_common::Error::database(message)
    }
}
