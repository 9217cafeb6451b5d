//! Movie database queries.

use chrono::Utc;
use rusqlite::{Connection, Row};
use wishlist_common::{Error, MovieId, Result};

use super::{map_write_error, parse_timestamp};
use crate::models::Movie;

fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: MovieId::from(row.get::<_, i64>(0)?),
        title: row.get(1)?,
        watchmode_id: row.get(2)?,
        created_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
    })
}

/// Save a movie, optionally linked to a WatchMode title id.
pub fn create_movie(conn: &Connection, title: &str, watchmode_id: Option<i64>) -> Result<Movie> {
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO movies (title, watchmode_id, created_at)
         VALUES (:title, :watchmode_id, :created_at)",
        rusqlite::named_params! {
            ":title": title,
            ":watchmode_id": watchmode_id,
            ":created_at": created_at.to_rfc3339(),
        },
    )
    .map_err(|e| map_write_error(e, &format!("Movie '{title}'")))?;

    Ok(Movie {
        id: MovieId::from(conn.last_insert_rowid()),
        title: title.to_string(),
        watchmode_id,
        created_at,
    })
}

/// Get a movie by ID.
pub fn get_movie(conn: &Connection, id: MovieId) -> Result<Option<Movie>> {
    let result = conn.query_row(
        "SELECT id, title, watchmode_id, created_at FROM movies WHERE id = :id",
        rusqlite::named_params! { ":id": id.get() },
        movie_from_row,
    );

    match result {
        Ok(movie) => Ok(Some(movie)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all movies ordered by id.
pub fn list_movies(conn: &Connection) -> Result<Vec<Movie>> {
    let mut stmt = conn
        .prepare("SELECT id, title, watchmode_id, created_at FROM movies ORDER BY id")
        .map_err(|e| Error::database(e.to_string()))?;

    let movies = stmt
        .query_map([], movie_from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(movies)
}
