//! Profile database queries.

use chrono::Utc;
use rusqlite::{Connection, Row};
use wishlist_common::{ClientId, Error, ProfileId, Result};

use super::{map_write_error, parse_timestamp};
use crate::models::Profile;

const PROFILE_COLUMNS: &str = "id, client_id, name, created_at";

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: ProfileId::from(row.get::<_, i64>(0)?),
        client_id: ClientId::from(row.get::<_, i64>(1)?),
        name: row.get(2)?,
        created_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
    })
}

/// Create a profile for an existing client.
///
/// Fails with `InvalidInput` when the name is taken or the client does not
/// exist.
pub fn create_profile(conn: &Connection, client_id: ClientId, name: &str) -> Result<Profile> {
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO profiles (client_id, name, created_at) VALUES (:client_id, :name, :created_at)",
        rusqlite::named_params! {
            ":client_id": client_id.get(),
            ":name": name,
            ":created_at": created_at.to_rfc3339(),
        },
    )
    .map_err(|e| map_write_error(e, &format!("Profile '{name}'")))?;

    Ok(Profile {
        id: ProfileId::from(conn.last_insert_rowid()),
        client_id,
        name: name.to_string(),
        created_at,
    })
}

fn query_one(
    conn: &Connection,
    filter: &str,
    params: &[(&str, &dyn rusqlite::ToSql)],
) -> Result<Option<Profile>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE {filter}");
    match conn.query_row(&sql, params, profile_from_row) {
        Ok(profile) => Ok(Some(profile)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get a profile by ID.
pub fn get_profile(conn: &Connection, id: ProfileId) -> Result<Option<Profile>> {
    query_one(conn, "id = :id", rusqlite::named_params! { ":id": id.get() })
}

/// Get a profile by its (unique) name.
pub fn get_profile_by_name(conn: &Connection, name: &str) -> Result<Option<Profile>> {
    query_one(conn, "name = :name", rusqlite::named_params! { ":name": name })
}

fn query_many(
    conn: &Connection,
    sql: &str,
    params: &[(&str, &dyn rusqlite::ToSql)],
) -> Result<Vec<Profile>> {
    let mut stmt = conn.prepare(sql).map_err(|e| Error::database(e.to_string()))?;

    let profiles = stmt
        .query_map(params, profile_from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(profiles)
}

/// List all profiles ordered by id.
pub fn list_profiles(conn: &Connection) -> Result<Vec<Profile>> {
    query_many(
        conn,
        &format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY id"),
        &[],
    )
}

/// List the profiles belonging to one client.
pub fn list_profiles_for_client(conn: &Connection, client_id: ClientId) -> Result<Vec<Profile>> {
    query_many(
        conn,
        &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE client_id = :client_id ORDER BY id"),
        rusqlite::named_params! { ":client_id": client_id.get() },
    )
}
