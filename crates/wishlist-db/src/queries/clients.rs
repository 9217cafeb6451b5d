//! Client database queries.

use chrono::Utc;
use rusqlite::{Connection, Row};
use wishlist_common::{ClientId, Error, Result};

use super::{map_write_error, parse_timestamp};
use crate::models::Client;

fn client_from_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: ClientId::from(row.get::<_, i64>(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
    })
}

/// Create a new client.
///
/// # Returns
///
/// * `Ok(Client)` - The created client
/// * `Err(Error::InvalidInput)` - If the email is already registered
/// * `Err(Error)` - If a database error occurs
pub fn create_client(conn: &Connection, name: &str, email: &str) -> Result<Client> {
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO clients (name, email, created_at) VALUES (:name, :email, :created_at)",
        rusqlite::named_params! {
            ":name": name,
            ":email": email,
            ":created_at": created_at.to_rfc3339(),
        },
    )
    .map_err(|e| map_write_error(e, &format!("Client with email '{email}'")))?;

    Ok(Client {
        id: ClientId::from(conn.last_insert_rowid()),
        name: name.to_string(),
        email: email.to_string(),
        created_at,
    })
}

/// Get a client by ID.
///
/// # Returns
///
/// * `Ok(Some(Client))` - The client if found
/// * `Ok(None)` - If the client does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_client(conn: &Connection, id: ClientId) -> Result<Option<Client>> {
    let result = conn.query_row(
        "SELECT id, name, email, created_at FROM clients WHERE id = :id",
        rusqlite::named_params! { ":id": id.get() },
        client_from_row,
    );

    match result {
        Ok(client) => Ok(Some(client)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all clients ordered by id.
pub fn list_clients(conn: &Connection) -> Result<Vec<Client>> {
    let mut stmt = conn
        .prepare("SELECT id, name, email, created_at FROM clients ORDER BY id")
        .map_err(|e| Error::database(e.to_string()))?;

    let clients = stmt
        .query_map([], client_from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(clients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{get_conn, init_memory_pool};

    #[test]
    fn test_create_and_get_client() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let created = create_client(&conn, "Ada", "ada@example.com").unwrap();
        let fetched = get_client(&conn, created.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Ada");
        assert_eq!(fetched.email, "ada@example.com");
    }

    #[test]
    fn test_get_missing_client_is_none() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        assert!(get_client(&conn, ClientId::from(42)).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        create_client(&conn, "Ada", "ada@example.com").unwrap();
        let err = create_client(&conn, "Other", "ada@example.com").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_list_clients_in_insertion_order() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        create_client(&conn, "Ada", "ada@example.com").unwrap();
        create_client(&conn, "Grace", "grace@example.com").unwrap();

        let names: Vec<_> = list_clients(&conn)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Ada", "Grace"]);
    }
}
