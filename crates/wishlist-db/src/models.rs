//! Rust models matching the database schema.
//!
//! Serialized field names are camelCase because these values are handed to
//! the query layer as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wishlist_common::{ClientId, MovieId, ProfileId};

/// Client account model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Viewing profile owned by a client. Profile names are globally unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub client_id: ClientId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Locally saved movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// WatchMode title id, when the movie was saved from a search result.
    pub watchmode_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
