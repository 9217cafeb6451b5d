//! Persistence-backed entity services and the shared resolver dependencies.
//!
//! The services are thin delegations to `wishlist-db`; the only logic here is
//! identifier parsing, so malformed ids are rejected before any lookup.

use std::sync::Arc;

use wishlist_common::{ClientId, Result};
use wishlist_db::models::{Client, Movie, Profile};
use wishlist_db::pool::{get_conn, DbPool};
use wishlist_db::queries::{clients, movies, profiles};

use crate::config::GraphqlConfig;
use crate::metadata::MetadataProvider;

/// Client account lookups.
#[derive(Clone)]
pub struct ClientService {
    pool: DbPool,
}

impl ClientService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn get_all(&self) -> Result<Vec<Client>> {
        let conn = get_conn(&self.pool)?;
        clients::list_clients(&conn)
    }

    pub fn find_by_id(&self, id: ClientId) -> Result<Option<Client>> {
        let conn = get_conn(&self.pool)?;
        clients::get_client(&conn, id)
    }

    /// Parse a raw id string, then look it up. A non-integer id is an
    /// `InvalidInput` error; an unknown one is `Ok(None)`.
    pub fn find_by_raw_id(&self, raw: &str) -> Result<Option<Client>> {
        let id: ClientId = raw.parse()?;
        self.find_by_id(id)
    }

    pub fn create(&self, name: &str, email: &str) -> Result<Client> {
        let conn = get_conn(&self.pool)?;
        clients::create_client(&conn, name, email)
    }
}

/// Viewing profile lookups.
#[derive(Clone)]
pub struct ProfileService {
    pool: DbPool,
}

impl ProfileService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn get_all(&self) -> Result<Vec<Profile>> {
        let conn = get_conn(&self.pool)?;
        profiles::list_profiles(&conn)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Profile>> {
        let conn = get_conn(&self.pool)?;
        profiles::get_profile_by_name(&conn, name)
    }

    pub fn find_by_client(&self, client_id: ClientId) -> Result<Vec<Profile>> {
        let conn = get_conn(&self.pool)?;
        profiles::list_profiles_for_client(&conn, client_id)
    }

    pub fn create(&self, client_id: ClientId, name: &str) -> Result<Profile> {
        let conn = get_conn(&self.pool)?;
        profiles::create_profile(&conn, client_id, name)
    }
}

/// Saved movie lookups.
#[derive(Clone)]
pub struct MovieService {
    pool: DbPool,
}

impl MovieService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn get_all(&self) -> Result<Vec<Movie>> {
        let conn = get_conn(&self.pool)?;
        movies::list_movies(&conn)
    }

    pub fn create(&self, title: &str, watchmode_id: Option<i64>) -> Result<Movie> {
        let conn = get_conn(&self.pool)?;
        movies::create_movie(&conn, title, watchmode_id)
    }
}

/// Tunables the resolvers read at request time.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionSettings {
    pub similar_titles_concurrency: usize,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self::from(&GraphqlConfig::default())
    }
}

impl From<&GraphqlConfig> for ExecutionSettings {
    fn from(config: &GraphqlConfig) -> Self {
        Self {
            similar_titles_concurrency: config.similar_titles_concurrency.max(1),
        }
    }
}

/// Everything a resolver may call, built once at startup and shared.
#[derive(Clone)]
pub struct Services {
    pub clients: ClientService,
    pub profiles: ProfileService,
    pub movies: MovieService,
    pub provider: Arc<dyn MetadataProvider>,
    pub settings: ExecutionSettings,
}

impl Services {
    pub fn new(
        pool: DbPool,
        provider: Arc<dyn MetadataProvider>,
        settings: ExecutionSettings,
    ) -> Self {
        Self {
            clients: ClientService::new(pool.clone()),
            profiles: ProfileService::new(pool.clone()),
            movies: MovieService::new(pool),
            provider,
            settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wishlist_common::Error;
    use wishlist_db::pool::init_memory_pool;

    #[test]
    fn client_lookup_by_raw_id() {
        let service = ClientService::new(init_memory_pool().unwrap());
        let ada = service.create("Ada", "ada@example.com").unwrap();

        let found = service.find_by_raw_id(&ada.id.to_string()).unwrap();
        assert_eq!(found.map(|c| c.email), Some("ada@example.com".to_string()));
    }

    #[test]
    fn malformed_client_id_is_invalid_input() {
        let service = ClientService::new(init_memory_pool().unwrap());
        let err = service.find_by_raw_id("abc").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn unknown_client_id_is_none() {
        let service = ClientService::new(init_memory_pool().unwrap());
        assert!(service.find_by_raw_id("42").unwrap().is_none());
    }

    #[test]
    fn settings_never_zero() {
        let config = GraphqlConfig {
            similar_titles_concurrency: 0,
            ..GraphqlConfig::default()
        };
        assert_eq!(ExecutionSettings::from(&config).similar_titles_concurrency, 1);
    }
}
