//! Trait definition and types for the external title-metadata provider.
//!
//! This module defines the [`MetadataProvider`] trait that the title backend
//! (WatchMode) implements, along with the shared data types returned by
//! provider queries. These types are also what the query layer serializes, so
//! they use camelCase field names.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Provider-side numeric identifier of a title.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TitleId(u64);

impl TitleId {
    /// Wrap a raw provider id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw provider id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TitleId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl FromStr for TitleId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// A single title returned from a search query.
///
/// Always fully populated by the provider; never carries related titles or
/// streaming sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: TitleId,
    /// Display name of the title.
    pub name: String,
    /// Title category, e.g. `movie` or `tv_series`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub year: Option<u16>,
    /// TMDB cross-reference id.
    pub tmdb_id: Option<u64>,
    /// TMDB cross-reference type (`movie` / `tv`).
    pub tmdb_type: Option<String>,
    /// Poster image URL.
    pub image_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Title detail
// ---------------------------------------------------------------------------

/// Full title record.
///
/// A value is either *complete* (returned by [`MetadataProvider::get_detail`])
/// or *partial*: derived locally from a [`SearchResult`] or a bare identifier
/// stub. Partial values leave every field past the baseline set as `None`, in
/// particular `similar_titles_ids` and `sources`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleDetail {
    pub id: TitleId,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub year: Option<u16>,
    pub tmdb_id: Option<u64>,
    pub tmdb_type: Option<String>,
    pub poster: Option<String>,
    pub plot_overview: Option<String>,
    pub runtime_minutes: Option<u32>,
    /// ISO-8601 release date (YYYY-MM-DD).
    pub release_date: Option<String>,
    pub genre_names: Option<Vec<String>>,
    pub user_rating: Option<f64>,
    pub critic_score: Option<u32>,
    pub us_rating: Option<String>,
    pub original_language: Option<String>,
    pub imdb_id: Option<String>,
    /// Related titles in provider order.
    pub similar_titles_ids: Option<Vec<TitleId>>,
    /// Streaming availability; only present when explicitly requested.
    pub sources: Option<Vec<TitleSource>>,
}

impl TitleDetail {
    /// A detail carrying only its identifier.
    pub fn stub(id: TitleId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Copy the baseline fields of a search result into a partial detail.
    pub fn from_search_result(result: &SearchResult) -> Self {
        Self {
            id: result.id,
            title: Some(result.name.clone()),
            kind: result.kind.clone(),
            year: result.year,
            tmdb_id: result.tmdb_id,
            tmdb_type: result.tmdb_type.clone(),
            poster: result.image_url.clone(),
            ..Self::default()
        }
    }
}

/// One place a title can be watched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleSource {
    pub source_id: u64,
    pub name: String,
    /// Offer type: `sub`, `rent`, `buy`, `free`, `tve`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub region: Option<String>,
    pub web_url: Option<String>,
    pub ios_url: Option<String>,
    pub android_url: Option<String>,
    /// Quality, e.g. `HD` or `4K`.
    pub format: Option<String>,
    pub price: Option<f64>,
    pub seasons: Option<u32>,
    pub episodes: Option<u32>,
}

// ---------------------------------------------------------------------------
// Networks
// ---------------------------------------------------------------------------

/// A TV network known to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: u64,
    pub name: String,
    pub origin_country: Option<String>,
    pub tmdb_id: Option<u64>,
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Async trait implemented by the external metadata backend.
///
/// Every call is a single attempt: implementations must not retry. Providers
/// are shared across requests behind an `Arc` and must be safe to call
/// concurrently.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"watchmode"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the provider has been configured with credentials.
    fn is_available(&self) -> bool;

    /// Search titles by name. Results are returned in provider order.
    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchResult>>;

    /// Fetch the complete record for one title. Streaming sources are only
    /// requested from the backend when `include_sources` is set.
    async fn get_detail(&self, id: TitleId, include_sources: bool) -> anyhow::Result<TitleDetail>;

    /// List every network the provider knows about.
    async fn list_networks(&self) -> anyhow::Result<Vec<Network>>;
}
