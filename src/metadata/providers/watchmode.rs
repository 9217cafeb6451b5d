//! WatchMode title-metadata provider.
//!
//! Implements [`MetadataProvider`] on top of the WatchMode v1 REST API.
//!
//! Features:
//! - Token-bucket rate limiting (configurable requests / second) via [`governor`].
//! - Per-request timeout.
//! - Exactly one HTTP attempt per call; failures surface to the caller.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::WatchmodeConfig;
use crate::metadata::provider::{
    MetadataProvider, Network, SearchResult, TitleDetail, TitleId, TitleSource,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// `search_type=2` restricts autocomplete results to titles (no people).
const SEARCH_TYPE_TITLES: &str = "2";

// ---------------------------------------------------------------------------
// WatchMode API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WmAutocompleteResponse {
    results: Vec<WmSearchResult>,
}

#[derive(Debug, Deserialize)]
struct WmSearchResult {
    id: u64,
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    year: Option<u16>,
    tmdb_id: Option<u64>,
    tmdb_type: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WmTitleDetail {
    id: u64,
    title: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    year: Option<u16>,
    tmdb_id: Option<u64>,
    tmdb_type: Option<String>,
    poster: Option<String>,
    plot_overview: Option<String>,
    runtime_minutes: Option<u32>,
    release_date: Option<String>,
    genre_names: Option<Vec<String>>,
    user_rating: Option<f64>,
    critic_score: Option<u32>,
    us_rating: Option<String>,
    original_language: Option<String>,
    imdb_id: Option<String>,
    similar_titles: Option<Vec<u64>>,
    sources: Option<Vec<WmSource>>,
}

#[derive(Debug, Deserialize)]
struct WmSource {
    source_id: u64,
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    region: Option<String>,
    web_url: Option<String>,
    ios_url: Option<String>,
    android_url: Option<String>,
    format: Option<String>,
    price: Option<f64>,
    seasons: Option<u32>,
    episodes: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WmNetwork {
    id: u64,
    name: String,
    origin_country: Option<String>,
    tmdb_id: Option<u64>,
}

impl From<WmSearchResult> for SearchResult {
    fn from(r: WmSearchResult) -> Self {
        SearchResult {
            id: TitleId::new(r.id),
            name: r.name,
            kind: r.kind,
            year: r.year,
            tmdb_id: r.tmdb_id,
            tmdb_type: r.tmdb_type,
            image_url: r.image_url,
        }
    }
}

impl From<WmSource> for TitleSource {
    fn from(s: WmSource) -> Self {
        TitleSource {
            source_id: s.source_id,
            name: s.name,
            kind: s.kind,
            region: s.region,
            web_url: s.web_url,
            ios_url: s.ios_url,
            android_url: s.android_url,
            format: s.format,
            price: s.price,
            seasons: s.seasons,
            episodes: s.episodes,
        }
    }
}

impl From<WmNetwork> for Network {
    fn from(n: WmNetwork) -> Self {
        Network {
            id: n.id,
            name: n.name,
            origin_country: n.origin_country,
            tmdb_id: n.tmdb_id,
        }
    }
}

/// Convert a details payload into a complete [`TitleDetail`].
///
/// A complete record always carries its related-title list (possibly empty).
/// Sources are only claimed when they were asked for.
fn into_detail(d: WmTitleDetail, include_sources: bool) -> TitleDetail {
    TitleDetail {
        id: TitleId::new(d.id),
        title: d.title,
        kind: d.kind,
        year: d.year,
        tmdb_id: d.tmdb_id,
        tmdb_type: d.tmdb_type,
        poster: d.poster,
        plot_overview: d.plot_overview,
        runtime_minutes: d.runtime_minutes,
        release_date: d.release_date,
        genre_names: d.genre_names,
        user_rating: d.user_rating,
        critic_score: d.critic_score,
        us_rating: d.us_rating,
        original_language: d.original_language,
        imdb_id: d.imdb_id,
        similar_titles_ids: Some(
            d.similar_titles
                .unwrap_or_default()
                .into_iter()
                .map(TitleId::new)
                .collect(),
        ),
        sources: include_sources.then(|| {
            d.sources
                .unwrap_or_default()
                .into_iter()
                .map(TitleSource::from)
                .collect()
        }),
    }
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// WatchMode metadata provider.
///
/// # Examples
///
/// ```no_run
/// use wishlist::config::WatchmodeConfig;
/// use wishlist::metadata::providers::WatchmodeProvider;
///
/// let config = WatchmodeConfig {
///     api_key: "your-api-key".into(),
///     ..WatchmodeConfig::default()
/// };
/// let provider = WatchmodeProvider::from_config(&config).unwrap();
/// ```
pub struct WatchmodeProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl WatchmodeProvider {
    /// Build a provider from the `[watchmode]` configuration section.
    pub fn from_config(config: &WatchmodeConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build WatchMode HTTP client")?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    /// Issue one rate-limited GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> anyhow::Result<T> {
        if !self.is_available() {
            anyhow::bail!("WatchMode API key is not configured");
        }

        self.rate_limiter.until_ready().await;

        let url = format!("{}{path}", self.base_url);
        debug!(path, "WatchMode request");

        self.client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .with_context(|| format!("WatchMode request failed: {path}"))?
            .error_for_status()
            .with_context(|| format!("WatchMode request returned error: {path}"))?
            .json()
            .await
            .with_context(|| format!("failed to parse WatchMode response: {path}"))
    }
}

#[async_trait]
impl MetadataProvider for WatchmodeProvider {
    fn name(&self) -> &'static str {
        "watchmode"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchResult>> {
        let body: WmAutocompleteResponse = self
            .get_json(
                "/autocomplete-search/",
                &[("search_value", query), ("search_type", SEARCH_TYPE_TITLES)],
            )
            .await?;

        Ok(body.results.into_iter().map(SearchResult::from).collect())
    }

    async fn get_detail(&self, id: TitleId, include_sources: bool) -> anyhow::Result<TitleDetail> {
        let path = format!("/title/{id}/details/");
        let params: &[(&str, &str)] = if include_sources {
            &[("append_to_response", "sources")]
        } else {
            &[]
        };

        let body: WmTitleDetail = self.get_json(&path, params).await?;
        Ok(into_detail(body, include_sources))
    }

    async fn list_networks(&self) -> anyhow::Result<Vec<Network>> {
        let body: Vec<WmNetwork> = self.get_json("/networks/", &[]).await?;
        Ok(body.into_iter().map(Network::from).collect())
    }
}
