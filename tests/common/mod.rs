//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires an in-memory database and a
//! [`FakeProvider`] into a full GraphQL service and router. The fake provider
//! records every call so tests can assert on exactly how many remote
//! round-trips a query cost.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

use wishlist::config::Config;
use wishlist::graphql::GraphqlService;
use wishlist::metadata::{
    MetadataProvider, Network, SearchResult, TitleDetail, TitleId, TitleSource,
};
use wishlist::server::{create_router, AppContext};
use wishlist::services::{ExecutionSettings, Services};
use wishlist_db::pool::{init_memory_pool, DbPool};

/// One call received by [`FakeProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Search(String),
    Detail { id: u64, include_sources: bool },
    Networks,
}

/// Scriptable in-process metadata provider.
#[derive(Default)]
pub struct FakeProvider {
    search_results: Vec<SearchResult>,
    similar: HashMap<u64, Vec<u64>>,
    failing: HashSet<u64>,
    delays: HashMap<u64, Duration>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_results(mut self, results: Vec<SearchResult>) -> Self {
        self.search_results = results;
        self
    }

    pub fn with_similar(mut self, id: u64, similar: &[u64]) -> Self {
        self.similar.insert(id, similar.to_vec());
        self
    }

    pub fn failing_on(mut self, id: u64) -> Self {
        self.failing.insert(id);
        self
    }

    pub fn with_delay(mut self, id: u64, delay: Duration) -> Self {
        self.delays.insert(id, delay);
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().clone()
    }

    pub fn detail_calls(&self) -> Vec<(u64, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::Detail {
                    id,
                    include_sources,
                } => Some((id, include_sources)),
                _ => None,
            })
            .collect()
    }
}

/// Search result fixture with every baseline field populated.
pub fn search_result(id: u64, name: &str) -> SearchResult {
    SearchResult {
        id: TitleId::new(id),
        name: name.to_string(),
        kind: Some("movie".into()),
        year: Some(1989),
        tmdb_id: Some(id + 1000),
        tmdb_type: Some("movie".into()),
        image_url: Some(format!("https://img.example/{id}.jpg")),
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchResult>> {
        self.calls.lock().push(ProviderCall::Search(query.to_string()));
        Ok(self.search_results.clone())
    }

    async fn get_detail(&self, id: TitleId, include_sources: bool) -> anyhow::Result<TitleDetail> {
        self.calls.lock().push(ProviderCall::Detail {
            id: id.get(),
            include_sources,
        });

        if let Some(delay) = self.delays.get(&id.get()) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&id.get()) {
            anyhow::bail!("503 Service Unavailable");
        }

        Ok(TitleDetail {
            id,
            title: Some(format!("Title {id}")),
            kind: Some("movie".into()),
            plot_overview: Some(format!("Plot of {id}")),
            similar_titles_ids: Some(
                self.similar
                    .get(&id.get())
                    .map(|ids| ids.iter().copied().map(TitleId::new).collect())
                    .unwrap_or_default(),
            ),
            sources: include_sources.then(|| {
                vec![TitleSource {
                    source_id: 203,
                    name: "Netflix".into(),
                    kind: Some("sub".into()),
                    region: Some("US".into()),
                    web_url: Some(format!("https://netflix.example/{id}")),
                    ios_url: None,
                    android_url: None,
                    format: Some("HD".into()),
                    price: None,
                    seasons: None,
                    episodes: None,
                }]
            }),
            ..TitleDetail::default()
        })
    }

    async fn list_networks(&self) -> anyhow::Result<Vec<Network>> {
        self.calls.lock().push(ProviderCall::Networks);
        Ok(vec![
            Network {
                id: 1,
                name: "HBO".into(),
                origin_country: Some("US".into()),
                tmdb_id: Some(49),
            },
            Network {
                id: 2,
                name: "BBC One".into(),
                origin_country: Some("GB".into()),
                tmdb_id: Some(4),
            },
        ])
    }
}

/// Fully wired GraphQL service and router over an in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub provider: Arc<FakeProvider>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_provider(FakeProvider::new())
    }

    pub fn with_provider(provider: FakeProvider) -> Self {
        Self::with_config(Config::default(), provider)
    }

    pub fn with_config(config: Config, provider: FakeProvider) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let provider = Arc::new(provider);
        let shared: Arc<dyn MetadataProvider> = provider.clone();

        let services = Services::new(db.clone(), shared, ExecutionSettings::from(&config.graphql));
        let graphql = GraphqlService::new(Arc::new(services), &config.graphql)
            .expect("schema builds");

        let ctx = AppContext {
            config: Arc::new(config),
            graphql,
        };

        Self { ctx, db, provider }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    /// Execute `query` directly and return the serialized response.
    pub async fn query(&self, query: &str) -> Value {
        self.execute(async_graphql::Request::new(query)).await
    }

    pub async fn execute(&self, request: async_graphql::Request) -> Value {
        let response = self.ctx.graphql.execute(request).await;
        serde_json::to_value(response).expect("response serializes")
    }

    /// POST a GraphQL body through the router.
    pub async fn post_graphql(&self, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(self.router(), request).await
    }
}

/// Send one request and decode the JSON body (or `Value::Null` if the body
/// is not JSON).
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = body_to_string(response.into_body()).await;
    (status, serde_json::from_str(&body).unwrap_or(Value::Null))
}

/// Helper to get response body as string
pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Error codes of a serialized response, in order.
pub fn error_codes(response: &Value) -> Vec<String> {
    response["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["extensions"]["code"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
