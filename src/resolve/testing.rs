//! Provider double for unit tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::metadata::{MetadataProvider, Network, SearchResult, TitleDetail, TitleId, TitleSource};

/// Answers every detail call with a synthetic record and remembers each
/// `(id, include_sources)` it was asked for.
#[derive(Default)]
pub(crate) struct RecordingProvider {
    similar: HashMap<u64, Vec<u64>>,
    failing: HashSet<u64>,
    delayed: HashSet<u64>,
    search_results: Vec<SearchResult>,
    detail_calls: Mutex<Vec<(TitleId, bool)>>,
    search_calls: Mutex<Vec<String>>,
}

impl RecordingProvider {
    pub(crate) fn with_similar(mut self, id: u64, similar: &[u64]) -> Self {
        self.similar.insert(id, similar.to_vec());
        self
    }

    pub(crate) fn failing_on(mut self, id: u64) -> Self {
        self.failing.insert(id);
        self
    }

    /// Make fetches of `id` slow so later ids finish first.
    pub(crate) fn with_delay_for(mut self, id: u64) -> Self {
        self.delayed.insert(id);
        self
    }

    pub(crate) fn with_search_results(mut self, results: Vec<SearchResult>) -> Self {
        self.search_results = results;
        self
    }

    pub(crate) fn detail_calls(&self) -> Vec<(TitleId, bool)> {
        self.detail_calls.lock().clone()
    }

    pub(crate) fn search_calls(&self) -> Vec<String> {
        self.search_calls.lock().clone()
    }
}

#[async_trait]
impl MetadataProvider for RecordingProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchResult>> {
        self.search_calls.lock().push(query.to_string());
        Ok(self.search_results.clone())
    }

    async fn get_detail(&self, id: TitleId, include_sources: bool) -> anyhow::Result<TitleDetail> {
        self.detail_calls.lock().push((id, include_sources));

        if self.delayed.contains(&id.get()) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        if self.failing.contains(&id.get()) {
            anyhow::bail!("provider returned 503 for title {id}");
        }

        Ok(TitleDetail {
            id,
            title: Some(format!("Title {id}")),
            plot_overview: Some(format!("Overview of {id}")),
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
                    web_url: None,
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
        Ok(vec![Network {
            id: 1,
            name: "HBO".into(),
            origin_country: Some("US".into()),
            tmdb_id: Some(49),
        }])
    }
}
