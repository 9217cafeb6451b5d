//! Producing a full title detail, locally or from the provider.

use tracing::debug;

use super::decision::{decide, Strategy, BASELINE_FIELDS, SOURCES_FIELD};
use super::error::{ResolveError, ResolveResult};
use super::selection::{contains_field_anywhere, FieldSelection};
use crate::metadata::{MetadataProvider, SearchResult, TitleDetail, TitleId};

/// Resolve the detail behind a search result for the requested shape.
///
/// Selections within the baseline are answered from `result` with no I/O.
pub async fn resolve_detail(
    provider: &dyn MetadataProvider,
    result: &SearchResult,
    selection: &FieldSelection,
) -> ResolveResult<TitleDetail> {
    let strategy = decide(selection, &BASELINE_FIELDS);
    debug!(title_id = %result.id, ?strategy, "Resolving title detail");

    match strategy {
        Strategy::LocalDerivation => Ok(TitleDetail::from_search_result(result)),
        Strategy::RemoteFetch { include_sources } => {
            fetch_detail(provider, result.id, include_sources).await
        }
    }
}

/// Resolve a detail entered by bare identifier. There is nothing to derive
/// from, so this always fetches.
pub async fn resolve_detail_by_id(
    provider: &dyn MetadataProvider,
    id: TitleId,
    selection: &FieldSelection,
) -> ResolveResult<TitleDetail> {
    let include_sources = contains_field_anywhere(selection, SOURCES_FIELD);
    fetch_detail(provider, id, include_sources).await
}

/// One provider detail call; failures become [`ResolveError::UpstreamFetch`]
/// naming the title.
pub async fn fetch_detail(
    provider: &dyn MetadataProvider,
    id: TitleId,
    include_sources: bool,
) -> ResolveResult<TitleDetail> {
    debug!(title_id = %id, include_sources, "Fetching title detail");

    provider
        .get_detail(id, include_sources)
        .await
        .map_err(|e| ResolveError::upstream(format!("title {id}"), e))
}
