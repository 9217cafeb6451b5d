//! Expanding a title's related-id list into title details.
//!
//! When the caller asks for nothing but identifiers the list is answered from
//! the ids themselves. Anything broader costs one provider call per related
//! id; those calls may overlap but results always come back in list order.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use super::decision::SOURCES_FIELD;
use super::detail::fetch_detail;
use super::error::ResolveResult;
use super::selection::{contains_field_anywhere, FieldSelection, TYPENAME_FIELD};
use crate::metadata::{MetadataProvider, TitleDetail, TitleId};

const ID_FIELD: &str = "id";

/// How a related-titles list will be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarPlan {
    /// Identifier-only details, no provider calls.
    Stub,
    /// One detail fetch per id, all sharing the same sources flag.
    FullFetch { include_sources: bool },
}

/// Pick the plan for the selection made on each child.
///
/// Only a selection of exactly `id` (optionally with `__typename`) takes the
/// stub path. A selection left empty, e.g. by `@skip`, fetches.
pub fn plan_similar(child_selection: &FieldSelection) -> SimilarPlan {
    let mut data_fields = child_selection
        .fields()
        .iter()
        .filter(|f| f.name != TYPENAME_FIELD)
        .peekable();
    let only_identifier = data_fields.peek().is_some()
        && data_fields.all(|f| f.name == ID_FIELD && f.selection.is_empty());

    if only_identifier {
        SimilarPlan::Stub
    } else {
        SimilarPlan::FullFetch {
            include_sources: contains_field_anywhere(child_selection, SOURCES_FIELD),
        }
    }
}

/// Resolve `ids` into details shaped for `child_selection`.
///
/// At most `concurrency` fetches are in flight (`1` means strictly
/// sequential). The first failure aborts the whole list; dropping the
/// remaining stream cancels fetches still in flight.
pub async fn resolve_similar_titles(
    provider: &dyn MetadataProvider,
    ids: &[TitleId],
    child_selection: &FieldSelection,
    concurrency: usize,
) -> ResolveResult<Vec<TitleDetail>> {
    match plan_similar(child_selection) {
        SimilarPlan::Stub => {
            debug!(count = ids.len(), "Building similar-title stubs");
            Ok(ids.iter().copied().map(TitleDetail::stub).collect())
        }
        SimilarPlan::FullFetch { include_sources } => {
            debug!(
                count = ids.len(),
                include_sources, concurrency, "Fetching similar titles"
            );
            stream::iter(ids.iter().copied())
                .map(|id| fetch_detail(provider, id, include_sources))
                .buffered(concurrency.max(1))
                .try_collect()
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::error::ResolveError;
    use crate::resolve::selection::SelectedField;
    use crate::resolve::testing::RecordingProvider;

    fn ids(raw: &[u64]) -> Vec<TitleId> {
        raw.iter().copied().map(TitleId::new).collect()
    }

    #[test]
    fn plan_for_id_only() {
        assert_eq!(plan_similar(&FieldSelection::leaves(["id"])), SimilarPlan::Stub);
        assert_eq!(
            plan_similar(&FieldSelection::leaves(["id", "__typename"])),
            SimilarPlan::Stub
        );
    }

    #[test]
    fn plan_for_empty_selection_fetches() {
        assert_eq!(
            plan_similar(&FieldSelection::default()),
            SimilarPlan::FullFetch {
                include_sources: false
            }
        );
        assert_eq!(
            plan_similar(&FieldSelection::leaves(["__typename"])),
            SimilarPlan::FullFetch {
                include_sources: false
            }
        );
    }

    #[test]
    fn plan_for_broader_selection() {
        assert_eq!(
            plan_similar(&FieldSelection::leaves(["id", "title"])),
            SimilarPlan::FullFetch {
                include_sources: false
            }
        );
        assert_eq!(
            plan_similar(&FieldSelection::new(vec![SelectedField::new("similarTitles")
                .with_selection(FieldSelection::new(vec![
                    SelectedField::new("sources").with_selection(FieldSelection::leaves(["name"]))
                ]))])),
            SimilarPlan::FullFetch {
                include_sources: true
            }
        );
    }

    #[tokio::test]
    async fn stub_path_preserves_order_without_calls() {
        let provider = RecordingProvider::default();
        let input = ids(&[30, 10, 20, 10]);

        let details =
            resolve_similar_titles(&provider, &input, &FieldSelection::leaves(["id"]), 4)
                .await
                .unwrap();

        assert_eq!(details.iter().map(|d| d.id).collect::<Vec<_>>(), input);
        assert!(details.iter().all(|d| d.title.is_none() && d.sources.is_none()));
        assert!(provider.detail_calls().is_empty());
    }

    #[tokio::test]
    async fn full_fetch_one_call_per_id_in_order() {
        let provider = RecordingProvider::default().with_delay_for(30);
        let input = ids(&[30, 10, 20, 10]);
        let selection = FieldSelection::leaves(["id", "title"]);

        let details = resolve_similar_titles(&provider, &input, &selection, 4)
            .await
            .unwrap();

        assert_eq!(details.iter().map(|d| d.id).collect::<Vec<_>>(), input);
        let mut calls = provider.detail_calls();
        assert_eq!(calls.len(), 4);
        assert!(calls.iter().all(|(_, sources)| !sources));
        calls.sort();
        assert_eq!(
            calls.into_iter().map(|(id, _)| id).collect::<Vec<_>>(),
            ids(&[10, 10, 20, 30])
        );
    }

    #[tokio::test]
    async fn sequential_fan_out_issues_calls_in_order() {
        let provider = RecordingProvider::default();
        let input = ids(&[3, 1, 2]);
        let selection = FieldSelection::new(vec![
            SelectedField::new("sources").with_selection(FieldSelection::leaves(["name"])),
        ]);

        resolve_similar_titles(&provider, &input, &selection, 1)
            .await
            .unwrap();

        assert_eq!(
            provider.detail_calls(),
            vec![
                (TitleId::new(3), true),
                (TitleId::new(1), true),
                (TitleId::new(2), true)
            ]
        );
    }

    #[tokio::test]
    async fn one_failure_aborts_the_list() {
        let provider = RecordingProvider::default().failing_on(2);
        let input = ids(&[1, 2, 3]);

        let err = resolve_similar_titles(&provider, &input, &FieldSelection::leaves(["title"]), 1)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::UpstreamFetch { ref target, .. } if target == "title 2"));
        // Sequential execution stops at the failing id.
        assert_eq!(
            provider.detail_calls(),
            vec![(TitleId::new(1), false), (TitleId::new(2), false)]
        );
    }

    #[tokio::test]
    async fn empty_id_list() {
        let provider = RecordingProvider::default();
        let details = resolve_similar_titles(&provider, &[], &FieldSelection::leaves(["title"]), 4)
            .await
            .unwrap();
        assert!(details.is_empty());
        assert!(provider.detail_calls().is_empty());
    }
}
