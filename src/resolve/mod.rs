//! Selection-aware title resolution.
//!
//! Given the exact fields a caller asked for on a title, decide whether the
//! result can be produced from data already in hand or needs the external
//! provider, and expand related-title lists with the fewest provider calls
//! that still answer the request.
//!
//! - [`selection`] -- Requested-field trees and the pure analyzer functions.
//! - [`decision`] -- Baseline field set and the local/remote decision.
//! - [`detail`] -- Title detail resolution.
//! - [`similar`] -- Related-titles expansion (stub path or fan-out).
//! - [`error`] -- Field-level error type.

pub mod decision;
pub mod detail;
pub mod error;
pub mod selection;
pub mod similar;

#[cfg(test)]
pub(crate) mod testing;

pub use decision::{decide, BaselineFieldSet, Strategy, BASELINE_FIELDS, SOURCES_FIELD};
pub use detail::{fetch_detail, resolve_detail, resolve_detail_by_id};
pub use error::{ResolveError, ResolveResult};
pub use selection::{
    contains_field_anywhere, count_fields_outside, requested_top_level_fields, FieldSelection,
    SelectedField, TYPENAME_FIELD,
};
pub use similar::{plan_similar, resolve_similar_titles, SimilarPlan};
