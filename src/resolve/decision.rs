//! Choosing between local derivation and a remote fetch.

use super::selection::{contains_field_anywhere, count_fields_outside, FieldSelection};

/// Field that carries streaming availability; expensive for the provider.
pub const SOURCES_FIELD: &str = "sources";

/// A fixed set of field names.
#[derive(Debug, Clone, Copy)]
pub struct BaselineFieldSet {
    fields: &'static [&'static str],
}

impl BaselineFieldSet {
    pub const fn new(fields: &'static [&'static str]) -> Self {
        Self { fields }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| *field == name)
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }
}

/// Title fields producible from a search result without another fetch.
pub const BASELINE_FIELDS: BaselineFieldSet =
    BaselineFieldSet::new(&["id", "title", "type", "year", "tmdbId", "tmdbType", "poster"]);

/// How a title detail will be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Copy the baseline fields from data already in hand.
    LocalDerivation,
    /// Ask the provider for the complete record.
    RemoteFetch { include_sources: bool },
}

impl Strategy {
    pub fn needs_fetch(self) -> bool {
        matches!(self, Strategy::RemoteFetch { .. })
    }

    pub fn includes_sources(self) -> bool {
        matches!(self, Strategy::RemoteFetch { include_sources: true })
    }
}

/// Fetch only when something outside `baseline` was requested.
pub fn decide(selection: &FieldSelection, baseline: &BaselineFieldSet) -> Strategy {
    if count_fields_outside(selection, baseline) == 0 {
        Strategy::LocalDerivation
    } else {
        Strategy::RemoteFetch {
            include_sources: contains_field_anywhere(selection, SOURCES_FIELD),
        }
    }
}
