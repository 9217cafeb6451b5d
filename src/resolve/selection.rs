//! Requested-field trees and the pure functions that inspect them.
//!
//! A [`FieldSelection`] is the shape a caller asked for on one object: the
//! fields at that level, each with its own nested selection. The transport
//! builds it once per request; everything in here only reads it.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::decision::BaselineFieldSet;

/// Introspection field that every object can answer without data.
pub const TYPENAME_FIELD: &str = "__typename";

/// One requested field with its arguments and nested selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedField {
    pub name: String,
    pub alias: Option<String>,
    /// Arguments with variables already substituted.
    pub arguments: Map<String, Value>,
    pub selection: FieldSelection,
}

impl SelectedField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            arguments: Map::new(),
            selection: FieldSelection::default(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn with_selection(mut self, selection: FieldSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Key under which this field's value appears in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Same response key, same field, same arguments.
    fn merges_with(&self, other: &SelectedField) -> bool {
        self.response_key() == other.response_key()
            && self.name == other.name
            && self.arguments == other.arguments
    }
}

/// The fields requested on one object, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSelection {
    fields: Vec<SelectedField>,
}

impl FieldSelection {
    pub fn new(fields: Vec<SelectedField>) -> Self {
        let mut selection = Self::default();
        for field in fields {
            selection.insert(field);
        }
        selection
    }

    /// Selection of plain leaf fields, handy for building requests by hand.
    pub fn leaves<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(names.into_iter().map(SelectedField::new).collect())
    }

    pub fn fields(&self) -> &[SelectedField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Add a field, merging it into an earlier identical field (same response
    /// key, name and arguments) by unioning their nested selections. A field
    /// that only shares the response key is kept as its own entry.
    pub fn insert(&mut self, field: SelectedField) {
        match self
            .fields
            .iter_mut()
            .find(|existing| existing.merges_with(&field))
        {
            Some(existing) => {
                for nested in field.selection.fields {
                    existing.selection.insert(nested);
                }
            }
            None => self.fields.push(field),
        }
    }
}

/// Distinct field names requested at this object's level.
pub fn requested_top_level_fields(selection: &FieldSelection) -> BTreeSet<&str> {
    selection.fields().iter().map(|f| f.name.as_str()).collect()
}

/// Whether `field_name` is requested at any depth below this object.
pub fn contains_field_anywhere(selection: &FieldSelection, field_name: &str) -> bool {
    selection
        .fields()
        .iter()
        .any(|f| f.name == field_name || contains_field_anywhere(&f.selection, field_name))
}

/// Number of distinct top-level field names not covered by `baseline`.
/// `__typename` never counts.
pub fn count_fields_outside(selection: &FieldSelection, baseline: &BaselineFieldSet) -> usize {
    requested_top_level_fields(selection)
        .into_iter()
        .filter(|name| *name != TYPENAME_FIELD && !baseline.contains(name))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::decision::BASELINE_FIELDS;

    fn nested_sources() -> FieldSelection {
        FieldSelection::new(vec![
            SelectedField::new("id"),
            SelectedField::new("similarTitles").with_selection(FieldSelection::new(vec![
                SelectedField::new("title"),
                SelectedField::new("sources").with_selection(FieldSelection::leaves(["name"])),
            ])),
        ])
    }

    #[test]
    fn top_level_fields_ignore_nesting() {
        let selection = nested_sources();
        let fields = requested_top_level_fields(&selection);
        assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec!["id", "similarTitles"]);
    }

    #[test]
    fn contains_anywhere_finds_nested_field() {
        let selection = nested_sources();
        assert!(contains_field_anywhere(&selection, "sources"));
        assert!(contains_field_anywhere(&selection, "name"));
        assert!(!contains_field_anywhere(&selection, "poster"));
    }

    #[test]
    fn count_outside_baseline() {
        let selection = FieldSelection::leaves(["id", "title", "plotOverview", "sources"]);
        assert_eq!(count_fields_outside(&selection, &BASELINE_FIELDS), 2);
    }

    #[test]
    fn count_outside_ignores_typename_and_duplicates() {
        let selection = FieldSelection::new(vec![
            SelectedField::new("__typename"),
            SelectedField::new("runtimeMinutes").with_alias("a"),
            SelectedField::new("runtimeMinutes").with_alias("b"),
        ]);
        assert_eq!(count_fields_outside(&selection, &BASELINE_FIELDS), 1);
    }

    #[test]
    fn empty_selection_has_nothing_outside() {
        let selection = FieldSelection::default();
        assert!(requested_top_level_fields(&selection).is_empty());
        assert_eq!(count_fields_outside(&selection, &BASELINE_FIELDS), 0);
        assert!(!contains_field_anywhere(&selection, "sources"));
    }

    #[test]
    fn insert_merges_same_response_key() {
        let mut selection = FieldSelection::default();
        selection.insert(
            SelectedField::new("similarTitles").with_selection(FieldSelection::leaves(["id"])),
        );
        selection.insert(
            SelectedField::new("similarTitles").with_selection(FieldSelection::leaves(["title"])),
        );

        assert_eq!(selection.fields().len(), 1);
        let nested = requested_top_level_fields(&selection.fields()[0].selection);
        assert_eq!(nested.into_iter().collect::<Vec<_>>(), vec!["id", "title"]);
    }

    #[test]
    fn same_key_with_different_arguments_is_not_merged() {
        let mut selection = FieldSelection::default();
        selection.insert(
            SelectedField::new("titleDetail")
                .with_alias("t")
                .with_argument("id", Value::from("1"))
                .with_selection(FieldSelection::leaves(["id"])),
        );
        selection.insert(
            SelectedField::new("titleDetail")
                .with_alias("t")
                .with_argument("id", Value::from("2"))
                .with_selection(FieldSelection::leaves(["title"])),
        );

        assert_eq!(selection.fields().len(), 2);
        assert_eq!(selection.fields()[1].arguments["id"], "2");
        assert_eq!(
            requested_top_level_fields(&selection.fields()[0].selection)
                .into_iter()
                .collect::<Vec<_>>(),
            vec!["id"]
        );
    }

    #[test]
    fn same_key_with_different_names_is_not_merged() {
        let mut selection = FieldSelection::default();
        selection.insert(SelectedField::new("title").with_alias("x"));
        selection.insert(SelectedField::new("poster").with_alias("x"));

        let names = requested_top_level_fields(&selection);
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["poster", "title"]);
    }

    #[test]
    fn aliases_keep_fields_apart() {
        let selection = FieldSelection::new(vec![
            SelectedField::new("title").with_alias("primary"),
            SelectedField::new("title"),
        ]);
        assert_eq!(selection.fields().len(), 2);
        assert_eq!(selection.fields()[0].response_key(), "primary");
    }
}
