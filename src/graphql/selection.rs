//! Lowering the field being resolved into the [`FieldSelection`] handed to
//! the resolution functions.
//!
//! async-graphql has already inlined fragments and dropped `@skip`/`@include`
//! fields by the time a resolver runs, and validation has bounded the depth,
//! so this is a plain walk.

use async_graphql::{Context, SelectionField, ServerError, ServerResult};
use serde_json::Map;

use crate::resolve::{FieldSelection, SelectedField};

/// Selection made on the field `ctx` is resolving.
pub fn current_selection(ctx: &Context<'_>) -> ServerResult<FieldSelection> {
    children(ctx.field())
}

fn children(field: SelectionField<'_>) -> ServerResult<FieldSelection> {
    let mut selection = FieldSelection::default();
    for child in field.selection_set() {
        selection.insert(lower(child)?);
    }
    Ok(selection)
}

fn lower(field: SelectionField<'_>) -> ServerResult<SelectedField> {
    let mut arguments = Map::new();
    for (name, value) in field.arguments()? {
        let json = value
            .into_json()
            .map_err(|e| ServerError::new(format!("argument `{name}`: {e}"), None))?;
        arguments.insert(name.to_string(), json);
    }

    Ok(SelectedField {
        name: field.name().to_string(),
        alias: field.alias().map(str::to_string),
        arguments,
        selection: children(field)?,
    })
}
