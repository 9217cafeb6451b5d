//! Checks run on a request before it reaches the schema.
//!
//! async-graphql walks fragment spreads once per use while validating, so a
//! document whose fragments spread each other twice over costs exponential
//! time there. Sizing the document here, with each fragment measured once,
//! turns such documents away in linear time.

use std::collections::HashMap;

use async_graphql::parser::types::{
    DocumentOperations, ExecutableDocument, OperationType, Selection, SelectionSet,
};
use async_graphql::{Pos, Request, ServerError};

use super::error::{
    request_error, with_code, OPERATION_NOT_SUPPORTED, OPERATION_RESOLUTION_FAILURE,
    PARSE_FAILED, VALIDATION_FAILED,
};

/// Parse `request` in place and reject it if it cannot run here or would
/// expand past `max_selections`.
pub fn preflight(request: &mut Request, max_selections: usize) -> Result<(), ServerError> {
    let operation_name = request.operation_name.clone();
    let document = request
        .parsed_query()
        .map_err(|e| with_code(e, PARSE_FAILED))?;

    check_operation(document, operation_name.as_deref())?;

    let mut sizer = Sizer::new(document, max_selections);
    for (name, fragment) in &document.fragments {
        sizer.fragment(name.as_str(), fragment.pos, &fragment.node.selection_set.node)?;
    }
    let mut total = 0usize;
    for (_, operation) in document.operations.iter() {
        total = total.saturating_add(sizer.selection_set(&operation.node.selection_set.node)?);
    }
    sizer.check(total)
}

fn check_operation(document: &ExecutableDocument, name: Option<&str>) -> Result<(), ServerError> {
    let unknown = |name: &str| {
        request_error(
            format!("Unknown operation named \"{name}\""),
            OPERATION_RESOLUTION_FAILURE,
        )
    };

    let operation = match (&document.operations, name) {
        (DocumentOperations::Single(operation), None) => operation,
        (DocumentOperations::Single(_), Some(name)) => return Err(unknown(name)),
        (DocumentOperations::Multiple(operations), Some(name)) => {
            operations.get(name).ok_or_else(|| unknown(name))?
        }
        (DocumentOperations::Multiple(operations), None) if operations.len() == 1 => operations
            .values()
            .next()
            .ok_or_else(|| unknown(""))?,
        (DocumentOperations::Multiple(_), None) => {
            return Err(request_error(
                "Operation name required in request.",
                OPERATION_RESOLUTION_FAILURE,
            ))
        }
    };

    if matches!(operation.node.ty, OperationType::Subscription) {
        return Err(request_error(
            "Subscriptions are not supported",
            OPERATION_NOT_SUPPORTED,
        ));
    }
    Ok(())
}

/// Counts the selections a document expands to. Each fragment's size is
/// computed once and reused at every spread.
struct Sizer<'d> {
    document: &'d ExecutableDocument,
    limit: usize,
    sizes: HashMap<&'d str, usize>,
    active: Vec<&'d str>,
}

impl<'d> Sizer<'d> {
    fn new(document: &'d ExecutableDocument, limit: usize) -> Self {
        Self {
            document,
            limit,
            sizes: HashMap::new(),
            active: Vec::new(),
        }
    }

    fn check(&self, size: usize) -> Result<(), ServerError> {
        if size > self.limit {
            return Err(request_error(
                format!("Query expands to more than {} selections", self.limit),
                VALIDATION_FAILED,
            ));
        }
        Ok(())
    }

    fn selection_set(&mut self, set: &'d SelectionSet) -> Result<usize, ServerError> {
        let mut size = 0usize;
        for item in &set.items {
            let nested = match &item.node {
                Selection::Field(field) => self.selection_set(&field.node.selection_set.node)?,
                Selection::InlineFragment(fragment) => {
                    self.selection_set(&fragment.node.selection_set.node)?
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    match self.document.fragments.get_key_value(name) {
                        Some((key, fragment)) => self.fragment(
                            key.as_str(),
                            spread.pos,
                            &fragment.node.selection_set.node,
                        )?,
                        // validation reports the unknown name
                        None => 0,
                    }
                }
            };
            size = size.saturating_add(1).saturating_add(nested);
        }
        self.check(size)?;
        Ok(size)
    }

    fn fragment(
        &mut self,
        name: &'d str,
        pos: Pos,
        set: &'d SelectionSet,
    ) -> Result<usize, ServerError> {
        if let Some(size) = self.sizes.get(name) {
            return Ok(*size);
        }
        if self.active.contains(&name) {
            let message = format!("Cannot spread fragment \"{name}\" within itself");
            return Err(with_code(
                ServerError::new(message, Some(pos)),
                VALIDATION_FAILED,
            ));
        }

        self.active.push(name);
        let size = self.selection_set(set);
        self.active.pop();
        let size = size?;
        self.sizes.insert(name, size);
        Ok(size)
    }
}
