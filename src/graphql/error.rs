//! Error codes reported under `extensions.code`, and the schema extension
//! that attaches them to errors async-graphql raises on its own.

use std::sync::Arc;

use async_graphql::extensions::{
    Extension, ExtensionContext, ExtensionFactory, NextResolve, NextValidation, ResolveInfo,
};
use async_graphql::{
    Context, ErrorExtensions, PathSegment, QueryPathNode, QueryPathSegment, ServerError,
    ServerResult, ValidationResult, Value,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::resolve::ResolveError;

pub const PARSE_FAILED: &str = "GRAPHQL_PARSE_FAILED";
pub const VALIDATION_FAILED: &str = "GRAPHQL_VALIDATION_FAILED";
pub const OPERATION_RESOLUTION_FAILURE: &str = "OPERATION_RESOLUTION_FAILURE";
pub const OPERATION_NOT_SUPPORTED: &str = "OPERATION_NOT_SUPPORTED";
pub const TIMEOUT: &str = "TIMEOUT";

impl ErrorExtensions for ResolveError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

/// Attach `code` unless the error already carries one.
pub fn with_code(mut error: ServerError, code: &'static str) -> ServerError {
    let extensions = error.extensions.get_or_insert_with(Default::default);
    if extensions.get("code").is_none() {
        extensions.set("code", code);
    }
    error
}

/// A request-level error with no location.
pub fn request_error(message: impl Into<String>, code: &'static str) -> ServerError {
    with_code(ServerError::new(message, None), code)
}

/// Log a field failure at a level matching its cause.
pub fn log_failure(ctx: &Context<'_>, err: &ResolveError) {
    let field = ctx.item.node.name.node.as_str();
    match err {
        ResolveError::UpstreamFetch { .. } | ResolveError::Storage(_) => {
            warn!(field, code = err.code(), error = %err, "Field resolution failed")
        }
        _ => debug!(field, code = err.code(), error = %err, "Field rejected"),
    }
}

/// Record a failed field on the response and hand back `None`, so the field
/// reads as `null` while its siblings keep their values.
pub fn record_field_error<T>(ctx: &Context<'_>, result: Result<T, ResolveError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log_failure(ctx, &err);
            ctx.add_error(ctx.set_error_path(err.extend().into_server_error(ctx.item.pos)));
            None
        }
    }
}

fn path_of(node: &QueryPathNode<'_>) -> Vec<PathSegment> {
    let mut path = Vec::new();
    let mut current = Some(node);
    while let Some(node) = current {
        path.push(match node.segment {
            QueryPathSegment::Name(name) => PathSegment::Field(name.to_string()),
            QueryPathSegment::Index(index) => PathSegment::Index(index),
        });
        current = node.parent;
    }
    path.reverse();
    path
}

/// Tags validation failures with [`VALIDATION_FAILED`] and gives field
/// errors that escape their resolver a response path.
pub struct ErrorReporting;

impl ExtensionFactory for ErrorReporting {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(ErrorReportingExtension)
    }
}

struct ErrorReportingExtension;

#[async_trait]
impl Extension for ErrorReportingExtension {
    async fn validation(
        &self,
        ctx: &ExtensionContext<'_>,
        next: NextValidation<'_>,
    ) -> Result<ValidationResult, Vec<ServerError>> {
        next.run(ctx).await.map_err(|errors| {
            debug!(count = errors.len(), "GraphQL document failed validation");
            errors
                .into_iter()
                .map(|error| with_code(error, VALIDATION_FAILED))
                .collect()
        })
    }

    async fn resolve(
        &self,
        ctx: &ExtensionContext<'_>,
        info: ResolveInfo<'_>,
        next: NextResolve<'_>,
    ) -> ServerResult<Option<Value>> {
        let path_node = info.path_node;
        next.run(ctx, info).await.map_err(|mut error| {
            if error.path.is_empty() {
                error.path = path_of(path_node);
            }
            error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_code_becomes_extension() {
        let err = ResolveError::invalid_argument("title id 'x' is not a number").extend();
        let server = err.into_server_error(async_graphql::Pos::default());
        let json = serde_json::to_value(&server).unwrap();

        assert_eq!(json["extensions"]["code"], "INVALID_ARGUMENT");
        assert!(json["message"].as_str().unwrap().contains("not a number"));
    }

    #[test]
    fn existing_code_is_kept() {
        let error = with_code(request_error("late", TIMEOUT), VALIDATION_FAILED);
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["extensions"]["code"], TIMEOUT);
    }

    #[test]
    fn path_lists_fields_and_indexes_from_the_root() {
        let root = QueryPathNode {
            parent: None,
            segment: QueryPathSegment::Name("titleDetail"),
        };
        let list = QueryPathNode {
            parent: Some(&root),
            segment: QueryPathSegment::Name("similarTitles"),
        };
        let item = QueryPathNode {
            parent: Some(&list),
            segment: QueryPathSegment::Index(2),
        };

        assert_eq!(
            path_of(&item),
            vec![
                PathSegment::Field("titleDetail".into()),
                PathSegment::Field("similarTitles".into()),
                PathSegment::Index(2),
            ]
        );
    }
}
