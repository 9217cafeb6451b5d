//! Entry point for running one GraphQL request.

use std::sync::Arc;

use async_graphql::dynamic::{Schema, SchemaError};
use async_graphql::{Request, Response};
use tracing::debug;

use super::preflight::preflight;
use super::schema::build_schema;
use crate::config::GraphqlConfig;
use crate::services::Services;

/// The executable schema and the services its resolvers call.
#[derive(Clone)]
pub struct GraphqlService {
    schema: Schema,
    services: Arc<Services>,
    max_complexity: usize,
}

impl GraphqlService {
    pub fn new(services: Arc<Services>, config: &GraphqlConfig) -> Result<Self, SchemaError> {
        Ok(Self {
            schema: build_schema(services.clone(), config)?,
            services,
            max_complexity: config.max_complexity,
        })
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Check, parse and execute a request.
    pub async fn execute(&self, mut request: Request) -> Response {
        if let Err(error) = preflight(&mut request, self.max_complexity) {
            debug!(error = %error.message, "Rejected GraphQL request");
            return Response::from_errors(vec![error]);
        }
        self.schema.execute(request).await
    }
}
