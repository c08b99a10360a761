use std::sync::Arc;

use axum::response::IntoResponse;
use tracing::info;

use crate::config::Environment;
use crate::error::{ApiError, StoreError};
use crate::store::BookmarkStore;
use crate::validate::BookmarkValidator;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookmarkStore>,
    pub validator: BookmarkValidator,
    pub environment: Environment,
}

impl AppState {
    pub fn new(store: Arc<dyn BookmarkStore>, validator: BookmarkValidator, environment: Environment) -> Self {
        Self {
            store,
            validator,
            environment,
        }
    }

    pub fn store_error(&self, err: StoreError) -> ApiError {
        ApiError::from_store(err, self.environment)
    }
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    "Hello, world!"
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
