use axum::http::Method;
use axum::{Router, middleware, routing::get};
use std::error::Error;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::ApiToken;
use crate::handler::AppState;

pub mod auth;
pub mod bookmarks;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod model;
pub mod sanitize;
pub mod store;
pub mod validate;

pub const API_PREFIX: &str = "/api";

/// The complete service: auth gate, `/api` bookmark routes, fallback, CORS and access logs.
pub fn app(state: AppState, token: ApiToken) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handler::healthcheck))
        .nest(API_PREFIX, bookmarks::routes())
        .fallback(handler::not_found)
        .layer(middleware::from_fn_with_state(token, auth::require_bearer_token))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}
