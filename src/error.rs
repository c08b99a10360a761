use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::config::Environment;
use crate::model::BookmarkId;

/// Why a candidate payload is not a well-formed bookmark create or update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing '{0}' in request body")]
    MissingField(&'static str),
    #[error("'rating' must be a number between 0 and 5")]
    InvalidRating,
    #[error("'{0}' must be a string")]
    InvalidType(&'static str),
    #[error("'url' must be a valid URL")]
    InvalidUrl,
    #[error("Request body must contain either 'title', 'url', 'description' or 'rating'")]
    EmptyUpdate,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("bookmark {0} not found")]
    NotFound(BookmarkId),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<libsql::Error> for StoreError {
    fn from(error: libsql::Error) -> Self {
        StoreError::Backend(error.into())
    }
}

/// Every failure a bookmark request can end in, mapped onto a status and JSON body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized request")]
    Unauthorized,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Request body must be valid JSON")]
    MalformedBody,
    #[error("Bookmark doesn't exist")]
    NotFound,
    #[error("Not found")]
    RouteNotFound,
    #[error("server error")]
    Internal { detail: Option<String> },
}

impl ApiError {
    /// Detail is only kept in development so production responses never leak internals.
    pub fn internal(err: &(dyn std::error::Error), env: Environment) -> Self {
        let detail = crate::unpack_error(err);
        tracing::error!(error = %detail, "request failed with internal error");
        ApiError::Internal {
            detail: env.is_development().then_some(detail),
        }
    }

    pub fn from_store(err: StoreError, env: Environment) -> Self {
        match err {
            StoreError::NotFound(id) => {
                tracing::error!("Bookmark with id {} not found", id);
                ApiError::NotFound
            }
            StoreError::Backend(_) => ApiError::internal(&err, env),
        }
    }

    pub fn status(&self) -> StatusCode {
        use ApiError::*;
        match self {
            Unauthorized => StatusCode::UNAUTHORIZED,
            Validation(_) | MalformedBody => StatusCode::BAD_REQUEST,
            NotFound | RouteNotFound => StatusCode::NOT_FOUND,
            Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Unauthorized => json!({ "error": self.to_string() }),
            ApiError::Internal { detail: Some(detail) } => json!({ "error": { "message": detail } }),
            _ => json!({ "error": { "message": self.to_string() } }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::MissingField("title").to_string(),
            "Missing 'title' in request body"
        );
        assert_eq!(
            ValidationError::InvalidRating.to_string(),
            "'rating' must be a number between 0 and 5"
        );
        assert_eq!(
            ValidationError::EmptyUpdate.to_string(),
            "Request body must contain either 'title', 'url', 'description' or 'rating'"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(ValidationError::InvalidRating).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal { detail: None }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err = ApiError::from_store(StoreError::NotFound(BookmarkId::Key(3)), Environment::Production);
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn test_internal_detail_is_gated_by_environment() {
        let backend = || -> StoreError {
            let inner: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
            StoreError::Backend(inner.context("failed to list bookmarks").unwrap_err())
        };

        match ApiError::from_store(backend(), Environment::Production) {
            ApiError::Internal { detail } => assert_eq!(detail, None),
            other => panic!("unexpected error: {other:?}"),
        }

        match ApiError::from_store(backend(), Environment::Development) {
            ApiError::Internal { detail: Some(detail) } => {
                assert!(detail.contains("failed to list bookmarks"));
                assert!(detail.contains("connection refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
