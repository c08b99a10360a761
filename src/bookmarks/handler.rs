//! HTTP Handlers for the Bookmarks API

use axum::{
    Json,
    body::Bytes,
    extract::{OriginalUri, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::error::{ApiError, ValidationError};
use crate::handler::AppState;
use crate::model::{Bookmark, BookmarkId};
use crate::sanitize::{serialize_all, serialize_bookmark};
use crate::validate::Payload;

/// An empty body counts as `{}`, and so does any JSON that isn't an object.
fn parse_payload(body: &Bytes) -> Result<Payload, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Payload::new()),
        Err(e) => {
            tracing::error!(error = %e, "request body is not valid JSON");
            Err(ApiError::MalformedBody)
        }
    }
}

fn rejected(err: ValidationError) -> ApiError {
    tracing::error!("{}", err);
    ApiError::Validation(err)
}

async fn find_bookmark(state: &AppState, raw_id: &str) -> Result<Bookmark, ApiError> {
    let id = BookmarkId::parse(raw_id);
    match state.store.get_by_id(&id).await {
        Ok(Some(bookmark)) => Ok(bookmark),
        Ok(None) => {
            tracing::error!("Bookmark with id {} not found", id);
            Err(ApiError::NotFound)
        }
        Err(e) => Err(state.store_error(e)),
    }
}

pub async fn list_bookmarks(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bookmarks = state.store.list().await.map_err(|e| state.store_error(e))?;
    Ok((StatusCode::OK, Json(serialize_all(&bookmarks))).into_response())
}

pub async fn get_bookmark(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let bookmark = find_bookmark(&state, &id).await?;
    Ok((StatusCode::OK, Json(serialize_bookmark(&bookmark))).into_response())
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload = parse_payload(&body)?;
    let input = state.validator.create(&payload).map_err(rejected)?;

    let bookmark = state.store.insert(input).await.map_err(|e| state.store_error(e))?;
    tracing::info!("Bookmark with id {} created", bookmark.id);

    let location = format!("{}/{}", uri.path().trim_end_matches('/'), bookmark.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(serialize_bookmark(&bookmark)),
    )
        .into_response())
}

/// Existence is checked before the body, so an unknown id is a 404 whatever was sent.
pub async fn update_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let existing = find_bookmark(&state, &id).await?;
    let payload = parse_payload(&body)?;
    let patch = state.validator.update(&payload).map_err(rejected)?;

    state
        .store
        .update(&existing.id, patch)
        .await
        .map_err(|e| state.store_error(e))?;
    tracing::info!("Bookmark with id {} updated", existing.id);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_bookmark(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = BookmarkId::parse(&id);
    state.store.delete(&id).await.map_err(|e| state.store_error(e))?;
    tracing::info!("Bookmark with id {} deleted", id);

    Ok(StatusCode::NO_CONTENT)
}
