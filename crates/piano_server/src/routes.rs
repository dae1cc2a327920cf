//! HTTP routes for the melody API.
//!
//! # Responsibility
//! - Map `/api/melodies` requests onto the melody service.
//! - Translate service failures into status codes with a `{message}` body.
//!
//! # Invariants
//! - Validation failures and undecodable bodies answer 400.
//! - Unknown ids answer 404; malformed ids and storage failures answer 500.

use crate::storage::{MelodyStorage, StorageError};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, warn};
use piano_core::{parse_melody_id, Melody, MelodyServiceError, NewMelody};
use serde::Serialize;
use std::sync::Arc;

pub const ROOT_BANNER: &str = "Piano App API is running";

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Error carried out of a handler as `status + {message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(value: StorageError) -> Self {
        let status = match &value {
            StorageError::Service(MelodyServiceError::Validation(_)) => StatusCode::BAD_REQUEST,
            StorageError::Service(MelodyServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            StorageError::Service(MelodyServiceError::InvalidId(_))
            | StorageError::Service(MelodyServiceError::Repo(_))
            | StorageError::Unavailable(_)
            | StorageError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, value.to_string())
    }
}

impl From<MelodyServiceError> for ApiError {
    fn from(value: MelodyServiceError) -> Self {
        StorageError::Service(value).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                "event=http_request module=server status=error code={} message={}",
                self.status.as_u16(),
                self.message
            );
        } else {
            warn!(
                "event=http_request module=server status=rejected code={} message={}",
                self.status.as_u16(),
                self.message
            );
        }
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

/// Builds the application router over shared storage.
pub fn router(storage: Arc<MelodyStorage>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/melodies", get(list_melodies).post(create_melody))
        .route("/api/melodies/:id", get(get_melody))
        .with_state(storage)
}

async fn root() -> &'static str {
    ROOT_BANNER
}

async fn list_melodies(
    State(storage): State<Arc<MelodyStorage>>,
) -> Result<Json<Vec<Melody>>, ApiError> {
    let melodies = storage.run(|service| service.list_melodies()).await?;
    Ok(Json(melodies))
}

async fn create_melody(
    State(storage): State<Arc<MelodyStorage>>,
    body: Result<Json<NewMelody>, JsonRejection>,
) -> Result<(StatusCode, Json<Melody>), ApiError> {
    let Json(draft) =
        body.map_err(|rejection| ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text()))?;
    let melody = storage
        .run(move |service| service.create_melody(&draft))
        .await?;
    Ok((StatusCode::CREATED, Json(melody)))
}

async fn get_melody(
    State(storage): State<Arc<MelodyStorage>>,
    Path(id): Path<String>,
) -> Result<Json<Melody>, ApiError> {
    let id = parse_melody_id(&id)?;
    let melody = storage.run(move |service| service.get_melody(id)).await?;
    Ok(Json(melody))
}
