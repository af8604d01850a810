use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::{IntoResponse, Json},
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::config::{AppConfig, StoreBackend};
use crate::model::{parse_artwork_id, Artwork, Catalog, EmotionCounts, EmotionSet, VisitorKey};
use crate::store::traits::VoteStore;

/// Shared state handed to every handler
pub struct AppState<S> {
    pub store: Arc<S>,
    pub catalog: Arc<Catalog>,
    pub config: Arc<AppConfig>,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, catalog: Catalog, config: AppConfig) -> Self {
        Self {
            store,
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            catalog: self.catalog.clone(),
            config: self.config.clone(),
        }
    }
}

/// Counts must never be served from a cache
const NO_STORE: [(header::HeaderName, &str); 3] = [
    (
        header::CACHE_CONTROL,
        "no-store, no-cache, must-revalidate, proxy-revalidate, max-age=0",
    ),
    (header::PRAGMA, "no-cache"),
    (header::EXPIRES, "0"),
];

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountsResponse {
    pub counts: EmotionCounts,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AdjustCountRequest {
    pub emotion: Option<String>,
    pub delta: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustCountResponse {
    pub success: bool,
    pub new_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub has_submitted: bool,
    pub previous_emotions: EmotionSet,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub selected_emotions: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvCheckResponse {
    pub status: String,
    pub timestamp: String,
    pub store_backend: StoreBackend,
    pub database_connection: &'static str,
    pub catalog_size: usize,
}

fn lookup_artwork<'a>(catalog: &'a Catalog, raw_id: &str) -> Result<&'a Artwork, ApiError> {
    let id = parse_artwork_id(raw_id).ok_or(ApiError::InvalidPaintingId)?;
    catalog.get(id).ok_or(ApiError::UnknownPainting(id))
}

fn check_emotion(artwork: &Artwork, emotion: &str) -> Result<(), ApiError> {
    if artwork.has_emotion(emotion) {
        Ok(())
    } else {
        Err(ApiError::UnknownEmotion {
            painting_id: artwork.id,
            emotion: emotion.to_string(),
        })
    }
}

/// GET /env-check
/// Reports which settings are present without exposing their values
pub async fn env_check<S: VoteStore>(State(state): State<AppState<S>>) -> Json<EnvCheckResponse> {
    let database_connection = if state.config.database_url().is_ok() {
        "SET"
    } else {
        "MISSING"
    };
    Json(EnvCheckResponse {
        status: "Environment check endpoint working".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        store_backend: state.config.store.backend,
        database_connection,
        catalog_size: state.catalog.len(),
    })
}

/// GET /artworks
pub async fn list_artworks<S: VoteStore>(State(state): State<AppState<S>>) -> Json<Vec<Artwork>> {
    Json(state.catalog.artworks().to_vec())
}

/// GET /emotions/{painting_id}
/// Current emotion counts for a painting
pub async fn get_emotion_counts<S: VoteStore>(
    State(state): State<AppState<S>>,
    Path(painting_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let artwork = lookup_artwork(&state.catalog, &painting_id)?;

    let counts = state
        .store
        .get_counts(artwork.id)
        .await
        .map_err(ApiError::store("Failed to fetch emotion counts"))?;
    debug!("Counts for painting {}: {:?}", artwork.id, counts);

    Ok((NO_STORE, Json(CountsResponse { counts })))
}

/// POST /emotions/{painting_id}
/// Apply a signed delta to one emotion counter
pub async fn adjust_emotion_count<S: VoteStore>(
    State(state): State<AppState<S>>,
    Path(painting_id): Path<String>,
    payload: Result<Json<AdjustCountRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let artwork = lookup_artwork(&state.catalog, &painting_id)?;
    let Json(req) = payload.map_err(|rejection| {
        ApiError::MalformedPayload(format!(
            "Failed to parse request body: {}",
            rejection.body_text()
        ))
    })?;

    let (Some(emotion), Some(delta)) = (req.emotion, req.delta) else {
        return Err(ApiError::MalformedPayload(
            "Missing required fields".to_string(),
        ));
    };
    let emotion = emotion.trim();
    if emotion.is_empty() {
        return Err(ApiError::MalformedPayload(
            "Missing required fields".to_string(),
        ));
    }
    check_emotion(artwork, emotion)?;

    let new_count = state
        .store
        .adjust_count(artwork.id, emotion, delta)
        .await
        .map_err(ApiError::store("Failed to update emotion count"))?;
    info!(
        "Painting {} emotion {} adjusted by {:+} to {}",
        artwork.id, emotion, delta, new_count
    );

    Ok((
        NO_STORE,
        Json(AdjustCountResponse {
            success: true,
            new_count,
        }),
    ))
}

/// GET /emotions/{painting_id}/submission
/// Whether this visitor already submitted for the painting, and what
pub async fn get_submission<S: VoteStore>(
    State(state): State<AppState<S>>,
    Path(painting_id): Path<String>,
    visitor: VisitorKey,
) -> Result<impl IntoResponse, ApiError> {
    let artwork = lookup_artwork(&state.catalog, &painting_id)?;

    let submission = state
        .store
        .get_submission(artwork.id, &visitor)
        .await
        .map_err(ApiError::store("Failed to check submission"))?;
    debug!(
        "Submission check for painting {} by {}: {}",
        artwork.id,
        visitor,
        submission.is_some()
    );

    let response = match submission {
        Some(submission) => SubmissionResponse {
            has_submitted: true,
            previous_emotions: submission.selected_emotions,
        },
        None => SubmissionResponse {
            has_submitted: false,
            previous_emotions: EmotionSet::new(),
        },
    };
    Ok((NO_STORE, Json(response)))
}

/// POST /emotions/{painting_id}/submission
/// Replace this visitor's submission for the painting
pub async fn put_submission<S: VoteStore>(
    State(state): State<AppState<S>>,
    Path(painting_id): Path<String>,
    visitor: VisitorKey,
    payload: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let artwork = lookup_artwork(&state.catalog, &painting_id)?;
    let Json(req) = payload.map_err(|rejection| {
        ApiError::MalformedPayload(format!(
            "Failed to parse request body: {}",
            rejection.body_text()
        ))
    })?;
    let Some(selected) = req.selected_emotions else {
        return Err(ApiError::MalformedPayload(
            "selectedEmotions must be an array".to_string(),
        ));
    };

    let mut emotions = EmotionSet::new();
    for emotion in selected {
        let emotion = emotion.trim().to_string();
        check_emotion(artwork, &emotion)?;
        emotions.insert(emotion);
    }

    state
        .store
        .put_submission(artwork.id, &visitor, &emotions)
        .await
        .map_err(ApiError::store("Failed to save submission"))?;
    info!(
        "Saved submission for painting {} by {}: {:?}",
        artwork.id, visitor, emotions
    );

    Ok((NO_STORE, Json(AckResponse { success: true })))
}
