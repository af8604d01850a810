use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::error;
use thiserror::Error;

use crate::api::handlers::ErrorResponse;
use crate::model::ArtworkId;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid painting ID")]
    InvalidPaintingId,

    #[error("Painting {0} not found")]
    UnknownPainting(ArtworkId),

    #[error("{0}")]
    MalformedPayload(String),

    #[error("Emotion '{emotion}' is not offered for painting {painting_id}")]
    UnknownEmotion {
        painting_id: ArtworkId,
        emotion: String,
    },

    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn store(context: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| ApiError::Store { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPaintingId => StatusCode::BAD_REQUEST,
            ApiError::UnknownPainting(_) => StatusCode::NOT_FOUND,
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownEmotion { .. } => StatusCode::BAD_REQUEST,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store { context, source } = &self {
            error!("{}: {:#}", context, source);
        }
        (self.status(), Json(ErrorResponse::new(&self.to_string()))).into_response()
    }
}
