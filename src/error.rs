use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A wall-clock string that could not be read as "HH:mm".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("missing ':' separator in {0:?}")]
    MissingSeparator(String),
    #[error("non-numeric component in {0:?}")]
    NotANumber(String),
    #[error("minute component out of range in {0:?}")]
    MinuteOutOfRange(String),
}

/// Per-entity problems found while laying out the day.
/// The offending entity is skipped; the rest of the timeline still renders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("entity {entity_id}: {source}")]
    Format {
        entity_id: Uuid,
        #[source]
        source: TimeError,
    },
    #[error("entity {entity_id}: {detail}")]
    InvariantViolation { entity_id: Uuid, detail: String },
}

impl LayoutError {
    pub fn entity_id(&self) -> Uuid {
        match self {
            LayoutError::Format { entity_id, .. } => *entity_id,
            LayoutError::InvariantViolation { entity_id, .. } => *entity_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LayoutError::Format { .. } => "format_error",
            LayoutError::InvariantViolation { .. } => "invariant_violation",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("no task fits the request")]
    NoCandidates,
}

/// Rejections when turning a gap into a scheduled block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FillError {
    #[error("no fillable gap starts at {0}")]
    NoGapAt(String),
    #[error("duration {requested}m does not fit a {available}m gap")]
    DurationOutOfBounds { requested: u32, available: u32 },
    #[error(transparent)]
    Time(#[from] TimeError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error(transparent)]
    Fill(#[from] FillError),
    #[error(transparent)]
    Suggest(#[from] SuggestError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Time(_) | ApiError::Fill(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Suggest(SuggestError::NoCandidates) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrResponse {
    ok: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (
            status,
            Json(ErrResponse {
                ok: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
