// Input checks shared by the write handlers.

use uuid::Uuid;

use crate::error::ApiError;
use crate::time::{format_hhmm, parse_hhmm, DAY_MINUTES};

pub fn id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("invalid id".to_string()))
}

pub fn title(raw: &str) -> Result<String, ApiError> {
    let t = raw.trim();
    if t.is_empty() {
        return Err(ApiError::BadRequest("title required".to_string()));
    }
    Ok(t.to_string())
}

// Accept "H:mm" / "HH:mm" within the day and store it zero-padded.
pub fn clock(raw: &str) -> Result<String, ApiError> {
    let minutes = parse_hhmm(raw)?;
    if minutes > DAY_MINUTES {
        return Err(ApiError::BadRequest(format!("{raw:?} lies beyond 24:00")));
    }
    Ok(format_hhmm(minutes))
}
