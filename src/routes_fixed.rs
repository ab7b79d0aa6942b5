// --------------------------------------------------
// Fixed events: the daily commitments the timeline is built around.
// Kept sorted by start time so list order matches the day.
// -------------------------------------------------

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Db, FixedEvent};
use crate::time::parse_hhmm;
use crate::validate;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FixedEventInput {
    pub title: String,
    pub start_time: String, // "HH:mm"
    pub end_time: String,   // "HH:mm", before start_time means it runs past midnight
    #[serde(default)]
    pub do_not_disturb: bool,
}

impl FixedEventInput {
    fn into_event(self, id: Uuid) -> Result<FixedEvent, ApiError> {
        let start_time = validate::clock(&self.start_time)?;
        let end_time = validate::clock(&self.end_time)?;
        // equal times would lay out as nothing at all
        if start_time == end_time {
            return Err(ApiError::BadRequest(format!(
                "fixed event {start_time}-{end_time} has no length"
            )));
        }
        Ok(FixedEvent {
            id,
            title: validate::title(&self.title)?,
            start_time,
            end_time,
            do_not_disturb: self.do_not_disturb,
        })
    }
}

// unparseable starts (hand-edited snapshots) sink to the end
fn sort_by_start(db: &mut Db) {
    db.fixed_events
        .sort_by_cached_key(|f| parse_hhmm(&f.start_time).unwrap_or(u32::MAX));
}

// -----------------------------
// GET /api/fixed-events
// -----------------------------
pub async fn get_fixed_events(State(state): State<AppState>) -> Json<Vec<FixedEvent>> {
    Json(state.store.read(|db| db.fixed_events.clone()).await)
}

// -----------------------------
// POST /api/fixed-events
// Creates a fixed event
// -----------------------------
pub async fn create_fixed_event(
    State(state): State<AppState>,
    Json(input): Json<FixedEventInput>,
) -> Result<Json<FixedEvent>, ApiError> {
    let event = input.into_event(Uuid::new_v4())?;

    state
        .store
        .update(|db| {
            db.fixed_events.push(event.clone());
            sort_by_start(db);
            Ok::<_, ApiError>(())
        })
        .await?;

    info!(event = %event.id, title = %event.title, "fixed event created");
    Ok(Json(event))
}

// -----------------------------
// PUT /api/fixed-events/:id
// Replaces title, times and the do-not-disturb flag
// -----------------------------
pub async fn update_fixed_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<FixedEventInput>,
) -> Result<Json<FixedEvent>, ApiError> {
    let id = validate::id(&id)?;
    let event = input.into_event(id)?;

    state
        .store
        .update(|db| {
            let slot = db
                .fixed_events
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or(ApiError::NotFound("fixed event"))?;
            *slot = event.clone();
            sort_by_start(db);
            Ok::<_, ApiError>(())
        })
        .await?;

    Ok(Json(event))
}

// -----------------------------
// DELETE /api/fixed-events/:id
// Blocks nested inside it become free-standing on the next layout
// -----------------------------
pub async fn delete_fixed_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = validate::id(&id)?;

    state
        .store
        .update(|db| {
            let before = db.fixed_events.len();
            db.fixed_events.retain(|f| f.id != id);
            if db.fixed_events.len() == before {
                return Err(ApiError::NotFound("fixed event"));
            }
            db.completed_fixed_ids.retain(|c| *c != id);
            Ok(())
        })
        .await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub id: Uuid,
    pub is_completed: bool,
}

// -----------------------------
// POST /api/fixed-events/:id/toggle
// Marks a fixed event done (or not done) for today
// -----------------------------
pub async fn toggle_fixed_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let id = validate::id(&id)?;

    let is_completed = state
        .store
        .update(|db| {
            if !db.fixed_events.iter().any(|f| f.id == id) {
                return Err(ApiError::NotFound("fixed event"));
            }
            if let Some(pos) = db.completed_fixed_ids.iter().position(|c| *c == id) {
                db.completed_fixed_ids.remove(pos);
                Ok(false)
            } else {
                db.completed_fixed_ids.push(id);
                Ok(true)
            }
        })
        .await?;

    Ok(Json(CompletionResponse { id, is_completed }))
}
