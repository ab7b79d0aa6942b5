// --------------------------------------------------
// Handles API endpoints for scheduled blocks on today's timeline.
//
// Responsibilities:
// - List blocks
// - Fill a gap with a new block (start = gap start, duration <= gap)
// - Delete a block
// - Toggle block status (Planned <-> Completed)
// - Attach reflection notes and artifacts
// -------------------------------------------------

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::logic::{self, FillRequest};
use crate::models::ScheduledBlock;
use crate::time::now_local;
use crate::validate;
use crate::AppState;

// -----------------------------
// GET /api/blocks
// Returns every scheduled block in storage order
// -----------------------------
pub async fn get_blocks(State(state): State<AppState>) -> Json<Vec<ScheduledBlock>> {
    Json(state.store.read(|db| db.blocks.clone()).await)
}

#[derive(Debug, Deserialize)]
pub struct FillInput {
    pub gap_start: String, // "HH:mm"
    pub title: String,
    pub duration_min: Option<u32>,
    pub original_task_id: Option<Uuid>,
}

// -----------------------------
// POST /api/blocks/fill
// Turns the gap starting at gap_start into a block
// -----------------------------
pub async fn fill_gap(
    State(state): State<AppState>,
    Json(input): Json<FillInput>,
) -> Result<Json<ScheduledBlock>, ApiError> {
    let req = FillRequest {
        gap_start: input.gap_start,
        duration_min: input.duration_min,
        title: validate::title(&input.title)?,
        original_task_id: input.original_task_id,
    };
    let now = now_local();

    let block = state
        .store
        .update(|db| {
            let block = logic::fill_gap(db, &req, now)?;
            db.blocks.push(block.clone());
            Ok::<_, ApiError>(block)
        })
        .await?;

    info!(
        block = %block.id,
        start = %block.start_time,
        end = %block.end_time,
        "gap filled"
    );
    Ok(Json(block))
}

// -----------------------------
// DELETE /api/blocks/:id
// Removes a block; its time becomes a gap again
// -----------------------------
pub async fn delete_block(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = validate::id(&id)?;

    state
        .store
        .update(|db| {
            let before = db.blocks.len();
            db.blocks.retain(|b| b.id != id);
            if db.blocks.len() == before {
                return Err(ApiError::NotFound("block"));
            }
            Ok(())
        })
        .await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

// -----------------------------
// POST /api/blocks/:id/toggle
// Toggles block status between Planned and Completed
// -----------------------------
pub async fn toggle_block(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScheduledBlock>, ApiError> {
    let id = validate::id(&id)?;

    let updated = state
        .store
        .update(|db| {
            let b = db
                .blocks
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or(ApiError::NotFound("block"))?;
            b.status = b.status.toggled();
            Ok::<_, ApiError>(b.clone())
        })
        .await?;

    Ok(Json(updated))
}

// Omitted fields are left as they are; an empty string clears the field.
#[derive(Debug, Default, Deserialize)]
pub struct ReflectionInput {
    pub notes: Option<String>,
    pub facts: Option<Vec<String>>,
    pub description: Option<String>,
    pub banner_url: Option<String>,
    pub image_url: Option<String>,
    pub generated_app_key: Option<String>,
    pub generated_page_key: Option<String>,
}

fn merge_text(slot: &mut Option<String>, incoming: Option<String>) {
    if let Some(text) = incoming {
        let text = text.trim();
        *slot = (!text.is_empty()).then(|| text.to_string());
    }
}

// -----------------------------
// PUT /api/blocks/:id/reflection
// Attaches notes, facts and generated artifacts to a block
// -----------------------------
pub async fn put_reflection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ReflectionInput>,
) -> Result<Json<ScheduledBlock>, ApiError> {
    let id = validate::id(&id)?;

    let updated = state
        .store
        .update(|db| {
            let max_facts = db.settings.max_facts;
            let b = db
                .blocks
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or(ApiError::NotFound("block"))?;

            if let Some(facts) = input.facts {
                let facts: Vec<String> = facts
                    .iter()
                    .map(|f| f.trim())
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect();
                if facts.len() > max_facts {
                    return Err(ApiError::BadRequest(format!(
                        "at most {max_facts} facts per block"
                    )));
                }
                b.facts = facts;
            }
            merge_text(&mut b.notes, input.notes);
            merge_text(&mut b.description, input.description);
            merge_text(&mut b.banner_url, input.banner_url);
            merge_text(&mut b.image_url, input.image_url);
            merge_text(&mut b.generated_app_key, input.generated_app_key);
            merge_text(&mut b.generated_page_key, input.generated_page_key);

            Ok(b.clone())
        })
        .await?;

    Ok(Json(updated))
}
