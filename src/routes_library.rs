// --------------------------------------------------
// Handles the task library, planner settings and suggestions.
//
// Responsibilities:
// - Create / read / update / delete flexible task templates
// - Create / read / delete fixed-task presets
// - Get / update planner settings
// - Suggest a task for a gap
// -------------------------------------------------

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{FixedTaskPreset, FlexibleTask, PlannerSettings, Priority};
use crate::suggest::{SuggestionRequest, TaskSuggestion};
use crate::validate;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TaskInput {
    pub title: String,
    pub priority: Priority,
}

// -----------------------------
// GET /api/library/tasks
// -----------------------------
pub async fn get_tasks(State(state): State<AppState>) -> Json<Vec<FlexibleTask>> {
    Json(state.store.read(|db| db.flexible_tasks.clone()).await)
}

// -----------------------------
// POST /api/library/tasks
// Adds a flexible task template
// -----------------------------
pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<TaskInput>,
) -> Result<Json<FlexibleTask>, ApiError> {
    let task = FlexibleTask {
        id: Uuid::new_v4(),
        title: validate::title(&input.title)?,
        priority: input.priority,
    };

    state
        .store
        .update(|db| {
            db.flexible_tasks.push(task.clone());
            Ok::<_, ApiError>(())
        })
        .await?;

    Ok(Json(task))
}

// -----------------------------
// PUT /api/library/tasks/:id
// Updates title and priority
// -----------------------------
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TaskInput>,
) -> Result<Json<FlexibleTask>, ApiError> {
    let id = validate::id(&id)?;
    let title = validate::title(&input.title)?;

    let updated = state
        .store
        .update(|db| {
            let t = db
                .flexible_tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(ApiError::NotFound("task"))?;
            t.title = title;
            t.priority = input.priority;
            Ok::<_, ApiError>(t.clone())
        })
        .await?;

    Ok(Json(updated))
}

// -----------------------------
// DELETE /api/library/tasks/:id
// Blocks created from the template keep their original_task_id
// -----------------------------
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = validate::id(&id)?;

    state
        .store
        .update(|db| {
            let before = db.flexible_tasks.len();
            db.flexible_tasks.retain(|t| t.id != id);
            if db.flexible_tasks.len() == before {
                return Err(ApiError::NotFound("task"));
            }
            Ok(())
        })
        .await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
pub struct PresetInput {
    pub title: String,
    pub default_duration_min: Option<u32>,
}

// -----------------------------
// GET /api/library/presets
// -----------------------------
pub async fn get_presets(State(state): State<AppState>) -> Json<Vec<FixedTaskPreset>> {
    Json(state.store.read(|db| db.presets.clone()).await)
}

// -----------------------------
// POST /api/library/presets
// Missing duration falls back to settings.default_preset_min
// -----------------------------
pub async fn create_preset(
    State(state): State<AppState>,
    Json(input): Json<PresetInput>,
) -> Result<Json<FixedTaskPreset>, ApiError> {
    let title = validate::title(&input.title)?;
    if input.default_duration_min == Some(0) {
        return Err(ApiError::BadRequest(
            "default_duration_min must be positive".to_string(),
        ));
    }

    let preset = state
        .store
        .update(|db| {
            let preset = FixedTaskPreset {
                id: Uuid::new_v4(),
                title,
                default_duration_min: Some(
                    input
                        .default_duration_min
                        .unwrap_or(db.settings.default_preset_min),
                ),
            };
            db.presets.push(preset.clone());
            Ok::<_, ApiError>(preset)
        })
        .await?;

    Ok(Json(preset))
}

// -----------------------------
// DELETE /api/library/presets/:id
// -----------------------------
pub async fn delete_preset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = validate::id(&id)?;

    state
        .store
        .update(|db| {
            let before = db.presets.len();
            db.presets.retain(|p| p.id != id);
            if db.presets.len() == before {
                return Err(ApiError::NotFound("preset"));
            }
            Ok(())
        })
        .await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

// -----------------------------
// GET /api/settings
// -----------------------------
pub async fn get_settings(State(state): State<AppState>) -> Json<PlannerSettings> {
    Json(state.store.read(|db| db.settings.clone()).await)
}

// -----------------------------
// PUT /api/settings
// Replaces planner settings
// -----------------------------
pub async fn put_settings(
    State(state): State<AppState>,
    Json(s): Json<PlannerSettings>,
) -> Result<Json<PlannerSettings>, ApiError> {
    if s.default_fill_min == 0 || s.default_preset_min == 0 {
        return Err(ApiError::BadRequest(
            "default durations must be positive".to_string(),
        ));
    }

    state
        .store
        .update(|db| {
            db.settings = s.clone();
            Ok::<_, ApiError>(())
        })
        .await?;

    Ok(Json(s))
}

// -----------------------------
// POST /api/suggest
// Suggests something to do with a gap of available_min minutes.
// The suggester runs without the state lock held.
// -----------------------------
pub async fn suggest(
    State(state): State<AppState>,
    Json(mut req): Json<SuggestionRequest>,
) -> Result<Json<TaskSuggestion>, ApiError> {
    let (library, default_fill_min) = state
        .store
        .read(|db| (db.flexible_tasks.clone(), db.settings.default_fill_min))
        .await;
    req.preferred_min.get_or_insert(default_fill_min);

    let suggestion = state.suggester.suggest(&req, &library).await?;
    debug!(title = %suggestion.title, minutes = suggestion.duration_min, "suggestion");
    Ok(Json(suggestion))
}
