// --------------------------------------------------
// Task suggestions for a gap.
//
// Generative backends plug in behind `TaskSuggester`; the built-in
// `LibrarySuggester` picks from the user's own flexible task library.
// Suggestions never block timeline layout: handlers call them without
// holding the state lock.
// --------------------------------------------------

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SuggestError;
use crate::logic;
use crate::models::FlexibleTask;

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionRequest {
    pub available_min: u32,
    #[serde(default)]
    pub hint: Option<String>,
    // caller's usual block length; capped by available_min
    #[serde(default)]
    pub preferred_min: Option<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskSuggestion {
    pub title: String,
    pub description: String,
    pub duration_min: u32, // never more than available_min
    pub source_task_id: Option<Uuid>,
}

#[async_trait]
pub trait TaskSuggester: Send + Sync {
    async fn suggest(
        &self,
        req: &SuggestionRequest,
        library: &[FlexibleTask],
    ) -> Result<TaskSuggestion, SuggestError>;
}

pub struct LibrarySuggester;

#[async_trait]
impl TaskSuggester for LibrarySuggester {
    async fn suggest(
        &self,
        req: &SuggestionRequest,
        library: &[FlexibleTask],
    ) -> Result<TaskSuggestion, SuggestError> {
        if req.available_min == 0 {
            return Err(SuggestError::NoCandidates);
        }
        let duration_min = req
            .preferred_min
            .unwrap_or(req.available_min)
            .clamp(1, req.available_min);
        let hint = req.hint.as_deref().map(str::trim).filter(|h| !h.is_empty());

        let ranked = logic::score_and_sort(library, hint);
        match (ranked.first(), hint) {
            // a hint nothing in the library matches becomes an ad hoc task
            (Some(best), Some(h)) if !best.hint_match => Ok(ad_hoc(h, duration_min)),
            (Some(best), _) => Ok(TaskSuggestion {
                title: best.task.title.clone(),
                description: format!(
                    "{:?} priority task from your library, {duration_min}m",
                    best.task.priority
                ),
                duration_min,
                source_task_id: Some(best.task.id),
            }),
            (None, Some(h)) => Ok(ad_hoc(h, duration_min)),
            (None, None) => Err(SuggestError::NoCandidates),
        }
    }
}

fn ad_hoc(hint: &str, duration_min: u32) -> TaskSuggestion {
    TaskSuggestion {
        title: hint.to_string(),
        description: format!("Spend {duration_min}m on it"),
        duration_min,
        source_task_id: None,
    }
}
