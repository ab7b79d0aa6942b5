use axum::{extract::State, Json};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use uuid::Uuid;

use crate::logic::{self, DayStats};
use crate::models::{FixedEvent, ScheduledBlock};
use crate::time::{format_hhmm, now_local, TimeSpan};
use crate::timeline::{compute_timeline_layout, NestedItem, RenderItem, TimelineLayout};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub date: String,
    pub now: String,
    pub items: Vec<ItemResponse>,
    pub errors: Vec<ErrorResponse>,
    pub unplaced: Vec<UnplacedResponse>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SpanResponse {
    pub start: String, // "HH:mm"
    pub end: String,   // "HH:mm", "24:00" at the end of the day
    pub start_min: u32,
    pub end_min: u32,
    pub duration_min: u32,
}

impl From<TimeSpan> for SpanResponse {
    fn from(span: TimeSpan) -> Self {
        Self {
            start: format_hhmm(span.start),
            end: format_hhmm(span.end),
            start_min: span.start,
            end_min: span.end,
            duration_min: span.len(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemResponse {
    Gap {
        #[serde(flatten)]
        span: SpanResponse,
    },
    FreeTask {
        #[serde(flatten)]
        span: SpanResponse,
        block: ScheduledBlock,
    },
    FixedContainer {
        #[serde(flatten)]
        span: SpanResponse,
        event: FixedEvent,
        is_completed: bool,
        nested: Vec<NestedResponse>,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NestedResponse {
    InnerGap {
        #[serde(flatten)]
        span: SpanResponse,
    },
    SubTask {
        #[serde(flatten)]
        span: SpanResponse,
        block: ScheduledBlock,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub entity_id: Uuid,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UnplacedResponse {
    pub block_id: Uuid,
    #[serde(flatten)]
    pub span: SpanResponse,
    pub reason: &'static str,
}

impl TimelineResponse {
    fn build(
        layout: TimelineLayout<'_>,
        completed_fixed_ids: &[Uuid],
        now: DateTime<FixedOffset>,
    ) -> Self {
        let items = layout
            .items
            .into_iter()
            .map(|item| match item {
                RenderItem::Gap(span) => ItemResponse::Gap { span: span.into() },
                RenderItem::FreeTask { block, span } => ItemResponse::FreeTask {
                    span: span.into(),
                    block: block.clone(),
                },
                RenderItem::FixedContainer {
                    event,
                    span,
                    nested,
                } => ItemResponse::FixedContainer {
                    span: span.into(),
                    event: event.clone(),
                    is_completed: completed_fixed_ids.contains(&event.id),
                    nested: nested
                        .into_iter()
                        .map(|n| match n {
                            NestedItem::InnerGap(span) => {
                                NestedResponse::InnerGap { span: span.into() }
                            }
                            NestedItem::SubTask { block, span } => NestedResponse::SubTask {
                                span: span.into(),
                                block: block.clone(),
                            },
                        })
                        .collect(),
                },
            })
            .collect();

        let errors = layout
            .errors
            .iter()
            .map(|e| ErrorResponse {
                entity_id: e.entity_id(),
                kind: e.kind(),
                message: e.to_string(),
            })
            .collect();

        let unplaced = layout
            .unplaced
            .into_iter()
            .map(|u| UnplacedResponse {
                block_id: u.block_id,
                span: u.span.into(),
                reason: u.reason,
            })
            .collect();

        TimelineResponse {
            date: now.format("%Y-%m-%d").to_string(),
            now: now.to_rfc3339(),
            items,
            errors,
            unplaced,
        }
    }
}

// -----------------------------
// GET /api/timeline
// Lays out today from the current fixed events and blocks
// -----------------------------
pub async fn get_timeline(State(state): State<AppState>) -> Json<TimelineResponse> {
    let now = now_local();
    let resp = state
        .store
        .read(|db| {
            let layout = compute_timeline_layout(&db.fixed_events, &db.blocks);
            TimelineResponse::build(layout, &db.completed_fixed_ids, now)
        })
        .await;
    Json(resp)
}

// -----------------------------
// GET /api/stats
// Time spent per category on completed work
// -----------------------------
pub async fn get_stats(State(state): State<AppState>) -> Json<DayStats> {
    Json(state.store.read(logic::day_stats).await)
}
