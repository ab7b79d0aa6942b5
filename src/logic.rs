/*
Planning logic around the timeline: gap filling, library ranking, day stats.
Module was independently written from HTTP / Axum for testing
*/

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use uuid::Uuid;

use crate::error::FillError;
use crate::models::{Db, FlexibleTask, ScheduledBlock};
use crate::time::{format_hhmm, parse_hhmm};
use crate::timeline::{compute_timeline_layout, normalize};

// Request to turn (part of) a gap into a scheduled block
#[derive(Debug, Clone)]
pub struct FillRequest {
    pub gap_start: String,         // "HH:mm", must be the start of a gap
    pub duration_min: Option<u32>, // defaults to settings.default_fill_min
    pub title: String,
    pub original_task_id: Option<Uuid>,
}

// Build a block for the gap starting at `gap_start`.
//
// Rules:
// - The gap is looked up on the current layout, never trusted from the caller
// - Block starts at the gap start; 1 <= duration <= gap length
// - Inner gaps give the block its parent fixed event
pub fn fill_gap(
    db: &Db,
    req: &FillRequest,
    now: DateTime<FixedOffset>,
) -> Result<ScheduledBlock, FillError> {
    let start = parse_hhmm(&req.gap_start)?;
    let layout = compute_timeline_layout(&db.fixed_events, &db.blocks);
    let gap = layout
        .gap_starting_at(start)
        .ok_or_else(|| FillError::NoGapAt(format_hhmm(start)))?;

    let available = gap.span.len();
    let duration = req
        .duration_min
        .unwrap_or_else(|| db.settings.default_fill_min.min(available));
    if duration == 0 || duration > available {
        return Err(FillError::DurationOutOfBounds {
            requested: duration,
            available,
        });
    }

    // gaps never pass 24:00, so a block reaching midnight ends at "24:00"
    let end = start + duration;

    let mut block = ScheduledBlock::planned(
        req.title.trim().to_string(),
        format_hhmm(start),
        format_hhmm(end),
        now,
    );
    block.parent_id = gap.parent_id;
    block.original_task_id = req.original_task_id;
    Ok(block)
}

// Library task after scoring against a suggestion request
#[derive(Debug, Clone)]
pub struct ScoredTask<'a> {
    pub task: &'a FlexibleTask,
    pub hint_match: bool, // title contains the hint
    pub total: i64,       // priority weight (1..3), +10 on hint match
}

// Score library tasks and sort them.
//
// hint match adds 10, so any matching task outranks every non-matching one.
// Sorting rules:
// 1) Higher total score first
// 2) If tied, alphabetical order by title
pub fn score_and_sort<'a>(tasks: &'a [FlexibleTask], hint: Option<&str>) -> Vec<ScoredTask<'a>> {
    let hint = hint
        .map(|h| h.trim().to_lowercase())
        .filter(|h| !h.is_empty());

    let mut scored: Vec<ScoredTask<'a>> = tasks
        .iter()
        .map(|t| {
            let hint_match = hint
                .as_deref()
                .is_some_and(|h| t.title.to_lowercase().contains(h));
            let total = t.priority.weight() + if hint_match { 10 } else { 0 };
            ScoredTask {
                task: t,
                hint_match,
                total,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.task.title.to_lowercase().cmp(&b.task.title.to_lowercase()))
    });

    scored
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryStat {
    pub category: String,
    pub minutes: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayStats {
    pub total_min: u32,
    pub items: Vec<CategoryStat>,
}

// Minutes spent per title on completed fixed events and completed blocks.
// Durations come from normalized spans, so midnight-crossing events count right.
pub fn day_stats(db: &Db) -> DayStats {
    let mut per_title: BTreeMap<&str, u32> = BTreeMap::new();

    let (fixed, _) = normalize(&db.fixed_events);
    for f in fixed
        .iter()
        .filter(|f| db.completed_fixed_ids.contains(&f.entity.id))
    {
        *per_title.entry(f.entity.title.as_str()).or_default() += f.span.len();
    }

    let (blocks, _) = normalize(&db.blocks);
    for b in blocks.iter().filter(|b| b.entity.is_completed()) {
        *per_title.entry(b.entity.title.as_str()).or_default() += b.span.len();
    }

    let total_min: u32 = per_title.values().sum();
    let mut items: Vec<CategoryStat> = per_title
        .into_iter()
        .filter(|(_, minutes)| *minutes > 0)
        .map(|(category, minutes)| CategoryStat {
            category: category.to_string(),
            minutes,
            percentage: f64::from(minutes) * 100.0 / f64::from(total_min),
        })
        .collect();

    // minutes desc, tie -> title asc (map order already gives title asc)
    items.sort_by(|a, b| b.minutes.cmp(&a.minutes));

    DayStats { total_min, items }
}
