/*
Timeline layout.
Turns fixed events and scheduled blocks into one ordered render model for
the day. Pure and independent of HTTP / Axum; re-run on every change.
*/

use tracing::warn;
use uuid::Uuid;

use crate::error::LayoutError;
use crate::models::{FixedEvent, ScheduledBlock};
use crate::time::{parse_hhmm, TimeSpan, DAY_MINUTES};

/// Anything with a wall-clock start and end that can be put on the day.
pub trait Timed {
    fn id(&self) -> Uuid;
    fn start_time(&self) -> &str;
    fn end_time(&self) -> &str;
}

impl Timed for FixedEvent {
    fn id(&self) -> Uuid {
        self.id
    }
    fn start_time(&self) -> &str {
        &self.start_time
    }
    fn end_time(&self) -> &str {
        &self.end_time
    }
}

impl Timed for ScheduledBlock {
    fn id(&self) -> Uuid {
        self.id
    }
    fn start_time(&self) -> &str {
        &self.start_time
    }
    fn end_time(&self) -> &str {
        &self.end_time
    }
}

// An entity together with one of its normalized spans.
#[derive(Debug, PartialEq, Eq)]
pub struct Placed<'a, T> {
    pub entity: &'a T,
    pub span: TimeSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderItem<'a> {
    Gap(TimeSpan),
    FreeTask {
        block: &'a ScheduledBlock,
        span: TimeSpan,
    },
    FixedContainer {
        event: &'a FixedEvent,
        span: TimeSpan,
        nested: Vec<NestedItem<'a>>,
    },
}

impl RenderItem<'_> {
    pub fn span(&self) -> TimeSpan {
        match self {
            RenderItem::Gap(span) => *span,
            RenderItem::FreeTask { span, .. } => *span,
            RenderItem::FixedContainer { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NestedItem<'a> {
    InnerGap(TimeSpan),
    SubTask {
        block: &'a ScheduledBlock,
        span: TimeSpan,
    },
}

impl NestedItem<'_> {
    pub fn span(&self) -> TimeSpan {
        match self {
            NestedItem::InnerGap(span) => *span,
            NestedItem::SubTask { span, .. } => *span,
        }
    }
}

// Block span that fits neither inside a fixed event nor in free time,
// i.e. it crosses a fixed event's boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnplacedBlock {
    pub block_id: Uuid,
    pub span: TimeSpan,
    pub reason: &'static str,
}

/// Gap the user can turn into a block. `parent_id` is set for inner gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillableGap {
    pub span: TimeSpan,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineLayout<'a> {
    pub items: Vec<RenderItem<'a>>,
    pub errors: Vec<LayoutError>,
    pub unplaced: Vec<UnplacedBlock>,
}

impl TimelineLayout<'_> {
    /// Every fillable gap, top level and inside containers, in day order.
    pub fn gaps(&self) -> Vec<FillableGap> {
        let mut out = Vec::new();
        for item in &self.items {
            match item {
                RenderItem::Gap(span) => out.push(FillableGap {
                    span: *span,
                    parent_id: None,
                }),
                RenderItem::FixedContainer { event, nested, .. } => {
                    out.extend(nested.iter().filter_map(|n| match n {
                        NestedItem::InnerGap(span) => Some(FillableGap {
                            span: *span,
                            parent_id: Some(event.id),
                        }),
                        NestedItem::SubTask { .. } => None,
                    }))
                }
                RenderItem::FreeTask { .. } => {}
            }
        }
        out
    }

    pub fn gap_starting_at(&self, minute: u32) -> Option<FillableGap> {
        self.gaps().into_iter().find(|g| g.span.start == minute)
    }
}

// Split an entity's raw times into day spans.
//
// start <= end -> [start, end]
// start >  end -> crosses midnight: [start, 1440] and [0, end]
fn day_spans<T: Timed>(entity: &T) -> Result<Vec<TimeSpan>, LayoutError> {
    let bad_format = |source| LayoutError::Format {
        entity_id: entity.id(),
        source,
    };
    let start = parse_hhmm(entity.start_time()).map_err(bad_format)?;
    let end = parse_hhmm(entity.end_time()).map_err(bad_format)?;

    for (label, value) in [("start", start), ("end", end)] {
        if value > DAY_MINUTES {
            return Err(LayoutError::InvariantViolation {
                entity_id: entity.id(),
                detail: format!("{label} minute {value} lies beyond 24:00"),
            });
        }
    }

    if start <= end {
        Ok(vec![TimeSpan::new(start, end)])
    } else {
        Ok(vec![
            TimeSpan::new(start, DAY_MINUTES),
            TimeSpan::new(0, end),
        ])
    }
}

/// Normalize entities into day spans. A midnight-crossing entity shows up
/// twice; an entity with bad times is reported and left out.
pub fn normalize<T: Timed>(entities: &[T]) -> (Vec<Placed<'_, T>>, Vec<LayoutError>) {
    let mut placed = Vec::with_capacity(entities.len());
    let mut errors = Vec::new();

    for entity in entities {
        match day_spans(entity) {
            Ok(spans) => placed.extend(spans.into_iter().map(|span| Placed { entity, span })),
            Err(e) => errors.push(e),
        }
    }

    (placed, errors)
}

// Gap synthesis. Walk `region` with a pointer and put a gap in front of
// every occupant that starts past the pointer, plus one trailing gap.
// Occupants must be sorted by start.
fn weave<T>(
    region: TimeSpan,
    occupants: impl IntoIterator<Item = (TimeSpan, T)>,
    gap: impl Fn(TimeSpan) -> T,
) -> Vec<T> {
    let mut out = Vec::new();
    let mut pointer = region.start;

    for (span, item) in occupants {
        if span.start > pointer {
            out.push(gap(TimeSpan::new(pointer, span.start)));
        }
        out.push(item);
        pointer = pointer.max(span.end);
    }

    if pointer < region.end {
        out.push(gap(TimeSpan::new(pointer, region.end)));
    }
    out
}

// Remove and return every pooled block span lying entirely inside `region`.
// Order is kept on both sides.
fn take_within<'a>(
    pool: &mut Vec<Placed<'a, ScheduledBlock>>,
    region: TimeSpan,
) -> Vec<Placed<'a, ScheduledBlock>> {
    let (inside, rest): (Vec<_>, Vec<_>) =
        pool.drain(..).partition(|b| region.contains(b.span));
    *pool = rest;
    inside
}

fn lay_out_free_region<'a>(
    region: TimeSpan,
    pool: &mut Vec<Placed<'a, ScheduledBlock>>,
    items: &mut Vec<RenderItem<'a>>,
) {
    if region.is_empty() {
        return;
    }
    let free = take_within(pool, region);
    let occupants = free.into_iter().map(|b| {
        (
            b.span,
            RenderItem::FreeTask {
                block: b.entity,
                span: b.span,
            },
        )
    });
    items.extend(weave(region, occupants, RenderItem::Gap));
}

fn lay_out_container<'a>(
    fixed: &Placed<'a, FixedEvent>,
    pool: &mut Vec<Placed<'a, ScheduledBlock>>,
) -> RenderItem<'a> {
    let occupants = take_within(pool, fixed.span).into_iter().map(|b| {
        (
            b.span,
            NestedItem::SubTask {
                block: b.entity,
                span: b.span,
            },
        )
    });

    // do-not-disturb: sub-tasks only, never inner gaps
    let nested = if fixed.entity.do_not_disturb {
        occupants.map(|(_, item)| item).collect()
    } else {
        weave(fixed.span, occupants, NestedItem::InnerGap)
    };

    RenderItem::FixedContainer {
        event: fixed.entity,
        span: fixed.span,
        nested,
    }
}

// Overlapping fixed events are allowed but almost always a data mistake.
// `fixed` must be sorted by start.
fn warn_on_overlaps(fixed: &[Placed<'_, FixedEvent>]) {
    let mut reach: Option<&Placed<'_, FixedEvent>> = None;
    for f in fixed {
        if let Some(r) = reach {
            if r.span.overlaps(f.span) {
                warn!(
                    first = %r.entity.id,
                    second = %f.entity.id,
                    "fixed events '{}' and '{}' overlap; nested blocks go to the earlier one",
                    r.entity.title,
                    f.entity.title
                );
            }
            if f.span.end <= r.span.end {
                continue;
            }
        }
        reach = Some(f);
    }
}

/// Lay out one day.
///
/// Process:
/// - Normalize fixed events and blocks into day spans (midnight split)
/// - Walk fixed events in start order; free time before each one holds
///   free-standing blocks and gaps
/// - Each fixed event claims the still-unassigned blocks inside it
/// - Blocks that end up nowhere are reported as unplaced
pub fn compute_timeline_layout<'a>(
    fixed_events: &'a [FixedEvent],
    blocks: &'a [ScheduledBlock],
) -> TimelineLayout<'a> {
    let (mut fixed, mut errors) = normalize(fixed_events);
    fixed.retain(|f| !f.span.is_empty());
    fixed.sort_by_key(|f| f.span.start);
    warn_on_overlaps(&fixed);

    let (mut pool, block_errors) = normalize(blocks);
    errors.extend(block_errors);
    pool.retain(|b| !b.span.is_empty());
    pool.sort_by_key(|b| b.span.start);

    let mut items = Vec::new();
    let mut pointer = 0;

    for f in &fixed {
        if f.span.start > pointer {
            lay_out_free_region(TimeSpan::new(pointer, f.span.start), &mut pool, &mut items);
        }
        items.push(lay_out_container(f, &mut pool));
        pointer = pointer.max(f.span.end);
    }
    lay_out_free_region(TimeSpan::new(pointer, DAY_MINUTES), &mut pool, &mut items);

    let unplaced: Vec<UnplacedBlock> = pool
        .into_iter()
        .map(|b| UnplacedBlock {
            block_id: b.entity.id,
            span: b.span,
            reason: "straddles_fixed_event",
        })
        .collect();

    for e in &errors {
        warn!(entity = %e.entity_id(), kind = e.kind(), "left out of timeline: {e}");
    }
    for u in &unplaced {
        warn!(block = %u.block_id, "block crosses a fixed event boundary; not placed");
    }

    TimelineLayout {
        items,
        errors,
        unplaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimeError;
    use crate::time::format_hhmm;
    use chrono::DateTime;
    use proptest::prelude::*;

    fn fixed(title: &str, start: &str, end: &str) -> FixedEvent {
        FixedEvent {
            id: Uuid::new_v4(),
            title: title.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            do_not_disturb: false,
        }
    }

    fn quiet(title: &str, start: &str, end: &str) -> FixedEvent {
        FixedEvent {
            do_not_disturb: true,
            ..fixed(title, start, end)
        }
    }

    fn block(title: &str, start: &str, end: &str) -> ScheduledBlock {
        ScheduledBlock::planned(
            title.to_string(),
            start.to_string(),
            end.to_string(),
            DateTime::parse_from_rfc3339("2026-01-05T08:00:00+09:00").unwrap(),
        )
    }

    fn span(start: u32, end: u32) -> TimeSpan {
        TimeSpan::new(start, end)
    }

    fn top_spans(layout: &TimelineLayout<'_>) -> Vec<TimeSpan> {
        layout.items.iter().map(RenderItem::span).collect()
    }

    fn nested_of<'l, 'a>(item: &'l RenderItem<'a>) -> &'l [NestedItem<'a>] {
        match item {
            RenderItem::FixedContainer { nested, .. } => nested,
            other => panic!("expected container, got {other:?}"),
        }
    }

    #[test]
    fn empty_day_is_one_gap() {
        let layout = compute_timeline_layout(&[], &[]);
        assert_eq!(layout.items, vec![RenderItem::Gap(span(0, 1440))]);
        assert!(layout.errors.is_empty());
        assert!(layout.unplaced.is_empty());
    }

    #[test]
    fn midnight_event_opens_and_closes_the_day() {
        let events = vec![fixed("Sleep", "23:00", "00:30")];
        let layout = compute_timeline_layout(&events, &[]);

        assert_eq!(
            top_spans(&layout),
            vec![span(0, 30), span(30, 1380), span(1380, 1440)]
        );
        for idx in [0, 2] {
            match &layout.items[idx] {
                RenderItem::FixedContainer { event, .. } => assert_eq!(event.id, events[0].id),
                other => panic!("expected container, got {other:?}"),
            }
        }
    }

    #[test]
    fn midnight_block_is_split_into_two_free_tasks() {
        let blocks = vec![block("Stargazing", "23:30", "00:15")];
        let layout = compute_timeline_layout(&[], &blocks);

        assert_eq!(
            layout.items,
            vec![
                RenderItem::FreeTask {
                    block: &blocks[0],
                    span: span(0, 15)
                },
                RenderItem::Gap(span(15, 1410)),
                RenderItem::FreeTask {
                    block: &blocks[0],
                    span: span(1410, 1440)
                },
            ]
        );
    }

    #[test]
    fn block_inside_fixed_event_is_a_sub_task() {
        let events = vec![fixed("Work", "09:00", "12:00")];
        let blocks = vec![block("Standup", "09:15", "09:45")];
        let layout = compute_timeline_layout(&events, &blocks);

        assert_eq!(
            top_spans(&layout),
            vec![span(0, 540), span(540, 720), span(720, 1440)]
        );
        assert!(
            !layout
                .items
                .iter()
                .any(|i| matches!(i, RenderItem::FreeTask { .. }))
        );
        assert_eq!(
            nested_of(&layout.items[1]),
            &[
                NestedItem::InnerGap(span(540, 555)),
                NestedItem::SubTask {
                    block: &blocks[0],
                    span: span(555, 585)
                },
                NestedItem::InnerGap(span(585, 720)),
            ]
        );
    }

    #[test]
    fn containment_ignores_stale_parent_id() {
        let events = vec![fixed("Work", "09:00", "12:00")];
        let mut b = block("Lunch walk", "12:30", "13:00");
        b.parent_id = Some(events[0].id);
        let blocks = vec![b];
        let layout = compute_timeline_layout(&events, &blocks);

        assert_eq!(layout.items[2], RenderItem::Gap(span(720, 750)));
        assert_eq!(
            layout.items[3],
            RenderItem::FreeTask {
                block: &blocks[0],
                span: span(750, 780)
            }
        );
        assert_eq!(nested_of(&layout.items[1]), &[NestedItem::InnerGap(span(540, 720))]);
    }

    #[test]
    fn do_not_disturb_suppresses_inner_gaps() {
        let blocks = vec![block("Focus sprint", "10:00", "10:30")];

        let open = vec![fixed("Deep Work", "09:00", "12:00")];
        let open_layout = compute_timeline_layout(&open, &blocks);
        let open_gaps = nested_of(&open_layout.items[1])
            .iter()
            .filter(|n| matches!(n, NestedItem::InnerGap(_)))
            .count();
        assert!(open_gaps >= 1);

        let closed = vec![quiet("Deep Work", "09:00", "12:00")];
        let closed_layout = compute_timeline_layout(&closed, &blocks);
        assert_eq!(
            nested_of(&closed_layout.items[1]),
            &[NestedItem::SubTask {
                block: &blocks[0],
                span: span(600, 630)
            }]
        );
        // top-level gaps are unaffected
        assert_eq!(closed_layout.items[0], RenderItem::Gap(span(0, 540)));
        assert_eq!(closed_layout.items[2], RenderItem::Gap(span(720, 1440)));
    }

    #[test]
    fn layout_is_idempotent() {
        let events = vec![
            fixed("Sleep", "23:00", "07:00"),
            fixed("Work", "09:00", "18:00"),
        ];
        let blocks = vec![
            block("Email", "09:00", "09:15"),
            block("Run", "07:30", "08:15"),
        ];
        let first = compute_timeline_layout(&events, &blocks);
        let second = compute_timeline_layout(&events, &blocks);
        assert_eq!(first, second);
    }

    #[test]
    fn filling_part_of_a_gap_leaves_the_rest() {
        let events = vec![
            fixed("Commute", "08:00", "10:00"),
            fixed("Class", "11:00", "12:00"),
        ];
        let before = compute_timeline_layout(&events, &[]);
        assert_eq!(before.items[2], RenderItem::Gap(span(600, 660)));

        let blocks = vec![block("Read", "10:00", "10:30")];
        let after = compute_timeline_layout(&events, &blocks);
        assert_eq!(
            after.items[2],
            RenderItem::FreeTask {
                block: &blocks[0],
                span: span(600, 630)
            }
        );
        assert_eq!(after.items[3], RenderItem::Gap(span(630, 660)));
    }

    #[test]
    fn overlapping_fixed_events_first_one_wins() {
        let events = vec![
            fixed("Inner", "10:00", "11:00"),
            fixed("Outer", "09:00", "12:00"),
        ];
        let blocks = vec![block("Call", "10:15", "10:30")];
        let layout = compute_timeline_layout(&events, &blocks);

        let outer = &layout.items[1];
        let inner = &layout.items[2];
        assert_eq!(outer.span(), span(540, 720));
        assert_eq!(inner.span(), span(600, 660));
        assert!(
            nested_of(outer)
                .iter()
                .any(|n| matches!(n, NestedItem::SubTask { .. }))
        );
        assert_eq!(nested_of(inner), &[NestedItem::InnerGap(span(600, 660))]);
        assert_eq!(layout.items[3], RenderItem::Gap(span(720, 1440)));
    }

    #[test]
    fn block_across_a_fixed_boundary_is_reported() {
        let events = vec![fixed("Meeting", "09:00", "10:00")];
        let blocks = vec![block("Overrun", "08:30", "09:30")];
        let layout = compute_timeline_layout(&events, &blocks);

        assert_eq!(
            top_spans(&layout),
            vec![span(0, 540), span(540, 600), span(600, 1440)]
        );
        assert_eq!(
            layout.unplaced,
            vec![UnplacedBlock {
                block_id: blocks[0].id,
                span: span(510, 570),
                reason: "straddles_fixed_event",
            }]
        );
    }

    #[test]
    fn bad_entity_does_not_blank_the_day() {
        let events = vec![fixed("Broken", "9am", "10:00"), fixed("Gym", "18:00", "19:00")];
        let blocks = vec![block("Read", "20:00", "20:30")];
        let layout = compute_timeline_layout(&events, &blocks);

        assert_eq!(
            layout.errors,
            vec![LayoutError::Format {
                entity_id: events[0].id,
                source: TimeError::MissingSeparator("9am".to_string()),
            }]
        );
        assert_eq!(
            top_spans(&layout),
            vec![
                span(0, 1080),
                span(1080, 1140),
                span(1140, 1200),
                span(1200, 1230),
                span(1230, 1440)
            ]
        );
    }

    #[test]
    fn times_beyond_midnight_are_invariant_violations() {
        let blocks = vec![block("Impossible", "25:00", "26:00")];
        let layout = compute_timeline_layout(&[], &blocks);

        assert_eq!(layout.errors.len(), 1);
        assert_eq!(layout.errors[0].kind(), "invariant_violation");
        assert_eq!(layout.errors[0].entity_id(), blocks[0].id);
        assert_eq!(layout.items, vec![RenderItem::Gap(span(0, 1440))]);
    }

    #[test]
    fn zero_length_pieces_are_dropped() {
        let events = vec![fixed("Evening", "22:00", "00:00")];
        let blocks = vec![block("Blink", "12:00", "12:00")];
        let layout = compute_timeline_layout(&events, &blocks);

        assert_eq!(top_spans(&layout), vec![span(0, 1320), span(1320, 1440)]);
        assert!(layout.unplaced.is_empty());
    }

    #[test]
    fn end_of_day_sentinel_is_accepted() {
        let events = vec![fixed("Wind down", "22:00", "24:00")];
        let layout = compute_timeline_layout(&events, &[]);
        assert_eq!(top_spans(&layout), vec![span(0, 1320), span(1320, 1440)]);
    }

    #[test]
    fn fillable_gaps_carry_their_container() {
        let events = vec![
            fixed("Work", "09:00", "12:00"),
            quiet("Nap", "13:00", "14:00"),
        ];
        let layout = compute_timeline_layout(&events, &[]);

        assert_eq!(
            layout.gap_starting_at(540),
            Some(FillableGap {
                span: span(540, 720),
                parent_id: Some(events[0].id)
            })
        );
        assert_eq!(
            layout.gap_starting_at(720),
            Some(FillableGap {
                span: span(720, 780),
                parent_id: None
            })
        );
        assert_eq!(layout.gap_starting_at(780), None);
        assert_eq!(layout.gaps().len(), 4);
    }

    #[test]
    fn normalize_reports_per_entity() {
        let events = vec![fixed("A", "08:00", "09:00"), fixed("B", "xx:00", "09:00")];
        let (placed, errors) = normalize(&events);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].span, span(480, 540));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].entity_id(), events[1].id);
    }

    // Random partition of the day into fixed events, free blocks and empty time.
    fn day_partition() -> impl Strategy<Value = (Vec<FixedEvent>, Vec<ScheduledBlock>)> {
        (
            prop::collection::btree_set(1u32..DAY_MINUTES, 0..16),
            prop::collection::vec(0u8..5, 17),
        )
            .prop_map(|(cuts, kinds)| {
                let mut bounds = vec![0];
                bounds.extend(cuts);
                bounds.push(DAY_MINUTES);

                let mut events = Vec::new();
                let mut blocks = Vec::new();
                for (i, pair) in bounds.windows(2).enumerate() {
                    let (a, b) = (pair[0], pair[1]);
                    let (start, end) = (format_hhmm(a), format_hhmm(b));
                    match kinds[i] {
                        1 => events.push(fixed("F", &start, &end)),
                        2 => blocks.push(block("B", &start, &end)),
                        3 | 4 => {
                            let mut event = fixed("F", &start, &end);
                            event.do_not_disturb = kinds[i] == 4;
                            events.push(event);
                            let mid = a + (b - a) / 2;
                            if mid > a {
                                blocks.push(block("S", &start, &format_hhmm(mid)));
                            }
                        }
                        _ => {}
                    }
                }
                (events, blocks)
            })
    }

    proptest! {
        #[test]
        fn top_level_covers_the_whole_day((events, blocks) in day_partition()) {
            let layout = compute_timeline_layout(&events, &blocks);
            prop_assert!(layout.errors.is_empty());
            prop_assert!(layout.unplaced.is_empty());

            let spans = top_spans(&layout);
            prop_assert_eq!(spans.first().map(|s| s.start), Some(0));
            prop_assert_eq!(spans.last().map(|s| s.end), Some(DAY_MINUTES));
            for pair in spans.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }

            let mut placed_blocks = 0;
            for item in &layout.items {
                match item {
                    RenderItem::FreeTask { .. } => placed_blocks += 1,
                    RenderItem::FixedContainer { event, span, nested } => {
                        placed_blocks += nested
                            .iter()
                            .filter(|n| matches!(n, NestedItem::SubTask { .. }))
                            .count();
                        if !event.do_not_disturb {
                            let inner: Vec<TimeSpan> = nested.iter().map(NestedItem::span).collect();
                            prop_assert_eq!(inner.first().map(|s| s.start), Some(span.start));
                            prop_assert_eq!(inner.last().map(|s| s.end), Some(span.end));
                            for pair in inner.windows(2) {
                                prop_assert_eq!(pair[0].end, pair[1].start);
                            }
                        } else {
                            prop_assert!(
                                nested.iter().all(|n| matches!(n, NestedItem::SubTask { .. })),
                                "do-not-disturb container produced an inner gap"
                            );
                        }
                    }
                    RenderItem::Gap(_) => {}
                }
            }
            prop_assert_eq!(placed_blocks, blocks.len());

            prop_assert_eq!(&layout, &compute_timeline_layout(&events, &blocks));
        }
    }

    // Arbitrary days: fixed events and blocks may cross midnight, overlap
    // each other or straddle a fixed event's boundary.
    fn messy_day() -> impl Strategy<Value = (Vec<FixedEvent>, Vec<ScheduledBlock>)> {
        let times = (0u32..DAY_MINUTES, 0u32..=DAY_MINUTES);
        (
            prop::collection::vec((times.clone(), any::<bool>()), 0..6),
            prop::collection::vec(times, 0..10),
        )
            .prop_map(|(events, blocks)| {
                let events = events
                    .into_iter()
                    .map(|((a, b), dnd)| FixedEvent {
                        do_not_disturb: dnd,
                        ..fixed("F", &format_hhmm(a), &format_hhmm(b))
                    })
                    .collect();
                let blocks = blocks
                    .into_iter()
                    .map(|(a, b)| block("B", &format_hhmm(a), &format_hhmm(b)))
                    .collect();
                (events, blocks)
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn messy_days_stay_covered_ordered_and_accounted((events, blocks) in messy_day()) {
            let layout = compute_timeline_layout(&events, &blocks);
            prop_assert!(layout.errors.is_empty());

            // top level: non-decreasing starts, no hole anywhere in the day
            let spans = top_spans(&layout);
            let mut reach = 0;
            for (i, s) in spans.iter().enumerate() {
                if i > 0 {
                    prop_assert!(spans[i - 1].start <= s.start, "top-level starts went backwards");
                }
                prop_assert!(s.start <= reach, "hole before minute {}", s.start);
                reach = reach.max(s.end);
            }
            prop_assert_eq!(reach, DAY_MINUTES);

            let mut placed_pieces = 0;
            for item in &layout.items {
                match item {
                    RenderItem::FreeTask { .. } => placed_pieces += 1,
                    RenderItem::FixedContainer { event, span, nested } => {
                        for (i, n) in nested.iter().enumerate() {
                            prop_assert!(span.contains(n.span()), "nested item leaks out of its container");
                            if i > 0 {
                                prop_assert!(nested[i - 1].span().start <= n.span().start, "nested starts went backwards");
                            }
                            match n {
                                NestedItem::SubTask { .. } => placed_pieces += 1,
                                NestedItem::InnerGap(_) => prop_assert!(
                                    !event.do_not_disturb,
                                    "do-not-disturb container produced an inner gap"
                                ),
                            }
                        }
                    }
                    RenderItem::Gap(_) => {}
                }
            }

            // every non-empty block piece is placed once or reported unplaced
            let pieces = normalize(&blocks).0.iter().filter(|p| !p.span.is_empty()).count();
            prop_assert_eq!(placed_pieces + layout.unplaced.len(), pieces);

            prop_assert_eq!(&layout, &compute_timeline_layout(&events, &blocks));
        }
    }
}
