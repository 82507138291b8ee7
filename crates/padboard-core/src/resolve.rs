//! Directional focus resolution over screen rectangles.
//!
//! Two passes. The primary pass only looks at candidates whose center lies
//! strictly ahead of the active center. Horizontal moves additionally require
//! the candidate's vertical span to contain the active center (rows must line
//! up); vertical moves instead pay a penalty for horizontal misalignment,
//! since columns on a keyboard are ragged. When nothing is ahead, the wrap
//! pass picks the candidate furthest in the opposite direction among those
//! overlapping the active element on the cross axis, so holding a direction
//! cycles through a row or column instead of stopping at the edge.

use crate::focus::{ElementId, GeometrySource};
use crate::geometry::{Axis, Rect};
use crate::input::Direction;

/// Weight of the cross-axis misalignment relative to the travel distance.
pub const CROSS_AXIS_PENALTY: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Primary(usize),
    Wrapped(usize),
}

impl Resolution {
    pub fn index(self) -> usize {
        match self {
            Resolution::Primary(i) | Resolution::Wrapped(i) => i,
        }
    }
}

/// Index into `candidates` of the element to focus next, or `None` to stay
/// put. A candidate whose rectangle equals `active` is treated as the active
/// element itself and skipped.
pub fn resolve(active: Rect, candidates: &[Rect], direction: Direction) -> Option<usize> {
    resolve_detailed(active, candidates, direction).map(Resolution::index)
}

pub fn resolve_detailed(
    active: Rect,
    candidates: &[Rect],
    direction: Direction,
) -> Option<Resolution> {
    let primary = primary_pass(active, candidates, direction);
    let wrapped = wrap_pass(active, candidates, direction);
    primary
        .map(Resolution::Primary)
        .or(wrapped.map(Resolution::Wrapped))
}

/// Cost of moving from `active` to `rect`, or `None` if `rect` is not ahead.
pub fn primary_score(active: Rect, rect: Rect, direction: Direction) -> Option<f32> {
    let axis = direction.axis();
    let cross = axis.cross();
    let origin = active.center();

    let ahead = (rect.center().along(axis) - origin.along(axis)) * direction.sign();
    if ahead <= 0.0 {
        return None;
    }

    let cross_span = rect.span(cross);
    let penalty = match axis {
        Axis::Horizontal => {
            if !cross_span.contains(origin.along(cross)) {
                return None;
            }
            0.0
        }
        Axis::Vertical => cross_span.distance_to(origin.along(cross)),
    };

    Some(ahead + penalty * CROSS_AXIS_PENALTY)
}

fn primary_pass(active: Rect, candidates: &[Rect], direction: Direction) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, rect) in candidates.iter().enumerate() {
        if *rect == active {
            continue;
        }
        let Some(score) = primary_score(active, *rect, direction) else {
            continue;
        };
        if best.is_none_or(|(_, s)| score < s) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

fn wrap_pass(active: Rect, candidates: &[Rect], direction: Direction) -> Option<usize> {
    let axis = direction.axis();
    let lane = active.span(axis.cross());

    // Furthest against the direction of travel has the smallest signed key.
    let mut best: Option<(usize, f32)> = None;
    for (i, rect) in candidates.iter().enumerate() {
        if *rect == active || !rect.span(axis.cross()).overlaps(&lane) {
            continue;
        }
        let key = rect.center().along(axis) * direction.sign();
        if best.is_none_or(|(_, k)| key < k) {
            best = Some((i, key));
        }
    }
    best.map(|(i, _)| i)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub element: ElementId,
    pub wrapped: bool,
}

/// Resolves over live elements. Geometry is queried fresh; elements the
/// source no longer knows are skipped, and an unknown `active` resolves to
/// nothing.
pub fn resolve_element<G: GeometrySource + ?Sized>(
    geometry: &G,
    active: ElementId,
    candidates: &[ElementId],
    direction: Direction,
) -> Option<Resolved> {
    let active_rect = geometry.rect(active)?;
    let (ids, rects): (Vec<ElementId>, Vec<Rect>) = candidates
        .iter()
        .filter(|&&el| el != active)
        .filter_map(|&el| geometry.rect(el).map(|r| (el, r)))
        .unzip();

    let resolution = resolve_detailed(active_rect, &rects, direction)?;
    Some(Resolved {
        element: ids[resolution.index()],
        wrapped: matches!(resolution, Resolution::Wrapped(_)),
    })
}
