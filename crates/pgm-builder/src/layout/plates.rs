//! Plate placement.
//!
//! Each plate is first bounded around its members on its own. Plates that
//! share members are then visited pairwise, each plate against the later
//! ones from the last declared back, and adjusted so that nested plates are drawn inside each other and partially
//! overlapping plates do not share borders.

use indexmap::IndexSet;
use log::debug;

use pgm_builder_core::geometry::{Bounds, Insets, Point, Rect, round_hundredths};

use super::PlateLayout;
use crate::{
    config::LayoutConfig,
    error::PgmError,
    pgm::{NodeId, Pgm},
    structure::DiagramStructure,
};

/// How much the later plate of a partial overlap drops its bottom edge.
const PARTIAL_OVERLAP_DROP: f32 = 0.2;

/// How much the earlier plate of a partial overlap raises its top edge.
const PARTIAL_OVERLAP_RISE: f32 = 0.1;

/// The relation between two plates sharing members, and how it was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapCase {
    /// Same members; the later plate surrounds the earlier.
    Identical,
    /// The earlier plate has every member of the later one, and more. It surrounds the later.
    Contains,
    /// The later plate has every member of the earlier one, and more. It surrounds the earlier.
    ContainedBy,
    /// Each plate has members the other lacks; both are stretched apart vertically.
    Partial,
}

/// A plate while it is being laid out.
#[derive(Debug, Clone)]
pub(crate) struct PlateFrame<'a> {
    members: &'a IndexSet<NodeId>,
    bounds: Bounds,
    rect: Rect,
}

impl<'a> PlateFrame<'a> {
    /// Bounds `members` at `positions`, or `None` if there are no members.
    pub fn bound(
        members: &'a IndexSet<NodeId>,
        positions: &[Point],
        margins: Insets,
    ) -> Option<Self> {
        let points = members
            .iter()
            .filter_map(|id| positions.get(id.index()).copied());
        let (bounds, rect) = bound_points(points, margins)?;
        Some(Self {
            members,
            bounds,
            rect,
        })
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Returns `true` if the plates share at least one member.
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.members.is_disjoint(other.members)
    }

    /// Adjusts two overlapping plates, `self` being the one declared first.
    pub fn resolve_overlap(&mut self, other: &mut Self, margin: f32) -> OverlapCase {
        if self.members == other.members {
            other.rect = surround(other.rect, self.rect, margin);
            OverlapCase::Identical
        } else if other.members.is_subset(self.members) {
            self.rect = surround(self.rect, other.rect, margin);
            OverlapCase::Contains
        } else if self.members.is_subset(other.members) {
            other.rect = surround(other.rect, self.rect, margin);
            OverlapCase::ContainedBy
        } else {
            other.rect = other
                .rect
                .adjust(0.0, -PARTIAL_OVERLAP_DROP, 0.0, PARTIAL_OVERLAP_DROP);
            self.rect = self.rect.adjust(0.0, 0.0, 0.0, PARTIAL_OVERLAP_RISE);
            OverlapCase::Partial
        }
    }

    fn into_layout(self) -> PlateLayout {
        PlateLayout {
            bounds: self.bounds,
            rect: self.rect,
        }
    }
}

/// Bounds `points` and expands the bounds by `margins`.
///
/// Returns `None` for an empty set of points.
pub(crate) fn bound_points(
    points: impl IntoIterator<Item = Point>,
    margins: Insets,
) -> Option<(Bounds, Rect)> {
    let bounds = Bounds::from_points(points)?;
    Some((bounds, bounds.expand(margins)))
}

/// Grows `outer` by `margin` on every edge it shares with `inner`.
///
/// Edges are compared after rounding to hundredths. When both side edges
/// are shared the plate grows at the bottom and the top, whether or not
/// those edges are shared.
pub(crate) fn surround(outer: Rect, inner: Rect, margin: f32) -> Rect {
    let same = |a: f32, b: f32| round_hundredths(a) == round_hundredths(b);
    let left = same(outer.x(), inner.x());
    let right = same(outer.right(), inner.right());
    let bottom = same(outer.y(), inner.y());
    let top = same(outer.top(), inner.top());

    let mut rect = outer;
    if left {
        rect = rect.adjust(-margin, 0.0, margin, 0.0);
    }
    if right {
        rect = rect.adjust(0.0, 0.0, margin, 0.0);
    }
    if left && right {
        rect = rect.adjust(0.0, -margin, 0.0, 2.0 * margin);
    } else {
        if bottom {
            rect = rect.adjust(0.0, -margin, 0.0, margin);
        }
        if top {
            rect = rect.adjust(0.0, 0.0, 0.0, margin);
        }
    }
    rect
}

/// Bounds every plate and resolves overlaps between them.
///
/// # Errors
///
/// Returns [`PgmError::EmptyPlate`] for a plate without members.
pub(super) fn place_plates(
    pgm: &Pgm,
    structure: &DiagramStructure,
    positions: &[Point],
    config: &LayoutConfig,
) -> Result<Vec<PlateLayout>, PgmError> {
    let mut frames = structure
        .plates()
        .map(|(plate_id, members)| {
            PlateFrame::bound(members, positions, config.plate_margins()).ok_or_else(|| {
                PgmError::EmptyPlate {
                    label: pgm.plate_label(plate_id).unwrap_or_default().to_string(),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    resolve_overlaps(&mut frames, config.surround_margin());
    Ok(frames.into_iter().map(PlateFrame::into_layout).collect())
}

/// Resolves every overlapping pair of plates in place.
///
/// Each plate is paired with the plates declared after it, last one first.
/// The rectangle of a plate surrounding several others depends on this order.
pub(crate) fn resolve_overlaps(frames: &mut [PlateFrame<'_>], margin: f32) {
    for first in 0..frames.len() {
        for second in (first + 1..frames.len()).rev() {
            let Ok([a, b]) = frames.get_disjoint_mut([first, second]) else {
                continue;
            };
            if !a.overlaps(b) {
                continue;
            }
            let case = a.resolve_overlap(b, margin);
            debug!(
                first,
                second,
                case:?,
                first_rect:? = a.rect(),
                second_rect:? = b.rect();
                "Resolved plate overlap"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    const MARGIN: f32 = 0.15;

    fn ids(indices: &[usize]) -> IndexSet<NodeId> {
        indices.iter().copied().map(NodeId::new).collect()
    }

    fn margins() -> Insets {
        LayoutConfig::default().plate_margins()
    }

    fn frame<'a>(members: &'a IndexSet<NodeId>, positions: &[Point]) -> PlateFrame<'a> {
        PlateFrame::bound(members, positions, margins()).unwrap()
    }

    fn assert_rect(rect: Rect, x: f32, y: f32, width: f32, height: f32) {
        assert_approx_eq!(f32, rect.x(), x, epsilon = 1e-4);
        assert_approx_eq!(f32, rect.y(), y, epsilon = 1e-4);
        assert_approx_eq!(f32, rect.width(), width, epsilon = 1e-4);
        assert_approx_eq!(f32, rect.height(), height, epsilon = 1e-4);
    }

    #[test]
    fn test_bound_points() {
        let (bounds, rect) =
            bound_points([Point::new(0.0, 0.0), Point::new(1.0, 2.0)], margins()).unwrap();

        assert_approx_eq!(f32, bounds.max_y(), 2.0);
        assert_rect(rect, -0.4, -0.35, 2.2, 3.1);
        assert!(bound_points([], margins()).is_none());
    }

    #[test]
    fn test_surround_no_shared_edges() {
        let outer = Rect::new(0.0, 0.0, 4.0, 4.0);
        let inner = Rect::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(surround(outer, inner, MARGIN), outer);
    }

    #[test]
    fn test_surround_shared_left_and_bottom() {
        let outer = Rect::new(0.0, 0.0, 4.0, 4.0);
        let inner = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert_rect(surround(outer, inner, MARGIN), -0.15, -0.15, 4.15, 4.15);
    }

    #[test]
    fn test_surround_shared_right_and_top() {
        let outer = Rect::new(0.0, 0.0, 4.0, 4.0);
        let inner = Rect::new(2.0, 2.0, 2.0, 2.0);
        assert_rect(surround(outer, inner, MARGIN), 0.0, 0.0, 4.15, 4.15);
    }

    #[test]
    fn test_surround_shared_sides_doubles_vertical_growth() {
        let outer = Rect::new(0.0, 0.0, 4.0, 4.0);
        let inner = Rect::new(0.0, 1.0, 4.0, 1.0);
        assert_rect(surround(outer, inner, MARGIN), -0.15, -0.15, 4.3, 4.3);
    }

    #[test]
    fn test_surround_rounds_before_comparing() {
        let outer = Rect::new(0.0, 0.0, 4.0, 4.0);
        let inner = Rect::new(0.001, 1.0, 1.0, 1.0);
        assert_rect(surround(outer, inner, MARGIN), -0.15, 0.0, 4.15, 4.0);
    }

    #[test]
    fn test_overlap_cases() {
        let positions = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        let (a, b) = (ids(&[0, 1]), ids(&[1, 0]));
        let (mut first, mut second) = (frame(&a, &positions), frame(&b, &positions));
        assert_eq!(first.resolve_overlap(&mut second, MARGIN), OverlapCase::Identical);
        assert_eq!(first.rect(), frame(&a, &positions).rect());
        assert!(second.rect().encloses(first.rect()));

        let (a, b) = (ids(&[0, 1]), ids(&[1]));
        let (mut first, mut second) = (frame(&a, &positions), frame(&b, &positions));
        assert_eq!(first.resolve_overlap(&mut second, MARGIN), OverlapCase::Contains);
        assert!(first.rect().encloses(second.rect()));

        let (a, b) = (ids(&[1]), ids(&[0, 1]));
        let (mut first, mut second) = (frame(&a, &positions), frame(&b, &positions));
        assert_eq!(first.resolve_overlap(&mut second, MARGIN), OverlapCase::ContainedBy);
        assert!(second.rect().encloses(first.rect()));
        assert_eq!(first.rect(), frame(&a, &positions).rect());
    }

    #[test]
    fn test_partial_overlap() {
        let positions = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        let (a, b) = (ids(&[0, 1]), ids(&[1, 2]));
        let mut first = frame(&a, &positions);
        let mut second = frame(&b, &positions);
        let (before_first, before_second) = (first.rect(), second.rect());

        assert!(first.overlaps(&second));
        assert_eq!(first.resolve_overlap(&mut second, MARGIN), OverlapCase::Partial);

        assert_approx_eq!(f32, second.rect().y(), before_second.y() - 0.2);
        assert_approx_eq!(f32, second.rect().height(), before_second.height() + 0.2);
        assert_approx_eq!(f32, first.rect().height(), before_first.height() + 0.1);
        assert_approx_eq!(f32, first.rect().y(), before_first.y());
    }

    #[test]
    fn test_outer_plate_meets_later_plates_last_first() {
        let positions = [
            Point::new(0.0, 1.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 2.0),
        ];
        let (outer, sides, bottom) = (ids(&[0, 1, 2, 3]), ids(&[0, 1]), ids(&[2]));
        let mut frames = vec![
            frame(&outer, &positions),
            frame(&sides, &positions),
            frame(&bottom, &positions),
        ];

        resolve_overlaps(&mut frames, MARGIN);

        // The bottom plate drops the outer bottom edge first, then the side
        // plate still matches both sides and drops it again.
        assert_rect(frames[0].rect(), -0.55, -0.65, 3.5, 3.55);
        assert_rect(frames[1].rect(), -0.4, 0.65, 3.2, 1.1);
        assert_rect(frames[2].rect(), 0.6, -0.35, 1.2, 1.1);
    }

    #[test]
    fn test_disjoint_plates_do_not_overlap() {
        let positions = [Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        let (a, b) = (ids(&[0]), ids(&[1]));
        let first = frame(&a, &positions);
        let second = frame(&b, &positions);
        assert!(!first.overlaps(&second));
    }
}
