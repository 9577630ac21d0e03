//! Geometric primitives for PGM layout.
//!
//! All values are in grid units of the rendering canvas, not pixels.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate
//! - [`Size`] - Width and height of the canvas
//! - [`Bounds`] - The extent of a set of points (min/max on both axes)
//! - [`Rect`] - A rectangle anchored at its lower-left corner, as plates are drawn
//! - [`Insets`] - Margins on four sides
//!
//! # Coordinate System
//!
//! Plotting backends for PGMs use a mathematical coordinate system:
//!
//! ```text
//!    +Y
//!     ▲
//!     │
//!     │
//!   (0,0) ────────► +X
//! ```
//!
//! "Above" therefore means a larger y-coordinate, and a [`Rect`]'s `y` is
//! its bottom edge.

use serde::{Deserialize, Serialize};

/// Rounds `value` to two decimal places.
///
/// Plate sizes are rounded this way, and plate edges are compared after
/// rounding, so that accumulated float noise does not break edge matching.
pub fn round_hundredths(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// A 2D point in grid units.
///
/// # Examples
///
/// ```
/// # use pgm_builder_core::geometry::Point;
/// let anchor = Point::new(1.0, 2.0);
/// let above = anchor.translate(0.0, 1.0);
/// assert_eq!(above.y(), 3.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Moves the point by `dx` and `dy`.
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Adds another point component-wise, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        self.translate(other.x, other.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

/// Width and height, used for the overall canvas shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Grows both dimensions by `amount`.
    pub fn grow(self, amount: f32) -> Self {
        Self {
            width: self.width + amount,
            height: self.height + amount,
        }
    }
}

impl From<[f32; 2]> for Size {
    fn from([width, height]: [f32; 2]) -> Self {
        Self::new(width, height)
    }
}

/// The extent of a non-empty set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds covering a single point
    pub fn from_point(point: Point) -> Self {
        Self {
            min_x: point.x,
            min_y: point.y,
            max_x: point.x,
            max_y: point.y,
        }
    }

    /// Computes the bounds of all `points`, or `None` if there are none.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pgm_builder_core::geometry::{Bounds, Point};
    /// let bounds = Bounds::from_points([Point::new(0.0, 1.0), Point::new(2.0, -1.0)]).unwrap();
    /// assert_eq!(bounds.min_x(), 0.0);
    /// assert_eq!(bounds.max_y(), 1.0);
    ///
    /// assert!(Bounds::from_points([]).is_none());
    /// ```
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points
            .into_iter()
            .map(Self::from_point)
            .reduce(|acc, bounds| acc.merge(&bounds))
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Merges two bounds into the smallest bounds containing both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Expands the bounds by `margins` into a [`Rect`].
    ///
    /// The width and height are rounded to two decimals; the corner is not.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pgm_builder_core::geometry::{Bounds, Insets, Point};
    /// let bounds = Bounds::from_point(Point::new(1.0, 1.0));
    /// let rect = bounds.expand(Insets::new(0.75, 0.8, 0.35, 0.4));
    /// assert_eq!(rect.width(), 1.2);
    /// assert_eq!(rect.height(), 1.1);
    /// ```
    pub fn expand(self, margins: Insets) -> Rect {
        let x = self.min_x - margins.left;
        let y = self.min_y - margins.bottom;
        let right = self.max_x + margins.right;
        let top = self.max_y + margins.top;
        Rect::new(x, y, round_hundredths(right - x), round_hundredths(top - y))
    }
}

/// An axis-aligned rectangle given by its lower-left corner and its size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the x-coordinate of the left edge
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the bottom edge
    pub fn y(self) -> f32 {
        self.y
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the x-coordinate of the right edge
    pub fn right(self) -> f32 {
        self.x + self.width
    }

    /// Returns the y-coordinate of the top edge
    pub fn top(self) -> f32 {
        self.y + self.height
    }

    /// Returns the upper-right corner as a [`Size`] measured from the origin.
    pub fn far_corner(self) -> Size {
        Size::new(self.right(), self.top())
    }

    /// Moves the left edge by `dx` and the bottom edge by `dy`, and grows the
    /// size by `dwidth` and `dheight`.
    pub fn adjust(self, dx: f32, dy: f32, dwidth: f32, dheight: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width + dwidth,
            height: self.height + dheight,
        }
    }

    /// Returns `true` if `point` lies strictly inside the rectangle.
    pub fn contains_strictly(self, point: Point) -> bool {
        point.x > self.x && point.x < self.right() && point.y > self.y && point.y < self.top()
    }

    /// Returns `true` if `other` lies within this rectangle (edges may touch).
    pub fn encloses(self, other: Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.top() >= other.top()
    }
}

/// Margins on the four sides of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates insets in CSS order: top, right, bottom, left.
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn top(self) -> f32 {
        self.top
    }

    pub fn right(self) -> f32 {
        self.right
    }

    pub fn bottom(self) -> f32 {
        self.bottom
    }

    pub fn left(self) -> f32 {
        self.left
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-100.0f32..100.0, -100.0f32..100.0).prop_map(|(x, y)| Point::new(x, y))
    }

    fn margins_strategy() -> impl Strategy<Value = Insets> {
        (0.05f32..2.0, 0.05f32..2.0, 0.05f32..2.0, 0.05f32..2.0)
            .prop_map(|(t, r, b, l)| Insets::new(t, r, b, l))
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Merging is commutative.
    fn check_merge_is_commutative(p1: Point, p2: Point) -> Result<(), TestCaseError> {
        let a = Bounds::from_point(p1);
        let b = Bounds::from_point(p2);
        prop_assert_eq!(a.merge(&b), b.merge(&a));
        Ok(())
    }

    /// Expanded bounds strictly contain every point they were computed from.
    fn check_expand_contains_points(
        points: Vec<Point>,
        margins: Insets,
    ) -> Result<(), TestCaseError> {
        let Some(bounds) = Bounds::from_points(points.iter().copied()) else {
            return Ok(());
        };
        let rect = bounds.expand(margins);
        for point in points {
            prop_assert!(rect.contains_strictly(point), "{rect:?} misses {point:?}");
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn merge_is_commutative(p1 in point_strategy(), p2 in point_strategy()) {
            check_merge_is_commutative(p1, p2)?;
        }

        #[test]
        fn expand_contains_points(
            points in prop::collection::vec(point_strategy(), 1..20),
            margins in margins_strategy(),
        ) {
            check_expand_contains_points(points, margins)?;
        }
    }
}
