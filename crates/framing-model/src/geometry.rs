//! Point and rectangle value types for camera framing.
//!
//! Both types are plain `Copy` values: every operation returns a new value,
//! nothing is mutated in place.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An axis-aligned rectangle given by its edges.
///
/// The type does not enforce `left <= right` or `top <= bottom`; use
/// [`Rect::normalized`] when the source may produce inverted boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    #[serde(rename = "l")]
    pub left: f64,
    #[serde(rename = "t")]
    pub top: f64,
    #[serde(rename = "r")]
    pub right: f64,
    #[serde(rename = "b")]
    pub bottom: f64,
}

impl Rect {
    /// The unit square `(0, 0)..(1, 1)`, i.e. a full normalized frame.
    pub const UNIT: Rect = Rect {
        left: 0.0,
        top: 0.0,
        right: 1.0,
        bottom: 1.0,
    };

    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Same as [`Rect::new`]; mirrors the `fromLTRB` naming used by camera APIs.
    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right, bottom)
    }

    /// Rectangle of the given size centered at `(cx, cy)`.
    pub fn from_center(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        let left = cx - width / 2.0;
        let top = cy - height / 2.0;
        Self::new(left, top, left + width, top + height)
    }

    /// Square of side `scale` centered at `(cx, cy)`.
    pub fn from_center_and_scale(cx: f64, cy: f64, scale: f64) -> Self {
        Self::from_center(cx, cy, scale, scale)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }

    /// Signed area; negative for inverted rectangles.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Copy with a different left edge.
    pub fn with_left(self, left: f64) -> Self {
        Self { left, ..self }
    }

    /// Copy with a different top edge.
    pub fn with_top(self, top: f64) -> Self {
        Self { top, ..self }
    }

    /// Copy with a different right edge.
    pub fn with_right(self, right: f64) -> Self {
        Self { right, ..self }
    }

    /// Copy with a different bottom edge.
    pub fn with_bottom(self, bottom: f64) -> Self {
        Self { bottom, ..self }
    }

    /// Swap inverted edges so that `left <= right` and `top <= bottom`.
    pub fn normalized(&self) -> Self {
        Self {
            left: self.left.min(self.right),
            top: self.top.min(self.bottom),
            right: self.left.max(self.right),
            bottom: self.top.max(self.bottom),
        }
    }

    /// All four edges are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
    }

    /// Non-finite, empty, or inverted.
    pub fn is_degenerate(&self) -> bool {
        !self.is_finite() || self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Check if a point is within this rectangle (edges inclusive).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Check if `other` lies entirely within this rectangle, allowing `eps` slack.
    pub fn contains_rect(&self, other: &Rect, eps: f64) -> bool {
        other.left >= self.left - eps
            && other.top >= self.top - eps
            && other.right <= self.right + eps
            && other.bottom <= self.bottom + eps
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::UNIT
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect(l={:.3}, t={:.3}, r={:.3}, b={:.3})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

// Equality is field-wise `==`, so hashing must agree on `0.0 == -0.0`.
// NaN coordinates make a value unequal to itself and must not be used as keys.
fn hash_f64<H: Hasher>(value: f64, state: &mut H) {
    let canonical = if value == 0.0 { 0.0 } else { value };
    canonical.to_bits().hash(state);
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_f64(self.x, state);
        hash_f64(self.y, state);
    }
}

impl Eq for Rect {}

impl Hash for Rect {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_f64(self.left, state);
        hash_f64(self.top, state);
        hash_f64(self.right, state);
        hash_f64(self.bottom, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_derived_attributes() {
        let r = Rect::new(0.2, 0.1, 0.6, 0.9);
        assert!((r.width() - 0.4).abs() < 1e-12);
        assert!((r.height() - 0.8).abs() < 1e-12);
        assert!((r.center_x() - 0.4).abs() < 1e-12);
        assert!((r.center_y() - 0.5).abs() < 1e-12);
        assert_eq!(r.center(), Point::new(r.center_x(), r.center_y()));
    }

    #[test]
    fn test_from_ltrb_matches_new() {
        let a = Rect::new(1.0, 2.0, 30.0, 40.0);
        let b = Rect::from_ltrb(1.0, 2.0, 30.0, 40.0);
        assert_eq!(a, b);
        assert_eq!(a.width(), b.width());
        assert_eq!(a.height(), b.height());
        assert_eq!(a.center(), b.center());
    }

    #[test]
    fn test_copy_with_overrides() {
        let r = Rect::new(0.1, 0.2, 0.3, 0.4);
        assert_eq!(Rect { ..r }, r);

        let moved = r.with_left(0.0);
        assert_eq!(moved.left, 0.0);
        assert_eq!((moved.top, moved.right, moved.bottom), (r.top, r.right, r.bottom));

        let taller = r.with_bottom(0.9);
        assert_eq!(taller.bottom, 0.9);
        assert_eq!((taller.left, taller.top, taller.right), (r.left, r.top, r.right));

        assert_eq!(r.with_top(0.0).with_right(1.0), Rect::new(0.1, 0.0, 1.0, 0.4));
    }

    #[test]
    fn test_from_center_and_scale() {
        let r = Rect::from_center_and_scale(0.5, 0.5, 0.5);
        assert_eq!(r, Rect::new(0.25, 0.25, 0.75, 0.75));

        let r = Rect::from_center(960.0, 540.0, 1920.0, 1080.0);
        assert_eq!(r, Rect::new(0.0, 0.0, 1920.0, 1080.0));
    }

    #[test]
    fn test_normalized_and_degenerate() {
        let inverted = Rect::new(0.6, 0.9, 0.2, 0.1);
        assert!(inverted.is_degenerate());
        let fixed = inverted.normalized();
        assert_eq!(fixed, Rect::new(0.2, 0.1, 0.6, 0.9));
        assert!(!fixed.is_degenerate());

        assert!(Rect::new(0.5, 0.5, 0.5, 0.9).is_degenerate());
        assert!(Rect::new(0.0, f64::NAN, 1.0, 1.0).is_degenerate());
        assert!(Rect::new(0.0, 0.0, f64::INFINITY, 1.0).is_degenerate());
    }

    #[test]
    fn test_contains() {
        let r = Rect::UNIT;
        assert!(r.contains(Point::new(0.5, 0.5)));
        assert!(r.contains(Point::new(1.0, 0.0)));
        assert!(!r.contains(Point::new(1.01, 0.5)));
        assert!(r.contains_rect(&Rect::new(0.1, 0.1, 0.9, 0.9), 0.0));
        assert!(!r.contains_rect(&Rect::new(-0.1, 0.1, 0.9, 0.9), 0.0));
    }

    #[test]
    fn test_display() {
        let r = Rect::new(0.1, 0.2, 0.3, 0.4);
        assert_eq!(r.to_string(), "Rect(l=0.100, t=0.200, r=0.300, b=0.400)");
        assert_eq!(Point::new(1.0, 2.5).to_string(), "(1.000, 2.500)");
    }

    #[test]
    fn test_hash_by_value() {
        let mut set = HashSet::new();
        set.insert(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert!(set.contains(&Rect::UNIT));
        assert!(set.contains(&Rect::new(-0.0, 0.0, 1.0, 1.0)));

        let mut points = HashSet::new();
        points.insert(Point::new(0.5, 0.5));
        points.insert(Rect::UNIT.center());
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn test_serde_short_field_names() {
        let json = serde_json::to_string(&Rect::new(0.1, 0.2, 0.3, 0.4)).unwrap();
        assert_eq!(json, r#"{"l":0.1,"t":0.2,"r":0.3,"b":0.4}"#);
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_center_is_inside_normalized_rect(
            l in -1000.0f64..1000.0,
            t in -1000.0f64..1000.0,
            r in -1000.0f64..1000.0,
            b in -1000.0f64..1000.0,
        ) {
            let rect = Rect::new(l, t, r, b).normalized();
            prop_assert!(rect.width() >= 0.0);
            prop_assert!(rect.height() >= 0.0);
            prop_assert!(rect.contains(rect.center()));
        }

        #[test]
        fn prop_from_center_round_trips_center(
            cx in -100.0f64..100.0,
            cy in -100.0f64..100.0,
            w in 0.001f64..50.0,
            h in 0.001f64..50.0,
        ) {
            let rect = Rect::from_center(cx, cy, w, h);
            prop_assert!((rect.center_x() - cx).abs() < 1e-9);
            prop_assert!((rect.center_y() - cy).abs() < 1e-9);
            prop_assert!((rect.width() - w).abs() < 1e-9);
            prop_assert!((rect.height() - h).abs() < 1e-9);
        }
    }
}
