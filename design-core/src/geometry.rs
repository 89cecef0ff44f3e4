//! Axis-aligned bounds and hit testing.

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementKind, Point};

/// Width/height used when an element has no usable size of its own.
pub const FALLBACK_SIZE: f32 = 50.0;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Bounds {
    /// Create bounds from an origin and a size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounds spanning two arbitrary corner points.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Flip negative extents so that width and height are non-negative.
    #[must_use]
    pub fn normalized(self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Strict overlap test. Boxes that only share an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        intersects(self, other)
    }

    /// Check whether a point lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Smallest box covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Strict AABB overlap: `ax < bx+bw && ax+aw > bx && ay < by+bh && ay+ah > by`.
#[must_use]
pub fn intersects(a: &Bounds, b: &Bounds) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Compute the axis-aligned bounding box of an element.
///
/// The box origin is the element position. Rotation is not taken into account.
#[must_use]
pub fn bounds_of(element: &Element) -> Bounds {
    let (width, height) = match &element.kind {
        ElementKind::Rect(r) => (r.width, r.height),
        ElementKind::Image(i) => (i.width, i.height),
        ElementKind::Text(t) => (t.width, t.height),
        ElementKind::Circle(c) => (c.radius * 2.0, c.radius * 2.0),
        ElementKind::Star(s) => (s.outer_radius * 2.0, s.outer_radius * 2.0),
        ElementKind::Polygon(p) => (p.radius * 2.0, p.radius * 2.0),
        ElementKind::Line(l) => return line_bounds(element, &l.points),
    };
    Bounds::new(
        element.x,
        element.y,
        or_fallback(width * element.scale_x.abs()),
        or_fallback(height * element.scale_y.abs()),
    )
}

fn line_bounds(element: &Element, points: &[f32]) -> Bounds {
    let mut pairs = points.chunks_exact(2);
    let Some(first) = pairs.next() else {
        return Bounds::new(element.x, element.y, FALLBACK_SIZE, FALLBACK_SIZE);
    };

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first[0], first[1], first[0], first[1]);
    for pair in pairs {
        min_x = min_x.min(pair[0]);
        max_x = max_x.max(pair[0]);
        min_y = min_y.min(pair[1]);
        max_y = max_y.max(pair[1]);
    }

    let sx = element.scale_x;
    let sy = element.scale_y;
    Bounds::new(
        element.x + (min_x * sx).min(max_x * sx),
        element.y + (min_y * sy).min(max_y * sy),
        ((max_x - min_x) * sx).abs(),
        ((max_y - min_y) * sy).abs(),
    )
}

fn or_fallback(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        FALLBACK_SIZE
    }
}

/// Fold [`bounds_of`] over a set of elements. Returns `None` for an empty set.
#[must_use]
pub fn union_bounds<'a, I>(elements: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a Element>,
{
    elements
        .into_iter()
        .map(bounds_of)
        .reduce(|acc, b| acc.union(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{CircleShape, LineShape, RectShape, StarShape};

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Element {
        Element::new(ElementKind::Rect(RectShape {
            width: w,
            height: h,
            fill: "#fff".to_string(),
            stroke: "#000".to_string(),
            stroke_width: 0.0,
            corner_radius: 0.0,
        }))
        .at(x, y)
    }

    #[test]
    fn test_rect_bounds_use_stored_size() {
        let b = bounds_of(&rect(10.0, 20.0, 30.0, 40.0));
        assert_eq!(b, Bounds::new(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn test_circle_and_star_use_diameter() {
        let circle = Element::new(ElementKind::Circle(CircleShape {
            radius: 15.0,
            fill: "#fff".to_string(),
            stroke: "#000".to_string(),
            stroke_width: 0.0,
        }));
        assert_eq!(bounds_of(&circle), Bounds::new(0.0, 0.0, 30.0, 30.0));

        let star = Element::new(ElementKind::Star(StarShape {
            inner_radius: 10.0,
            outer_radius: 40.0,
            num_points: 5,
            fill: "#fff".to_string(),
            stroke: "#000".to_string(),
            stroke_width: 0.0,
        }));
        assert_eq!(bounds_of(&star), Bounds::new(0.0, 0.0, 80.0, 80.0));
    }

    #[test]
    fn test_unset_size_falls_back() {
        let b = bounds_of(&rect(0.0, 0.0, 0.0, f32::NAN));
        assert!((b.width - FALLBACK_SIZE).abs() < f32::EPSILON);
        assert!((b.height - FALLBACK_SIZE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_line_bounds_follow_points() {
        let line = Element::new(ElementKind::Line(LineShape {
            points: vec![0.0, 0.0, 100.0, -20.0, 40.0, 30.0],
            closed: false,
            fill: "transparent".to_string(),
            stroke: "#000".to_string(),
            stroke_width: 2.0,
        }))
        .at(10.0, 10.0);
        assert_eq!(bounds_of(&line), Bounds::new(10.0, -10.0, 100.0, 50.0));
    }

    #[test]
    fn test_intersects_is_strict() {
        let a = Bounds::new(0.0, 0.0, 50.0, 50.0);
        let touching = Bounds::new(50.0, 0.0, 10.0, 10.0);
        let overlapping = Bounds::new(49.0, 49.0, 10.0, 10.0);
        assert!(!intersects(&a, &touching));
        assert!(intersects(&a, &overlapping));
        assert!(overlapping.intersects(&a));
    }

    #[test]
    fn test_union_bounds() {
        let elements = [rect(0.0, 0.0, 10.0, 10.0), rect(50.0, 20.0, 10.0, 30.0)];
        let b = union_bounds(&elements).expect("non-empty");
        assert_eq!(b, Bounds::new(0.0, 0.0, 60.0, 50.0));
        assert!(union_bounds(&[] as &[Element]).is_none());
    }

    #[test]
    fn test_normalized_flips_negative_extent() {
        let b = Bounds::new(60.0, 60.0, -50.0, -50.0).normalized();
        assert_eq!(b, Bounds::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn test_from_corners() {
        let b = Bounds::from_corners(Point::new(60.0, 10.0), Point::new(10.0, 60.0));
        assert_eq!(b, Bounds::new(10.0, 10.0, 50.0, 50.0));
    }
}
