//! Resize/rotate/move resolution.
//!
//! A completed transform gesture reports the node's final position, rotation
//! and scale. [`resolve_transform`] turns that into plain field updates with the
//! scale baked into the element's own size fields, so that after a commit every
//! element has an effective scale of exactly 1.

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementKind};

/// Scale factors within this distance of each other are treated as a corner drag.
pub const CORNER_TOLERANCE: f32 = 0.1;

/// Minimum width/height of rectangles and images after a resize.
pub const MIN_BOX_SIZE: f32 = 10.0;
/// Minimum radius of circles, polygons and star inner vertices.
pub const MIN_RADIUS: f32 = 5.0;
/// Minimum outer radius of stars.
pub const MIN_STAR_OUTER_RADIUS: f32 = 10.0;
/// Minimum size for variants without a dedicated policy.
pub const MIN_FALLBACK_SIZE: f32 = 5.0;

/// Resize handle anchors reported by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Top-left corner.
    TopLeft,
    /// Top edge midpoint.
    TopCenter,
    /// Top-right corner.
    TopRight,
    /// Left edge midpoint.
    MiddleLeft,
    /// Right edge midpoint.
    MiddleRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom edge midpoint.
    BottomCenter,
    /// Bottom-right corner.
    BottomRight,
    /// Rotation knob.
    Rotater,
}

impl Anchor {
    /// Parse an anchor name such as `"top-left"` or `"middle-right"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let anchor = match name {
            "top-left" => Self::TopLeft,
            "top-center" => Self::TopCenter,
            "top-right" => Self::TopRight,
            "middle-left" => Self::MiddleLeft,
            "middle-right" => Self::MiddleRight,
            "bottom-left" => Self::BottomLeft,
            "bottom-center" => Self::BottomCenter,
            "bottom-right" => Self::BottomRight,
            "rotater" => Self::Rotater,
            _ => return None,
        };
        Some(anchor)
    }

    /// How a drag on this anchor scales the element.
    #[must_use]
    pub const fn handle_kind(self) -> HandleKind {
        match self {
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight => {
                HandleKind::Corner
            }
            Self::TopCenter
            | Self::MiddleLeft
            | Self::MiddleRight
            | Self::BottomCenter
            | Self::Rotater => HandleKind::Edge,
        }
    }
}

/// Scaling policy implied by the dragged handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    /// Uniform scaling; both axes use the mean factor.
    Corner,
    /// Independent scaling per axis.
    Edge,
}

impl HandleKind {
    /// Classify a handle, preferring the anchor reported by the input layer.
    ///
    /// Without an anchor, near-equal factors (`|sx - sy| < tolerance`) count as
    /// a corner drag and anything else as an edge drag.
    #[must_use]
    pub fn classify(anchor: Option<Anchor>, scale_x: f32, scale_y: f32, tolerance: f32) -> Self {
        if let Some(anchor) = anchor {
            return anchor.handle_kind();
        }
        if (scale_x - scale_y).abs() < tolerance {
            Self::Corner
        } else {
            Self::Edge
        }
    }
}

/// Final node state reported at the end of a resize/rotate gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformDelta {
    /// Final x position.
    pub x: f32,
    /// Final y position.
    pub y: f32,
    /// Final rotation in degrees.
    pub rotation: f32,
    /// Final horizontal scale relative to the element's current size.
    pub scale_x: f32,
    /// Final vertical scale relative to the element's current size.
    pub scale_y: f32,
    /// Anchor that was dragged, if the input layer knows it.
    #[serde(default)]
    pub anchor: Option<Anchor>,
}

impl TransformDelta {
    /// A delta that keeps the element where it is at unit scale.
    #[must_use]
    pub fn identity(element: &Element) -> Self {
        Self {
            x: element.x,
            y: element.y,
            rotation: element.rotation,
            scale_x: 1.0,
            scale_y: 1.0,
            anchor: None,
        }
    }

    /// Set the scale factors.
    #[must_use]
    pub fn scaled(mut self, scale_x: f32, scale_y: f32) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Record which anchor was dragged.
    #[must_use]
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }
}

/// New values for an element's size fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SizeUpdate {
    /// Width/height of a box-shaped element.
    Box {
        /// New width.
        width: f32,
        /// New height.
        height: f32,
    },
    /// Radius of a circle or polygon.
    Radius {
        /// New radius.
        radius: f32,
    },
    /// Radii of a star.
    Star {
        /// New inner radius.
        inner_radius: f32,
        /// New outer radius.
        outer_radius: f32,
    },
    /// Scaled polyline coordinates.
    Points {
        /// New flat coordinate list.
        points: Vec<f32>,
    },
    /// Nothing to resize.
    Unchanged,
}

/// Field updates produced by [`resolve_transform`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdates {
    /// New x position.
    pub x: f32,
    /// New y position.
    pub y: f32,
    /// New rotation in degrees.
    pub rotation: f32,
    /// Handle classification that was applied.
    pub handle: HandleKind,
    /// New size fields.
    pub size: SizeUpdate,
}

impl FieldUpdates {
    /// Write these updates into `element` and reset its node scale to 1.
    pub fn apply_to(&self, element: &mut Element) {
        element.x = self.x;
        element.y = self.y;
        element.rotation = self.rotation;
        element.scale_x = 1.0;
        element.scale_y = 1.0;

        match (&mut element.kind, &self.size) {
            (ElementKind::Rect(r), SizeUpdate::Box { width, height }) => {
                r.width = *width;
                r.height = *height;
            }
            (ElementKind::Image(i), SizeUpdate::Box { width, height }) => {
                i.width = *width;
                i.height = *height;
            }
            (ElementKind::Text(t), SizeUpdate::Box { width, height }) => {
                t.width = *width;
                t.height = *height;
            }
            (ElementKind::Circle(c), SizeUpdate::Radius { radius }) => c.radius = *radius,
            (ElementKind::Polygon(p), SizeUpdate::Radius { radius }) => p.radius = *radius,
            (
                ElementKind::Star(s),
                SizeUpdate::Star {
                    inner_radius,
                    outer_radius,
                },
            ) => {
                s.inner_radius = *inner_radius;
                s.outer_radius = *outer_radius;
            }
            (ElementKind::Line(l), SizeUpdate::Points { points }) => l.points.clone_from(points),
            _ => {}
        }
    }
}

fn sanitize(scale: f32) -> f32 {
    if scale.is_finite() {
        scale
    } else {
        1.0
    }
}

/// Resolve a finished resize/rotate gesture into element field updates.
///
/// Pure: the element is only read. The element's own node scale (normally 1)
/// is folded in, so a scene loaded with a non-unit scale is normalized too.
#[must_use]
pub fn resolve_transform(element: &Element, delta: &TransformDelta, tolerance: f32) -> FieldUpdates {
    let sx = sanitize(delta.scale_x) * sanitize(element.scale_x);
    let sy = sanitize(delta.scale_y) * sanitize(element.scale_y);
    let handle = HandleKind::classify(delta.anchor, sx, sy, tolerance);
    let uniform = (sx + sy) / 2.0;

    let (fx, fy) = match handle {
        HandleKind::Corner => (uniform, uniform),
        HandleKind::Edge => (sx, sy),
    };

    let size = match &element.kind {
        ElementKind::Rect(r) => SizeUpdate::Box {
            width: (r.width * fx).max(MIN_BOX_SIZE),
            height: (r.height * fy).max(MIN_BOX_SIZE),
        },
        ElementKind::Image(i) => SizeUpdate::Box {
            width: (i.width * fx).max(MIN_BOX_SIZE),
            height: (i.height * fy).max(MIN_BOX_SIZE),
        },
        // Round shapes keep their proportions whatever handle was used.
        ElementKind::Circle(c) => SizeUpdate::Radius {
            radius: (c.radius * uniform).max(MIN_RADIUS),
        },
        ElementKind::Polygon(p) => SizeUpdate::Radius {
            radius: (p.radius * uniform).max(MIN_RADIUS),
        },
        ElementKind::Star(s) => SizeUpdate::Star {
            inner_radius: (s.inner_radius * uniform).max(MIN_RADIUS),
            outer_radius: (s.outer_radius * uniform).max(MIN_STAR_OUTER_RADIUS),
        },
        ElementKind::Line(l) if l.points.is_empty() => SizeUpdate::Unchanged,
        ElementKind::Line(l) => SizeUpdate::Points {
            points: l
                .points
                .iter()
                .enumerate()
                .map(|(i, v)| if i % 2 == 0 { v * fx } else { v * fy })
                .collect(),
        },
        ElementKind::Text(t) => SizeUpdate::Box {
            width: (t.width * fx).max(MIN_FALLBACK_SIZE),
            height: (t.height * fy).max(MIN_FALLBACK_SIZE),
        },
    };

    FieldUpdates {
        x: delta.x,
        y: delta.y,
        rotation: delta.rotation,
        handle,
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{CircleShape, LineShape, PolygonShape, RectShape, StarShape};

    fn rect(w: f32, h: f32) -> Element {
        Element::new(ElementKind::Rect(RectShape {
            width: w,
            height: h,
            fill: "#fff".to_string(),
            stroke: "#000".to_string(),
            stroke_width: 0.0,
            corner_radius: 0.0,
        }))
    }

    fn apply(element: &Element, sx: f32, sy: f32) -> Element {
        let delta = TransformDelta::identity(element).scaled(sx, sy);
        let mut out = element.clone();
        resolve_transform(element, &delta, CORNER_TOLERANCE).apply_to(&mut out);
        out
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_classify_heuristic() {
        assert_eq!(
            HandleKind::classify(None, 1.5, 1.55, CORNER_TOLERANCE),
            HandleKind::Corner
        );
        assert_eq!(
            HandleKind::classify(None, 2.0, 1.0, CORNER_TOLERANCE),
            HandleKind::Edge
        );
    }

    #[test]
    fn test_classify_prefers_anchor() {
        assert_eq!(
            HandleKind::classify(Some(Anchor::MiddleRight), 1.0, 1.0, CORNER_TOLERANCE),
            HandleKind::Edge
        );
        assert_eq!(
            HandleKind::classify(Some(Anchor::BottomRight), 2.0, 1.0, CORNER_TOLERANCE),
            HandleKind::Corner
        );
        assert_eq!(Anchor::from_name("top-left"), Some(Anchor::TopLeft));
        assert_eq!(Anchor::from_name("sideways"), None);
    }

    #[test]
    fn test_rect_corner_scales_uniformly() {
        let out = apply(&rect(100.0, 50.0), 2.0, 2.04);
        let ElementKind::Rect(r) = &out.kind else {
            panic!("expected rect");
        };
        assert!(approx(r.width, 202.0));
        assert!(approx(r.height, 101.0));
        assert!(approx(out.scale_x, 1.0));
        assert!(approx(out.scale_y, 1.0));
    }

    #[test]
    fn test_rect_edge_stretches() {
        let out = apply(&rect(100.0, 50.0), 2.0, 1.0);
        let ElementKind::Rect(r) = &out.kind else {
            panic!("expected rect");
        };
        assert!(approx(r.width, 200.0));
        assert!(approx(r.height, 50.0));
    }

    #[test]
    fn test_rect_is_clamped() {
        let out = apply(&rect(100.0, 50.0), 0.01, 0.01);
        let ElementKind::Rect(r) = &out.kind else {
            panic!("expected rect");
        };
        assert!(approx(r.width, MIN_BOX_SIZE));
        assert!(approx(r.height, MIN_BOX_SIZE));
    }

    #[test]
    fn test_circle_stays_round_on_edge_drag() {
        let circle = Element::new(ElementKind::Circle(CircleShape {
            radius: 20.0,
            fill: "#fff".to_string(),
            stroke: "#000".to_string(),
            stroke_width: 0.0,
        }));
        let out = apply(&circle, 3.0, 1.0);
        let ElementKind::Circle(c) = &out.kind else {
            panic!("expected circle");
        };
        assert!(approx(c.radius, 40.0));
    }

    #[test]
    fn test_star_radii_share_one_factor() {
        let star = Element::new(ElementKind::Star(StarShape {
            inner_radius: 20.0,
            outer_radius: 40.0,
            num_points: 5,
            fill: "#fff".to_string(),
            stroke: "#000".to_string(),
            stroke_width: 0.0,
        }));
        let out = apply(&star, 1.0, 2.0);
        let ElementKind::Star(s) = &out.kind else {
            panic!("expected star");
        };
        assert!(approx(s.inner_radius, 30.0));
        assert!(approx(s.outer_radius, 60.0));
    }

    #[test]
    fn test_zero_radius_polygon_is_clamped() {
        let polygon = Element::new(ElementKind::Polygon(PolygonShape {
            sides: 3,
            radius: 0.0,
            fill: "#fff".to_string(),
            stroke: "#000".to_string(),
            stroke_width: 0.0,
        }));
        let out = apply(&polygon, 2.0, 2.0);
        let ElementKind::Polygon(p) = &out.kind else {
            panic!("expected polygon");
        };
        assert!(approx(p.radius, MIN_RADIUS));
    }

    #[test]
    fn test_line_points_scale_per_axis() {
        let line = Element::new(ElementKind::Line(LineShape {
            points: vec![0.0, 0.0, 10.0, 20.0],
            closed: false,
            fill: "transparent".to_string(),
            stroke: "#000".to_string(),
            stroke_width: 2.0,
        }));
        let out = apply(&line, 2.0, 3.0);
        let ElementKind::Line(l) = &out.kind else {
            panic!("expected line");
        };
        assert_eq!(l.points, vec![0.0, 0.0, 20.0, 60.0]);

        let out = apply(&line, 2.0, 2.0);
        let ElementKind::Line(l) = &out.kind else {
            panic!("expected line");
        };
        assert_eq!(l.points, vec![0.0, 0.0, 20.0, 40.0]);
    }

    #[test]
    fn test_rotation_and_position_are_verbatim() {
        let element = rect(10.0, 10.0);
        let delta = TransformDelta {
            x: 33.0,
            y: -4.0,
            rotation: 45.0,
            scale_x: 1.0,
            scale_y: 1.0,
            anchor: Some(Anchor::Rotater),
        };
        let updates = resolve_transform(&element, &delta, CORNER_TOLERANCE);
        assert!(approx(updates.x, 33.0));
        assert!(approx(updates.y, -4.0));
        assert!(approx(updates.rotation, 45.0));
    }

    #[test]
    fn test_non_finite_scale_is_ignored() {
        let out = apply(&rect(40.0, 40.0), f32::NAN, f32::INFINITY);
        let ElementKind::Rect(r) = &out.kind else {
            panic!("expected rect");
        };
        assert!(approx(r.width, 40.0));
        assert!(approx(r.height, 40.0));
    }

    #[test]
    fn test_existing_node_scale_is_baked_in() {
        let mut element = rect(10.0, 10.0);
        element.scale_x = 2.0;
        element.scale_y = 2.0;
        let out = apply(&element, 1.0, 1.0);
        let ElementKind::Rect(r) = &out.kind else {
            panic!("expected rect");
        };
        assert!(approx(r.width, 20.0));
        assert!(approx(out.scale_x, 1.0));
    }
}
