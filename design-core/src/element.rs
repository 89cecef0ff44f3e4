//! Design elements - the building blocks of scenes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an element.
///
/// Generated from a random v4 UUID, so identifiers are never reused within a
/// session even across delete/undo cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(value: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(value).map(Self)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Vertical text alignment inside the text box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    /// Top of the box.
    #[default]
    Top,
    /// Vertically centered.
    Middle,
    /// Bottom of the box.
    Bottom,
}

/// A text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextShape {
    /// Text content.
    pub text: String,
    /// Font family name.
    #[serde(default = "defaults::font_family")]
    pub font_family: String,
    /// Font size in pixels.
    #[serde(default = "defaults::font_size")]
    pub font_size: f32,
    /// Fill color as hex.
    #[serde(default = "defaults::text_fill")]
    pub fill: String,
    /// Horizontal alignment.
    #[serde(default)]
    pub align: TextAlign,
    /// Vertical alignment.
    #[serde(default)]
    pub vertical_align: VerticalAlign,
    /// Line height multiplier.
    #[serde(default = "defaults::line_height")]
    pub line_height: f32,
    /// Extra spacing between letters in pixels.
    #[serde(default)]
    pub letter_spacing: f32,
    /// Inner padding in pixels.
    #[serde(default)]
    pub padding: f32,
    /// Box width.
    #[serde(default)]
    pub width: f32,
    /// Box height.
    #[serde(default)]
    pub height: f32,
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectShape {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Fill color as hex.
    #[serde(default = "defaults::shape_fill")]
    pub fill: String,
    /// Stroke color as hex.
    #[serde(default = "defaults::stroke")]
    pub stroke: String,
    /// Stroke width in pixels.
    #[serde(default)]
    pub stroke_width: f32,
    /// Corner radius in pixels.
    #[serde(default)]
    pub corner_radius: f32,
}

/// A raster image placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageShape {
    /// Display width in pixels.
    pub width: f32,
    /// Display height in pixels.
    pub height: f32,
    /// Image source URI or data URL.
    pub src: String,
    /// Native pixel width of the source image.
    #[serde(default)]
    pub native_width: u32,
    /// Native pixel height of the source image.
    #[serde(default)]
    pub native_height: u32,
}

/// A circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleShape {
    /// Radius in pixels.
    pub radius: f32,
    /// Fill color as hex.
    #[serde(default = "defaults::shape_fill")]
    pub fill: String,
    /// Stroke color as hex.
    #[serde(default = "defaults::stroke")]
    pub stroke: String,
    /// Stroke width in pixels.
    #[serde(default)]
    pub stroke_width: f32,
}

/// A star with alternating inner and outer vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarShape {
    /// Radius of the inner vertices.
    pub inner_radius: f32,
    /// Radius of the outer vertices (the tips).
    pub outer_radius: f32,
    /// Number of tips.
    #[serde(default = "defaults::num_points")]
    pub num_points: u32,
    /// Fill color as hex.
    #[serde(default = "defaults::shape_fill")]
    pub fill: String,
    /// Stroke color as hex.
    #[serde(default = "defaults::stroke")]
    pub stroke: String,
    /// Stroke width in pixels.
    #[serde(default)]
    pub stroke_width: f32,
}

/// A regular polygon (triangle, hexagon, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonShape {
    /// Number of sides.
    pub sides: u32,
    /// Circumradius in pixels.
    pub radius: f32,
    /// Fill color as hex.
    #[serde(default = "defaults::shape_fill")]
    pub fill: String,
    /// Stroke color as hex.
    #[serde(default = "defaults::stroke")]
    pub stroke: String,
    /// Stroke width in pixels.
    #[serde(default)]
    pub stroke_width: f32,
}

/// A polyline given as alternating x/y coordinates relative to the element position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineShape {
    /// Flat `[x0, y0, x1, y1, ...]` coordinate list.
    pub points: Vec<f32>,
    /// Whether the last point connects back to the first.
    #[serde(default)]
    pub closed: bool,
    /// Fill color as hex (only visible when closed).
    #[serde(default = "defaults::transparent")]
    pub fill: String,
    /// Stroke color as hex.
    #[serde(default = "defaults::stroke")]
    pub stroke: String,
    /// Stroke width in pixels.
    #[serde(default = "defaults::line_stroke_width")]
    pub stroke_width: f32,
}

/// The variant-specific content of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// A text block.
    Text(TextShape),
    /// A rectangle.
    Rect(RectShape),
    /// A circle.
    Circle(CircleShape),
    /// A star.
    Star(StarShape),
    /// A regular polygon.
    Polygon(PolygonShape),
    /// A polyline.
    Line(LineShape),
    /// A raster image.
    Image(ImageShape),
}

impl ElementKind {
    /// Tags accepted by [`ElementKind`] deserialization.
    pub const TAGS: [&'static str; 7] =
        ["text", "rect", "circle", "star", "polygon", "line", "image"];

    /// The variant tag used in serialized documents.
    #[must_use]
    pub const fn variant(&self) -> ElementVariant {
        match self {
            Self::Text(_) => ElementVariant::Text,
            Self::Rect(_) => ElementVariant::Rect,
            Self::Circle(_) => ElementVariant::Circle,
            Self::Star(_) => ElementVariant::Star,
            Self::Polygon(_) => ElementVariant::Polygon,
            Self::Line(_) => ElementVariant::Line,
            Self::Image(_) => ElementVariant::Image,
        }
    }
}

/// Variant selector used by element-creation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementVariant {
    /// Text block.
    Text,
    /// Rectangle.
    Rect,
    /// Circle.
    Circle,
    /// Star.
    Star,
    /// Regular polygon.
    Polygon,
    /// Polyline.
    Line,
    /// Raster image.
    Image,
}

impl std::fmt::Display for ElementVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::Text => "text",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Star => "star",
            Self::Polygon => "polygon",
            Self::Line => "line",
            Self::Image => "image",
        };
        f.write_str(tag)
    }
}

/// A point in scene coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Size {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A design element with common placement fields and variant content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// X position in scene coordinates.
    pub x: f32,
    /// Y position in scene coordinates.
    pub y: f32,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f32,
    /// Horizontal node scale. Always 1 after a committed transform.
    #[serde(default = "defaults::unit")]
    pub scale_x: f32,
    /// Vertical node scale. Always 1 after a committed transform.
    #[serde(default = "defaults::unit")]
    pub scale_y: f32,
    /// Whether the element is drawn.
    #[serde(default = "defaults::yes")]
    pub visible: bool,
    /// Whether the element can be dragged.
    #[serde(default = "defaults::yes")]
    pub draggable: bool,
    /// Opacity from 0.0 to 1.0.
    #[serde(default = "defaults::unit")]
    pub opacity: f32,
    /// Variant content.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create a new element at the origin with the given content.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            visible: true,
            draggable: true,
            opacity: 1.0,
            kind,
        }
    }

    /// Set the position.
    #[must_use]
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// The variant of this element.
    #[must_use]
    pub const fn variant(&self) -> ElementVariant {
        self.kind.variant()
    }

    /// Create an element of `variant` with variant defaults, then apply `overrides`.
    ///
    /// `size` drives the box dimensions of text, rectangles and images, and the
    /// radii of round shapes (half of the smaller side).
    #[must_use]
    pub fn create(
        variant: ElementVariant,
        position: Point,
        size: Option<Size>,
        overrides: &ElementPatch,
    ) -> Self {
        let kind = default_kind(variant, size);
        let mut element = Self::new(kind).at(position.x, position.y);
        element.apply_patch(overrides);
        element
    }

    /// Return a copy of this element with `patch` merged in.
    #[must_use]
    pub fn updated(&self, patch: &ElementPatch) -> Self {
        let mut element = self.clone();
        element.apply_patch(patch);
        element
    }

    /// Merge the supplied fields into this element.
    ///
    /// Fields that do not apply to this element's variant are ignored. The
    /// identifier is never touched.
    pub fn apply_patch(&mut self, patch: &ElementPatch) {
        set(&mut self.x, patch.x);
        set(&mut self.y, patch.y);
        set(&mut self.rotation, patch.rotation);
        set(&mut self.visible, patch.visible);
        set(&mut self.draggable, patch.draggable);
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.clamp(0.0, 1.0);
        }

        match &mut self.kind {
            ElementKind::Text(t) => {
                set_cloned(&mut t.text, patch.text.as_ref());
                set_cloned(&mut t.font_family, patch.font_family.as_ref());
                set(&mut t.font_size, patch.font_size);
                set_cloned(&mut t.fill, patch.fill.as_ref());
                set(&mut t.align, patch.align);
                set(&mut t.vertical_align, patch.vertical_align);
                set(&mut t.line_height, patch.line_height);
                set(&mut t.letter_spacing, patch.letter_spacing);
                set(&mut t.padding, patch.padding);
                set(&mut t.width, patch.width);
                set(&mut t.height, patch.height);
            }
            ElementKind::Rect(r) => {
                set(&mut r.width, patch.width);
                set(&mut r.height, patch.height);
                set_cloned(&mut r.fill, patch.fill.as_ref());
                set_cloned(&mut r.stroke, patch.stroke.as_ref());
                set(&mut r.stroke_width, patch.stroke_width);
                set(&mut r.corner_radius, patch.corner_radius);
            }
            ElementKind::Circle(c) => {
                set(&mut c.radius, patch.radius);
                set_cloned(&mut c.fill, patch.fill.as_ref());
                set_cloned(&mut c.stroke, patch.stroke.as_ref());
                set(&mut c.stroke_width, patch.stroke_width);
            }
            ElementKind::Star(s) => {
                set(&mut s.inner_radius, patch.inner_radius);
                set(&mut s.outer_radius, patch.outer_radius);
                set(&mut s.num_points, patch.num_points);
                set_cloned(&mut s.fill, patch.fill.as_ref());
                set_cloned(&mut s.stroke, patch.stroke.as_ref());
                set(&mut s.stroke_width, patch.stroke_width);
            }
            ElementKind::Polygon(p) => {
                set(&mut p.sides, patch.sides);
                set(&mut p.radius, patch.radius);
                set_cloned(&mut p.fill, patch.fill.as_ref());
                set_cloned(&mut p.stroke, patch.stroke.as_ref());
                set(&mut p.stroke_width, patch.stroke_width);
            }
            ElementKind::Line(l) => {
                set_cloned(&mut l.points, patch.points.as_ref());
                set(&mut l.closed, patch.closed);
                set_cloned(&mut l.fill, patch.fill.as_ref());
                set_cloned(&mut l.stroke, patch.stroke.as_ref());
                set(&mut l.stroke_width, patch.stroke_width);
            }
            ElementKind::Image(i) => {
                set(&mut i.width, patch.width);
                set(&mut i.height, patch.height);
                set_cloned(&mut i.src, patch.src.as_ref());
                set(&mut i.native_width, patch.native_width);
                set(&mut i.native_height, patch.native_height);
            }
        }
    }
}

fn set<T: Copy>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn set_cloned<T: Clone>(field: &mut T, value: Option<&T>) {
    if let Some(value) = value {
        field.clone_from(value);
    }
}

/// A partial element update. Every field is optional; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)] // Field names mirror the element fields they overwrite
pub struct ElementPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub rotation: Option<f32>,
    pub visible: Option<bool>,
    pub draggable: Option<bool>,
    pub opacity: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f32>,
    pub corner_radius: Option<f32>,
    pub text: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub align: Option<TextAlign>,
    pub vertical_align: Option<VerticalAlign>,
    pub line_height: Option<f32>,
    pub letter_spacing: Option<f32>,
    pub padding: Option<f32>,
    pub radius: Option<f32>,
    pub inner_radius: Option<f32>,
    pub outer_radius: Option<f32>,
    pub num_points: Option<u32>,
    pub sides: Option<u32>,
    pub points: Option<Vec<f32>>,
    pub closed: Option<bool>,
    pub src: Option<String>,
    pub native_width: Option<u32>,
    pub native_height: Option<u32>,
}

impl ElementPatch {
    /// Check whether the patch carries no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn default_kind(variant: ElementVariant, size: Option<Size>) -> ElementKind {
    let (width, height) = size.map_or((100.0, 100.0), |s| (s.width, s.height));
    let half = width.min(height) / 2.0;

    match variant {
        ElementVariant::Text => ElementKind::Text(TextShape {
            text: "Text".to_string(),
            font_family: defaults::font_family(),
            font_size: defaults::font_size(),
            fill: defaults::text_fill(),
            align: TextAlign::Left,
            vertical_align: VerticalAlign::Top,
            line_height: defaults::line_height(),
            letter_spacing: 0.0,
            padding: 0.0,
            width: size.map_or(200.0, |s| s.width),
            height: size.map_or(30.0, |s| s.height),
        }),
        ElementVariant::Rect => ElementKind::Rect(RectShape {
            width,
            height,
            fill: defaults::shape_fill(),
            stroke: defaults::stroke(),
            stroke_width: 0.0,
            corner_radius: 0.0,
        }),
        ElementVariant::Circle => ElementKind::Circle(CircleShape {
            radius: half,
            fill: defaults::shape_fill(),
            stroke: defaults::stroke(),
            stroke_width: 0.0,
        }),
        ElementVariant::Star => ElementKind::Star(StarShape {
            inner_radius: half / 2.0,
            outer_radius: half,
            num_points: defaults::num_points(),
            fill: defaults::shape_fill(),
            stroke: defaults::stroke(),
            stroke_width: 0.0,
        }),
        ElementVariant::Polygon => ElementKind::Polygon(PolygonShape {
            sides: 6,
            radius: half,
            fill: defaults::shape_fill(),
            stroke: defaults::stroke(),
            stroke_width: 0.0,
        }),
        ElementVariant::Line => ElementKind::Line(LineShape {
            points: vec![0.0, 0.0, width, 0.0],
            closed: false,
            fill: defaults::transparent(),
            stroke: defaults::stroke(),
            stroke_width: defaults::line_stroke_width(),
        }),
        ElementVariant::Image => ElementKind::Image(ImageShape {
            width,
            height,
            src: String::new(),
            // Until told otherwise, assume the image is shown at native resolution.
            native_width: to_pixels(width),
            native_height: to_pixels(height),
        }),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_pixels(value: f32) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

mod defaults {
    pub fn font_family() -> String {
        "Arial".to_string()
    }

    pub const fn font_size() -> f32 {
        24.0
    }

    pub fn text_fill() -> String {
        "#000000".to_string()
    }

    pub fn shape_fill() -> String {
        "#3b82f6".to_string()
    }

    pub fn stroke() -> String {
        "#000000".to_string()
    }

    pub fn transparent() -> String {
        "transparent".to_string()
    }

    pub const fn line_height() -> f32 {
        1.0
    }

    pub const fn line_stroke_width() -> f32 {
        2.0
    }

    pub const fn num_points() -> u32 {
        5
    }

    pub const fn unit() -> f32 {
        1.0
    }

    pub const fn yes() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_defaults() {
        let element = Element::create(
            ElementVariant::Text,
            Point::new(10.0, 20.0),
            None,
            &ElementPatch::default(),
        );
        let ElementKind::Text(text) = &element.kind else {
            panic!("expected text");
        };
        assert!((text.font_size - 24.0).abs() < f32::EPSILON);
        assert_eq!(text.fill, "#000000");
        assert_eq!(text.align, TextAlign::Left);
        assert!((element.x - 10.0).abs() < f32::EPSILON);
        assert!((element.y - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_star_defaults_to_five_points() {
        let element = Element::create(
            ElementVariant::Star,
            Point::default(),
            Some(Size::new(100.0, 100.0)),
            &ElementPatch::default(),
        );
        let ElementKind::Star(star) = &element.kind else {
            panic!("expected star");
        };
        assert_eq!(star.num_points, 5);
        assert!((star.outer_radius - 50.0).abs() < f32::EPSILON);
        assert!((star.inner_radius - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_create_applies_overrides() {
        let overrides = ElementPatch {
            text: Some("Sale!".to_string()),
            fill: Some("#ff0000".to_string()),
            ..ElementPatch::default()
        };
        let element = Element::create(ElementVariant::Text, Point::default(), None, &overrides);
        let ElementKind::Text(text) = &element.kind else {
            panic!("expected text");
        };
        assert_eq!(text.text, "Sale!");
        assert_eq!(text.fill, "#ff0000");
    }

    #[test]
    fn test_update_keeps_id_and_unrelated_fields() {
        let element = Element::create(
            ElementVariant::Rect,
            Point::new(5.0, 5.0),
            Some(Size::new(40.0, 30.0)),
            &ElementPatch::default(),
        );
        let patch = ElementPatch {
            fill: Some("#00ff00".to_string()),
            // Not applicable to rectangles.
            radius: Some(99.0),
            ..ElementPatch::default()
        };
        let updated = element.updated(&patch);

        assert_eq!(updated.id, element.id);
        let ElementKind::Rect(rect) = &updated.kind else {
            panic!("expected rect");
        };
        assert_eq!(rect.fill, "#00ff00");
        assert!((rect.width - 40.0).abs() < f32::EPSILON);
        assert!((updated.x - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut element = Element::new(ElementKind::Circle(CircleShape {
            radius: 10.0,
            fill: "#fff".to_string(),
            stroke: "#000".to_string(),
            stroke_width: 0.0,
        }));
        element.apply_patch(&ElementPatch {
            opacity: Some(3.0),
            ..ElementPatch::default()
        });
        assert!((element.opacity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = ElementId::new();
        let b = ElementId::new();
        assert_ne!(a, b);
        assert_eq!(ElementId::parse(&a.to_string()).expect("parse"), a);
    }

    #[test]
    fn test_serialized_form_is_flat_and_tagged() {
        let element = Element::create(
            ElementVariant::Circle,
            Point::new(1.0, 2.0),
            Some(Size::new(20.0, 20.0)),
            &ElementPatch::default(),
        );
        let value = serde_json::to_value(&element).expect("serialize");
        assert_eq!(value["type"], "circle");
        assert_eq!(value["radius"], 10.0);
        assert_eq!(value["x"], 1.0);

        let back: Element = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, element);
    }

    #[test]
    fn test_empty_patch() {
        assert!(ElementPatch::default().is_empty());
        let patch = ElementPatch {
            x: Some(1.0),
            ..ElementPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
