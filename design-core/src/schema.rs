//! Canonical serialized representation of a scene.
//!
//! A document carries the element sequence (in stacking order), the canvas
//! size and the background. Selection, gestures and history are session state
//! and never serialized.
//!
//! Element ids are UUID strings. A document whose ids are not UUIDs is
//! rejected as malformed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::element::{Element, ElementKind};
use crate::error::{EngineError, EngineResult};
use crate::scene::{Scene, DEFAULT_BACKGROUND};

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

/// Upper bound on star points and polygon sides accepted on load.
pub const MAX_SHAPE_VERTICES: u32 = 1000;

/// Canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasDocument {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

/// Canonical scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Format version.
    pub version: u32,
    /// Canvas metadata.
    pub canvas: CanvasDocument,
    /// Background color.
    pub background: String,
    /// Elements, back to front.
    pub elements: Vec<Element>,
}

impl SceneDocument {
    /// Build a document from a runtime scene.
    #[must_use]
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            version: FORMAT_VERSION,
            canvas: CanvasDocument {
                width: scene.width,
                height: scene.height,
            },
            background: scene.background.clone(),
            elements: scene.elements().to_vec(),
        }
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Materialize a scene with an empty selection.
    #[must_use]
    pub fn into_scene(self) -> Scene {
        let mut scene = Scene::new(self.canvas.width, self.canvas.height);
        scene.background = self.background;
        for element in self.elements {
            scene.add_element(element);
        }
        scene
    }
}

/// An element dropped during load because its variant tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedElement {
    /// Position in the source document.
    pub index: usize,
    /// The unrecognized tag.
    pub tag: String,
}

impl From<SkippedElement> for EngineError {
    fn from(skipped: SkippedElement) -> Self {
        Self::UnknownVariant {
            index: skipped.index,
            tag: skipped.tag,
        }
    }
}

/// A successfully parsed document plus any elements that were skipped.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    /// The parsed document.
    pub document: SceneDocument,
    /// Elements with unknown variant tags.
    pub skipped: Vec<SkippedElement>,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default = "default_version")]
    version: u32,
    canvas: CanvasDocument,
    #[serde(default = "default_background")]
    background: String,
    #[serde(default)]
    elements: Vec<Value>,
}

const fn default_version() -> u32 {
    FORMAT_VERSION
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

fn malformed(message: impl Into<String>) -> EngineError {
    EngineError::MalformedScene(message.into())
}

/// Parse and validate a serialized scene.
///
/// Elements with an unknown variant tag are skipped and reported. Everything
/// else that is wrong fails the whole document.
///
/// # Errors
///
/// Returns [`EngineError::MalformedScene`] if the document is not valid JSON,
/// lacks canvas metadata, has an element without a variant tag or without a
/// field its variant requires, or repeats an element identifier.
pub fn parse_scene(json: &str) -> EngineResult<LoadedScene> {
    let raw: RawDocument =
        serde_json::from_str(json).map_err(|e| malformed(format!("invalid document: {e}")))?;

    let CanvasDocument { width, height } = raw.canvas;
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return Err(malformed(format!("invalid canvas size {width}x{height}")));
    }

    let mut elements = Vec::with_capacity(raw.elements.len());
    let mut skipped = Vec::new();
    let mut seen = HashSet::new();

    for (index, value) in raw.elements.into_iter().enumerate() {
        let tag = match value.get("type") {
            Some(Value::String(tag)) => tag.clone(),
            Some(_) => return Err(malformed(format!("element {index}: variant tag is not a string"))),
            None => return Err(malformed(format!("element {index}: missing variant tag"))),
        };
        if !ElementKind::TAGS.contains(&tag.as_str()) {
            tracing::warn!(index, tag = %tag, "Skipping element with unknown variant");
            skipped.push(SkippedElement { index, tag });
            continue;
        }

        let element: Element = serde_json::from_value(value)
            .map_err(|e| malformed(format!("element {index} ({tag}): {e}")))?;
        validate_element(index, &element)?;
        if !seen.insert(element.id) {
            return Err(malformed(format!("element {index}: duplicate id {}", element.id)));
        }
        elements.push(element);
    }

    Ok(LoadedScene {
        document: SceneDocument {
            version: raw.version,
            canvas: raw.canvas,
            background: raw.background,
            elements,
        },
        skipped,
    })
}

fn validate_element(index: usize, element: &Element) -> EngineResult<()> {
    match &element.kind {
        ElementKind::Line(line) if line.points.len() % 2 != 0 => Err(malformed(format!(
            "element {index}: line has an odd number of coordinates"
        ))),
        ElementKind::Polygon(polygon) if polygon.sides < 3 => Err(malformed(format!(
            "element {index}: polygon needs at least 3 sides, got {}",
            polygon.sides
        ))),
        ElementKind::Polygon(polygon) if polygon.sides > MAX_SHAPE_VERTICES => {
            Err(malformed(format!(
                "element {index}: polygon has {} sides, at most {MAX_SHAPE_VERTICES} allowed",
                polygon.sides
            )))
        }
        ElementKind::Star(star) if star.num_points < 2 => Err(malformed(format!(
            "element {index}: star needs at least 2 points, got {}",
            star.num_points
        ))),
        ElementKind::Star(star) if star.num_points > MAX_SHAPE_VERTICES => {
            Err(malformed(format!(
                "element {index}: star has {} points, at most {MAX_SHAPE_VERTICES} allowed",
                star.num_points
            )))
        }
        _ => Ok(()),
    }
}
