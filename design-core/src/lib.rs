//! # Design Core
//!
//! Interactive design-surface engine: an editable scene of text, shapes and
//! images with selection, transforms, layering and undo.
//! Compiles to WASM for browser hosts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   Editor                    │
//! │  input → gesture → scene edit → history     │
//! │                         └──→ change events  │
//! ├──────────────────────┬──────────────────────┤
//! │  Transform engine    │  Selection/marquee   │
//! │  Layering            │  Print quality (DPI) │
//! ├──────────────────────┴──────────────────────┤
//! │  Scene: element sequence (back → front)     │
//! │  Geometry: bounds, hit tests                │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use design_core::{Editor, ElementPatch, ElementVariant, Point, Size};
//!
//! let mut editor = Editor::default();
//! let id = editor.add_element(
//!     ElementVariant::Rect,
//!     Point::new(10.0, 10.0),
//!     Some(Size::new(120.0, 60.0)),
//!     &ElementPatch::default(),
//! );
//! editor.bring_to_front(id);
//! assert!(editor.undo());
//! assert!(editor.scene().is_empty());
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod editor;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod layering;
pub mod print_quality;
pub mod scene;
pub mod schema;
pub mod selection;
pub mod surface;
pub mod transform;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::EditorConfig;
pub use editor::Editor;
pub use element::{
    CircleShape, Element, ElementId, ElementKind, ElementPatch, ElementVariant, ImageShape,
    LineShape, Point, PolygonShape, RectShape, Size, StarShape, TextAlign, TextShape,
    VerticalAlign,
};
pub use error::{EngineError, EngineResult};
pub use event::{ChangeListener, ChangeReason, EditorEvent, InputEvent, KeyCommand, KeyModifiers};
pub use geometry::{bounds_of, intersects, union_bounds, Bounds};
pub use gesture::{Gesture, GestureToken, Instant};
pub use history::{History, Snapshot};
pub use layering::LayerMove;
pub use print_quality::{analyze_image, DpiReport, Inches, QualityRating, PRINT_DPI};
pub use scene::Scene;
pub use schema::{
    parse_scene, CanvasDocument, LoadedScene, SceneDocument, SkippedElement, MAX_SHAPE_VERTICES,
};
pub use selection::{Marquee, MarqueeOutcome, Selection, SelectionMode};
pub use surface::{RasterFormat, RasterSurface};
pub use transform::{resolve_transform, Anchor, FieldUpdates, HandleKind, SizeUpdate, TransformDelta};

/// Design core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
