//! # Design Renderer
//!
//! Turns a [`design_core::Scene`] into pixels for hosts that have no canvas
//! of their own (command line, server-side previews, tests).
//!
//! ## Pipeline
//!
//! ```text
//! Scene ──→ SVG document ──→ usvg tree ──→ tiny-skia pixmap ──┬──→ PNG
//!                                                             └──→ JPEG (flattened)
//! ```
//!
//! [`SceneExporter`] implements [`design_core::RasterSurface`], so it plugs
//! straight into [`design_core::Editor::export_raster`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;

pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportFormat, SceneExporter};
