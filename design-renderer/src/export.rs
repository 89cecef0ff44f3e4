//! Scene export to image formats.
//!
//! Renders a [`Scene`] to PNG, JPEG or SVG using an SVG intermediate
//! representation and the resvg/tiny-skia rasterization pipeline.

use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt::Write;
use std::path::PathBuf;

use design_core::{
    Element, ElementKind, LineShape, RasterFormat, RasterSurface, Scene, TextAlign, TextShape,
    VerticalAlign, MAX_SHAPE_VERTICES,
};
use image::ImageEncoder;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// Colour used behind transparent pixels when flattening to JPEG.
const JPEG_MATTE: [u8; 3] = [255, 255, 255];

/// Fill used for images that have no source yet.
const IMAGE_PLACEHOLDER: &str = "#e0e0e0";

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// SVG vector graphics (the SVG XML string as UTF-8 bytes).
    Svg,
}

impl ExportFormat {
    /// Parse a format name or file extension, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("svg") {
            return Some(Self::Svg);
        }
        RasterFormat::from_name(name).map(Self::from)
    }

    /// Conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Svg => "svg",
        }
    }
}

impl From<RasterFormat> for ExportFormat {
    fn from(format: RasterFormat) -> Self {
        match format {
            RasterFormat::Png => Self::Png,
            RasterFormat::Jpeg => Self::Jpeg,
        }
    }
}

/// Configuration for scene export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output width in pixels before scaling (default: scene canvas width).
    pub width: Option<u32>,
    /// Output height in pixels before scaling (default: scene canvas height).
    pub height: Option<u32>,
    /// Background colour overriding the scene's own (any SVG colour).
    pub background: Option<String>,
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
    /// Scale factor (e.g. 2.0 for retina).
    pub scale: f32,
    /// Directory relative image sources are resolved against.
    pub resources_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            background: None,
            jpeg_quality: 85,
            scale: 1.0,
            resources_dir: None,
        }
    }
}

/// Exports a [`Scene`] to image formats.
#[derive(Debug, Clone, Default)]
pub struct SceneExporter {
    config: ExportConfig,
}

impl SceneExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export a scene to the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be rendered or encoded.
    pub fn export(&self, scene: &Scene, format: ExportFormat) -> RenderResult<Vec<u8>> {
        match format {
            ExportFormat::Png => self.render_to_png(scene),
            ExportFormat::Jpeg => self.render_to_jpeg(scene),
            ExportFormat::Svg => Ok(self.render_to_svg(scene).into_bytes()),
        }
    }

    /// Export the scene to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(&self, scene: &Scene) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize_pixmap(scene)?;

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Export the scene to JPEG bytes.
    ///
    /// Transparent regions are flattened onto white.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(&self, scene: &Scene) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize_pixmap(scene)?;

        let (width, height) = (pixmap.width(), pixmap.height());
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        // tiny-skia stores premultiplied RGBA.
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for (&channel, matte) in pixel[..3].iter().zip(JPEG_MATTE) {
                let value = f32::from(matte).mul_add(inv, f32::from(channel));
                rgb_data.push(value.round().clamp(0.0, 255.0) as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let quality = self.config.jpeg_quality.clamp(1, 100);
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// Export the scene to an SVG string.
    ///
    /// Elements are painted back to front; hidden elements are skipped.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn render_to_svg(&self, scene: &Scene) -> String {
        let (out_w, out_h) = self.output_dimensions(scene);
        let scale = self.effective_scale();
        let view_w = out_w as f32 / scale;
        let view_h = out_h as f32 / scale;

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
        );

        let background = self
            .config
            .background
            .as_deref()
            .unwrap_or(&scene.background);
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            paint(background),
        );

        let mut rendered = 0_usize;
        for element in scene.elements().iter().filter(|e| e.visible) {
            render_element_svg(&mut svg, element);
            rendered += 1;
        }

        svg.push_str("</svg>");
        tracing::debug!(
            elements = rendered,
            width = out_w,
            height = out_h,
            "Rendered scene to SVG"
        );
        svg
    }

    /// Output dimensions (width, height) in pixels.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    #[must_use]
    pub fn output_dimensions(&self, scene: &Scene) -> (u32, u32) {
        let base_w = self
            .config
            .width
            .unwrap_or_else(|| scene.width.max(1.0).round() as u32);
        let base_h = self
            .config
            .height
            .unwrap_or_else(|| scene.height.max(1.0).round() as u32);

        let scale = self.effective_scale();
        let out_w = (base_w as f32 * scale).round() as u32;
        let out_h = (base_h as f32 * scale).round() as u32;
        (out_w.max(1), out_h.max(1))
    }

    fn effective_scale(&self) -> f32 {
        let scale = self.config.scale;
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        }
    }

    /// Rasterize the scene's SVG rendition to a tiny-skia pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_pixmap(&self, scene: &Scene) -> RenderResult<tiny_skia::Pixmap> {
        let svg_string = self.render_to_svg(scene);

        let mut opt = usvg::Options::default();
        if let Some(dir) = &self.config.resources_dir {
            if !dir.is_dir() {
                return Err(RenderError::Resource(format!(
                    "resources directory not found: {}",
                    dir.display()
                )));
            }
            opt.resources_dir = Some(dir.clone());
        }

        let tree = usvg::Tree::from_str(&svg_string, &opt)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

        let px_w = tree.size().width().round() as u32;
        let px_h = tree.size().height().round() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

impl RasterSurface for SceneExporter {
    type Error = RenderError;

    fn rasterize(&self, scene: &Scene, format: RasterFormat) -> Result<Vec<u8>, Self::Error> {
        self.export(scene, format.into())
    }
}

/// Render a single element to SVG.
///
/// Each element becomes a group placed at its position; rotation pivots on
/// that position and scale applies in the rotated frame.
fn render_element_svg(svg: &mut String, element: &Element) {
    let _ = write!(
        svg,
        "<g transform=\"translate({} {}) rotate({}) scale({} {})\" opacity=\"{}\">",
        element.x,
        element.y,
        element.rotation,
        element.scale_x,
        element.scale_y,
        element.opacity.clamp(0.0, 1.0),
    );

    match &element.kind {
        ElementKind::Text(text) => render_text_svg(svg, text),

        ElementKind::Rect(rect) => {
            let _ = write!(
                svg,
                "<rect width=\"{}\" height=\"{}\" rx=\"{}\" fill=\"{}\"{}/>",
                rect.width,
                rect.height,
                rect.corner_radius.max(0.0),
                paint(&rect.fill),
                stroke_attrs(&rect.stroke, rect.stroke_width),
            );
        }

        ElementKind::Circle(circle) => {
            let r = circle.radius;
            let _ = write!(
                svg,
                "<circle cx=\"{r}\" cy=\"{r}\" r=\"{r}\" fill=\"{}\"{}/>",
                paint(&circle.fill),
                stroke_attrs(&circle.stroke, circle.stroke_width),
            );
        }

        ElementKind::Star(star) => {
            let points = star_points(star.outer_radius, star.inner_radius, star.num_points);
            let _ = write!(
                svg,
                "<polygon points=\"{}\" fill=\"{}\"{}/>",
                format_points(&points),
                paint(&star.fill),
                stroke_attrs(&star.stroke, star.stroke_width),
            );
        }

        ElementKind::Polygon(polygon) => {
            let points = polygon_points(polygon.radius, polygon.sides);
            let _ = write!(
                svg,
                "<polygon points=\"{}\" fill=\"{}\"{}/>",
                format_points(&points),
                paint(&polygon.fill),
                stroke_attrs(&polygon.stroke, polygon.stroke_width),
            );
        }

        ElementKind::Line(line) => render_line_svg(svg, line),

        ElementKind::Image(image) => {
            if image.src.is_empty() {
                let _ = write!(
                    svg,
                    "<rect width=\"{}\" height=\"{}\" fill=\"{IMAGE_PLACEHOLDER}\"/>",
                    image.width, image.height,
                );
            } else {
                let _ = write!(
                    svg,
                    "<image width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" xlink:href=\"{}\"/>",
                    image.width,
                    image.height,
                    escape_xml(&image.src),
                );
            }
        }
    }

    svg.push_str("</g>");
}

#[allow(clippy::cast_precision_loss)]
fn render_text_svg(svg: &mut String, text: &TextShape) {
    let (anchor, x) = match text.align {
        TextAlign::Left => ("start", text.padding),
        TextAlign::Center => ("middle", text.width / 2.0),
        TextAlign::Right => ("end", text.width - text.padding),
    };

    let lines: Vec<&str> = text.text.split('\n').collect();
    let line_px = text.font_size * text.line_height;
    let block = line_px * lines.len() as f32;
    let top = match text.vertical_align {
        VerticalAlign::Top => text.padding,
        VerticalAlign::Middle => (text.height - block) / 2.0,
        VerticalAlign::Bottom => text.height - text.padding - block,
    };

    let _ = write!(
        svg,
        "<text font-family=\"{}\" font-size=\"{}\" fill=\"{}\" text-anchor=\"{anchor}\" letter-spacing=\"{}\">",
        escape_xml(&text.font_family),
        text.font_size,
        paint(&text.fill),
        text.letter_spacing,
    );
    for (index, line) in lines.iter().enumerate() {
        let baseline = (index as f32).mul_add(line_px, top + text.font_size);
        let _ = write!(
            svg,
            "<tspan x=\"{x}\" y=\"{baseline}\">{}</tspan>",
            escape_xml(line),
        );
    }
    svg.push_str("</text>");
}

fn render_line_svg(svg: &mut String, line: &LineShape) {
    let points: Vec<(f32, f32)> = line
        .points
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();
    if points.len() < 2 {
        return;
    }

    if line.closed {
        let _ = write!(
            svg,
            "<polygon points=\"{}\" fill=\"{}\"{}/>",
            format_points(&points),
            paint(&line.fill),
            stroke_attrs(&line.stroke, line.stroke_width),
        );
    } else {
        let _ = write!(
            svg,
            "<polyline points=\"{}\" fill=\"none\"{} stroke-linecap=\"round\" stroke-linejoin=\"round\"/>",
            format_points(&points),
            stroke_attrs(&line.stroke, line.stroke_width),
        );
    }
}

/// Star vertices around the centre of its bounding square, first tip pointing up.
#[allow(clippy::cast_precision_loss)]
fn star_points(outer: f32, inner: f32, tips: u32) -> Vec<(f32, f32)> {
    let tips = tips.clamp(2, MAX_SHAPE_VERTICES);
    let count = tips * 2;
    let step = PI / tips as f32;
    (0..count)
        .map(|k| {
            let radius = if k % 2 == 0 { outer } else { inner };
            let angle = (k as f32).mul_add(step, -FRAC_PI_2);
            (
                radius.mul_add(angle.cos(), outer),
                radius.mul_add(angle.sin(), outer),
            )
        })
        .collect()
}

/// Regular polygon vertices around the centre of its bounding square.
#[allow(clippy::cast_precision_loss)]
fn polygon_points(radius: f32, sides: u32) -> Vec<(f32, f32)> {
    let sides = sides.clamp(3, MAX_SHAPE_VERTICES);
    let step = 2.0 * PI / sides as f32;
    (0..sides)
        .map(|k| {
            let angle = (k as f32).mul_add(step, -FRAC_PI_2);
            (
                radius.mul_add(angle.cos(), radius),
                radius.mul_add(angle.sin(), radius),
            )
        })
        .collect()
}

fn format_points(points: &[(f32, f32)]) -> String {
    let mut out = String::with_capacity(points.len() * 12);
    for (index, (x, y)) in points.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{x},{y}");
    }
    out
}

/// SVG paint value for a colour string; empty and `transparent` become `none`.
fn paint(color: &str) -> String {
    let trimmed = color.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("transparent") {
        "none".to_string()
    } else {
        escape_xml(trimmed)
    }
}

fn stroke_attrs(stroke: &str, width: f32) -> String {
    if width > 0.0 && paint(stroke) != "none" {
        format!(" stroke=\"{}\" stroke-width=\"{width}\"", paint(stroke))
    } else {
        String::new()
    }
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
