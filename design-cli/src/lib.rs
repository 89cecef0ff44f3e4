//! # Design CLI
//!
//! Command-line host for scene documents produced by the design surface.
//!
//! ## Usage
//!
//! ```bash
//! design-cli inspect banner.json
//! design-cli normalize banner.json -o banner.normalized.json
//! design-cli export banner.json -o banner.png --scale 2
//! ```
//!
//! An optional JSON config file (`--config`, or `DESIGN_CONFIG`) carries an
//! `editor` section ([`EditorConfig`]) and an `export` section ([`ExportConfig`]).

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use design_core::{
    DpiReport, Editor, EditorConfig, ElementId, QualityRating, RasterFormat, SkippedElement,
};
use design_renderer::{ExportConfig, ExportFormat, SceneExporter};
use serde::{Deserialize, Serialize};

/// Command-line arguments for design-cli.
#[derive(Debug, Clone, Parser)]
#[command(name = "design-cli")]
#[command(about = "Inspect, normalize and export design-surface scenes")]
#[command(version)]
pub struct CliArgs {
    /// JSON config file with `editor` and `export` sections
    #[arg(long, global = true, env = "DESIGN_CONFIG")]
    pub config: Option<PathBuf>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Summarize a scene and report print quality of its images
    Inspect {
        /// Scene document to read
        scene: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a scene and write it back in canonical form
    Normalize {
        /// Scene document to read
        scene: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a scene to an image file
    Export {
        /// Scene document to read
        scene: PathBuf,

        /// Output image file
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (png, jpeg or svg); inferred from the output extension when omitted
        #[arg(long)]
        format: Option<String>,

        /// Pixel scale factor
        #[arg(long, env = "DESIGN_EXPORT_SCALE")]
        scale: Option<f32>,

        /// Background colour overriding the scene's own
        #[arg(long)]
        background: Option<String>,

        /// JPEG quality (1-100)
        #[arg(long)]
        quality: Option<u8>,
    },
}

/// Contents of the `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Editor tunables.
    pub editor: EditorConfig,
    /// Export defaults; command-line flags take precedence.
    pub export: ExportConfig,
}

impl FileConfig {
    /// Read the config file, or the defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid config.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Print-quality line for one image element.
#[derive(Debug, Clone, Serialize)]
pub struct ImageQuality {
    /// The image element.
    pub id: ElementId,
    /// The DPI analysis.
    #[serde(flatten)]
    pub report: DpiReport,
}

/// Summary produced by `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
    /// Canvas background colour.
    pub background: String,
    /// Number of elements kept after load.
    pub element_count: usize,
    /// Element count per variant tag.
    pub variants: BTreeMap<String, usize>,
    /// Elements dropped during load.
    pub skipped: Vec<SkippedElement>,
    /// Print quality of every image element.
    pub images: Vec<ImageQuality>,
}

impl InspectReport {
    /// Build the report for the editor's current scene.
    #[must_use]
    pub fn new(editor: &Editor, skipped: Vec<SkippedElement>) -> Self {
        let scene = editor.scene();
        let mut variants = BTreeMap::new();
        for element in scene.elements() {
            *variants.entry(element.variant().to_string()).or_insert(0) += 1;
        }
        let images = editor
            .analyze_images()
            .into_iter()
            .map(|(id, report)| ImageQuality { id, report })
            .collect();

        Self {
            width: scene.width,
            height: scene.height,
            background: scene.background.clone(),
            element_count: scene.element_count(),
            variants,
            skipped,
            images,
        }
    }

    /// Worst image rating in the scene, if it has images.
    #[must_use]
    pub fn worst_rating(&self) -> Option<QualityRating> {
        self.images.iter().map(|i| i.report.rating).min()
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Canvas: {}x{} background {}",
            self.width, self.height, self.background
        )?;
        writeln!(f, "Elements: {}", self.element_count)?;
        for (variant, count) in &self.variants {
            writeln!(f, "  {variant}: {count}")?;
        }
        for skipped in &self.skipped {
            writeln!(
                f,
                "Skipped element #{} (unknown type \"{}\")",
                skipped.index, skipped.tag
            )?;
        }
        if self.images.is_empty() {
            return writeln!(f, "Images: none");
        }
        writeln!(f, "Images:")?;
        for image in &self.images {
            writeln!(
                f,
                "  {}: {:.0} DPI ({}) {}",
                image.id, image.report.dpi, image.report.rating, image.report.recommendation
            )?;
        }
        Ok(())
    }
}

/// Read a scene document into a fresh editor.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid scene.
pub fn load_editor(
    path: &Path,
    config: EditorConfig,
) -> anyhow::Result<(Editor, Vec<SkippedElement>)> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading scene {}", path.display()))?;
    let mut editor = Editor::new(config);
    let skipped = editor
        .load_scene(&json)
        .with_context(|| format!("loading scene {}", path.display()))?;
    Ok((editor, skipped))
}

/// Pick the export format from an explicit name or the output extension.
///
/// # Errors
///
/// Returns an error if neither names a supported format.
pub fn resolve_format(explicit: Option<&str>, output: &Path) -> anyhow::Result<ExportFormat> {
    if let Some(name) = explicit {
        return ExportFormat::from_name(name)
            .with_context(|| format!("unsupported export format \"{name}\""));
    }
    let Some(extension) = output.extension().and_then(|e| e.to_str()) else {
        bail!(
            "cannot infer export format from {}; pass --format",
            output.display()
        );
    };
    ExportFormat::from_name(extension)
        .with_context(|| format!("unsupported output extension \".{extension}\""))
}

/// Execute a parsed command line, writing human output to `out`.
///
/// # Errors
///
/// Returns an error if any file operation, load or export fails.
pub fn run(args: CliArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let config = FileConfig::load(args.config.as_deref())?;

    match args.command {
        Command::Inspect { scene, json } => {
            let (editor, skipped) = load_editor(&scene, config.editor)?;
            let report = InspectReport::new(&editor, skipped);
            if report.worst_rating() == Some(QualityRating::Poor) {
                tracing::warn!(scene = %scene.display(), "Scene contains images too low-res for print");
            }
            if json {
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            } else {
                write!(out, "{report}")?;
            }
        }

        Command::Normalize { scene, output } => {
            let (editor, skipped) = load_editor(&scene, config.editor)?;
            if !skipped.is_empty() {
                tracing::warn!(count = skipped.len(), "Dropped unknown elements");
            }
            let mut json = editor.serialize_scene()?;
            json.push('\n');
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), "Wrote normalized scene");
                }
                None => out.write_all(json.as_bytes())?,
            }
        }

        Command::Export {
            scene,
            output,
            format,
            scale,
            background,
            quality,
        } => {
            let format = resolve_format(format.as_deref(), &output)?;
            let (editor, _) = load_editor(&scene, config.editor)?;

            let mut export = config.export;
            if let Some(scale) = scale {
                export.scale = scale;
            }
            if background.is_some() {
                export.background = background;
            }
            if let Some(quality) = quality {
                export.jpeg_quality = quality;
            }
            if export.resources_dir.is_none() {
                export.resources_dir = scene
                    .parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map(Path::to_path_buf);
            }
            let exporter = SceneExporter::new(export);

            let bytes = match format {
                ExportFormat::Png => editor.export_raster(&exporter, RasterFormat::Png)?,
                ExportFormat::Jpeg => editor.export_raster(&exporter, RasterFormat::Jpeg)?,
                ExportFormat::Svg => exporter.export(editor.scene(), format)?,
            };
            std::fs::write(&output, &bytes)
                .with_context(|| format!("writing {}", output.display()))?;

            tracing::info!(
                path = %output.display(),
                format = format.extension(),
                bytes = bytes.len(),
                "Exported scene"
            );
            writeln!(out, "Wrote {} ({} bytes)", output.display(), bytes.len())?;
        }
    }

    Ok(())
}
