//! Print-quality (DPI) analysis for image elements.
//!
//! The canvas is assumed to print at [`PRINT_DPI`], so a canvas of `w` pixels
//! becomes a banner `w / PRINT_DPI` inches wide. An image's effective DPI is its
//! native pixel count divided by the inches it covers on that banner, taken on
//! the worse of the two axes.

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementKind};

/// Resolution the canvas is assumed to print at.
pub const PRINT_DPI: f32 = 150.0;

/// Print-quality class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityRating {
    /// Below 72 DPI.
    Poor,
    /// 72 DPI or better.
    Fair,
    /// 150 DPI or better.
    Good,
    /// 300 DPI or better.
    Excellent,
}

impl QualityRating {
    /// Classify an effective DPI value.
    #[must_use]
    pub fn from_dpi(dpi: f32) -> Self {
        if dpi >= 300.0 {
            Self::Excellent
        } else if dpi >= 150.0 {
            Self::Good
        } else if dpi >= 72.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }

    /// Advice shown next to the rating.
    #[must_use]
    pub const fn recommendation(self) -> &'static str {
        match self {
            Self::Excellent => "Image resolution is excellent for print.",
            Self::Good => "Image resolution is good for print.",
            Self::Fair => {
                "Image may look slightly soft when printed. Consider a higher resolution image or a smaller size."
            }
            Self::Poor => {
                "Image will look pixelated when printed. Use a higher resolution image or reduce its size."
            }
        }
    }
}

impl std::fmt::Display for QualityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Width/height pair in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inches {
    /// Width in inches.
    pub width: f32,
    /// Height in inches.
    pub height: f32,
}

/// Result of analysing one image element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpiReport {
    /// Effective DPI on the worse axis.
    pub dpi: f32,
    /// Quality class for `dpi`.
    pub rating: QualityRating,
    /// Human-readable advice.
    pub recommendation: String,
    /// Physical size of the whole printed canvas.
    pub physical: Inches,
    /// Printed footprint of the image.
    pub rendered: Inches,
}

/// Analyze an image element printed on a `canvas_width x canvas_height` canvas.
///
/// Returns `None` for non-image elements. The element's display size includes
/// its node scale. Degenerate sizes never produce NaN: an axis with no printed
/// extent is ignored, and an image with no usable axis reports 0 DPI.
#[must_use]
pub fn analyze_image(
    canvas_width: f32,
    canvas_height: f32,
    element: &Element,
    print_dpi: f32,
) -> Option<DpiReport> {
    let ElementKind::Image(image) = &element.kind else {
        return None;
    };
    let print_dpi = if print_dpi.is_finite() && print_dpi > 0.0 {
        print_dpi
    } else {
        PRINT_DPI
    };

    let display_width = image.width * element.scale_x.abs();
    let display_height = image.height * element.scale_y.abs();

    let physical = Inches {
        width: canvas_width / print_dpi,
        height: canvas_height / print_dpi,
    };
    let rendered = Inches {
        width: footprint(display_width, canvas_width, physical.width, print_dpi),
        height: footprint(display_height, canvas_height, physical.height, print_dpi),
    };

    #[allow(clippy::cast_precision_loss)]
    let axes = [
        axis_dpi(image.native_width as f32, rendered.width),
        axis_dpi(image.native_height as f32, rendered.height),
    ];
    let dpi = axes
        .into_iter()
        .flatten()
        .reduce(f32::min)
        .unwrap_or(0.0);

    let rating = QualityRating::from_dpi(dpi);
    Some(DpiReport {
        dpi,
        rating,
        recommendation: rating.recommendation().to_string(),
        physical,
        rendered,
    })
}

fn footprint(display: f32, canvas: f32, physical: f32, print_dpi: f32) -> f32 {
    if canvas.is_finite() && canvas > 0.0 {
        (display / canvas) * physical
    } else {
        display / print_dpi
    }
}

fn axis_dpi(native: f32, rendered_inches: f32) -> Option<f32> {
    (rendered_inches.is_finite() && rendered_inches > 0.0).then(|| native / rendered_inches)
}
