//! Seam to the rendering surface that rasterizes a scene.

use serde::{Deserialize, Serialize};

use crate::scene::Scene;

/// Raster formats an export can be requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    /// PNG (lossless, keeps transparency).
    Png,
    /// JPEG (lossy, no transparency).
    Jpeg,
}

impl RasterFormat {
    /// Conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// MIME type.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Parse a format name or file extension, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

impl std::fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Something that can turn a scene into encoded raster bytes.
///
/// The engine never rasterizes on its own; [`Editor::export_raster`](crate::Editor::export_raster)
/// hands the current scene to an implementation of this trait.
pub trait RasterSurface {
    /// Error produced by the surface.
    type Error: std::error::Error;

    /// Rasterize `scene` and encode it as `format`.
    ///
    /// # Errors
    ///
    /// Returns the surface's error if rendering or encoding fails.
    fn rasterize(&self, scene: &Scene, format: RasterFormat) -> Result<Vec<u8>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(RasterFormat::from_name("PNG"), Some(RasterFormat::Png));
        assert_eq!(RasterFormat::from_name("jpeg"), Some(RasterFormat::Jpeg));
        assert_eq!(RasterFormat::from_name("jpg"), Some(RasterFormat::Jpeg));
        assert_eq!(RasterFormat::from_name("gif"), None);
        assert_eq!(RasterFormat::Jpeg.mime_type(), "image/jpeg");
    }
}
