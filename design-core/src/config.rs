//! Editor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::transform::CORNER_TOLERANCE;

/// Tunables for an [`Editor`](crate::Editor) session.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// How long a marquee may stay open without being finished, in milliseconds.
    pub marquee_timeout_ms: u64,
    /// A marquee smaller than this on both axes counts as a click.
    pub min_marquee_size: f32,
    /// Maximum `|scale_x - scale_y|` still treated as a corner drag.
    pub corner_tolerance: f32,
    /// Assumed print resolution used to size the physical output.
    pub print_dpi: f32,
    /// Maximum number of history snapshots kept (oldest dropped first).
    /// `None`, the default, keeps the whole session undoable.
    pub history_limit: Option<usize>,
    /// Offset applied to duplicated elements on both axes.
    pub duplicate_offset: f32,
}

impl EditorConfig {
    /// The marquee timeout as a [`Duration`].
    #[must_use]
    pub const fn marquee_timeout(&self) -> Duration {
        Duration::from_millis(self.marquee_timeout_ms)
    }

    /// Parse a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid config object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            marquee_timeout_ms: 5_000,
            min_marquee_size: 10.0,
            corner_tolerance: CORNER_TOLERANCE,
            print_dpi: crate::print_quality::PRINT_DPI,
            history_limit: None,
            duplicate_offset: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.marquee_timeout(), Duration::from_secs(5));
        assert!((config.min_marquee_size - 10.0).abs() < f32::EPSILON);
        assert!((config.print_dpi - 150.0).abs() < f32::EPSILON);
        assert_eq!(config.history_limit, None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{"history_limit": 10}"#).expect("parse");
        assert_eq!(config.history_limit, Some(10));
        assert_eq!(config.marquee_timeout_ms, 5_000);
    }
}
