//! # Configuration
//!
//! Canvas presets and runtime tuning for export, preview and thumbnails.
//!
//! ## Canvas Presets
//!
//! | Preset | Size (px) | Used by |
//! |--------|-----------|---------|
//! | `A4_PORTRAIT` | 794 × 1123 | reports, contracts |
//! | `SLIDE_16_9` | 1600 × 900 | presentations, slide reports |
//! | `SQUARE_POST` | 1080 × 1080 | promotional graphics |
//!
//! ## Config File
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```
//! use vizdoc::config::VizdocConfig;
//!
//! let config: VizdocConfig = serde_json::from_str(r#"{"export": {"density": 3.0}}"#).unwrap();
//! assert_eq!(config.export.density, 3.0);
//! assert_eq!(config.export.settle_delay_ms, 150);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::document::DocumentKind;
use crate::error::VizdocError;

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_ENV: &str = "VIZDOC_CONFIG";

/// Native pixel size of a document page.
///
/// Exports always happen at exactly this size (times the capture density);
/// previews scale it visually without changing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// A4-proportioned portrait page at 96 DPI.
    pub const A4_PORTRAIT: Self = Self::new(794, 1123);

    /// 16:9 presentation slide.
    pub const SLIDE_16_9: Self = Self::new(1600, 900);

    /// Square social media post.
    pub const SQUARE_POST: Self = Self::new(1080, 1080);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel size at a device density, never below 1×1.
    pub fn at_density(&self, density: f32) -> (u32, u32) {
        let w = (self.width as f32 * density).round().max(1.0) as u32;
        let h = (self.height as f32 * density).round().max(1.0) as u32;
        (w, h)
    }
}

// ============================================================================
// SECTIONS
// ============================================================================

/// Export quality settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Device pixel multiplier for exports (1–3 typical).
    pub density: f32,
    /// JPEG quality in 0.6..=0.92.
    pub jpeg_quality: f32,
    /// Wait before each page capture of a multi-page export.
    pub settle_delay_ms: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            density: 2.0,
            jpeg_quality: 0.92,
            settle_delay_ms: 150,
        }
    }
}

impl ExportSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// On-screen preview bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Upper bound for regular documents (never magnify).
    pub max_scale: f64,
    /// Upper bound in full-screen presentation mode.
    pub presentation_max_scale: f64,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            max_scale: 1.0,
            presentation_max_scale: 2.0,
        }
    }
}

/// Thumbnail capture tuning for one document kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailSettings {
    pub density: f32,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl ThumbnailSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Per-kind thumbnail settings. Chart-heavy documents settle slower than
/// plain text ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailTable {
    pub report: ThumbnailSettings,
    pub contract: ThumbnailSettings,
    pub presentation: ThumbnailSettings,
    pub graphic: ThumbnailSettings,
}

impl Default for ThumbnailTable {
    fn default() -> Self {
        Self {
            report: ThumbnailSettings {
                density: 0.2,
                max_retries: 5,
                retry_delay_ms: 500,
            },
            contract: ThumbnailSettings {
                density: 0.2,
                max_retries: 3,
                retry_delay_ms: 200,
            },
            presentation: ThumbnailSettings {
                density: 0.2,
                max_retries: 5,
                retry_delay_ms: 400,
            },
            graphic: ThumbnailSettings {
                density: 0.25,
                max_retries: 4,
                retry_delay_ms: 300,
            },
        }
    }
}

impl ThumbnailTable {
    pub fn for_kind(&self, kind: DocumentKind) -> ThumbnailSettings {
        match kind {
            DocumentKind::Report => self.report,
            DocumentKind::Contract => self.contract,
            DocumentKind::Presentation => self.presentation,
            DocumentKind::Graphic => self.graphic,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizdocConfig {
    pub export: ExportSettings,
    pub preview: PreviewSettings,
    pub thumbnails: ThumbnailTable,
}

impl VizdocConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, VizdocError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `explicit`, else from `$VIZDOC_CONFIG`, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, VizdocError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), VizdocError> {
        if !(self.export.density > 0.0 && self.export.density.is_finite()) {
            return Err(VizdocError::Config(format!(
                "export.density must be positive, got {}",
                self.export.density
            )));
        }
        if !(0.6..=0.92).contains(&self.export.jpeg_quality) {
            return Err(VizdocError::Config(format!(
                "export.jpeg_quality must be within 0.6..=0.92, got {}",
                self.export.jpeg_quality
            )));
        }
        for kind in DocumentKind::ALL {
            let density = self.thumbnails.for_kind(kind).density;
            if !(density > 0.0 && density.is_finite()) {
                return Err(VizdocError::Config(format!(
                    "thumbnails.{}.density must be positive, got {}",
                    kind, density
                )));
            }
        }
        if !(self.preview.max_scale > 0.0 && self.preview.presentation_max_scale > 0.0) {
            return Err(VizdocError::Config("preview scale bounds must be positive".into()));
        }
        Ok(())
    }
}
