//! # Scaled Preview
//!
//! Documents have a fixed native size; previews show them scaled to fit a
//! container. The scale lives in a [`DisplayTransform`] next to the node and
//! never touches the native tree, so captures always see native geometry.
//!
//! ## Scale Policy
//!
//! | Mode | Scale |
//! |------|-------|
//! | `FitWidth { max }` | `min(cw / nw, max)` |
//! | `Contain { max }` (full-screen presentation) | `min(cw / nw, ch / nh, max)` |
//!
//! Both are clamped to `[MIN_SCALE, max]`. Non-finite ratios fall to
//! `MIN_SCALE`.
//!
//! ## Resizes During Capture
//!
//! ```text
//!   on_resize ──► node capturing? ──yes──► Deferred (remembered)
//!                      │                         │
//!                      no                   flush() once the
//!                      ▼                    capture is over
//!              Changed / Unchanged ◄────────────┘
//! ```

use image::RgbaImage;
use std::fmt;
use std::str::FromStr;

use crate::config::{CanvasSize, PreviewSettings};
use crate::error::VizdocError;
use crate::render::{CaptureOptions, rasterize};
use crate::stage::NodeHandle;

/// Smallest scale a preview ever uses.
pub const MIN_SCALE: f64 = 0.05;

/// Available display area in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl FromStr for ContainerSize {
    type Err = VizdocError;

    /// Parses `WIDTHxHEIGHT`, e.g. `1280x720`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VizdocError::InvalidJob(format!("invalid container size '{}', expected WxH", s));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: f64 = w.trim().parse().map_err(|_| invalid())?;
        let height: f64 = h.trim().parse().map_err(|_| invalid())?;
        if width < 0.0 || height < 0.0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleMode {
    FitWidth { max: f64 },
    Contain { max: f64 },
}

impl ScaleMode {
    /// Mode for a document view, `presentation` meaning full-screen slides.
    pub fn from_settings(settings: &PreviewSettings, presentation: bool) -> Self {
        if presentation {
            ScaleMode::Contain {
                max: settings.presentation_max_scale,
            }
        } else {
            ScaleMode::FitWidth {
                max: settings.max_scale,
            }
        }
    }

    pub fn max(&self) -> f64 {
        match *self {
            ScaleMode::FitWidth { max } | ScaleMode::Contain { max } => max,
        }
    }
}

/// A derived display scale. Recomputed on every resize, never stored in
/// the document.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PreviewScale(f64);

impl PreviewScale {
    pub fn compute(native: CanvasSize, container: ContainerSize, mode: ScaleMode) -> Self {
        let upper = if mode.max().is_finite() {
            mode.max().max(MIN_SCALE)
        } else {
            1.0
        };
        let width_ratio = container.width / native.width as f64;
        let ratio = match mode {
            ScaleMode::FitWidth { .. } => width_ratio,
            ScaleMode::Contain { .. } => width_ratio.min(container.height / native.height as f64),
        };
        if !ratio.is_finite() {
            return Self(MIN_SCALE);
        }
        Self(ratio.min(upper).clamp(MIN_SCALE, upper))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Display-only transform of a node: scale about the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub scale: f64,
    /// Size the node occupies on screen.
    pub displayed_width: f64,
    pub displayed_height: f64,
}

impl DisplayTransform {
    pub fn new(native: CanvasSize, scale: PreviewScale) -> Self {
        Self {
            scale: scale.value(),
            displayed_width: native.width as f64 * scale.value(),
            displayed_height: native.height as f64 * scale.value(),
        }
    }

    /// Equivalent CSS declarations.
    pub fn css(&self) -> String {
        format!(
            "transform: scale({}); transform-origin: top left; width: {:.0}px; height: {:.0}px;",
            self.scale, self.displayed_width, self.displayed_height
        )
    }
}

impl fmt::Display for DisplayTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3}x ({:.0}x{:.0})",
            self.scale, self.displayed_width, self.displayed_height
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeOutcome {
    Changed(DisplayTransform),
    Unchanged,
    /// The node is being captured; call [`PreviewController::flush`] later.
    Deferred,
}

/// Keeps a mounted node's display transform in step with its container.
pub struct PreviewController {
    node: NodeHandle,
    mode: ScaleMode,
    container: Option<ContainerSize>,
    transform: Option<DisplayTransform>,
    deferred: Option<ContainerSize>,
}

impl PreviewController {
    pub fn new(node: NodeHandle, mode: ScaleMode) -> Self {
        Self {
            node,
            mode,
            container: None,
            transform: None,
            deferred: None,
        }
    }

    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    pub fn transform(&self) -> Option<DisplayTransform> {
        self.transform
    }

    /// Compute the initial transform.
    pub fn mount(&mut self, container: ContainerSize) -> DisplayTransform {
        self.deferred = None;
        self.apply(container)
    }

    fn apply(&mut self, container: ContainerSize) -> DisplayTransform {
        let native = self.node.native_size();
        let transform = DisplayTransform::new(native, PreviewScale::compute(native, container, self.mode));
        self.container = Some(container);
        self.transform = Some(transform);
        log::debug!("preview of node {} at {}", self.node.id(), transform);
        transform
    }

    pub fn on_resize(&mut self, container: ContainerSize) -> ResizeOutcome {
        if self.node.is_capturing() {
            self.deferred = Some(container);
            return ResizeOutcome::Deferred;
        }
        self.deferred = None;
        if self.container == Some(container) {
            return ResizeOutcome::Unchanged;
        }
        let previous = self.transform;
        let transform = self.apply(container);
        if previous == Some(transform) {
            ResizeOutcome::Unchanged
        } else {
            ResizeOutcome::Changed(transform)
        }
    }

    /// Apply a deferred resize once the node is free.
    pub fn flush(&mut self) -> ResizeOutcome {
        match self.deferred {
            Some(_) if self.node.is_capturing() => ResizeOutcome::Deferred,
            Some(container) => self.on_resize(container),
            None => ResizeOutcome::Unchanged,
        }
    }

    /// Rasterize `page` at the display scale. `None` before
    /// [`mount`](Self::mount), while the node is laying out, or for a page
    /// that does not exist.
    pub fn render_preview(&self, page: usize) -> Result<Option<RgbaImage>, VizdocError> {
        let Some(transform) = self.transform else {
            return Ok(None);
        };
        let Some(images) = self.node.images() else {
            return Ok(None);
        };
        let Some(tree) = self.node.document().page(page) else {
            return Ok(None);
        };
        let opts = CaptureOptions::png(transform.scale as f32);
        rasterize(tree, &images, &opts).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::resolve::ImageMap;
    use crate::document::{DocumentKind, Payload, render};
    use pretty_assertions::assert_eq;

    const FIT: ScaleMode = ScaleMode::FitWidth { max: 1.0 };

    fn node(kind: DocumentKind, variant: &str) -> NodeHandle {
        NodeHandle::ready(render(kind, variant, &Payload::new()), ImageMap::new())
    }

    #[test]
    fn test_fit_width_scale() {
        let s = PreviewScale::compute(CanvasSize::A4_PORTRAIT, ContainerSize::new(397.0, 100.0), FIT);
        assert_eq!(s.value(), 0.5);
        // never magnifies past the bound
        let s = PreviewScale::compute(CanvasSize::A4_PORTRAIT, ContainerSize::new(4000.0, 100.0), FIT);
        assert_eq!(s.value(), 1.0);
    }

    #[test]
    fn test_contain_uses_tighter_axis() {
        let mode = ScaleMode::Contain { max: 2.0 };
        let s = PreviewScale::compute(CanvasSize::SLIDE_16_9, ContainerSize::new(3200.0, 900.0), mode);
        assert_eq!(s.value(), 1.0);
        let s = PreviewScale::compute(CanvasSize::SLIDE_16_9, ContainerSize::new(4000.0, 4000.0), mode);
        assert_eq!(s.value(), 2.0);
    }

    #[test]
    fn test_degenerate_containers_hit_the_floor() {
        let s = PreviewScale::compute(CanvasSize::A4_PORTRAIT, ContainerSize::new(0.0, 0.0), FIT);
        assert_eq!(s.value(), MIN_SCALE);
        let s = PreviewScale::compute(CanvasSize::new(0, 0), ContainerSize::new(0.0, 0.0), FIT);
        assert_eq!(s.value(), MIN_SCALE);
        let s = PreviewScale::compute(CanvasSize::A4_PORTRAIT, ContainerSize::new(f64::NAN, 1.0), FIT);
        assert_eq!(s.value(), MIN_SCALE);
    }

    #[test]
    fn test_scale_always_in_bounds() {
        for w in [0.0, 1.0, 37.5, 400.0, 794.0, 1e6] {
            for h in [0.0, 10.0, 900.0, 1e6] {
                for mode in [FIT, ScaleMode::Contain { max: 2.0 }] {
                    let s = PreviewScale::compute(CanvasSize::SLIDE_16_9, ContainerSize::new(w, h), mode);
                    assert!(s.value() > 0.0 && s.value() <= mode.max(), "{} {} {:?}", w, h, mode);
                }
            }
        }
    }

    #[test]
    fn test_container_parse() {
        assert_eq!("1280x720".parse::<ContainerSize>().unwrap(), ContainerSize::new(1280.0, 720.0));
        assert!("1280".parse::<ContainerSize>().is_err());
        assert!("-1x5".parse::<ContainerSize>().is_err());
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut preview = PreviewController::new(node(DocumentKind::Report, "classic"), FIT);
        let t = preview.mount(ContainerSize::new(397.0, 600.0));
        assert_eq!(t.displayed_width, 397.0);
        assert_eq!(preview.on_resize(ContainerSize::new(397.0, 600.0)), ResizeOutcome::Unchanged);
        assert!(matches!(
            preview.on_resize(ContainerSize::new(794.0, 600.0)),
            ResizeOutcome::Changed(t) if t.scale == 1.0
        ));
        // wider container, scale already at its bound
        assert_eq!(preview.on_resize(ContainerSize::new(1600.0, 600.0)), ResizeOutcome::Unchanged);
    }

    #[test]
    fn test_resize_deferred_during_capture() {
        let handle = node(DocumentKind::Report, "classic");
        let mut preview = PreviewController::new(handle.clone(), FIT);
        preview.mount(ContainerSize::new(794.0, 600.0));

        let session = handle.begin_capture().unwrap();
        assert_eq!(preview.on_resize(ContainerSize::new(397.0, 600.0)), ResizeOutcome::Deferred);
        assert_eq!(preview.transform().unwrap().scale, 1.0);
        assert_eq!(preview.flush(), ResizeOutcome::Deferred);
        drop(session);

        assert!(matches!(preview.flush(), ResizeOutcome::Changed(t) if t.scale == 0.5));
        assert_eq!(preview.flush(), ResizeOutcome::Unchanged);
    }

    #[test]
    fn test_render_preview_at_display_scale() {
        let handle = node(DocumentKind::Graphic, "minimal");
        let mut preview = PreviewController::new(handle.clone(), FIT);
        assert!(preview.render_preview(0).unwrap().is_none());
        preview.mount(ContainerSize::new(108.0, 108.0));
        let img = preview.render_preview(0).unwrap().unwrap();
        assert_eq!(img.dimensions(), (108, 108));
        // native geometry untouched
        assert_eq!(handle.native_size(), CanvasSize::SQUARE_POST);
        assert!(preview.render_preview(3).unwrap().is_none());
    }

    #[test]
    fn test_css() {
        let t = DisplayTransform::new(CanvasSize::SLIDE_16_9, PreviewScale(0.5));
        assert_eq!(
            t.css(),
            "transform: scale(0.5); transform-origin: top left; width: 800px; height: 450px;"
        );
    }
}
