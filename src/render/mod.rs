//! # Rendering Module
//!
//! Turns mounted documents into bitmaps.
//!
//! ## Modules
//!
//! - [`canvas`]: tiny-skia rasterizer for [`VisualTree`](crate::scene::VisualTree)s
//! - [`font`]: Spleen bitmap text
//! - [`encode`]: PNG and JPEG encoders
//!
//! ## Capture
//!
//! A capture rasterizes one page of a node at a density (device pixels per
//! native pixel) and encodes it. It is all-or-nothing: the result is either a
//! complete bitmap or `None`.
//!
//! ```text
//!   NodeHandle ──begin_capture──► CaptureSession ──capture_in(page)──► Capture
//!                    │                   │
//!                    └─ busy: None       └─ unmounted / pending / bad page: None
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use vizdoc::document::{DocumentKind, Payload, render};
//! use vizdoc::render::{CaptureOptions, capture};
//! use vizdoc::stage::Stage;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let doc = render(DocumentKind::Graphic, "minimal", &Payload::new().with("headline", "Hej"));
//! let handle = Stage::new().mount(doc);
//! let shot = capture(&handle, 0, &CaptureOptions::png(0.25)).await.unwrap();
//! assert_eq!((shot.width, shot.height), (270, 270));
//! # });
//! ```

pub mod canvas;
pub mod encode;
pub mod font;

pub use canvas::rasterize;
pub use encode::Encoding;

use crate::config::CanvasSize;
use crate::error::VizdocError;
use crate::scene::Color;
use crate::stage::{CaptureSession, NodeHandle};

/// How to capture a page.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Device pixels per native pixel.
    pub density: f32,
    /// Replaces the page background when set.
    pub background: Option<Color>,
    pub encoding: Encoding,
    /// Capture region in native pixels, anchored top-left. Defaults to the
    /// page size.
    pub size_override: Option<CanvasSize>,
}

impl CaptureOptions {
    pub fn png(density: f32) -> Self {
        Self {
            density,
            background: None,
            encoding: Encoding::Png,
            size_override: None,
        }
    }

    pub fn jpeg(density: f32, quality: f32) -> Self {
        Self {
            encoding: Encoding::Jpeg { quality },
            ..Self::png(density)
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_size(mut self, size: CanvasSize) -> Self {
        self.size_override = Some(size);
        self
    }
}

/// One encoded page.
#[derive(Debug, Clone)]
pub struct Capture {
    pub page: usize,
    /// Bitmap size in device pixels.
    pub width: u32,
    pub height: u32,
    /// Captured region in native pixels.
    pub region: CanvasSize,
    pub density: f32,
    pub encoding: Encoding,
    pub bytes: Vec<u8>,
}

/// Capture one page, taking exclusive ownership of the node for its
/// duration. `None` when another capture owns the node or the page cannot
/// be captured (see [`capture_in`]).
pub async fn capture(handle: &NodeHandle, page: usize, opts: &CaptureOptions) -> Option<Capture> {
    let Some(session) = handle.begin_capture() else {
        log::debug!("node {} busy, capture skipped", handle.id());
        return None;
    };
    capture_in(&session, page, opts).await
}

/// Capture one page inside an existing session.
///
/// Returns `None` if the node is unmounted, still laying out, `page` is out
/// of range, or rasterizing fails. Never returns a partial bitmap.
pub async fn capture_in(session: &CaptureSession, page: usize, opts: &CaptureOptions) -> Option<Capture> {
    let handle = session.handle();
    if !handle.is_mounted() {
        log::debug!("node {} unmounted, capture skipped", handle.id());
        return None;
    }
    let Some(images) = handle.images() else {
        log::debug!("node {} still laying out, capture skipped", handle.id());
        return None;
    };
    let Some(tree) = handle.document().page(page) else {
        log::warn!(
            "page {} out of range, node {} has {} page(s)",
            page,
            handle.id(),
            handle.page_count()
        );
        return None;
    };
    let region = opts.size_override.unwrap_or(tree.size);

    // rasterizing is CPU-bound, keep it off the runtime thread
    let node = handle.clone();
    let task_opts = opts.clone();
    let encoded = tokio::task::spawn_blocking(move || -> Result<(u32, u32, Vec<u8>), VizdocError> {
        let tree = node
            .document()
            .page(page)
            .ok_or_else(|| VizdocError::Capture { page })?;
        let background = task_opts.background.unwrap_or(tree.background);
        let img = rasterize(tree, &images, &task_opts)?;
        let (width, height) = img.dimensions();
        encode::encode(&img, task_opts.encoding, background).map(|bytes| (width, height, bytes))
    })
    .await;
    let (width, height, bytes) = match encoded {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => {
            log::warn!("capture of page {} failed: {}", page, e);
            return None;
        }
        Err(e) => {
            log::warn!("capture task for page {} failed: {}", page, e);
            return None;
        }
    };

    // a node unmounted mid-capture yields nothing
    if !handle.is_mounted() {
        return None;
    }
    Some(Capture {
        page,
        width,
        height,
        region,
        density: opts.density,
        encoding: opts.encoding,
        bytes,
    })
}
