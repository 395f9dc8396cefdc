//! # vizdoc - Visual Document Rendering & Export
//!
//! vizdoc renders marketing reports, contracts, presentations and social
//! graphics from a flat key/value payload, and exports them pixel-exact.
//! It provides:
//!
//! - **Templates**: a closed set of variants per document kind, each with a
//!   fixed native page size
//! - **Charts**: donut, bar and dual-line geometry embedded in templates
//! - **Capture**: tiny-skia rasterization at any density, PNG or JPEG
//! - **Export**: single images or multi-page PDFs, all-or-nothing
//! - **Preview & thumbnails**: display scaling and retrying low-density
//!   captures
//!
//! ## Quick Start
//!
//! ```no_run
//! use vizdoc::{
//!     config::VizdocConfig,
//!     document::{DocumentKind, Payload, render},
//!     export::{ExportFormat, ExportJob, ExportPipeline},
//!     stage::Stage,
//! };
//!
//! # async fn demo() -> Result<(), vizdoc::VizdocError> {
//! let config = VizdocConfig::default();
//! let payload = Payload::new()
//!     .with("client_name", "Hotel Mewa")
//!     .with("period", "2024-05")
//!     .with("reach", 120000)
//!     .with("clicks", 3400);
//!
//! // Pure: same payload, same pages
//! let doc = render(DocumentKind::Report, "classic", &payload);
//!
//! // Mount, then export
//! let node = Stage::new().mount(doc);
//! let today = chrono::Local::now().date_naive();
//! let job = ExportJob::new(node, ExportFormat::Pdf, &config.export, today);
//! let artifact = ExportPipeline::new(&config.export).run(&job).await?;
//! artifact.save(std::path::Path::new("."))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`scene`] | Visual tree primitives |
//! | [`chart`] | Chart geometry |
//! | [`document`] | Payloads, slots, template registry and layouts |
//! | [`stage`] | Mounted nodes, readiness and capture ownership |
//! | [`render`] | Rasterization and capture |
//! | [`preview`] | Display scaling |
//! | [`export`] | PNG/JPEG/PDF export jobs |
//! | [`thumbnail`] | Retrying thumbnail captures |
//! | [`config`] | Settings and canvas presets |
//! | [`error`] | Error types |

pub mod chart;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod preview;
pub mod render;
pub mod scene;
pub mod stage;
pub mod thumbnail;

// Re-exports for convenience
pub use config::{CanvasSize, VizdocConfig};
pub use error::VizdocError;
