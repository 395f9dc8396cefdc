//! # Export
//!
//! Captures the pages of a mounted document at export density and packages
//! them as PNG, JPEG or PDF.
//!
//! ## Job Flow
//!
//! ```text
//!   ExportJob ──validate──► begin_capture ──────────────► for page in page_sequence:
//!                              │ busy                        settle delay (multi-page)
//!                              ▼                             capture_in(page)
//!                     CaptureInProgress                        │ None → Capture { page }
//!                                                              ▼
//!                                              PNG/JPEG bytes or PdfBuilder pages
//!                                                              │
//!                                                              ▼
//!                                                       ExportArtifact::save
//!                                                    (temp file + atomic rename)
//! ```
//!
//! A job is all-or-nothing: the first failed page fails the whole job and no
//! bytes come out.

pub mod filename;
pub mod pdf;

use chrono::NaiveDate;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::config::ExportSettings;
use crate::error::VizdocError;
use crate::render::{Capture, CaptureOptions, capture_in};
use crate::stage::NodeHandle;

pub use filename::export_file_name;
pub use pdf::{PX_TO_PT, PdfBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Whether one file can hold more than one page.
    pub fn is_paged(&self) -> bool {
        matches!(self, ExportFormat::Pdf)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Pdf => "pdf",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = VizdocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(VizdocError::InvalidJob(format!(
                "unknown format '{}', expected png, jpeg or pdf",
                other
            ))),
        }
    }
}

/// One export attempt. Discarded after it completes or fails.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub source: NodeHandle,
    pub format: ExportFormat,
    pub density: f32,
    pub jpeg_quality: f32,
    /// Page indices in output order.
    pub page_sequence: Vec<usize>,
    pub file_name: String,
}

impl ExportJob {
    /// Job with settings defaults: every page for PDF, the first page
    /// otherwise. `date` supplies the month when the document has no valid
    /// period.
    pub fn new(source: NodeHandle, format: ExportFormat, settings: &ExportSettings, date: NaiveDate) -> Self {
        let doc = source.document();
        let page_sequence = if format.is_paged() {
            (0..doc.page_count()).collect()
        } else {
            vec![0]
        };
        let file_name = export_file_name(doc.kind, &doc.client, doc.period.as_deref(), date, format.extension());
        Self {
            format,
            density: settings.density,
            jpeg_quality: settings.jpeg_quality,
            page_sequence,
            file_name,
            source,
        }
    }

    pub fn with_pages(mut self, pages: Vec<usize>) -> Self {
        self.page_sequence = pages;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    pub fn validate(&self) -> Result<(), VizdocError> {
        if self.page_sequence.is_empty() {
            return Err(VizdocError::InvalidJob("no pages selected".into()));
        }
        if !self.format.is_paged() && self.page_sequence.len() > 1 {
            return Err(VizdocError::InvalidJob(format!(
                "{} holds a single page, {} requested",
                self.format,
                self.page_sequence.len()
            )));
        }
        let count = self.source.page_count();
        if let Some(page) = self.page_sequence.iter().find(|p| **p >= count) {
            return Err(VizdocError::InvalidJob(format!(
                "page {} out of range, document has {} page(s)",
                page, count
            )));
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(VizdocError::InvalidJob(format!("invalid density {}", self.density)));
        }
        if self.file_name.trim().is_empty() || self.file_name.contains(['/', '\\']) {
            return Err(VizdocError::InvalidJob(format!("invalid file name '{}'", self.file_name)));
        }
        Ok(())
    }

    fn capture_options(&self) -> CaptureOptions {
        match self.format {
            ExportFormat::Png => CaptureOptions::png(self.density),
            ExportFormat::Jpeg | ExportFormat::Pdf => CaptureOptions::jpeg(self.density, self.jpeg_quality),
        }
    }
}

/// Finished export output.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub pages: usize,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write into `dir` under [`file_name`](Self::file_name). The bytes go to
    /// a temporary file first and are renamed into place, so a failed save
    /// never leaves a partial file.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, VizdocError> {
        let target = dir.join(&self.file_name);
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&self.bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| VizdocError::Io(e.error))?;
        log::info!("saved {} ({} bytes)", target.display(), self.bytes.len());
        Ok(target)
    }
}

/// Runs export jobs one page at a time.
#[derive(Debug, Clone)]
pub struct ExportPipeline {
    settle_delay: Duration,
}

impl ExportPipeline {
    pub fn new(settings: &ExportSettings) -> Self {
        Self {
            settle_delay: settings.settle_delay(),
        }
    }

    pub fn with_settle_delay(settle_delay: Duration) -> Self {
        Self { settle_delay }
    }

    /// Run `job`. The source node is owned exclusively until the job ends;
    /// a node already being captured fails with
    /// [`VizdocError::CaptureInProgress`].
    pub async fn run(&self, job: &ExportJob) -> Result<ExportArtifact, VizdocError> {
        job.validate()?;
        let session = job.source.begin_capture().ok_or(VizdocError::CaptureInProgress)?;
        log::info!(
            "exporting {} as {} ({} page(s) at {}x)",
            job.file_name,
            job.format,
            job.page_sequence.len(),
            job.density
        );

        let opts = job.capture_options();
        let multi_page = job.page_sequence.len() > 1;
        let mut captures: Vec<Capture> = Vec::with_capacity(job.page_sequence.len());
        for &page in &job.page_sequence {
            if multi_page {
                tokio::time::sleep(self.settle_delay).await;
            }
            log::debug!("capturing page {}", page);
            let capture = capture_in(&session, page, &opts)
                .await
                .ok_or(VizdocError::Capture { page })?;
            captures.push(capture);
        }
        drop(session);

        let bytes = match job.format {
            ExportFormat::Png | ExportFormat::Jpeg => captures
                .pop()
                .map(|c| c.bytes)
                .ok_or_else(|| VizdocError::InvalidJob("no pages selected".into()))?,
            ExportFormat::Pdf => {
                let mut pdf = PdfBuilder::new();
                for capture in &captures {
                    pdf.add_page(capture)?;
                }
                pdf.finish()?
            }
        };

        Ok(ExportArtifact {
            file_name: job.file_name.clone(),
            format: job.format,
            pages: captures.len().max(1),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::resolve::ImageMap;
    use crate::document::{DocumentKind, Payload, render};
    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn settings() -> ExportSettings {
        ExportSettings {
            density: 0.1,
            ..Default::default()
        }
    }

    fn node(kind: DocumentKind, variant: &str) -> NodeHandle {
        let payload = Payload::new().with("client_name", "Hotel Mewa");
        NodeHandle::ready(render(kind, variant, &payload), ImageMap::new())
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JPG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_job_defaults() {
        let job = ExportJob::new(node(DocumentKind::Presentation, "bold"), ExportFormat::Pdf, &settings(), date());
        assert_eq!(job.page_sequence, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(job.file_name, "prezentacja-hotel-mewa-2024-06.pdf");
        let job = ExportJob::new(node(DocumentKind::Presentation, "bold"), ExportFormat::Png, &settings(), date());
        assert_eq!(job.page_sequence, vec![0]);
    }

    #[test]
    fn test_job_validation() {
        let base = ExportJob::new(node(DocumentKind::Graphic, "bold"), ExportFormat::Png, &settings(), date());
        assert!(base.validate().is_ok());
        assert!(base.clone().with_pages(vec![]).validate().is_err());
        assert!(base.clone().with_pages(vec![0, 0]).validate().is_err());
        assert!(base.clone().with_pages(vec![1]).validate().is_err());
        assert!(base.clone().with_density(0.0).validate().is_err());
        assert!(base.with_file_name("../x.png").validate().is_err());
    }

    #[tokio::test]
    async fn test_single_page_png() {
        let job = ExportJob::new(node(DocumentKind::Graphic, "sale"), ExportFormat::Png, &settings(), date());
        let artifact = ExportPipeline::new(&settings()).run(&job).await.unwrap();
        assert_eq!(artifact.pages, 1);
        let img = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((img.width(), img.height()), (108, 108));
        assert!(!job.source.is_capturing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_multi_page_waits_before_each_capture() {
        let job = ExportJob::new(node(DocumentKind::Presentation, "minimal"), ExportFormat::Pdf, &settings(), date())
            .with_pages(vec![2, 0, 5]);
        let pipeline = ExportPipeline::with_settle_delay(Duration::from_millis(150));
        let start = Instant::now();
        let artifact = pipeline.run(&job).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(450));
        assert_eq!(artifact.pages, 3);
        let doc = lopdf::Document::load_mem(&artifact.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[tokio::test]
    async fn test_busy_node_fails_immediately() {
        let source = node(DocumentKind::Report, "classic");
        let _session = source.begin_capture().unwrap();
        let job = ExportJob::new(source, ExportFormat::Pdf, &settings(), date());
        assert!(matches!(
            ExportPipeline::new(&settings()).run(&job).await,
            Err(VizdocError::CaptureInProgress)
        ));
    }

    #[tokio::test]
    async fn test_failed_capture_fails_the_job() {
        let pending = NodeHandle::pending(render(DocumentKind::Contract, "standard", &Payload::new()));
        let job = ExportJob::new(pending, ExportFormat::Pdf, &settings(), date());
        let result = ExportPipeline::with_settle_delay(Duration::ZERO).run(&job).await;
        assert!(matches!(result, Err(VizdocError::Capture { page: 0 })));
    }

    #[test]
    fn test_save_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ExportArtifact {
            file_name: "grafika-x-2024-06.png".into(),
            format: ExportFormat::Png,
            pages: 1,
            bytes: vec![1, 2, 3],
        };
        let path = artifact.save(dir.path()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
