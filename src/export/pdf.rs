//! PDF assembly from page captures.
//!
//! Each page is a single full-bleed image. Page size follows the native
//! pixel size of the first capture at a fixed [`PX_TO_PT`]; later pages use
//! the same size.
//!
//! | Capture | Image stream |
//! |---------|--------------|
//! | JPEG | embedded as-is, `DCTDecode` |
//! | PNG | decoded to RGB, `FlateDecode` |

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::io::Write;

use crate::error::VizdocError;
use crate::render::{Capture, Encoding};

/// PDF points per native pixel (72 pt / 96 px).
pub const PX_TO_PT: f32 = 0.75;

const IMAGE_NAME: &str = "Im0";

fn pdf_err(e: lopdf::Error) -> VizdocError {
    VizdocError::Pdf(e.to_string())
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, VizdocError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Image XObject for one capture.
fn image_stream(capture: &Capture) -> Result<Stream, VizdocError> {
    let (filter, data) = match capture.encoding {
        Encoding::Jpeg { .. } => ("DCTDecode", capture.bytes.clone()),
        Encoding::Png => {
            let rgb = image::load_from_memory(&capture.bytes)
                .map_err(|e| VizdocError::Image(format!("page {} unreadable: {}", capture.page, e)))?
                .to_rgb8();
            ("FlateDecode", deflate(rgb.as_raw())?)
        }
    };
    Ok(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => capture.width as i64,
            "Height" => capture.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => filter,
        },
        data,
    ))
}

/// Incrementally built image-per-page PDF.
pub struct PdfBuilder {
    document: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    page_size: Option<(f32, f32)>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
            page_size: None,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Page size in points, fixed by the first page.
    pub fn page_size(&self) -> Option<(f32, f32)> {
        self.page_size
    }

    /// Append a fresh page showing `capture`, stretched to fill it.
    pub fn add_page(&mut self, capture: &Capture) -> Result<(), VizdocError> {
        let (width, height) = *self.page_size.get_or_insert((
            capture.region.width as f32 * PX_TO_PT,
            capture.region.height as f32 * PX_TO_PT,
        ));

        let image_id = self.document.add_object(image_stream(capture)?);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![width.into(), 0.into(), 0.into(), height.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec![IMAGE_NAME.into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(pdf_err)?;
        let content_stream = Stream::new(dictionary! {"Filter" => "FlateDecode"}, deflate(&encoded)?);
        let content_id = self.document.add_object(content_stream);

        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { IMAGE_NAME => image_id },
            },
        };
        let page_id = self.document.add_object(page_dict);
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Serialize the document.
    pub fn finish(mut self) -> Result<Vec<u8>, VizdocError> {
        if self.page_ids.is_empty() {
            return Err(VizdocError::Pdf("document has no pages".to_string()));
        }
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.document.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        self.document
            .save_to(&mut out)
            .map_err(|e| VizdocError::Pdf(e.to_string()))?;
        Ok(out)
    }
}
