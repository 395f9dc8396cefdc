//! Image resolution: fetches and decodes the images a document references.
//!
//! `ImageResolver` keeps all fetching concerns out of the templates, which
//! only name image sources. Sources are `http(s)://` URLs or local file paths
//! (optionally `file://`). Decoded images are cached by source string and
//! shared between documents.

use async_trait::async_trait;
use image::DynamicImage;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::RenderedDocument;
use crate::error::VizdocError;

/// Decoded images by source.
pub type ImageMap = HashMap<String, Arc<DynamicImage>>;

/// Loads the raw bytes behind an image source.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, source: &str) -> Result<Vec<u8>, VizdocError>;
}

/// Fetches URLs over HTTP and everything else from disk.
pub struct SourceFetcher {
    client: reqwest::Client,
}

impl SourceFetcher {
    pub fn new() -> Result<Self, VizdocError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vizdoc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VizdocError::Fetch(format!("HTTP client error: {}", e)))?;
        Ok(Self { client })
    }
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[async_trait]
impl ImageFetcher for SourceFetcher {
    async fn fetch(&self, source: &str) -> Result<Vec<u8>, VizdocError> {
        if !is_url(source) {
            let path = source.strip_prefix("file://").unwrap_or(source);
            return Ok(tokio::fs::read(path).await?);
        }

        let response = self
            .client
            .get(source)
            .send()
            .await
            .map_err(|e| VizdocError::Fetch(format!("Failed to download {}: {}", source, e)))?;
        if !response.status().is_success() {
            return Err(VizdocError::Fetch(format!(
                "Failed to download {}: HTTP {}",
                source,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| VizdocError::Fetch(format!("Failed to read image data: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

/// Resolves image sources into decoded images, with a shared cache.
#[derive(Clone)]
pub struct ImageResolver {
    fetcher: Arc<dyn ImageFetcher>,
    cache: Arc<RwLock<ImageMap>>,
}

impl ImageResolver {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            fetcher,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolver over HTTP and the local filesystem.
    pub fn with_defaults() -> Result<Self, VizdocError> {
        Ok(Self::new(Arc::new(SourceFetcher::new()?)))
    }

    /// Fetch and decode one source, using the cache when possible.
    pub async fn fetch(&self, source: &str) -> Result<Arc<DynamicImage>, VizdocError> {
        if let Some(image) = self.cache.read().await.get(source) {
            return Ok(image.clone());
        }

        let bytes = self.fetcher.fetch(source).await?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| VizdocError::Image(format!("Failed to decode {}: {}", source, e)))?;
        let image = Arc::new(image);

        self.cache
            .write()
            .await
            .insert(source.to_string(), image.clone());
        Ok(image)
    }

    /// Resolve every image the document references.
    ///
    /// Sources that fail are logged and left out; the rasterizer draws a
    /// placeholder tile in their place.
    pub async fn resolve(&self, doc: &RenderedDocument) -> ImageMap {
        let mut images = ImageMap::new();
        for source in doc.image_sources() {
            match self.fetch(source).await {
                Ok(image) => {
                    images.insert(source.to_string(), image);
                }
                Err(e) => log::warn!("image {} unavailable: {}", source, e),
            }
        }
        images
    }

    pub async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentKind, Payload, render};
    use image::{ImageFormat, RgbaImage};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, image::Rgba([200, 10, 10, 255])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageFetcher for CountingFetcher {
        async fn fetch(&self, source: &str) -> Result<Vec<u8>, VizdocError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if source.contains("broken") {
                return Err(VizdocError::Fetch("404".into()));
            }
            Ok(png_bytes())
        }
    }

    #[tokio::test]
    async fn test_cache_hits_skip_fetch() {
        let fetcher = Arc::new(CountingFetcher { calls: AtomicUsize::new(0) });
        let resolver = ImageResolver::new(fetcher.clone());
        let a = resolver.fetch("https://x/logo.png").await.unwrap();
        let b = resolver.fetch("https://x/logo.png").await.unwrap();
        assert_eq!((a.width(), a.height()), (4, 3));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached().await, 1);
    }

    #[tokio::test]
    async fn test_failed_sources_are_left_out() {
        let fetcher = Arc::new(CountingFetcher { calls: AtomicUsize::new(0) });
        let resolver = ImageResolver::new(fetcher);
        let payload = Payload::new()
            .with("image_url", "https://x/photo.png")
            .with("logo_url", "https://x/broken.png");
        let doc = render(DocumentKind::Graphic, "diagonal", &payload);
        let images = resolver.resolve(&doc).await;
        assert!(images.contains_key("https://x/photo.png"));
        assert!(!images.contains_key("https://x/broken.png"));
    }

    #[tokio::test]
    async fn test_undecodable_bytes_are_an_image_error() {
        struct Garbage;
        #[async_trait]
        impl ImageFetcher for Garbage {
            async fn fetch(&self, _: &str) -> Result<Vec<u8>, VizdocError> {
                Ok(b"not an image".to_vec())
            }
        }
        let resolver = ImageResolver::new(Arc::new(Garbage));
        assert!(matches!(resolver.fetch("a.png").await, Err(VizdocError::Image(_))));
    }

    #[tokio::test]
    async fn test_source_fetcher_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, png_bytes()).unwrap();
        let fetcher = SourceFetcher::new().unwrap();
        let bytes = fetcher.fetch(&format!("file://{}", path.display())).await.unwrap();
        assert_eq!(bytes, png_bytes());
        assert!(matches!(
            fetcher.fetch("/definitely/not/here.png").await,
            Err(VizdocError::Io(_))
        ));
    }
}
