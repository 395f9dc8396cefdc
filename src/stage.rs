//! # Stage
//!
//! Mounting turns a [`RenderedDocument`] into a live node that can be
//! previewed and captured. Callers hold a [`NodeHandle`]; there is no lookup
//! by id anywhere.
//!
//! ## Node State
//!
//! ```text
//!            mount
//!              │
//!              ▼
//!   ┌───────────────────┐  images resolved  ┌──────────────┐
//!   │ mounted, pending  │ ────────────────► │ mounted,     │
//!   └───────────────────┘                   │ ready        │
//!              │                            └──────────────┘
//!              │ unmount                          │ unmount
//!              ▼                                  ▼
//!   ┌──────────────────────────────────────────────────────┐
//!   │ unmounted (captures return nothing, retries stop)    │
//!   └──────────────────────────────────────────────────────┘
//! ```
//!
//! Independently of that state, at most one capture session owns a node at a
//! time. An export job holds its session for all of its pages.

use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, watch};
use uuid::Uuid;

use crate::config::CanvasSize;
use crate::document::resolve::{ImageMap, ImageResolver};
use crate::document::{DocumentKind, RenderedDocument};

struct LiveNode {
    id: Uuid,
    document: RenderedDocument,
    /// `Some` once layout is complete.
    layout: watch::Sender<Option<Arc<ImageMap>>>,
    mounted: watch::Sender<bool>,
    capture_lock: Arc<Mutex<()>>,
}

/// Handle to a mounted document. Cheap to clone.
#[derive(Clone)]
pub struct NodeHandle {
    node: Arc<LiveNode>,
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeHandle")
            .field("id", &self.node.id)
            .field("kind", &self.node.document.kind)
            .field("template", &self.node.document.template_id)
            .field("mounted", &self.is_mounted())
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl NodeHandle {
    fn with_layout(document: RenderedDocument, layout: Option<Arc<ImageMap>>) -> Self {
        let (layout, _) = watch::channel(layout);
        let (mounted, _) = watch::channel(true);
        Self {
            node: Arc::new(LiveNode {
                id: Uuid::new_v4(),
                document,
                layout,
                mounted,
                capture_lock: Arc::new(Mutex::new(())),
            }),
        }
    }

    /// A mounted node whose layout is already complete.
    pub fn ready(document: RenderedDocument, images: ImageMap) -> Self {
        Self::with_layout(document, Some(Arc::new(images)))
    }

    /// A mounted node still waiting for [`finish_layout`](Self::finish_layout).
    pub fn pending(document: RenderedDocument) -> Self {
        Self::with_layout(document, None)
    }

    pub fn id(&self) -> Uuid {
        self.node.id
    }

    pub fn document(&self) -> &RenderedDocument {
        &self.node.document
    }

    pub fn kind(&self) -> DocumentKind {
        self.node.document.kind
    }

    pub fn native_size(&self) -> CanvasSize {
        self.node.document.size
    }

    pub fn page_count(&self) -> usize {
        self.node.document.page_count()
    }

    // ------------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------------

    pub fn is_ready(&self) -> bool {
        self.node.layout.borrow().is_some()
    }

    /// Resolved images, `None` while layout is pending.
    pub fn images(&self) -> Option<Arc<ImageMap>> {
        self.node.layout.borrow().clone()
    }

    /// Complete layout with the resolved images.
    pub fn finish_layout(&self, images: ImageMap) {
        self.node.layout.send_replace(Some(Arc::new(images)));
        log::debug!("node {} ready", self.node.id);
    }

    /// Wait until layout is complete. Returns `false` if the node is
    /// unmounted first.
    pub async fn wait_ready(&self) -> bool {
        let mut layout = self.node.layout.subscribe();
        let mut mounted = self.node.mounted.subscribe();
        loop {
            if !*mounted.borrow_and_update() {
                return false;
            }
            if layout.borrow_and_update().is_some() {
                return true;
            }
            tokio::select! {
                changed = layout.changed() => {
                    if changed.is_err() {
                        return false;
                    }
                }
                changed = mounted.changed() => {
                    if changed.is_err() {
                        return false;
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Mount state
    // ------------------------------------------------------------------------

    pub fn is_mounted(&self) -> bool {
        *self.node.mounted.borrow()
    }

    /// Detach the node. Pending captures and retries observe this and stop.
    pub fn unmount(&self) {
        if self.node.mounted.send_replace(false) {
            log::debug!("node {} unmounted", self.node.id);
        }
    }

    /// Receiver that changes when the node is unmounted.
    pub fn mount_watch(&self) -> watch::Receiver<bool> {
        self.node.mounted.subscribe()
    }

    // ------------------------------------------------------------------------
    // Capture exclusivity
    // ------------------------------------------------------------------------

    /// Take exclusive capture ownership, or `None` if someone else has it.
    pub fn begin_capture(&self) -> Option<CaptureSession> {
        let guard = self.node.capture_lock.clone().try_lock_owned().ok()?;
        Some(CaptureSession {
            handle: self.clone(),
            _guard: guard,
        })
    }

    /// Whether a capture session currently owns the node.
    pub fn is_capturing(&self) -> bool {
        self.node.capture_lock.try_lock().is_err()
    }
}

/// Exclusive capture ownership of a node. Released on drop.
pub struct CaptureSession {
    handle: NodeHandle,
    _guard: OwnedMutexGuard<()>,
}

impl CaptureSession {
    pub fn handle(&self) -> &NodeHandle {
        &self.handle
    }
}

/// Mounts rendered documents, resolving their images in the background.
#[derive(Clone, Default)]
pub struct Stage {
    resolver: Option<ImageResolver>,
}

impl Stage {
    /// A stage without image resolution: nodes are ready immediately and
    /// images draw as placeholder tiles.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(resolver: ImageResolver) -> Self {
        Self {
            resolver: Some(resolver),
        }
    }

    /// Mount `document`. With a resolver this spawns image resolution on the
    /// current tokio runtime and the node stays pending until it finishes.
    pub fn mount(&self, document: RenderedDocument) -> NodeHandle {
        let Some(resolver) = self.resolver.clone() else {
            return NodeHandle::ready(document, ImageMap::new());
        };
        if document.image_sources().is_empty() {
            return NodeHandle::ready(document, ImageMap::new());
        }
        let handle = NodeHandle::pending(document);
        let node = handle.clone();
        tokio::spawn(async move {
            let images = resolver.resolve(node.document()).await;
            node.finish_layout(images);
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::resolve::ImageFetcher;
    use crate::document::{Payload, render};
    use crate::error::VizdocError;
    use async_trait::async_trait;
    use std::time::Duration;

    fn doc() -> RenderedDocument {
        render(DocumentKind::Graphic, "photo", &Payload::new())
    }

    #[test]
    fn test_capture_is_exclusive() {
        let handle = NodeHandle::ready(doc(), ImageMap::new());
        let session = handle.begin_capture();
        assert!(session.is_some());
        assert!(handle.is_capturing());
        assert!(handle.begin_capture().is_none());
        drop(session);
        assert!(!handle.is_capturing());
        assert!(handle.begin_capture().is_some());
    }

    #[test]
    fn test_unmount_is_visible_to_clones() {
        let handle = NodeHandle::ready(doc(), ImageMap::new());
        let other = handle.clone();
        handle.unmount();
        assert!(!other.is_mounted());
    }

    #[tokio::test]
    async fn test_wait_ready_resolves_after_layout() {
        let handle = NodeHandle::pending(doc());
        assert!(!handle.is_ready());
        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.wait_ready().await });
        tokio::task::yield_now().await;
        handle.finish_layout(ImageMap::new());
        assert!(task.await.unwrap());
        assert!(handle.images().is_some());
    }

    #[tokio::test]
    async fn test_wait_ready_stops_on_unmount() {
        let handle = NodeHandle::pending(doc());
        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.wait_ready().await });
        tokio::task::yield_now().await;
        handle.unmount();
        assert!(!task.await.unwrap());
    }

    struct SlowFetcher;

    #[async_trait]
    impl ImageFetcher for SlowFetcher {
        async fn fetch(&self, _: &str) -> Result<Vec<u8>, VizdocError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Err(VizdocError::Fetch("offline".into()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_resolves_in_background() {
        let stage = Stage::with_resolver(ImageResolver::new(Arc::new(SlowFetcher)));
        let handle = stage.mount(doc());
        assert!(!handle.is_ready());
        assert!(handle.wait_ready().await);
        // failed fetches still complete layout, with no images
        assert_eq!(handle.images().map(|m| m.len()), Some(0));
    }

    #[test]
    fn test_stage_without_resolver_is_ready() {
        let handle = Stage::new().mount(doc());
        assert!(handle.is_ready());
        assert!(handle.is_mounted());
    }
}
