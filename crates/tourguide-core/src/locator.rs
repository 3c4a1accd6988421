//! Element lookup and the highlight frame.

use std::sync::Arc;

use tourguide_protocols::{Document, ElementRef, HighlightOverlay, PageError};
use tracing::{debug, warn};

/// Resolves step targets and frames them with the overlay.
#[derive(Clone)]
pub struct ElementLocator {
    document: Arc<dyn Document>,
    overlay: Arc<dyn HighlightOverlay>,
    padding: f64,
}

impl ElementLocator {
    pub fn new(
        document: Arc<dyn Document>,
        overlay: Arc<dyn HighlightOverlay>,
        padding: f64,
    ) -> Self {
        Self {
            document,
            overlay,
            padding,
        }
    }

    /// Resolve `selector`, scoped under `parent` when given.
    ///
    /// A missing parent or a failed scoped lookup falls back to a
    /// document-wide lookup before giving up.
    pub async fn locate(
        &self,
        selector: &str,
        parent: Option<&str>,
    ) -> Result<Option<ElementRef>, PageError> {
        if let Some(parent) = parent {
            match self.document.query(parent, None).await {
                Ok(Some(container)) => {
                    match self.document.query(selector, Some(container)).await {
                        Ok(Some(element)) => return Ok(Some(element)),
                        Ok(None) => debug!(
                            "'{}' not found inside '{}', trying whole document",
                            selector, parent
                        ),
                        Err(e) => debug!("Scoped lookup of '{}' failed: {}", selector, e),
                    }
                }
                Ok(None) => debug!("Parent '{}' not found, trying whole document", parent),
                Err(e) => debug!("Parent lookup '{}' failed: {}", parent, e),
            }
        }

        self.document.query(selector, None).await
    }

    /// Frame the element matching `selector`.
    ///
    /// Returns whether something was highlighted. On any failure the overlay
    /// is hidden and playback carries on.
    pub async fn highlight(&self, selector: &str, parent: Option<&str>) -> bool {
        let element = match self.locate(selector, parent).await {
            Ok(Some(element)) => element,
            Ok(None) => {
                warn!("Highlight target '{}' not found, skipping highlight", selector);
                self.hide().await;
                return false;
            }
            Err(e) => {
                warn!("Highlight target '{}' unusable: {}", selector, e);
                self.hide().await;
                return false;
            }
        };

        match self.frame(element).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to frame '{}': {}", selector, e);
                self.hide().await;
                false
            }
        }
    }

    async fn frame(&self, element: ElementRef) -> Result<(), PageError> {
        self.document.scroll_into_view(element).await?;
        let rect = self.document.bounding_rect(element).await?;
        let (scroll_x, scroll_y) = self.document.scroll_offset().await?;
        let framed = rect.translate(scroll_x, scroll_y).inflate(self.padding);
        self.overlay.frame(framed).await
    }

    /// Hide the overlay, logging rather than failing.
    pub async fn hide(&self) {
        if let Err(e) = self.overlay.hide().await {
            debug!("Failed to hide overlay: {}", e);
        }
    }
}
