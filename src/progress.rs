//! Progress-callback trait for export events.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::config::ExportConfigBuilder::progress_callback`] to receive
//! events as the pipeline walks the document and writes the site.
//!
//! # Example
//!
//! ```rust
//! use docx2site::{ExportConfig, ExportProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     images: AtomicUsize,
//! }
//!
//! impl ExportProgressCallback for CountingCallback {
//!     fn on_image_extracted(&self, index: usize, filename: &str) {
//!         self.images.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("image {index} -> {filename}");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { images: AtomicUsize::new(0) });
//!
//! let config = ExportConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExportProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the export pipeline as it processes a document.
///
/// The pipeline itself is single-threaded, but the callback is stored in an
/// `Arc` inside [`crate::ExportConfig`], which is shared freely, so
/// implementations must be `Send + Sync`. All methods default to no-ops.
pub trait ExportProgressCallback: Send + Sync {
    /// Called once, after the input was validated and before the walk starts.
    ///
    /// # Arguments
    /// * `document_stem`: file stem naming the output directory
    fn on_export_start(&self, document_stem: &str) {
        let _ = document_stem;
    }

    /// Called after an image payload was written to the image directory.
    ///
    /// # Arguments
    /// * `index`   : 1-based document-global image index
    /// * `filename`: raw `img_NNN.<ext>` name
    fn on_image_extracted(&self, index: usize, filename: &str) {
        let _ = (index, filename);
    }

    /// Called when an image is paired with its final caption.
    ///
    /// # Arguments
    /// * `index`   : image index
    /// * `filename`: final file name on disk
    /// * `caption` : caption text (or the `Image N` default)
    fn on_image_captioned(&self, index: usize, filename: &str, caption: &str) {
        let _ = (index, filename, caption);
    }

    /// Called when a pending image is replaced by a newer one before any
    /// caption arrived. The superseded image does not reach the index.
    fn on_image_superseded(&self, index: usize, filename: &str) {
        let _ = (index, filename);
    }

    /// Called after each HTML file is written.
    ///
    /// # Arguments
    /// * `page_num`   : 1-indexed page number, the index page comes last
    /// * `total_pages`: per-image pages plus the index
    fn on_page_written(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called once after the whole site was written.
    ///
    /// # Arguments
    /// * `image_count`: number of captioned images in the index
    fn on_export_complete(&self, image_count: usize) {
        let _ = image_count;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExportConfig`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;
