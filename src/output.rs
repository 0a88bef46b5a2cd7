//! Output types produced by an export.

use crate::error::PublishError;
use crate::publish::PublishOutcome;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An image payload written to disk, before any caption is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedImage {
    /// 1-based index, global to the document.
    pub index: usize,
    /// `img_NNN.<ext>`.
    pub filename: String,
    /// Full path under the image directory.
    pub path: PathBuf,
}

/// An image paired with its caption; one page is generated per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionedImage {
    /// 1-based document-global image index.
    pub index: usize,
    /// File name on disk inside `images/`, authoritative for `src` and `href`.
    pub filename: String,
    /// Caption text, or `Image {index}` when none was found.
    pub caption: String,
}

impl CaptionedImage {
    pub fn new(index: usize, filename: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            index,
            filename: filename.into(),
            caption: caption.into(),
        }
    }

    /// File name without its extension; names the per-image HTML page.
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }

    /// `<stem>.html`.
    pub fn page_name(&self) -> String {
        format!("{}.html", self.stem())
    }
}

/// Metadata read from the Word package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// `dc:title` from `docProps/core.xml`.
    pub core_title: Option<String>,
    /// `dc:creator` from `docProps/core.xml`.
    pub author: Option<String>,
    /// Text of the first non-empty `Heading 1` paragraph.
    pub first_heading: Option<String>,
    /// Title used for the generated pages: core title, then first heading,
    /// then the file stem.
    pub title: String,
    /// Number of body paragraphs walked.
    pub paragraph_count: usize,
}

/// Counters collected during an export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportStats {
    pub paragraphs: usize,
    /// Image payloads written to disk.
    pub images_extracted: usize,
    /// Images that reached the index (captioned or defaulted).
    pub images_indexed: usize,
    /// Images that found an explicit or implicit caption.
    pub images_captioned: usize,
    /// Images replaced by a newer image before any caption arrived.
    pub images_superseded: usize,
    /// HTML files written, index included.
    pub pages_written: usize,
    pub duration_ms: u64,
}

/// The complete result of exporting one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutput {
    /// Stem of the source file; names the output directory.
    pub document_stem: String,
    /// File name of the source document, used for the commit message.
    pub source_name: String,
    /// `<docs_dir>/<document_stem>`.
    pub output_root: PathBuf,
    /// `<output_root>/images`.
    pub image_dir: PathBuf,
    /// Entries in index order.
    pub images: Vec<CaptionedImage>,
    /// Every image file written, under its final name. Includes superseded
    /// images, which are on disk but not in the index.
    pub extracted: Vec<ExtractedImage>,
    pub metadata: DocumentMetadata,
    pub stats: ExportStats,
}

impl ExportOutput {
    /// `<output_root>/index.html`.
    pub fn index_path(&self) -> PathBuf {
        self.output_root.join("index.html")
    }
}

/// Outcome of [`crate::run`]: conversion and publication reported separately.
///
/// A successful export with a failed push is a legitimate state: the site is
/// on disk and can be published by hand.
#[derive(Debug)]
pub struct RunReport {
    pub export: ExportOutput,
    /// `None` when publishing was not requested.
    pub publish: Option<Result<PublishOutcome, PublishError>>,
}

impl RunReport {
    /// True when the export succeeded and publishing either succeeded or
    /// was not requested.
    pub fn is_success(&self) -> bool {
        !matches!(self.publish, Some(Err(_)))
    }

    /// Turn a failed publication into an error, keeping the export otherwise.
    pub fn into_result(self) -> Result<ExportOutput, PublishError> {
        match self.publish {
            Some(Err(e)) => Err(e),
            _ => Ok(self.export),
        }
    }
}
