//! Export entry points: Word document in, static site (and optionally a git
//! push) out.
//!
//! The run is a single synchronous pass. The output root is cleared first,
//! then every paragraph is resolved, fed to the [`Correlator`], and the
//! resulting intents are applied to disk before the next paragraph is read.
//! Pages and the index are written last; publishing, if requested, only
//! starts after that.

use crate::config::ExportConfig;
use crate::error::{ExportError, PublishError};
use crate::output::{
    CaptionedImage, DocumentMetadata, ExportOutput, ExportStats, ExtractedImage, RunReport,
};
use crate::pipeline::correlate::{Correlator, Intent};
use crate::pipeline::extract::ImageStore;
use crate::pipeline::generate::{self, IMAGE_DIR_NAME};
use crate::pipeline::input::{self, ZIP_MAGIC};
use crate::pipeline::walk::{DocxPackage, ImagePart, Paragraph};
use crate::progress::ProgressCallback;
use crate::publish::{PublishOutcome, Publisher};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Export a `.docx` file to `<docs_dir>/<stem>/`.
///
/// # Errors
/// - [`ExportError::InputNotFound`] / [`ExportError::NotADocx`] before any
///   output is touched
/// - [`ExportError::Resolution`] when an image cannot be found in the
///   package; the partially written output is left as is and nothing is
///   published
pub fn export(
    input_path: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportOutput, ExportError> {
    let start = Instant::now();
    let resolved = input::resolve_input(input_path.as_ref())?;
    info!("Starting export: {}", resolved.path.display());

    let mut package = DocxPackage::open(&resolved.path)?;
    export_package(&mut package, &resolved.stem, &resolved.file_name, config, start)
}

/// Export a `.docx` held in memory.
///
/// `document_name` plays the role of the file name (`report.docx`): its
/// stem names the output directory.
pub fn export_from_bytes(
    bytes: Vec<u8>,
    document_name: &str,
    config: &ExportConfig,
) -> Result<ExportOutput, ExportError> {
    let start = Instant::now();
    let label = PathBuf::from(document_name);
    if bytes.len() < 4 || bytes[..4] != ZIP_MAGIC {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(ExportError::NotADocx { path: label, magic });
    }
    let stem = input::document_stem(&label)?;
    let mut package = DocxPackage::from_bytes(bytes, &label)?;
    export_package(&mut package, &stem, document_name, config, start)
}

/// Read document metadata without writing anything.
pub fn inspect(input_path: impl AsRef<Path>) -> Result<DocumentMetadata, ExportError> {
    let resolved = input::resolve_input(input_path.as_ref())?;
    let mut package = DocxPackage::open(&resolved.path)?;
    let mut metadata = package.core_properties().to_metadata();
    let (paragraphs, _) = package.walk();
    for paragraph in paragraphs {
        note_paragraph(&mut metadata, &paragraph?);
    }
    metadata.title = resolve_title(&metadata, &resolved.stem);
    Ok(metadata)
}

/// Publish an export's output root with its commit message.
pub fn publish(
    output: &ExportOutput,
    publisher: &dyn Publisher,
    config: &ExportConfig,
) -> Result<PublishOutcome, PublishError> {
    let message = config.commit_message_for(&output.source_name);
    info!("Publishing {} ({})", output.output_root.display(), message);
    let outcome = publisher.stage_and_commit_and_push(&[output.output_root.clone()], &message)?;
    if outcome == PublishOutcome::Pushed {
        if let Some(url) = config.index_url(&output.document_stem) {
            info!("Published at {}", url);
        }
    }
    Ok(outcome)
}

/// Export, then publish if a publisher is given.
///
/// An export failure is returned as `Err`; a publish failure is not. It is
/// recorded in [`RunReport::publish`] because the site is already on disk.
pub fn run(
    input_path: impl AsRef<Path>,
    config: &ExportConfig,
    publisher: Option<&dyn Publisher>,
) -> Result<RunReport, ExportError> {
    let export = export(input_path, config)?;
    let publish = publisher.map(|p| {
        let result = publish(&export, p, config);
        if let Err(ref e) = result {
            warn!("Publishing failed, files remain in {}: {}", export.output_root.display(), e);
        }
        result
    });
    Ok(RunReport { export, publish })
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn export_package<R: Read + Seek>(
    package: &mut DocxPackage<R>,
    stem: &str,
    source_name: &str,
    config: &ExportConfig,
    start: Instant,
) -> Result<ExportOutput, ExportError> {
    let output_root = config.output_root(stem);
    let image_dir = output_root.join(IMAGE_DIR_NAME);
    generate::prepare_output_root(&output_root)?;

    let progress = config.progress_callback.as_ref();
    if let Some(cb) = progress {
        cb.on_export_start(stem);
    }

    let mut metadata = package.core_properties().to_metadata();
    let mut executor = IntentExecutor {
        store: ImageStore::new(&image_dir),
        extracted: Vec::new(),
        images: Vec::new(),
        stats: ExportStats::default(),
        progress,
    };
    let mut correlator = Correlator::new();

    let (paragraphs, parts) = package.walk();
    for paragraph in paragraphs {
        let paragraph = paragraph?;
        note_paragraph(&mut metadata, &paragraph);

        let resolved = paragraph
            .images
            .iter()
            .map(|reference| parts.resolve_image(reference))
            .collect::<Result<Vec<_>, _>>()?;
        let content_types: Vec<String> =
            resolved.iter().map(|part| part.content_type.clone()).collect();

        for intent in correlator.step(&paragraph, &content_types) {
            executor.apply(intent, &resolved)?;
        }
    }
    if let Some(intent) = correlator.finish() {
        executor.apply(intent, &[])?;
    }

    metadata.title = resolve_title(&metadata, stem);
    let mut stats = executor.stats;
    stats.paragraphs = metadata.paragraph_count;

    let header_title = config.front_matter.then_some(metadata.title.as_str());
    stats.pages_written =
        generate::write_site(&output_root, &executor.images, header_title, progress)?;
    stats.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Export complete: {} images ({} captioned, {} superseded) in {}ms",
        stats.images_indexed, stats.images_captioned, stats.images_superseded, stats.duration_ms
    );
    if let Some(cb) = progress {
        cb.on_export_complete(executor.images.len());
    }

    Ok(ExportOutput {
        document_stem: stem.to_string(),
        source_name: source_name.to_string(),
        output_root,
        image_dir,
        images: executor.images,
        extracted: executor.extracted,
        metadata,
        stats,
    })
}

/// Applies correlator intents to the image directory and collects entries.
struct IntentExecutor<'a> {
    store: ImageStore,
    extracted: Vec<ExtractedImage>,
    images: Vec<CaptionedImage>,
    stats: ExportStats,
    progress: Option<&'a ProgressCallback>,
}

impl IntentExecutor<'_> {
    fn apply(&mut self, intent: Intent, parts: &[ImagePart]) -> Result<(), ExportError> {
        match intent {
            Intent::WriteImage {
                slot,
                index,
                filename,
            } => {
                let part = parts.get(slot).ok_or_else(|| {
                    ExportError::Internal(format!("no resolved image for slot {slot}"))
                })?;
                let written = self.store.write(index, &filename, part)?;
                self.extracted.push(written);
                self.stats.images_extracted += 1;
                if let Some(cb) = self.progress {
                    cb.on_image_extracted(index, &filename);
                }
            }
            Intent::Supersede { index, filename } => {
                warn!(
                    "Image {} ({}) was followed by another image before any caption; it is left out of the index",
                    index, filename
                );
                self.stats.images_superseded += 1;
                if let Some(cb) = self.progress {
                    cb.on_image_superseded(index, &filename);
                }
            }
            Intent::Rename { from, to } => {
                self.store.rename(&from, &to)?;
                if let Some(file) = self.extracted.iter_mut().rev().find(|f| f.filename == from) {
                    file.path = self.store.dir().join(&to);
                    file.filename = to;
                }
                self.stats.images_captioned += 1;
            }
            Intent::Finalize(image) => {
                debug!("Image {} captioned: {:?}", image.index, image.caption);
                self.stats.images_indexed += 1;
                if let Some(cb) = self.progress {
                    cb.on_image_captioned(image.index, &image.filename, &image.caption);
                }
                self.images.push(image);
            }
        }
        Ok(())
    }
}

fn note_paragraph(metadata: &mut DocumentMetadata, paragraph: &Paragraph) {
    metadata.paragraph_count += 1;
    if metadata.first_heading.is_none()
        && paragraph.style.starts_with("heading 1")
        && paragraph.has_text()
    {
        metadata.first_heading = Some(paragraph.text.clone());
    }
}

/// Core title, then first `Heading 1`, then the file stem.
fn resolve_title(metadata: &DocumentMetadata, stem: &str) -> String {
    metadata
        .core_title
        .clone()
        .or_else(|| metadata.first_heading.clone())
        .unwrap_or_else(|| stem.to_string())
}
