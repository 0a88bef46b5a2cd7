//! # docx2site
//!
//! Turn the images of a Word document into a small static site and publish
//! it with git.
//!
//! Every embedded image becomes its own HTML page, named and titled after
//! the caption that follows it in the document. An `index.html` links all
//! pages in document order. The output is byte-stable, so exporting an
//! unchanged document again produces no git changes.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .docx
//!  │
//!  ├─ 1. Input      check path and ZIP signature
//!  ├─ 2. Walk       stream body paragraphs (text, style, image refs)
//!  ├─ 3. Correlate  pair each image with the caption that follows it
//!  ├─ 4. Extract    write images/, rename captioned ones
//!  ├─ 5. Generate   one page per image + index.html
//!  └─ 6. Publish    git add / commit / push (optional)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docx2site::{run, ExportConfig, GitPublisher};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExportConfig::builder().docs_dir("docs").build()?;
//!     let publisher = GitPublisher::new(&config.repo_dir);
//!     let report = run("Flood Report.docx", &config, Some(&publisher))?;
//!     println!("{} images", report.export.images.len());
//!     report.into_result()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docx2site` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ```toml
//! docx2site = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod publish;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExportConfig, ExportConfigBuilder};
pub use error::{ExportError, PublishError};
pub use export::{export, export_from_bytes, inspect, publish, run};
pub use output::{
    CaptionedImage, DocumentMetadata, ExportOutput, ExportStats, ExtractedImage, RunReport,
};
pub use progress::{ExportProgressCallback, NoopProgressCallback, ProgressCallback};
pub use publish::{GitPublisher, PublishOutcome, Publisher};
