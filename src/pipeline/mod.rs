//! Pipeline stages for Word-to-site export.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ walk ──▶ extract ◀──▶ correlate ──▶ generate
//! (path)   (zip/xml)  (disk)       (pure)       (html)
//! ```
//!
//! 1. [`input`]    : validate the path and the ZIP signature
//! 2. [`walk`]     : open the package and stream body paragraphs lazily
//! 3. [`correlate`]: caption state machine; turns paragraphs into intents
//! 4. [`extract`]  : apply write/rename intents to the image directory
//! 5. [`generate`] : clear the output root, write pages and the index
//!
//! Publishing is not a stage here: it lives in [`crate::publish`] and only
//! runs once the whole site is on disk.

pub mod correlate;
pub mod extract;
pub mod generate;
pub mod input;
pub mod walk;
