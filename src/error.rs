//! Error types for the docx2site library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExportError`] is **fatal**: the document cannot be turned into a site
//!   at all (missing input, not a Word package, an image whose payload cannot
//!   be found). Returned as `Err(ExportError)` from [`crate::export()`] and
//!   friends; nothing is published for that document.
//!
//! * [`PublishError`] comes **after the fact**: the site was written to disk but
//!   staging, committing or pushing it failed. The generated files stay where
//!   they are, and [`crate::RunReport`] keeps the two outcomes apart so the
//!   caller can tell "converted but not published" from "not converted".

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the export pipeline.
#[derive(Debug, Error)]
pub enum ExportError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Word file not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a ZIP-based Word package.
    #[error("File is not a .docx package: '{path}'\nFirst bytes: {magic:?}")]
    NotADocx { path: PathBuf, magic: [u8; 4] },

    // ── Package errors ────────────────────────────────────────────────────
    /// The ZIP container or one of its XML parts could not be parsed.
    #[error("Word package '{path}' is corrupt: {detail}")]
    CorruptDocx { path: PathBuf, detail: String },

    /// An image reference points at a relationship or part that does not exist.
    #[error("Cannot resolve image relationship '{rel_id}': {reason}")]
    Resolution { rel_id: String, reason: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create, write, rename or remove a file under the output tree.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExportError {
    /// Shorthand for wrapping an `io::Error` raised while touching `path`.
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::OutputWriteFailed {
            path: path.into(),
            source,
        }
    }
}

/// Failure of the git publishing step.
///
/// Raised only after every file of the export has been written.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The `git` executable could not be started.
    #[error("Could not run git: {0}\nIs git installed and on PATH?")]
    GitUnavailable(#[source] std::io::Error),

    /// A git command exited with a non-zero status.
    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_not_found_display() {
        let e = ExportError::InputNotFound {
            path: PathBuf::from("authoring/missing.docx"),
        };
        assert!(e.to_string().contains("missing.docx"));
    }

    #[test]
    fn resolution_display() {
        let e = ExportError::Resolution {
            rel_id: "rId9".into(),
            reason: "no such relationship".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("rId9"), "got: {msg}");
        assert!(msg.contains("no such relationship"));
    }

    #[test]
    fn write_helper_keeps_path_and_source() {
        let e = ExportError::write(
            "docs/report/index.html",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        let msg = e.to_string();
        assert!(msg.contains("index.html"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn command_failed_display() {
        let e = PublishError::CommandFailed {
            command: "git push".into(),
            status: "exit status: 128".into(),
            stderr: "fatal: No configured push destination.".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("git push"));
        assert!(msg.contains("128"));
    }
}
