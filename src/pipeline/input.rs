//! Input resolution: validate the user-supplied path before anything is
//! written to the output tree.
//!
//! A `.docx` is a ZIP archive, so the first four bytes must be the local
//! file header signature `PK\x03\x04`. Checking it up front turns "someone
//! passed the PDF export" into a clear error instead of a ZIP parse failure.

use crate::error::ExportError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// ZIP local file header signature.
pub const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// A validated Word document on disk.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub path: PathBuf,
    /// File stem; names the output directory.
    pub stem: String,
    /// File name, used in the commit message.
    pub file_name: String,
}

/// Check that `path` exists, is readable and looks like a `.docx` package.
pub fn resolve_input(path: &Path) -> Result<ResolvedInput, ExportError> {
    if !path.exists() {
        return Err(ExportError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExportError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(ExportError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_err() || magic != ZIP_MAGIC {
        return Err(ExportError::NotADocx {
            path: path.to_path_buf(),
            magic,
        });
    }

    let stem = document_stem(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| stem.clone());

    debug!("Resolved Word document: {}", path.display());
    Ok(ResolvedInput {
        path: path.to_path_buf(),
        stem,
        file_name,
    })
}

/// Stem used for the output directory; must be a usable directory name.
pub fn document_stem(path: &Path) -> Result<String, ExportError> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .ok_or_else(|| ExportError::InvalidConfig(format!("cannot derive a document name from {path:?}")))
}
