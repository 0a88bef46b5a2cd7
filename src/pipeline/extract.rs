//! Image extraction: naming and on-disk storage of image payloads.
//!
//! Names are decided by the correlator (`img_NNN.<ext>`, later renamed to
//! `img_NNN_<slug>.<ext>`); [`ImageStore`] is the thin executor that applies
//! those decisions to the image directory.

use super::walk::ImagePart;
use crate::error::ExportError;
use crate::output::ExtractedImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension for a content type: its last `/` segment, with `jpeg`
/// shortened to `jpg`.
pub fn image_extension(content_type: &str) -> &str {
    let subtype = content_type.rsplit('/').next().unwrap_or(content_type);
    if subtype == "jpeg" {
        "jpg"
    } else {
        subtype
    }
}

/// `img_{index:03}.{ext}`.
pub fn image_filename(index: usize, content_type: &str) -> String {
    format!("img_{index:03}.{}", image_extension(content_type))
}

/// Writes and renames image files inside one image directory.
#[derive(Debug)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a payload as `filename`, creating the directory if needed.
    pub fn write(
        &self,
        index: usize,
        filename: &str,
        part: &ImagePart,
    ) -> Result<ExtractedImage, ExportError> {
        fs::create_dir_all(&self.dir).map_err(|e| ExportError::write(&self.dir, e))?;
        let path = self.dir.join(filename);
        fs::write(&path, &part.bytes).map_err(|e| ExportError::write(&path, e))?;
        debug!(
            "Wrote {} ({} bytes, {}) from {}",
            path.display(),
            part.bytes.len(),
            part.content_type,
            part.part_name
        );
        Ok(ExtractedImage {
            index,
            filename: filename.to_string(),
            path,
        })
    }

    /// Rename `from` to `to` in place.
    pub fn rename(&self, from: &str, to: &str) -> Result<(), ExportError> {
        let to_path = self.dir.join(to);
        fs::rename(self.dir.join(from), &to_path).map_err(|e| ExportError::write(&to_path, e))?;
        debug!("Renamed {} -> {}", from, to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(bytes: &[u8]) -> ImagePart {
        ImagePart {
            rel_id: "rId1".into(),
            part_name: "word/media/image1.png".into(),
            content_type: "image/png".into(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn extension_from_content_type() {
        assert_eq!(image_extension("image/png"), "png");
        assert_eq!(image_extension("image/jpeg"), "jpg");
        assert_eq!(image_extension("image/gif"), "gif");
        assert_eq!(image_extension("image/x-emf"), "x-emf");
        assert_eq!(image_extension("png"), "png");
    }

    #[test]
    fn filename_is_zero_padded() {
        assert_eq!(image_filename(1, "image/jpeg"), "img_001.jpg");
        assert_eq!(image_filename(42, "image/png"), "img_042.png");
        assert_eq!(image_filename(1234, "image/png"), "img_1234.png");
    }

    #[test]
    fn write_creates_directory_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path().join("nested/images"));
        let img = store.write(1, "img_001.png", &part(b"\x89PNG")).unwrap();
        assert_eq!(img.index, 1);
        assert_eq!(fs::read(&img.path).unwrap(), b"\x89PNG");
        // Second write into the existing directory is fine.
        store.write(2, "img_002.png", &part(b"x")).unwrap();
    }

    #[test]
    fn rename_moves_file_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path());
        store.write(1, "img_001.png", &part(b"data")).unwrap();
        store.rename("img_001.png", "img_001_Map.png").unwrap();
        assert!(!tmp.path().join("img_001.png").exists());
        assert_eq!(fs::read(tmp.path().join("img_001_Map.png")).unwrap(), b"data");
    }

    #[test]
    fn rename_of_missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path());
        let err = store.rename("img_009.png", "img_009_X.png").unwrap_err();
        assert!(matches!(err, ExportError::OutputWriteFailed { .. }));
    }
}
