//! Page generation: one HTML page per captioned image plus an index.
//!
//! The markup is deliberately minimal and byte-stable so that re-running an
//! export over an unchanged document yields an empty git diff. Captions are
//! inserted verbatim (no HTML escaping): they come from the author's own
//! document.

use crate::error::ExportError;
use crate::output::CaptionedImage;
use crate::progress::ProgressCallback;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Name of the image directory inside a document's output root.
pub const IMAGE_DIR_NAME: &str = "images";

/// Remove any previous export at `root` and recreate `root/images`.
pub fn prepare_output_root(root: &Path) -> Result<(), ExportError> {
    if root.exists() {
        debug!("Removing previous export at {}", root.display());
        fs::remove_dir_all(root).map_err(|e| ExportError::write(root, e))?;
    }
    let images = root.join(IMAGE_DIR_NAME);
    fs::create_dir_all(&images).map_err(|e| ExportError::write(&images, e))?;
    Ok(())
}

/// Jekyll front matter block.
pub fn front_matter(title: &str) -> String {
    format!("---\nlayout: none\ntitle: \"{title}\"\n---\n")
}

/// HTML of a single image page.
pub fn render_page(image: &CaptionedImage) -> String {
    let caption = &image.caption;
    let filename = &image.filename;
    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>{caption}</title></head>
<body style="font-family:sans-serif;max-width:700px;margin:auto;text-align:center;">
  <img src="images/{filename}" style="max-width:100%;height:auto;"><br>
  <p>{caption}</p>
</body></html>"#
    )
}

/// HTML of the index page, entries in the given order.
pub fn render_index(images: &[CaptionedImage]) -> String {
    let mut html = String::from("<h1>Image Index</h1>\n<ul>\n");
    for image in images {
        html.push_str(&format!(
            "  <li><a href=\"{}\">{}</a></li>\n",
            image.page_name(),
            image.caption
        ));
    }
    html.push_str("</ul>\n");
    html
}

/// Write every image page and the index under `root`.
///
/// When `title` is given, each file starts with Jekyll front matter.
/// Returns the number of files written.
pub fn write_site(
    root: &Path,
    images: &[CaptionedImage],
    title: Option<&str>,
    progress: Option<&ProgressCallback>,
) -> Result<usize, ExportError> {
    let total = images.len() + 1;
    let header = title.map(front_matter).unwrap_or_default();

    for (i, image) in images.iter().enumerate() {
        let path = root.join(image.page_name());
        write_html(&path, &header, &render_page(image))?;
        if let Some(cb) = progress {
            cb.on_page_written(i + 1, total);
        }
    }

    let index = root.join("index.html");
    write_html(&index, &header, &render_index(images))?;
    if let Some(cb) = progress {
        cb.on_page_written(total, total);
    }

    info!("Wrote {} pages to {}", total, root.display());
    Ok(total)
}

fn write_html(path: &Path, header: &str, body: &str) -> Result<(), ExportError> {
    let mut content = String::with_capacity(header.len() + body.len());
    content.push_str(header);
    content.push_str(body);
    fs::write(path, content).map_err(|e| ExportError::write(path, e))
}
