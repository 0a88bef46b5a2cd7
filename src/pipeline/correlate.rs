//! Caption correlation: pair each extracted image with the text that
//! captions it.
//!
//! The pairing is positional. An image paragraph leaves its (last) image
//! *pending*; the next paragraph that is caption-styled, or that carries
//! text and no image, becomes its caption. Blank paragraphs are skipped
//! while waiting.
//!
//! ```text
//!               image(s)                       caption-styled, or text w/o image
//!   Idle ───────────────────▶ AwaitingCaption ───────────────────────────────▶ Idle
//!                               │   ▲                                 (rename + emit)
//!                               │   │ blank paragraph
//!                               └───┘
//!                               │
//!                               │ another image: the pending one is superseded
//!                               ▼ and never reaches the index
//!                             AwaitingCaption (new image)
//! ```
//!
//! [`Correlator`] is pure: it never touches the file system. Each step
//! returns [`Intent`]s that [`super::extract::ImageStore`] carries out, so
//! every transition can be unit-tested with hand-built paragraphs.

use super::extract::image_filename;
use super::walk::Paragraph;
use crate::output::CaptionedImage;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Maximum number of characters of a caption used for the file-name slug.
pub const SLUG_MAX_CHARS: usize = 40;

/// Correlator state between paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaptionState {
    #[default]
    Idle,
    /// One image written to disk and waiting for its caption.
    AwaitingCaption { filename: String, index: usize },
}

/// A side effect requested by the correlator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Write the payload of the paragraph's `slot`-th image as `filename`.
    WriteImage {
        slot: usize,
        index: usize,
        filename: String,
    },
    /// The pending image was replaced before any caption arrived. Its file
    /// stays on disk but it is not part of the index.
    Supersede { index: usize, filename: String },
    /// Rename an image file inside the image directory.
    Rename { from: String, to: String },
    /// Emit a finished index entry.
    Finalize(CaptionedImage),
}

/// Caption state machine plus the document-scoped image counter.
#[derive(Debug, Default)]
pub struct Correlator {
    state: CaptionState,
    counter: usize,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CaptionState {
        &self.state
    }

    /// Number of images seen so far.
    pub fn image_count(&self) -> usize {
        self.counter
    }

    /// Advance over one paragraph.
    ///
    /// `content_types` holds the resolved content type of each image
    /// reference of the paragraph, in order.
    pub fn step(&mut self, paragraph: &Paragraph, content_types: &[String]) -> Vec<Intent> {
        let mut intents = Vec::new();

        for (slot, content_type) in content_types.iter().enumerate() {
            self.counter += 1;
            let filename = image_filename(self.counter, content_type);
            intents.push(Intent::WriteImage {
                slot,
                index: self.counter,
                filename: filename.clone(),
            });
            let previous = std::mem::replace(
                &mut self.state,
                CaptionState::AwaitingCaption {
                    filename,
                    index: self.counter,
                },
            );
            if let CaptionState::AwaitingCaption { filename, index } = previous {
                intents.push(Intent::Supersede { index, filename });
            }
        }

        let CaptionState::AwaitingCaption { filename, index } = &self.state else {
            return intents;
        };

        let explicit = paragraph.is_caption_styled();
        let implicit = paragraph.has_text() && content_types.is_empty();
        if explicit || implicit {
            let caption = if paragraph.has_text() {
                paragraph.text.clone()
            } else {
                default_caption(*index)
            };
            let renamed = captioned_filename(filename, &caption, *index);
            intents.push(Intent::Rename {
                from: filename.clone(),
                to: renamed.clone(),
            });
            intents.push(Intent::Finalize(CaptionedImage::new(*index, renamed, caption)));
            self.state = CaptionState::Idle;
        }
        // Otherwise: blank paragraph, or text alongside a new image; keep waiting.

        intents
    }

    /// Close the walk. A still-pending image keeps its raw file name and
    /// gets the default caption.
    pub fn finish(self) -> Option<Intent> {
        match self.state {
            CaptionState::Idle => None,
            CaptionState::AwaitingCaption { filename, index } => Some(Intent::Finalize(
                CaptionedImage::new(index, filename, default_caption(index)),
            )),
        }
    }
}

/// `Image {index}`.
pub fn default_caption(index: usize) -> String {
    format!("Image {index}")
}

static RE_UNSAFE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]+").unwrap());

/// File-name slug for a caption: the first 40 characters with every run of
/// characters outside `[A-Za-z0-9_-]` collapsed to one `_`; `img_NNN` if
/// nothing is left.
pub fn caption_slug(caption: &str, index: usize) -> String {
    let head: String = caption.chars().take(SLUG_MAX_CHARS).collect();
    let slug = RE_UNSAFE_RUN.replace_all(&head, "_");
    if slug.is_empty() {
        format!("img_{index:03}")
    } else {
        slug.into_owned()
    }
}

/// `<stem>_<slug><suffix>`, e.g. `img_001.png` → `img_001_Diagram_A.png`.
pub fn captioned_filename(filename: &str, caption: &str, index: usize) -> String {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let suffix = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!("{stem}_{}{suffix}", caption_slug(caption, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Paragraph {
        Paragraph {
            images: vec![crate::pipeline::walk::ImageReference {
                rel_id: "rId1".into(),
            }],
            ..Paragraph::default()
        }
    }

    fn text(t: &str) -> Paragraph {
        Paragraph {
            text: t.into(),
            style: "normal".into(),
            ..Paragraph::default()
        }
    }

    fn caption(t: &str) -> Paragraph {
        Paragraph {
            text: t.into(),
            style: "caption".into(),
            ..Paragraph::default()
        }
    }

    fn png() -> Vec<String> {
        vec!["image/png".to_string()]
    }

    fn finalized(intents: &[Intent]) -> Vec<CaptionedImage> {
        intents
            .iter()
            .filter_map(|i| match i {
                Intent::Finalize(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn idle_text_paragraph_does_nothing() {
        let mut c = Correlator::new();
        assert!(c.step(&text("Introduction"), &[]).is_empty());
        assert_eq!(c.state(), &CaptionState::Idle);
    }

    #[test]
    fn image_moves_to_awaiting() {
        let mut c = Correlator::new();
        let intents = c.step(&image(), &png());
        assert_eq!(
            intents,
            vec![Intent::WriteImage {
                slot: 0,
                index: 1,
                filename: "img_001.png".into()
            }]
        );
        assert_eq!(
            c.state(),
            &CaptionState::AwaitingCaption {
                filename: "img_001.png".into(),
                index: 1
            }
        );
    }

    #[test]
    fn explicit_caption_renames_and_emits() {
        let mut c = Correlator::new();
        c.step(&image(), &png());
        let intents = c.step(&caption("Diagram A"), &[]);
        assert_eq!(
            intents,
            vec![
                Intent::Rename {
                    from: "img_001.png".into(),
                    to: "img_001_Diagram_A.png".into()
                },
                Intent::Finalize(CaptionedImage::new(1, "img_001_Diagram_A.png", "Diagram A")),
            ]
        );
        assert_eq!(c.state(), &CaptionState::Idle);
    }

    #[test]
    fn empty_caption_styled_paragraph_uses_default_caption() {
        let mut c = Correlator::new();
        c.step(&image(), &png());
        let out = finalized(&c.step(&caption(""), &[]));
        assert_eq!(out, vec![CaptionedImage::new(1, "img_001_Image_1.png", "Image 1")]);
    }

    #[test]
    fn implicit_caption_from_plain_text() {
        let mut c = Correlator::new();
        c.step(&image(), &png());
        let out = finalized(&c.step(&text("River basin map"), &[]));
        assert_eq!(
            out,
            vec![CaptionedImage::new(1, "img_001_River_basin_map.png", "River basin map")]
        );
    }

    #[test]
    fn blank_paragraphs_are_skipped_while_waiting() {
        let mut c = Correlator::new();
        c.step(&image(), &png());
        assert!(c.step(&text(""), &[]).is_empty());
        assert!(c.step(&text(""), &[]).is_empty());
        let out = finalized(&c.step(&text("Late caption"), &[]));
        assert_eq!(out[0].filename, "img_001_Late_caption.png");
    }

    #[test]
    fn second_image_supersedes_pending_one() {
        let mut c = Correlator::new();
        c.step(&image(), &png());
        let intents = c.step(&image(), &png());
        assert!(intents.contains(&Intent::Supersede {
            index: 1,
            filename: "img_001.png".into()
        }));
        let out = finalized(&c.step(&caption("Second"), &[]));
        assert_eq!(out, vec![CaptionedImage::new(2, "img_002_Second.png", "Second")]);
        assert!(c.finish().is_none());
    }

    #[test]
    fn multiple_images_in_one_paragraph_keep_only_the_last_pending() {
        let mut c = Correlator::new();
        let p = Paragraph {
            images: vec![
                crate::pipeline::walk::ImageReference { rel_id: "rId1".into() },
                crate::pipeline::walk::ImageReference { rel_id: "rId2".into() },
            ],
            ..Paragraph::default()
        };
        let intents = c.step(&p, &["image/png".into(), "image/jpeg".into()]);
        assert_eq!(intents.len(), 3);
        assert!(intents.contains(&Intent::Supersede {
            index: 1,
            filename: "img_001.png".into()
        }));
        assert_eq!(
            c.state(),
            &CaptionState::AwaitingCaption {
                filename: "img_002.jpg".into(),
                index: 2
            }
        );
    }

    #[test]
    fn text_next_to_new_image_is_not_its_caption() {
        let mut c = Correlator::new();
        let p = Paragraph {
            text: "inline words".into(),
            ..image()
        };
        let intents = c.step(&p, &png());
        assert!(finalized(&intents).is_empty());
        assert!(matches!(c.state(), CaptionState::AwaitingCaption { .. }));
    }

    #[test]
    fn caption_styled_image_paragraph_captions_itself() {
        let mut c = Correlator::new();
        let p = Paragraph {
            text: "Figure 4".into(),
            style: "caption".into(),
            ..image()
        };
        let out = finalized(&c.step(&p, &png()));
        assert_eq!(out, vec![CaptionedImage::new(1, "img_001_Figure_4.png", "Figure 4")]);
    }

    #[test]
    fn trailing_pending_image_gets_default_caption_without_rename() {
        let mut c = Correlator::new();
        c.step(&image(), &png());
        c.step(&text(""), &[]);
        assert_eq!(
            c.finish(),
            Some(Intent::Finalize(CaptionedImage::new(1, "img_001.png", "Image 1")))
        );
    }

    #[test]
    fn counter_is_global_across_paragraphs() {
        let mut c = Correlator::new();
        c.step(&image(), &png());
        c.step(&caption("A"), &[]);
        c.step(&image(), &["image/gif".into()]);
        let out = finalized(&c.step(&caption("B"), &[]));
        assert_eq!(out[0].filename, "img_002_B.gif");
        assert_eq!(c.image_count(), 2);
    }

    #[test]
    fn slug_of_punctuated_unicode_caption() {
        let slug = caption_slug("Fig. 1: Δ>Results (2024)!!", 1);
        assert_eq!(slug, "Fig_1_Results_2024_");
        assert!(slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
        assert!(!slug.contains("__"));
    }

    #[test]
    fn slug_truncates_to_forty_characters() {
        let long = "a".repeat(60);
        assert_eq!(caption_slug(&long, 1).len(), SLUG_MAX_CHARS);
        // Truncation counts characters, not bytes.
        let greek = format!("{}tail", "Δ".repeat(40));
        assert_eq!(caption_slug(&greek, 7), "_");
    }

    #[test]
    fn slug_keeps_hyphens_and_underscores() {
        assert_eq!(caption_slug("pre-flood_survey", 1), "pre-flood_survey");
    }

    #[test]
    fn empty_slug_falls_back_to_index() {
        assert_eq!(caption_slug("", 12), "img_012");
    }

    #[test]
    fn captioned_filename_inserts_slug_before_suffix() {
        assert_eq!(
            captioned_filename("img_003.jpg", "Site plan", 3),
            "img_003_Site_plan.jpg"
        );
    }
}
