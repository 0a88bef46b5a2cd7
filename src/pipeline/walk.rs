//! Document walker: open a `.docx` package and stream its paragraphs.
//!
//! A Word file is an OOXML package, a ZIP archive of XML parts tied
//! together by relationship tables:
//!
//! ```text
//! _rels/.rels                     → which part is the main document
//! [Content_Types].xml             → MIME type of every part
//! word/document.xml               → the paragraph stream (w:body/w:p)
//! word/_rels/document.xml.rels    → rId → media/imageN.ext
//! word/styles.xml                 → styleId → display name
//! docProps/core.xml               → title / creator
//! ```
//!
//! [`DocxPackage`] reads the small tables eagerly and keeps the archive open
//! so image payloads can be pulled out one at a time. The paragraph stream
//! itself is never materialised: [`Paragraphs`] is a lazy, single-pass
//! iterator driven by a `quick-xml` pull parser over the document part.

use crate::error::ExportError;
use crate::output::DocumentMetadata;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

// ── Paragraph model ──────────────────────────────────────────────────────

/// One embedded picture inside a paragraph, identified by its relationship id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// `r:embed` value of the picture's first `a:blip`, e.g. `rId7`. A linked
    /// picture carries its `r:link` id; a picture without a blip carries "".
    /// Neither resolves to a payload.
    pub rel_id: String,
}

/// A body-level paragraph as seen by the caption heuristics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Concatenated run text, trimmed.
    pub text: String,
    /// Lower-cased style display name, empty if the document defines none.
    pub style: String,
    /// Pictures found in the paragraph's runs, in document order.
    pub images: Vec<ImageReference>,
}

impl Paragraph {
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// Explicit caption: the style name starts with `caption`.
    pub fn is_caption_styled(&self) -> bool {
        self.style.starts_with("caption")
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Binary payload of a picture, resolved through the package tables.
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub rel_id: String,
    /// Part name inside the archive, e.g. `word/media/image1.png`.
    pub part_name: String,
    /// Declared content type, e.g. `image/png`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// ── Package ──────────────────────────────────────────────────────────────

/// An opened Word package.
pub struct DocxPackage<R> {
    parts: PartStore<R>,
    styles: StyleTable,
    document_xml: String,
    core: CoreProperties,
}

impl DocxPackage<File> {
    /// Open a package from disk.
    pub fn open(path: &Path) -> Result<Self, ExportError> {
        let file = File::open(path).map_err(|e| corrupt(path, e))?;
        Self::from_reader(file, path)
    }
}

impl DocxPackage<Cursor<Vec<u8>>> {
    /// Open a package held in memory. `label` is only used in error messages.
    pub fn from_bytes(bytes: Vec<u8>, label: &Path) -> Result<Self, ExportError> {
        Self::from_reader(Cursor::new(bytes), label)
    }
}

impl<R: Read + Seek> DocxPackage<R> {
    fn from_reader(reader: R, label: &Path) -> Result<Self, ExportError> {
        let mut archive = ZipArchive::new(reader).map_err(|e| corrupt(label, e))?;

        let content_types = match read_part(&mut archive, "[Content_Types].xml", label)? {
            Some(xml) => ContentTypes::parse(&xml).map_err(|e| corrupt(label, e))?,
            None => ContentTypes::default(),
        };

        let document_part = match read_part(&mut archive, "_rels/.rels", label)? {
            Some(xml) => parse_relationships(&xml, "")
                .map_err(|e| corrupt(label, e))?
                .into_values()
                .find(|r| r.rel_type == OFFICE_DOCUMENT_REL && !r.external)
                .map(|r| r.part_name)
                .unwrap_or_else(|| DEFAULT_DOCUMENT_PART.to_string()),
            None => DEFAULT_DOCUMENT_PART.to_string(),
        };
        debug!("Main document part: {}", document_part);

        let document_xml = read_part(&mut archive, &document_part, label)?.ok_or_else(|| {
            ExportError::CorruptDocx {
                path: label.to_path_buf(),
                detail: format!("missing main document part '{document_part}'"),
            }
        })?;

        let (doc_dir, doc_file) = split_part_name(&document_part);
        let rels_name = if doc_dir.is_empty() {
            format!("_rels/{doc_file}.rels")
        } else {
            format!("{doc_dir}/_rels/{doc_file}.rels")
        };
        let relationships = match read_part(&mut archive, &rels_name, label)? {
            Some(xml) => parse_relationships(&xml, doc_dir).map_err(|e| corrupt(label, e))?,
            None => HashMap::new(),
        };

        let styles_name = relationships
            .values()
            .find(|r| r.rel_type.ends_with("/styles") && !r.external)
            .map(|r| r.part_name.clone())
            .unwrap_or_else(|| "word/styles.xml".to_string());
        let styles = match read_part(&mut archive, &styles_name, label)? {
            Some(xml) => StyleTable::parse(&xml).map_err(|e| corrupt(label, e))?,
            None => StyleTable::default(),
        };

        let core = match read_part(&mut archive, "docProps/core.xml", label)? {
            Some(xml) => CoreProperties::parse(&xml).map_err(|e| corrupt(label, e))?,
            None => CoreProperties::default(),
        };

        debug!(
            "Opened package: {} relationships, {} styles",
            relationships.len(),
            styles.names.len()
        );

        Ok(Self {
            parts: PartStore {
                archive,
                relationships,
                content_types,
            },
            styles,
            document_xml,
            core,
        })
    }

    /// Split the package into its paragraph stream and the part store used
    /// to resolve image references while the stream is being consumed.
    pub fn walk(&mut self) -> (Paragraphs<'_>, &mut PartStore<R>) {
        (
            Paragraphs::new(&self.document_xml, &self.styles),
            &mut self.parts,
        )
    }

    /// Metadata available without walking the body.
    pub fn core_properties(&self) -> &CoreProperties {
        &self.core
    }
}

/// Archive plus the tables needed to turn a relationship id into bytes.
pub struct PartStore<R> {
    archive: ZipArchive<R>,
    relationships: HashMap<String, Relationship>,
    content_types: ContentTypes,
}

impl<R: Read + Seek> PartStore<R> {
    /// Resolve an image reference to its payload and declared content type.
    ///
    /// Fails with [`ExportError::Resolution`] when the relationship is
    /// unknown, points outside the package, or names a missing part.
    pub fn resolve_image(&mut self, reference: &ImageReference) -> Result<ImagePart, ExportError> {
        let rel_id = &reference.rel_id;
        let resolution = |reason: String| ExportError::Resolution {
            rel_id: rel_id.clone(),
            reason,
        };

        if rel_id.is_empty() {
            return Err(resolution("picture has no embedded image reference".into()));
        }
        let rel = self
            .relationships
            .get(rel_id)
            .ok_or_else(|| resolution("no such relationship in the document part".into()))?;
        if rel.external {
            return Err(resolution(format!("external target '{}'", rel.part_name)));
        }

        let content_type = self
            .content_types
            .lookup(&rel.part_name)
            .ok_or_else(|| resolution(format!("no content type declared for '{}'", rel.part_name)))?
            .to_string();

        let mut entry = self
            .archive
            .by_name(&rel.part_name)
            .map_err(|e| resolution(format!("part '{}' not found: {e}", rel.part_name)))?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| resolution(format!("reading '{}': {e}", rel.part_name)))?;

        Ok(ImagePart {
            rel_id: rel_id.clone(),
            part_name: rel.part_name.clone(),
            content_type,
            bytes,
        })
    }
}

// ── Paragraph stream ─────────────────────────────────────────────────────

/// Lazy iterator over the body-level paragraphs of a document.
///
/// Paragraphs nested inside tables are skipped; paragraphs of a text box
/// belong to the enclosing paragraph and contribute their pictures but not
/// their text. After the first error the iterator is exhausted.
pub struct Paragraphs<'a> {
    reader: Reader<&'a [u8]>,
    styles: &'a StyleTable,
    done: bool,
    /// `w:p` nesting depth inside the current body paragraph (0 = outside).
    para_depth: usize,
    /// `w:tbl` depth while outside any paragraph.
    table_depth: usize,
    run_depth: usize,
    pic_depth: usize,
    /// Relationship id of the first `a:blip` of the current picture.
    pic_blip: Option<String>,
    in_text: bool,
    text: String,
    style_id: Option<String>,
    images: Vec<ImageReference>,
}

impl<'a> Paragraphs<'a> {
    fn new(xml: &'a str, styles: &'a StyleTable) -> Self {
        let mut reader = Reader::from_str(xml);
        // w:t content is whitespace-significant (xml:space="preserve").
        reader.trim_text(false);
        Self {
            reader,
            styles,
            done: false,
            para_depth: 0,
            table_depth: 0,
            run_depth: 0,
            pic_depth: 0,
            pic_blip: None,
            in_text: false,
            text: String::new(),
            style_id: None,
            images: Vec::new(),
        }
    }

    fn begin_paragraph(&mut self) {
        self.para_depth = 1;
        self.run_depth = 0;
        self.pic_depth = 0;
        self.pic_blip = None;
        self.in_text = false;
        self.text.clear();
        self.style_id = None;
        self.images.clear();
    }

    fn finish_paragraph(&mut self) -> Paragraph {
        self.para_depth = 0;
        Paragraph {
            text: self.text.trim().to_string(),
            style: self.styles.display_name(self.style_id.as_deref()),
            images: std::mem::take(&mut self.images),
        }
    }

    /// Top-level paragraph content, excluding nested text-box paragraphs.
    fn at_own_level(&self) -> bool {
        self.para_depth == 1
    }

    fn on_element(&mut self, e: &BytesStart<'_>, is_empty: bool) -> Option<Paragraph> {
        let name = e.name();
        match name.as_ref() {
            b"w:p" => {
                if self.para_depth > 0 {
                    if !is_empty {
                        self.para_depth += 1;
                    }
                } else if self.table_depth == 0 {
                    self.begin_paragraph();
                    if is_empty {
                        return Some(self.finish_paragraph());
                    }
                }
            }
            b"w:tbl" if self.para_depth == 0 && !is_empty => self.table_depth += 1,
            _ if self.para_depth == 0 => {}
            b"w:pStyle" if self.at_own_level() => {
                self.style_id = attr(e, b"w:val");
            }
            b"w:r" if !is_empty => self.run_depth += 1,
            b"w:t" if self.at_own_level() && self.run_depth > 0 && !is_empty => {
                self.in_text = true;
            }
            b"w:tab" if self.at_own_level() && self.run_depth > 0 => self.text.push('\t'),
            b"w:br" | b"w:cr" if self.at_own_level() && self.run_depth > 0 => {
                self.text.push('\n');
            }
            b"pic:pic" if is_empty => self.images.push(ImageReference {
                rel_id: String::new(),
            }),
            b"pic:pic" => self.pic_depth += 1,
            b"a:blip" if self.pic_depth > 0 && self.pic_blip.is_none() => {
                let rel_id = attr(e, b"r:embed")
                    .or_else(|| attr(e, b"r:link"))
                    .unwrap_or_default();
                self.pic_blip = Some(rel_id);
            }
            _ => {}
        }
        None
    }

    fn on_end(&mut self, name: &[u8]) -> Option<Paragraph> {
        match name {
            b"w:p" if self.para_depth == 1 => return Some(self.finish_paragraph()),
            b"w:p" if self.para_depth > 1 => self.para_depth -= 1,
            b"w:tbl" if self.para_depth == 0 => {
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            b"w:r" if self.para_depth > 0 => self.run_depth = self.run_depth.saturating_sub(1),
            b"w:t" => self.in_text = false,
            b"pic:pic" if self.para_depth > 0 && self.pic_depth > 0 => {
                self.pic_depth -= 1;
                if self.pic_depth == 0 {
                    let rel_id = self.pic_blip.take().unwrap_or_default();
                    self.images.push(ImageReference { rel_id });
                }
            }
            _ => {}
        }
        None
    }
}

impl Iterator for Paragraphs<'_> {
    type Item = Result<Paragraph, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    self.done = true;
                    return Some(Err(ExportError::CorruptDocx {
                        path: PathBuf::from("word/document.xml"),
                        detail: format!(
                            "XML error at byte {}: {e}",
                            self.reader.buffer_position()
                        ),
                    }));
                }
            };
            let emitted = match event {
                Event::Start(ref e) => self.on_element(e, false),
                Event::Empty(ref e) => self.on_element(e, true),
                Event::End(ref e) => self.on_end(e.name().as_ref()),
                Event::Text(ref t) if self.in_text && self.at_own_level() => {
                    match t.unescape() {
                        Ok(s) => self.text.push_str(&s),
                        Err(e) => {
                            self.done = true;
                            return Some(Err(ExportError::CorruptDocx {
                                path: PathBuf::from("word/document.xml"),
                                detail: format!("bad text escape: {e}"),
                            }));
                        }
                    }
                    None
                }
                Event::Eof => {
                    self.done = true;
                    return None;
                }
                _ => None,
            };
            if let Some(paragraph) = emitted {
                return Some(Ok(paragraph));
            }
        }
    }
}

// ── Package tables ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Relationship {
    rel_type: String,
    /// Archive part name for internal targets, raw target for external ones.
    part_name: String,
    external: bool,
}

/// Parse a `.rels` part. Internal targets are resolved against `base_dir`.
fn parse_relationships(
    xml: &str,
    base_dir: &str,
) -> Result<HashMap<String, Relationship>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut rels = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"Relationship" => {
                let (Some(id), Some(target)) = (attr(e, b"Id"), attr(e, b"Target")) else {
                    continue;
                };
                let external = attr(e, b"TargetMode").as_deref() == Some("External");
                let part_name = if external {
                    target
                } else {
                    resolve_target(base_dir, &target)
                };
                rels.insert(
                    id,
                    Relationship {
                        rel_type: attr(e, b"Type").unwrap_or_default(),
                        part_name,
                        external,
                    },
                );
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rels)
}

/// `[Content_Types].xml`: per-part overrides and per-extension defaults.
#[derive(Debug, Default)]
struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    fn parse(xml: &str) -> Result<Self, quick_xml::Error> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut types = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                    b"Default" => {
                        if let (Some(ext), Some(ct)) =
                            (attr(e, b"Extension"), attr(e, b"ContentType"))
                        {
                            types.defaults.insert(ext.to_ascii_lowercase(), ct);
                        }
                    }
                    b"Override" => {
                        if let (Some(part), Some(ct)) =
                            (attr(e, b"PartName"), attr(e, b"ContentType"))
                        {
                            let part = part.trim_start_matches('/').to_ascii_lowercase();
                            types.overrides.insert(part, ct);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(types)
    }

    /// Content type for an archive part name (no leading slash).
    fn lookup(&self, part_name: &str) -> Option<&str> {
        let key = part_name.to_ascii_lowercase();
        if let Some(ct) = self.overrides.get(&key) {
            return Some(ct);
        }
        let ext = Path::new(&key).extension()?.to_str()?;
        self.defaults.get(ext).map(String::as_str)
    }
}

/// Paragraph style ids mapped to their display names.
#[derive(Debug, Default)]
struct StyleTable {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleTable {
    fn parse(xml: &str) -> Result<Self, quick_xml::Error> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut table = Self::default();
        let mut current: Option<(String, bool)> = None;
        loop {
            match reader.read_event()? {
                Event::Start(ref e) if e.name().as_ref() == b"w:style" => {
                    let is_paragraph = attr(e, b"w:type").as_deref() == Some("paragraph");
                    let is_default = matches!(attr(e, b"w:default").as_deref(), Some("1" | "true"));
                    current = attr(e, b"w:styleId").filter(|_| is_paragraph).map(|id| (id, is_default));
                    if let Some((ref id, true)) = current {
                        table.default_paragraph = Some(id.clone());
                    }
                }
                Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"w:name" => {
                    if let (Some((id, _)), Some(name)) = (current.as_ref(), attr(e, b"w:val")) {
                        table.names.insert(id.clone(), name);
                    }
                }
                Event::End(ref e) if e.name().as_ref() == b"w:style" => current = None,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(table)
    }

    /// Lower-cased display name for a paragraph's `w:pStyle`. An id that is
    /// missing or not a known paragraph style resolves to the default
    /// paragraph style, and to "" when there is none.
    fn display_name(&self, style_id: Option<&str>) -> String {
        style_id
            .and_then(|id| self.names.get(id))
            .or_else(|| {
                self.default_paragraph
                    .as_deref()
                    .and_then(|id| self.names.get(id))
            })
            .map(|name| name.to_lowercase())
            .unwrap_or_default()
    }
}

/// The fields of `docProps/core.xml` used for page titles.
#[derive(Debug, Clone, Default)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub creator: Option<String>,
}

impl CoreProperties {
    fn parse(xml: &str) -> Result<Self, quick_xml::Error> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut props = Self::default();
        let mut field: Option<&'static str> = None;
        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    field = match e.name().as_ref() {
                        b"dc:title" => Some("title"),
                        b"dc:creator" => Some("creator"),
                        _ => None,
                    };
                }
                Event::Text(ref t) => {
                    let value = t.unescape()?.trim().to_string();
                    match field {
                        Some("title") if !value.is_empty() => props.title = Some(value),
                        Some("creator") if !value.is_empty() => props.creator = Some(value),
                        _ => {}
                    }
                }
                Event::End(_) => field = None,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(props)
    }

    /// Start document metadata from these properties; the walk fills in the rest.
    pub fn to_metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            core_title: self.title.clone(),
            author: self.creator.clone(),
            ..DocumentMetadata::default()
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(Result::ok)
        .find(|a| a.key.as_ref() == key)
        .map(|a| {
            a.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&a.value).into_owned())
        })
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    label: &Path,
) -> Result<Option<String>, ExportError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(corrupt(label, e)),
    };
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| corrupt(label, format!("{name}: {e}")))?;
    Ok(Some(content))
}

fn corrupt(path: &Path, detail: impl std::fmt::Display) -> ExportError {
    ExportError::CorruptDocx {
        path: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// `word/document.xml` → (`word`, `document.xml`).
fn split_part_name(part: &str) -> (&str, &str) {
    match part.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => ("", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None if base_dir.is_empty() => target.to_string(),
        None => format!("{base_dir}/{target}"),
    };
    let mut segments: Vec<&str> = Vec::new();
    for seg in joined.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styles() -> StyleTable {
        StyleTable::parse(
            r#"<w:styles>
                <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
                <w:style w:type="paragraph" w:styleId="Caption"><w:name w:val="caption"/></w:style>
                <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
                <w:style w:type="character" w:styleId="Strong"><w:name w:val="Strong"/></w:style>
            </w:styles>"#,
        )
        .unwrap()
    }

    fn walk(body: &str) -> Vec<Paragraph> {
        let xml = format!("<w:document><w:body>{body}</w:body></w:document>");
        let styles = styles();
        Paragraphs::new(&xml, &styles)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    const PICTURE: &str = r#"<w:r><w:drawing><wp:inline><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="rId5"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#;

    #[test]
    fn text_is_concatenated_and_trimmed() {
        let paras = walk(
            r#"<w:p><w:r><w:t xml:space="preserve">  Hello </w:t></w:r><w:r><w:t>world &amp; more </w:t></w:r></w:p>"#,
        );
        assert_eq!(paras.len(), 1);
        assert_eq!(paras[0].text, "Hello world & more");
        assert_eq!(paras[0].style, "normal");
    }

    #[test]
    fn style_name_resolved_and_lowercased() {
        let paras = walk(
            r#"<w:p><w:pPr><w:pStyle w:val="Caption"/></w:pPr><w:r><w:t>Figure 1</w:t></w:r></w:p>
               <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>"#,
        );
        assert_eq!(paras[0].style, "caption");
        assert!(paras[0].is_caption_styled());
        assert_eq!(paras[1].style, "heading 1");
    }

    #[test]
    fn unknown_style_id_falls_back_to_default_style() {
        let paras = walk(r#"<w:p><w:pPr><w:pStyle w:val="CaptionWide"/></w:pPr></w:p>"#);
        assert_eq!(paras[0].style, "normal");
        assert!(!paras[0].is_caption_styled());
    }

    #[test]
    fn character_style_id_is_not_a_paragraph_style() {
        let paras = walk(r#"<w:p><w:pPr><w:pStyle w:val="Strong"/></w:pPr></w:p>"#);
        assert_eq!(paras[0].style, "normal");
    }

    #[test]
    fn unknown_style_without_default_is_empty() {
        let xml = r#"<w:document><w:body><w:p><w:pPr><w:pStyle w:val="Caption"/></w:pPr></w:p></w:body></w:document>"#;
        let styles = StyleTable::default();
        let paras = Paragraphs::new(xml, &styles)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(paras[0].style, "");
    }

    #[test]
    fn linked_picture_keeps_its_link_id() {
        let linked = r#"<w:r><w:drawing><pic:pic><pic:blipFill><a:blip r:link="rId9"/></pic:blipFill></pic:pic></w:drawing></w:r>"#;
        let paras = walk(&format!("<w:p>{linked}</w:p>"));
        assert_eq!(
            paras[0].images,
            vec![ImageReference {
                rel_id: "rId9".into()
            }]
        );
    }

    #[test]
    fn picture_without_blip_is_still_a_reference() {
        let paras = walk("<w:p><w:r><w:drawing><pic:pic><pic:nvPicPr/></pic:pic></w:drawing></w:r></w:p>");
        assert_eq!(paras[0].images.len(), 1);
        assert_eq!(paras[0].images[0].rel_id, "");
    }

    #[test]
    fn only_first_blip_of_a_picture_counts() {
        let double = r#"<w:r><w:drawing><pic:pic><a:blip r:embed="rId1"/><a:blip r:embed="rId2"/></pic:pic></w:drawing></w:r>"#;
        let paras = walk(&format!("<w:p>{double}</w:p>"));
        assert_eq!(
            paras[0].images,
            vec![ImageReference {
                rel_id: "rId1".into()
            }]
        );
    }

    #[test]
    fn picture_reference_is_collected() {
        let paras = walk(&format!("<w:p>{PICTURE}</w:p>"));
        assert_eq!(
            paras[0].images,
            vec![ImageReference {
                rel_id: "rId5".into()
            }]
        );
        assert!(paras[0].text.is_empty());
    }

    #[test]
    fn empty_paragraph_element_is_emitted() {
        let paras = walk("<w:p/><w:p><w:r><w:t>x</w:t></w:r></w:p>");
        assert_eq!(paras.len(), 2);
        assert!(!paras[0].has_text());
        assert_eq!(paras[1].text, "x");
    }

    #[test]
    fn table_paragraphs_are_skipped() {
        let paras = walk(
            r#"<w:p><w:r><w:t>before</w:t></w:r></w:p>
               <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
               <w:p><w:r><w:t>after</w:t></w:r></w:p>"#,
        );
        let texts: Vec<_> = paras.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["before", "after"]);
    }

    #[test]
    fn text_box_text_is_not_paragraph_text() {
        let paras = walk(
            r#"<w:p><w:r><w:t>outer</w:t></w:r><w:r><w:pict><v:textbox><w:txbxContent><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:txbxContent></v:textbox></w:pict></w:r></w:p>"#,
        );
        assert_eq!(paras.len(), 1);
        assert_eq!(paras[0].text, "outer");
    }

    #[test]
    fn tabs_in_paragraph_properties_are_not_text() {
        let paras = walk(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t></w:r></w:p>"#,
        );
        assert_eq!(paras[0].text, "a\tb");
    }

    #[test]
    fn malformed_xml_yields_error_then_stops() {
        let styles = StyleTable::default();
        let xml = "<w:document><w:body><w:p><w:r></w:p></w:body></w:document>";
        let mut iter = Paragraphs::new(xml, &styles);
        assert!(matches!(iter.next(), Some(Err(ExportError::CorruptDocx { .. }))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn unstyled_paragraph_without_style_table_has_empty_style() {
        let styles = StyleTable::default();
        let xml = "<w:document><w:body><w:p><w:r><w:t>x</w:t></w:r></w:p></w:body></w:document>";
        let paras: Vec<_> = Paragraphs::new(xml, &styles).map(Result::unwrap).collect();
        assert_eq!(paras[0].style, "");
    }

    #[test]
    fn relationships_resolve_relative_targets() {
        let rels = parse_relationships(
            r#"<Relationships>
                <Relationship Id="rId5" Type="http://x/image" Target="media/image1.png"/>
                <Relationship Id="rId6" Type="http://x/image" Target="../media/shared.jpeg"/>
                <Relationship Id="rId7" Type="http://x/hyperlink" Target="https://example.com" TargetMode="External"/>
            </Relationships>"#,
            "word",
        )
        .unwrap();
        assert_eq!(rels["rId5"].part_name, "word/media/image1.png");
        assert_eq!(rels["rId6"].part_name, "media/shared.jpeg");
        assert!(rels["rId7"].external);
    }

    #[test]
    fn content_type_override_wins_over_default() {
        let types = ContentTypes::parse(
            r#"<Types>
                <Default Extension="png" ContentType="image/png"/>
                <Default Extension="JPEG" ContentType="image/jpeg"/>
                <Override PartName="/word/media/special.png" ContentType="image/x-special"/>
            </Types>"#,
        )
        .unwrap();
        assert_eq!(types.lookup("word/media/image1.png"), Some("image/png"));
        assert_eq!(types.lookup("word/media/photo.jpeg"), Some("image/jpeg"));
        assert_eq!(types.lookup("word/media/special.png"), Some("image/x-special"));
        assert_eq!(types.lookup("word/media/unknown.emf"), None);
    }

    #[test]
    fn core_properties_title_and_creator() {
        let core = CoreProperties::parse(
            r#"<cp:coreProperties><dc:title> Flood Atlas </dc:title><dc:creator>A. Author</dc:creator></cp:coreProperties>"#,
        )
        .unwrap();
        assert_eq!(core.title.as_deref(), Some("Flood Atlas"));
        assert_eq!(core.creator.as_deref(), Some("A. Author"));
    }

    #[test]
    fn resolve_target_handles_absolute_and_dot_segments() {
        assert_eq!(resolve_target("word", "/word/media/a.png"), "word/media/a.png");
        assert_eq!(resolve_target("word", "./media/a.png"), "word/media/a.png");
        assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
    }
}
