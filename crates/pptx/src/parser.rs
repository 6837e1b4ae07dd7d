//! PPTX file parser implementation.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slideqa_core::{DeckFormat, Document, Error, ParseError, Result, SlideBlock, SlideExtractor};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Document> {
        let mut archive = ZipArchive::new(reader).map_err(|e| ParseError::Zip {
            part: "archive".to_string(),
            source: Box::new(e),
        })?;

        let mut document = Document::new(filename, DeckFormat::Pptx);

        let slide_order = self.get_slide_order(&mut archive)?;
        document.slide_count = slide_order.len();
        log::debug!("{}: {} slides listed", filename, slide_order.len());

        for (idx, slide_path) in slide_order.iter().enumerate() {
            match self.parse_slide(&mut archive, slide_path, idx + 1)? {
                Some(block) => document.add_block(block),
                None => log::debug!("Slide {} has no text, skipping", idx + 1),
            }
        }

        Ok(document)
    }

    /// Get the ordered list of slide part paths.
    ///
    /// Order comes from `<p:sldIdLst>` in presentation.xml; each entry's
    /// relationship id is resolved to a part name via presentation.xml.rels.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = self.read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
        let targets = parse_slide_relationships(&rels_content)?;

        let presentation = self.read_file_from_archive(archive, PRESENTATION_PATH)?;
        let slide_ids = parse_slide_id_list(&presentation)?;

        slide_ids
            .into_iter()
            .map(|rid| {
                targets
                    .get(&rid)
                    .map(|target| resolve_target(target))
                    .ok_or_else(|| {
                        Error::from(ParseError::BrokenRelationship(format!(
                            "slide id '{}' has no slide relationship",
                            rid
                        )))
                    })
            })
            .collect()
    }

    /// Parse a single slide from the archive.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<Option<SlideBlock>> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let shapes = extract_shapes_from_xml(&content, slide_path)?;

        let title = shapes
            .iter()
            .find(|s| s.is_title)
            .map(|s| s.text.clone())
            .unwrap_or_default();

        // A shape whose text equals the title verbatim is left out of the body,
        // even when it is not the title placeholder itself.
        let mut body = String::new();
        for shape in shapes.iter().filter(|s| s.has_text_frame) {
            if shape.text != title {
                body.push_str(shape.text.trim());
                body.push('\n');
            }
        }

        Ok(SlideBlock::from_parts(slide_number, title, body.trim()))
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive.by_name(path).map_err(|e| match e {
            ZipError::FileNotFound => ParseError::MissingPart(path.to_string()),
            other => ParseError::Zip {
                part: path.to_string(),
                source: Box::new(other),
            },
        })?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| ParseError::Zip {
                part: path.to_string(),
                source: Box::new(e),
            })?;

        Ok(content)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SlideExtractor for PptxParser {
    fn extract(&self, bytes: &[u8], filename: &str) -> Result<Document> {
        match DeckFormat::from_magic(bytes) {
            Some(DeckFormat::Pptx) => self.parse(Cursor::new(bytes), filename),
            Some(DeckFormat::Ppt) => Err(ParseError::UnsupportedFormat(
                "legacy binary .ppt decks are not supported, save the deck as .pptx".to_string(),
            )
            .into()),
            None => Err(ParseError::UnsupportedFormat(format!(
                "{} is not a PPTX (ZIP) container",
                filename
            ))
            .into()),
        }
    }
}

/// Text and role of one top-level shape on a slide.
#[derive(Debug, Default)]
struct ShapeText {
    text: String,
    is_title: bool,
    has_text_frame: bool,
}

/// A top-level `<p:sp>` currently being read.
#[derive(Debug)]
struct OpenShape {
    depth: usize,
    shape: ShapeText,
    paragraphs: Vec<String>,
    in_text_body: bool,
    in_paragraph: bool,
    in_run_text: bool,
}

impl OpenShape {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            shape: ShapeText::default(),
            paragraphs: Vec::new(),
            in_text_body: false,
            in_paragraph: false,
            in_run_text: false,
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(paragraph) = self.paragraphs.last_mut() {
            paragraph.push_str(text);
        }
    }

    fn finish(mut self) -> ShapeText {
        self.shape.text = self.paragraphs.join("\n");
        self.shape
    }

    fn start(&mut self, e: &BytesStart, empty: bool) {
        let name = e.name();
        match local_name(name.as_ref()) {
            b"ph" => self.shape.is_title = is_title_placeholder(e),
            b"txBody" => {
                self.shape.has_text_frame = true;
                self.in_text_body = !empty;
            }
            b"p" if self.in_text_body => {
                self.paragraphs.push(String::new());
                self.in_paragraph = !empty;
            }
            b"t" if self.in_paragraph => self.in_run_text = !empty,
            b"br" if self.in_paragraph => self.push_text("\n"),
            _ => {}
        }
    }

    fn end(&mut self, local: &[u8]) {
        match local {
            b"txBody" => self.in_text_body = false,
            b"p" => self.in_paragraph = false,
            b"t" => self.in_run_text = false,
            _ => {}
        }
    }
}

/// Extract the direct children of `<p:spTree>` that are text shapes.
///
/// Group shapes, graphic frames and pictures are skipped along with
/// everything nested inside them.
fn extract_shapes_from_xml(xml_content: &str, part: &str) -> Result<Vec<ShapeText>> {
    let xml_error = |e: quick_xml::Error| ParseError::Xml {
        part: part.to_string(),
        source: Box::new(e),
    };

    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut depth = 0usize;
    let mut tree_depth: Option<usize> = None;
    let mut current: Option<OpenShape> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(ref e) => {
                depth += 1;
                let name = e.name();
                let local = local_name(name.as_ref());

                if let Some(shape) = current.as_mut() {
                    shape.start(e, false);
                } else if tree_depth.is_none() && local == b"spTree" {
                    tree_depth = Some(depth);
                } else if tree_depth.is_some_and(|tree| depth == tree + 1) && local == b"sp" {
                    current = Some(OpenShape::new(depth));
                }
            }
            Event::Empty(ref e) => {
                if let Some(shape) = current.as_mut() {
                    shape.start(e, true);
                }
            }
            Event::Text(ref e) => {
                if let Some(shape) = current.as_mut().filter(|s| s.in_run_text) {
                    let text = e.unescape().map_err(xml_error)?;
                    shape.push_text(&text);
                }
            }
            Event::CData(e) => {
                if let Some(shape) = current.as_mut().filter(|s| s.in_run_text) {
                    let raw = e.into_inner();
                    shape.push_text(&String::from_utf8_lossy(&raw));
                }
            }
            Event::End(ref e) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                if current.as_ref().is_some_and(|s| s.depth == depth) {
                    if let Some(open) = current.take() {
                        shapes.push(open.finish());
                    }
                } else if let Some(shape) = current.as_mut() {
                    shape.end(local);
                } else if tree_depth == Some(depth) {
                    tree_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

/// Map relationship ids to targets for every slide relationship.
fn parse_slide_relationships(xml_content: &str) -> Result<HashMap<String, String>> {
    let mut targets = HashMap::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut id = String::new();

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                        _ => {}
                    }
                }

                if rel_type.ends_with("/slide") {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ParseError::Xml {
                    part: PRESENTATION_RELS_PATH.to_string(),
                    source: Box::new(e),
                }
                .into());
            }
            _ => {}
        }
    }

    Ok(targets)
}

/// The relationship ids of `<p:sldId>` entries, in presentation order.
fn parse_slide_id_list(xml_content: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                // The bare `id` attribute is the numeric slide id; the
                // namespaced one (`r:id`) is the relationship we need.
                let rid = e.attributes().flatten().find_map(|attr| {
                    let key = attr.key.as_ref();
                    (key.contains(&b':') && local_name(key) == b"id")
                        .then(|| String::from_utf8_lossy(&attr.value).to_string())
                });
                match rid {
                    Some(rid) => ids.push(rid),
                    None => log::warn!("sldId without a relationship id, skipping"),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ParseError::Xml {
                    part: PRESENTATION_PATH.to_string(),
                    source: Box::new(e),
                }
                .into());
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Whether a `<p:ph>` element marks a title placeholder.
fn is_title_placeholder(e: &BytesStart) -> bool {
    e.attributes().flatten().any(|attr| {
        attr.key.as_ref() == b"type"
            && matches!(attr.value.as_ref(), b"title" | b"ctrTitle")
    })
}

/// Turn a relationship target into a part name inside the archive.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        format!("ppt/{}", target.trim_start_matches("./"))
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide_xml(shapes: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
            shapes
        )
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("/ppt/slides/slide2.xml"), "ppt/slides/slide2.xml");
        assert_eq!(resolve_target("./slides/slide3.xml"), "ppt/slides/slide3.xml");
    }

    #[test]
    fn test_paragraphs_runs_and_breaks() {
        let xml = slide_xml(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Body"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>Revenue </a:t></a:r><a:r><a:t>grew</a:t></a:r><a:br/><a:r><a:t>fast &amp; far</a:t></a:r></a:p><a:p/><a:p><a:r><a:t>Q4</a:t></a:r></a:p></p:txBody></p:sp>"#,
        );
        let shapes = extract_shapes_from_xml(&xml, "slide").unwrap();
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].has_text_frame);
        assert!(!shapes[0].is_title);
        assert_eq!(shapes[0].text, "Revenue grew\nfast & far\n\nQ4");
    }

    #[test]
    fn test_title_placeholder_detected() {
        let xml = slide_xml(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr><p:txBody><a:p><a:r><a:t>Welcome</a:t></a:r></a:p></p:txBody></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Subtitle 2"/><p:cNvSpPr/><p:nvPr><p:ph type="subTitle" idx="1"/></p:nvPr></p:nvSpPr><p:txBody><a:p><a:r><a:t>Intro</a:t></a:r></a:p></p:txBody></p:sp>"#,
        );
        let shapes = extract_shapes_from_xml(&xml, "slide").unwrap();
        assert_eq!(shapes.len(), 2);
        assert!(shapes[0].is_title);
        assert_eq!(shapes[0].text, "Welcome");
        assert!(!shapes[1].is_title);
    }

    #[test]
    fn test_group_contents_skipped() {
        let xml = slide_xml(
            r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="4" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="5" name="Inner"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:txBody><a:p><a:r><a:t>Hidden</a:t></a:r></a:p></p:txBody></p:sp></p:grpSp><p:sp><p:nvSpPr><p:cNvPr id="6" name="Outer"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:txBody><a:p><a:r><a:t>Visible</a:t></a:r></a:p></p:txBody></p:sp>"#,
        );
        let shapes = extract_shapes_from_xml(&xml, "slide").unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].text, "Visible");
    }

    #[test]
    fn test_shape_without_text_body() {
        let xml = slide_xml(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Rect"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#,
        );
        let shapes = extract_shapes_from_xml(&xml, "slide").unwrap();
        assert_eq!(shapes.len(), 1);
        assert!(!shapes[0].has_text_frame);
        assert_eq!(shapes[0].text, "");
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let err = extract_shapes_from_xml("<p:sld><p:cSld></p:sld>", "ppt/slides/slide1.xml").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Xml { .. })));
    }

    #[test]
    fn test_slide_id_list_uses_relationship_ids() {
        let xml = r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst></p:presentation>"#;
        assert_eq!(parse_slide_id_list(xml).unwrap(), vec!["rId3", "rId2"]);
    }

    #[test]
    fn test_only_slide_relationships_kept() {
        let xml = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/></Relationships>"#;
        let targets = parse_slide_relationships(xml).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets.get("rId2").map(String::as_str), Some("slides/slide1.xml"));
    }
}
