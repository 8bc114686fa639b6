//! PPTX outline reader.
//!
//! Reads a presentation back into [`SlideRecord`]s: the title placeholder
//! becomes the title and every other non-empty paragraph becomes a bullet,
//! with a leading bullet glyph removed.

use crate::writer::BULLET_GLYPH;
use autodeck_core::{Error, Result, SlideRecord};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Reader for PPTX (Office Open XML) outlines.
pub struct PptxReader;

impl PptxReader {
    /// Create a new PPTX reader.
    pub fn new() -> Self {
        Self
    }

    /// Read every slide's title and bullets, in presentation order.
    pub fn read_outline<R: Read + Seek>(&self, reader: R) -> Result<Vec<SlideRecord>> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_paths = self.get_slide_order(&mut archive)?;
        log::debug!("Presentation lists {} slides", slide_paths.len());

        slide_paths
            .iter()
            .map(|path| {
                let content = self.read_file_from_archive(&mut archive, path)?;
                parse_slide_xml(&content)
            })
            .collect()
    }

    /// Count the slides listed in the presentation.
    pub fn slide_count<R: Read + Seek>(&self, reader: R) -> Result<usize> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;
        Ok(self.get_slide_order(&mut archive)?.len())
    }

    /// Resolve the slide list of presentation.xml to part paths.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels = self.read_file_from_archive(archive, "ppt/_rels/presentation.xml.rels")?;
        let targets = parse_relationships(&rels)?;

        let presentation = self.read_file_from_archive(archive, "ppt/presentation.xml")?;
        let mut reader = Reader::from_str(&presentation);
        reader.trim_text(true);

        let mut paths = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sldId" =>
                {
                    let rel_id = attribute(e, b"r:id").ok_or_else(|| {
                        Error::CorruptedFile("Slide entry without relationship ID".to_string())
                    })?;
                    let target = targets.get(&rel_id).ok_or_else(|| {
                        Error::CorruptedFile(format!("Unknown slide relationship '{}'", rel_id))
                    })?;
                    paths.push(resolve_target(target));
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!("Error parsing presentation.xml: {}", e)));
                }
                _ => {}
            }
        }

        Ok(paths)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Map relationship IDs to targets.
fn parse_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                if let (Some(id), Some(target)) = (attribute(e, b"Id"), attribute(e, b"Target")) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing relationships: {}", e)));
            }
            _ => {}
        }
    }

    Ok(targets)
}

/// Which placeholder a shape fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeRole {
    Title,
    Body,
}

/// Text paragraphs of a shape extracted from XML.
#[derive(Debug)]
struct ShapeInfo {
    role: ShapeRole,
    paragraphs: Vec<String>,
}

/// Extract the title and bullet paragraphs from one slide.
fn parse_slide_xml(xml: &str) -> Result<SlideRecord> {
    let mut reader = Reader::from_str(xml);

    let mut shapes: Vec<ShapeInfo> = Vec::new();
    let mut current: Option<ShapeInfo> = None;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    current = Some(ShapeInfo {
                        role: ShapeRole::Body,
                        paragraphs: Vec::new(),
                    });
                }
                b"ph" => mark_placeholder(&mut current, e),
                b"p" => {
                    if let Some(shape) = current.as_mut() {
                        shape.paragraphs.push(String::new());
                    }
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if local_name(e.name().as_ref()) == b"ph" {
                    mark_placeholder(&mut current, e);
                }
            }
            Ok(Event::Text(ref e)) if in_text => {
                let text = e.unescape().unwrap_or_default();
                if let Some(paragraph) = current.as_mut().and_then(|s| s.paragraphs.last_mut()) {
                    paragraph.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    if let Some(shape) = current.take() {
                        shapes.push(shape);
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing slide: {}", e)));
            }
            _ => {}
        }
    }

    let mut slide = SlideRecord::default();
    let mut has_title = false;

    for shape in shapes {
        if shape.role == ShapeRole::Title && !has_title {
            slide.title = shape.paragraphs.join(" ").trim().to_string();
            has_title = true;
            continue;
        }
        for paragraph in shape.paragraphs.into_iter().filter(|p| !p.is_empty()) {
            slide.add_bullet(strip_bullet(&paragraph));
        }
    }

    Ok(slide)
}

fn mark_placeholder(current: &mut Option<ShapeInfo>, e: &BytesStart) {
    if let Some(shape) = current.as_mut() {
        if matches!(attribute(e, b"type").as_deref(), Some("title") | Some("ctrTitle")) {
            shape.role = ShapeRole::Title;
        }
    }
}

/// Remove the bullet glyph and the space after it.
fn strip_bullet(paragraph: &str) -> String {
    match paragraph.strip_prefix(BULLET_GLYPH) {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest).to_string(),
        None => paragraph.to_string(),
    }
}

/// Value of attribute `key` on `e`, unescaped.
fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| {
            attr.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
        })
}

/// Turn a relationship target relative to `ppt/` into an archive path.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
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
