//! PPTX deck writer.
//!
//! Every slide uses the "Title and Content" layout: the title placeholder
//! holds the slide title verbatim and the content placeholder holds one
//! paragraph per bullet, each prefixed with [`BULLET_GLYPH`].

use crate::template::*;
use autodeck_core::{Deck, DeckRenderer, Error, Result, SlideRecord};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::{Cursor, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Glyph placed in front of every bullet line.
pub const BULLET_GLYPH: &str = "\u{2022}";

/// Name written to the document properties.
const APPLICATION: &str = "autodeck";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Writer for PPTX (Office Open XML) presentations.
#[derive(Debug, Clone, Default)]
pub struct PptxWriter;

impl PptxWriter {
    /// Create a new PPTX writer.
    pub fn new() -> Self {
        Self
    }

    /// Write `deck` as a complete presentation package to `writer`.
    pub fn write<W: Write + Seek>(&self, deck: &Deck, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let count = deck.len();

        add_part(&mut zip, "[Content_Types].xml", &content_types_xml(count)?)?;
        add_part(&mut zip, "_rels/.rels", &root_rels_xml()?)?;
        add_part(&mut zip, "docProps/core.xml", &core_props_xml(deck.title.as_deref())?)?;
        add_part(&mut zip, "docProps/app.xml", &app_props_xml(count)?)?;
        add_part(&mut zip, "ppt/presentation.xml", &presentation_xml(count)?)?;
        add_part(&mut zip, "ppt/_rels/presentation.xml.rels", &presentation_rels_xml(count)?)?;
        add_part(&mut zip, SLIDE_MASTER_PATH, SLIDE_MASTER_XML.as_bytes())?;
        add_part(&mut zip, SLIDE_MASTER_RELS_PATH, SLIDE_MASTER_RELS_XML.as_bytes())?;
        add_part(&mut zip, SLIDE_LAYOUT_PATH, SLIDE_LAYOUT_XML.as_bytes())?;
        add_part(&mut zip, SLIDE_LAYOUT_RELS_PATH, SLIDE_LAYOUT_RELS_XML.as_bytes())?;
        add_part(&mut zip, THEME_PATH, THEME_XML.as_bytes())?;

        for (idx, slide) in deck.slides.iter().enumerate() {
            let number = idx + 1;
            log::debug!("Writing slide {}: {}", number, slide.title);
            add_part(&mut zip, &format!("ppt/slides/slide{}.xml", number), &slide_xml(slide)?)?;
            add_part(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                SLIDE_RELS_XML.as_bytes(),
            )?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }
}

impl DeckRenderer for PptxWriter {
    fn render(&self, deck: &Deck) -> Result<Vec<u8>> {
        Ok(self.write(deck, Cursor::new(Vec::new()))?.into_inner())
    }
}

fn add_part<W: Write + Seek>(zip: &mut ZipWriter<W>, path: &str, content: &[u8]) -> Result<()> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(path, options)
        .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", path, e)))?;
    zip.write_all(content)
        .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", path, e)))?;
    Ok(())
}

/// Build one XML part with a standalone declaration.
fn xml_part<F>(build: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut XmlWriter) -> quick_xml::Result<()>,
{
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .and_then(|_| build(&mut writer))
        .map_err(|e| Error::XmlError(e.to_string()))?;
    Ok(writer.into_inner().into_inner())
}

/// Drop characters that XML 1.0 cannot represent.
fn xml_safe(text: &str) -> Cow<'_, str> {
    let valid = |c: char| {
        matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
    };
    if text.chars().all(valid) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| valid(c)).collect())
    }
}

fn relationship(w: &mut XmlWriter, id: &str, rel_type: &str, target: &str) -> quick_xml::Result<()> {
    w.create_element("Relationship")
        .with_attribute(("Id", id))
        .with_attribute(("Type", rel_type))
        .with_attribute(("Target", target))
        .write_empty()?;
    Ok(())
}

fn content_types_xml(slide_count: usize) -> Result<Vec<u8>> {
    let fixed = [
        ("/ppt/presentation.xml", CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml", CT_THEME),
        ("/docProps/core.xml", CT_CORE_PROPS),
        ("/docProps/app.xml", CT_EXTENDED_PROPS),
    ];

    xml_part(|w| {
        w.create_element("Types")
            .with_attribute(("xmlns", NS_CONTENT_TYPES))
            .write_inner_content::<_, quick_xml::Error>(|w| {
                w.create_element("Default")
                    .with_attribute(("Extension", "rels"))
                    .with_attribute(("ContentType", CT_RELATIONSHIPS))
                    .write_empty()?;
                w.create_element("Default")
                    .with_attribute(("Extension", "xml"))
                    .with_attribute(("ContentType", "application/xml"))
                    .write_empty()?;
                for (part, content_type) in fixed {
                    w.create_element("Override")
                        .with_attribute(("PartName", part))
                        .with_attribute(("ContentType", content_type))
                        .write_empty()?;
                }
                for number in 1..=slide_count {
                    let part = format!("/ppt/slides/slide{}.xml", number);
                    w.create_element("Override")
                        .with_attribute(("PartName", part.as_str()))
                        .with_attribute(("ContentType", CT_SLIDE))
                        .write_empty()?;
                }
                Ok(())
            })?;
        Ok(())
    })
}

fn root_rels_xml() -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("Relationships")
            .with_attribute(("xmlns", NS_PKG_RELS))
            .write_inner_content::<_, quick_xml::Error>(|w| {
                relationship(w, "rId1", REL_OFFICE_DOCUMENT, "ppt/presentation.xml")?;
                relationship(w, "rId2", REL_CORE_PROPS, "docProps/core.xml")?;
                relationship(w, "rId3", REL_EXTENDED_PROPS, "docProps/app.xml")
            })?;
        Ok(())
    })
}

fn core_props_xml(title: Option<&str>) -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("cp:coreProperties")
            .with_attribute((
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ))
            .with_attribute(("xmlns:dc", "http://purl.org/dc/elements/1.1/"))
            .with_attribute(("xmlns:dcterms", "http://purl.org/dc/terms/"))
            .with_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"))
            .write_inner_content::<_, quick_xml::Error>(|w| {
                if let Some(title) = title {
                    w.create_element("dc:title")
                        .write_text_content(BytesText::new(&xml_safe(title)))?;
                }
                w.create_element("dc:creator")
                    .write_text_content(BytesText::new(APPLICATION))?;
                Ok(())
            })?;
        Ok(())
    })
}

fn app_props_xml(slide_count: usize) -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("Properties")
            .with_attribute((
                "xmlns",
                "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
            ))
            .write_inner_content::<_, quick_xml::Error>(|w| {
                w.create_element("Application")
                    .write_text_content(BytesText::new(APPLICATION))?;
                w.create_element("Slides")
                    .write_text_content(BytesText::new(&slide_count.to_string()))?;
                Ok(())
            })?;
        Ok(())
    })
}

fn presentation_xml(slide_count: usize) -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("p:presentation")
            .with_attribute(("xmlns:a", NS_A))
            .with_attribute(("xmlns:r", NS_R))
            .with_attribute(("xmlns:p", NS_P))
            .write_inner_content::<_, quick_xml::Error>(|w| {
                w.create_element("p:sldMasterIdLst").write_inner_content::<_, quick_xml::Error>(|w| {
                    w.create_element("p:sldMasterId")
                        .with_attribute(("id", SLIDE_MASTER_ID.to_string().as_str()))
                        .with_attribute(("r:id", "rId1"))
                        .write_empty()?;
                    Ok(())
                })?;

                if slide_count > 0 {
                    w.create_element("p:sldIdLst").write_inner_content::<_, quick_xml::Error>(|w| {
                        for idx in 0..slide_count {
                            let id = (FIRST_SLIDE_ID as usize + idx).to_string();
                            let rel_id = slide_rel_id(idx);
                            w.create_element("p:sldId")
                                .with_attribute(("id", id.as_str()))
                                .with_attribute(("r:id", rel_id.as_str()))
                                .write_empty()?;
                        }
                        Ok(())
                    })?;
                }

                w.create_element("p:sldSz")
                    .with_attribute(("cx", SLIDE_WIDTH.to_string().as_str()))
                    .with_attribute(("cy", SLIDE_HEIGHT.to_string().as_str()))
                    .with_attribute(("type", "screen4x3"))
                    .write_empty()?;
                w.create_element("p:notesSz")
                    .with_attribute(("cx", SLIDE_HEIGHT.to_string().as_str()))
                    .with_attribute(("cy", SLIDE_WIDTH.to_string().as_str()))
                    .write_empty()?;
                Ok(())
            })?;
        Ok(())
    })
}

/// Relationship ID of slide `idx` (0-based) in presentation.xml.rels.
/// rId1 is the slide master; the theme follows the last slide.
fn slide_rel_id(idx: usize) -> String {
    format!("rId{}", idx + 2)
}

fn presentation_rels_xml(slide_count: usize) -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("Relationships")
            .with_attribute(("xmlns", NS_PKG_RELS))
            .write_inner_content::<_, quick_xml::Error>(|w| {
                relationship(w, "rId1", REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml")?;
                for idx in 0..slide_count {
                    let target = format!("slides/slide{}.xml", idx + 1);
                    relationship(w, &slide_rel_id(idx), REL_SLIDE, &target)?;
                }
                relationship(w, &slide_rel_id(slide_count), REL_THEME, "theme/theme1.xml")
            })?;
        Ok(())
    })
}

fn slide_xml(slide: &SlideRecord) -> Result<Vec<u8>> {
    xml_part(|w| {
        w.create_element("p:sld")
            .with_attribute(("xmlns:a", NS_A))
            .with_attribute(("xmlns:r", NS_R))
            .with_attribute(("xmlns:p", NS_P))
            .write_inner_content::<_, quick_xml::Error>(|w| {
                w.create_element("p:cSld").write_inner_content::<_, quick_xml::Error>(|w| {
                    w.create_element("p:spTree").write_inner_content::<_, quick_xml::Error>(|w| {
                        group_properties(w)?;
                        placeholder_shape(w, "2", "Title 1", Some("title"), None, |w| {
                            text_paragraph(w, &slide.title, false)
                        })?;
                        placeholder_shape(w, "3", "Content Placeholder 2", None, Some("1"), |w| {
                            if slide.bullets.is_empty() {
                                return empty_paragraph(w);
                            }
                            for bullet in &slide.bullets {
                                text_paragraph(w, &format!("{} {}", BULLET_GLYPH, bullet), true)?;
                            }
                            Ok(())
                        })
                    })?;
                    Ok(())
                })?;
                w.create_element("p:clrMapOvr").write_inner_content::<_, quick_xml::Error>(|w| {
                    w.create_element("a:masterClrMapping").write_empty()?;
                    Ok(())
                })?;
                Ok(())
            })?;
        Ok(())
    })
}

fn group_properties(w: &mut XmlWriter) -> quick_xml::Result<()> {
    w.create_element("p:nvGrpSpPr").write_inner_content::<_, quick_xml::Error>(|w| {
        w.create_element("p:cNvPr")
            .with_attribute(("id", "1"))
            .with_attribute(("name", ""))
            .write_empty()?;
        w.create_element("p:cNvGrpSpPr").write_empty()?;
        w.create_element("p:nvPr").write_empty()?;
        Ok(())
    })?;
    w.create_element("p:grpSpPr").write_empty()?;
    Ok(())
}

fn placeholder_shape<F>(
    w: &mut XmlWriter,
    id: &str,
    name: &str,
    ph_type: Option<&str>,
    ph_idx: Option<&str>,
    paragraphs: F,
) -> quick_xml::Result<()>
where
    F: Fn(&mut XmlWriter) -> quick_xml::Result<()>,
{
    w.create_element("p:sp").write_inner_content::<_, quick_xml::Error>(|w| {
        w.create_element("p:nvSpPr").write_inner_content::<_, quick_xml::Error>(|w| {
            w.create_element("p:cNvPr")
                .with_attribute(("id", id))
                .with_attribute(("name", name))
                .write_empty()?;
            w.create_element("p:cNvSpPr").write_inner_content::<_, quick_xml::Error>(|w| {
                w.create_element("a:spLocks")
                    .with_attribute(("noGrp", "1"))
                    .write_empty()?;
                Ok(())
            })?;
            w.create_element("p:nvPr").write_inner_content::<_, quick_xml::Error>(|w| {
                let mut ph = w.create_element("p:ph");
                if let Some(ph_type) = ph_type {
                    ph = ph.with_attribute(("type", ph_type));
                }
                if let Some(ph_idx) = ph_idx {
                    ph = ph.with_attribute(("idx", ph_idx));
                }
                ph.write_empty()?;
                Ok(())
            })?;
            Ok(())
        })?;
        w.create_element("p:spPr").write_empty()?;
        w.create_element("p:txBody").write_inner_content::<_, quick_xml::Error>(|w| {
            w.create_element("a:bodyPr").write_empty()?;
            w.create_element("a:lstStyle").write_empty()?;
            paragraphs(w)
        })?;
        Ok(())
    })?;
    Ok(())
}

/// A paragraph with a single run. Bullet paragraphs switch off the
/// layout's own bullets since the glyph is part of the text.
fn text_paragraph(w: &mut XmlWriter, text: &str, bullet: bool) -> quick_xml::Result<()> {
    if text.is_empty() {
        return empty_paragraph(w);
    }
    w.create_element("a:p").write_inner_content::<_, quick_xml::Error>(|w| {
        if bullet {
            w.create_element("a:pPr")
                .with_attribute(("marL", "0"))
                .with_attribute(("indent", "0"))
                .write_inner_content::<_, quick_xml::Error>(|w| {
                    w.create_element("a:buNone").write_empty()?;
                    Ok(())
                })?;
        }
        w.create_element("a:r").write_inner_content::<_, quick_xml::Error>(|w| {
            w.create_element("a:rPr")
                .with_attribute(("lang", "en-US"))
                .with_attribute(("dirty", "0"))
                .write_empty()?;
            w.create_element("a:t")
                .write_text_content(BytesText::new(&xml_safe(text)))?;
            Ok(())
        })?;
        Ok(())
    })?;
    Ok(())
}

fn empty_paragraph(w: &mut XmlWriter) -> quick_xml::Result<()> {
    w.create_element("a:p").write_inner_content::<_, quick_xml::Error>(|w| {
        w.create_element("a:endParaRPr")
            .with_attribute(("lang", "en-US"))
            .write_empty()?;
        Ok(())
    })?;
    Ok(())
}
