//! Slide-deck (PPTX) extractor using `zip` + `quick-xml`.
//!
//! A deck is a zip of XML parts. Slides are visited in presentation order
//! (`ppt/presentation.xml` → `ppt/_rels/presentation.xml.rels`), falling back
//! to `ppt/slides/slideN.xml` numbering when those parts are missing. Every
//! top-level shape that carries a text body contributes its paragraphs joined
//! by newlines, followed by a newline.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::library::error::{LibraryError, LibraryResult};
use crate::library::model::ContentFormat;
use crate::library::parser::ContentExtractor;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";
const SLIDE_REL_TYPE_SUFFIX: &str = "/relationships/slide";

/// Slide-deck text extractor.
pub struct PptxExtractor;

/// Structural problems inside the deck package.
#[derive(Debug, Error)]
enum DeckError {
    #[error("zip container: {0}")]
    Zip(#[from] ZipError),
    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute: {0}")]
    Attr(#[from] AttrError),
    #[error("read part: {0}")]
    Io(#[from] std::io::Error),
    #[error("slide part \"{0}\" referenced but missing")]
    MissingSlide(String),
}

type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

impl ContentExtractor for PptxExtractor {
    fn format(&self) -> ContentFormat {
        ContentFormat::SlideDeck
    }

    fn extract(&self, data: &[u8], origin: &str) -> LibraryResult<String> {
        extract_deck(data).map_err(|e| LibraryError::ParseError {
            format: "pptx".into(),
            path: origin.into(),
            message: e.to_string(),
        })
    }
}

fn extract_deck(data: &[u8]) -> Result<String, DeckError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let mut text = String::new();
    for part in slide_parts(&mut archive)? {
        let xml = read_part(&mut archive, &part)?.ok_or(DeckError::MissingSlide(part))?;
        text.push_str(&slide_text(&xml)?);
    }
    Ok(text)
}

/// Slide part names in presentation order.
fn slide_parts(archive: &mut Archive<'_>) -> Result<Vec<String>, DeckError> {
    let presentation = read_part(archive, PRESENTATION_PART)?;
    let rels = read_part(archive, PRESENTATION_RELS_PART)?;

    if let (Some(presentation), Some(rels)) = (presentation, rels) {
        let targets = slide_relationships(&rels)?;
        let ordered: Vec<String> = presentation_order(&presentation)?
            .iter()
            .filter_map(|rid| targets.get(rid))
            .map(|target| resolve_target(target))
            .collect();
        if !ordered.is_empty() {
            return Ok(ordered);
        }
    }

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    Ok(numbered_slides(&names))
}

fn read_part(archive: &mut Archive<'_>, name: &str) -> Result<Option<String>, DeckError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(Some(xml))
}

/// Relationship ids of `<p:sldId r:id="…"/>` in document order.
fn presentation_order(xml: &str) -> Result<Vec<String>, DeckError> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                for attr in e.attributes() {
                    let attr = attr?;
                    // `id` alone is the numeric slide id; the relationship id is `r:id`.
                    if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
                        ids.push(attr.unescape_value()?.into_owned());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(ids)
}

/// Map of relationship id → target for slide relationships.
fn slide_relationships(xml: &str) -> Result<HashMap<String, String>, DeckError> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                let mut is_slide = false;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr.unescape_value()?.into_owned()),
                        b"Target" => target = Some(attr.unescape_value()?.into_owned()),
                        b"Type" => {
                            is_slide = attr.unescape_value()?.ends_with(SLIDE_REL_TYPE_SUFFIX)
                        }
                        _ => {}
                    }
                }
                if let (true, Some(id), Some(target)) = (is_slide, id, target) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(targets)
}

/// Relationship targets are relative to `ppt/` unless absolute within the package.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target.trim_start_matches("./")),
    }
}

fn numbered_slides(names: &[String]) -> Vec<String> {
    let mut slides: Vec<(u32, &String)> = names
        .iter()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);
    slides.into_iter().map(|(_, name)| name.clone()).collect()
}

#[derive(Default)]
struct ShapeText {
    has_body: bool,
    paragraphs: Vec<String>,
}

/// Text of one slide: each top-level text shape's paragraphs joined by `\n`,
/// followed by `\n`. Shapes inside group shapes and tables are not visited.
fn slide_text(xml: &str) -> Result<String, DeckError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut group_depth = 0usize;
    let mut shape: Option<ShapeText> = None;
    let mut paragraph: Option<String> = None;
    let mut in_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"grpSp" => group_depth += 1,
                b"sp" if group_depth == 0 => shape = Some(ShapeText::default()),
                b"txBody" => {
                    if let Some(s) = shape.as_mut() {
                        s.has_body = true;
                    }
                }
                b"p" if shape.as_ref().is_some_and(|s| s.has_body) => {
                    paragraph = Some(String::new())
                }
                b"t" if paragraph.is_some() => in_run = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"br" => {
                    if let Some(p) = paragraph.as_mut() {
                        p.push('\n');
                    }
                }
                b"txBody" => {
                    if let Some(s) = shape.as_mut() {
                        s.has_body = true;
                    }
                }
                b"p" => {
                    if let Some(s) = shape.as_mut().filter(|s| s.has_body) {
                        s.paragraphs.push(String::new());
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_run => {
                if let Some(p) = paragraph.as_mut() {
                    p.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_run = false,
                b"p" => {
                    if let (Some(s), Some(p)) = (shape.as_mut(), paragraph.take()) {
                        s.paragraphs.push(p);
                    }
                }
                b"sp" if group_depth == 0 => {
                    if let Some(s) = shape.take().filter(|s| s.has_body) {
                        out.push_str(&s.paragraphs.join("\n"));
                        out.push('\n');
                    }
                }
                b"grpSp" => group_depth = group_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}
