//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Cursor, Write};

use raven_factory::config::FactoryConfig;
use raven_factory::library::model::ModuleRecord;
use raven_factory::transform::{TransformError, TransformResult, Transformer};

/// Transformer that answers from a script keyed by file name and records
/// every call. Unscripted files get a well-formed module named after the file.
#[derive(Default)]
pub struct ScriptedTransformer {
    responses: HashMap<String, String>,
    pub calls: RefCell<Vec<String>>,
}

impl ScriptedTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `filename` with this raw model text.
    pub fn respond(mut self, filename: &str, raw: &str) -> Self {
        self.responses.insert(filename.to_string(), raw.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transformer for ScriptedTransformer {
    fn transform(&self, _text: &str, filename: &str) -> TransformResult<ModuleRecord> {
        self.calls.borrow_mut().push(filename.to_string());
        let raw = match self.responses.get(filename) {
            Some(raw) => raw.clone(),
            None => module_json(filename, &format!("Modül {filename}")),
        };
        ModuleRecord::from_json_str(&raw).map_err(|e| TransformError::ParseError {
            message: e.to_string(),
        })
    }
}

/// A schema-shaped module document.
pub fn module_json(filename: &str, title: &str) -> String {
    let id = filename.split('.').next().unwrap_or(filename);
    serde_json::json!({
        "meta": { "title": title, "tag": "FİZYOLOJİ" },
        "modules": {
            "id": id,
            "code": "AUTO-G",
            "title": title,
            "author": "RA'VEN AI",
            "tag": "FİZYOLOJİ",
            "class": "3",
            "block": "GENEL",
            "url": format!("modules/{id}.json"),
            "summary": { "text": "<div class='summary-container'>özet</div>" },
            "cases": [{
                "id": "c1", "title": "GÖREV 1", "desc": "...", "start": "s1",
                "scenes": { "s1": { "text": "...", "opts": [{ "txt": "A", "type": "correct", "go": "s2" }] } }
            }],
            "quiz": [{ "q": "Soru?", "a": ["A", "B"], "correct": 0 }],
            "match": [{ "A": "sol", "B": "sağ" }],
            "decypher": [{ "text": "KALP", "decoys": ["KAS"] }]
        }
    })
    .to_string()
}

/// Temp root with input and output directories created.
pub fn workspace() -> (tempfile::TempDir, FactoryConfig) {
    let dir = tempfile::TempDir::new().unwrap();
    let config = FactoryConfig::with_root(dir.path());
    config.ensure_dirs().unwrap();
    (dir, config)
}

/// Roughly `chars` characters of Turkish lecture text.
pub fn lecture_text(chars: usize) -> String {
    let sentence = "Kalp döngüsü sistol ve diyastol evrelerinden oluşur. ";
    sentence.chars().cycle().take(chars).collect()
}

/// Minimal .pptx with one text shape per slide.
pub fn build_deck(slides: &[&str]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);

    let mut ids = String::new();
    let mut rels = String::new();
    for (i, text) in slides.iter().enumerate() {
        let n = i + 1;
        ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{n}"/>"#, 255 + n));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{n}.xml"/>"#
        ));
        let slide = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr/><p:grpSpPr/><p:sp><p:nvSpPr/><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp><p:pic><p:nvPicPr/></p:pic></p:spTree></p:cSld></p:sld>"#
        );
        zip.start_file(format!("ppt/slides/slide{n}.xml"), opts).unwrap();
        zip.write_all(slide.as_bytes()).unwrap();
    }

    zip.start_file("ppt/presentation.xml", opts).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst>{ids}</p:sldIdLst></p:presentation>"#
        )
        .as_bytes(),
    )
    .unwrap();
    zip.start_file("ppt/_rels/presentation.xml.rels", opts).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
        )
        .as_bytes(),
    )
    .unwrap();

    zip.finish().unwrap().into_inner()
}
