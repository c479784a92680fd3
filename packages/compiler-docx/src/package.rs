//! Archive-backed WordprocessingML package (`.docx`)
//!
//! Parts are written in a fixed order: content types, package
//! relationships, core and app properties, document relationships,
//! settings, then the main document.

use crate::escape::escape_xml;
use chrono::{DateTime, SecondsFormat, Utc};
use redline_revisions::DocumentMetadata;
use std::fs;
use std::io::{Seek, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const WORDPROCESSING_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = concat!(
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>"#,
    r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
    r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
    r#"</Types>"#,
);

const PACKAGE_RELS: &str = concat!(
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>"#,
    r#"</Relationships>"#,
);

const DOCUMENT_RELS: &str = concat!(
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/>"#,
    r#"</Relationships>"#,
);

const APP_PROPERTIES: &str = concat!(
    r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
    r#"<Application>Redline</Application>"#,
    r#"</Properties>"#,
);

/// US Letter, one inch margins
const SECTION_PROPERTIES: &str = concat!(
    r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/>"#,
    r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/>"#,
    r#"</w:sectPr>"#,
);

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Core document properties (`docProps/core.xml`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub subject: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl CoreProperties {
    /// Properties from batch metadata, created and modified now
    pub fn from_metadata(metadata: &DocumentMetadata) -> Self {
        let now = Utc::now();
        Self {
            title: metadata.title.clone(),
            creator: metadata.author.as_ref().map(|author| author.joined()),
            subject: metadata.subject.clone(),
            created: now,
            modified: now,
        }
    }
}

/// Document-level settings (`word/settings.xml`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentSettings {
    pub track_revisions: bool,
    pub suppress_convert_prompt: bool,
    /// Twips
    pub default_tab_stop: u32,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            track_revisions: true,
            suppress_convert_prompt: true,
            default_tab_stop: 708,
        }
    }
}

pub struct DocumentPackage {
    properties: CoreProperties,
    settings: DocumentSettings,
    body: String,
}

impl DocumentPackage {
    pub fn new(properties: CoreProperties, settings: DocumentSettings) -> Self {
        Self {
            properties,
            settings,
            body: String::new(),
        }
    }

    /// Paragraph elements to place inside `w:body`
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Write the whole package and hand the writer back
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W, PackageError> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("docProps/core.xml", self.core_xml()),
            ("docProps/app.xml", APP_PROPERTIES.to_string()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
            ("word/settings.xml", self.settings_xml()),
            ("word/document.xml", self.document_xml()),
        ];

        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(XML_DECLARATION.as_bytes())?;
            zip.write_all(content.as_bytes())?;
        }

        Ok(zip.finish()?)
    }

    /// Save to `path`, creating its parent directories
    pub fn save(&self, path: &Path) -> Result<(), PackageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        self.write_to(file)?;
        info!(path = %path.display(), "saved document package");
        Ok(())
    }

    fn core_xml(&self) -> String {
        let props = &self.properties;
        let mut out = String::from(concat!(
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties""#,
            r#" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/""#,
            r#" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        ));

        for (element, value) in [
            ("dc:title", &props.title),
            ("dc:subject", &props.subject),
            ("dc:creator", &props.creator),
        ] {
            if let Some(value) = value {
                out.push_str(&format!("<{element}>{}</{element}>", escape_xml(value)));
            }
        }

        for (element, value) in [("dcterms:created", props.created), ("dcterms:modified", props.modified)] {
            out.push_str(&format!(
                "<{element} xsi:type=\"dcterms:W3CDTF\">{}</{element}>",
                value.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }

        out.push_str("</cp:coreProperties>");
        out
    }

    fn settings_xml(&self) -> String {
        let mut out = format!(r#"<w:settings xmlns:w="{WORDPROCESSING_NS}">"#);
        if self.settings.track_revisions {
            out.push_str(r#"<w:trackRevisions w:val="1"/>"#);
        }
        if self.settings.suppress_convert_prompt {
            out.push_str(r#"<w:doNotPromptForConvert w:val="1"/>"#);
        }
        out.push_str(&format!(
            r#"<w:defaultTabStop w:val="{}"/>"#,
            self.settings.default_tab_stop
        ));
        out.push_str("</w:settings>");
        out
    }

    fn document_xml(&self) -> String {
        format!(
            r#"<w:document xmlns:w="{WORDPROCESSING_NS}"><w:body>{}{SECTION_PROPERTIES}</w:body></w:document>"#,
            self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_revisions::Authors;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn read_part(bytes: Vec<u8>, name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    fn package(metadata: &DocumentMetadata) -> DocumentPackage {
        DocumentPackage::new(
            CoreProperties::from_metadata(metadata),
            DocumentSettings::default(),
        )
    }

    #[test]
    fn test_package_contains_every_part() {
        let bytes = package(&DocumentMetadata::default())
            .write_to(Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();

        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "docProps/app.xml",
            "word/_rels/document.xml.rels",
            "word/settings.xml",
            "word/document.xml",
        ] {
            assert!(names.contains(&part), "missing {part}");
        }
    }

    #[test]
    fn test_settings_enable_tracking() {
        let bytes = package(&DocumentMetadata::default())
            .write_to(Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();

        let settings = read_part(bytes, "word/settings.xml");
        assert!(settings.contains(r#"<w:trackRevisions w:val="1"/>"#));
        assert!(settings.contains(r#"<w:doNotPromptForConvert w:val="1"/>"#));
        assert!(settings.contains(r#"<w:defaultTabStop w:val="708"/>"#));
    }

    #[test]
    fn test_settings_can_be_turned_off() {
        let settings = DocumentSettings {
            track_revisions: false,
            suppress_convert_prompt: false,
            default_tab_stop: 720,
        };
        let bytes = DocumentPackage::new(CoreProperties::from_metadata(&DocumentMetadata::default()), settings)
            .write_to(Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();

        let xml = read_part(bytes, "word/settings.xml");
        assert!(!xml.contains("trackRevisions"));
        assert!(!xml.contains("doNotPromptForConvert"));
        assert!(xml.contains(r#"w:val="720""#));
    }

    #[test]
    fn test_core_properties_are_escaped_and_joined() {
        let metadata = DocumentMetadata {
            title: Some("Draft <1> & notes".to_string()),
            author: Some(Authors::Many(vec!["Ann".to_string(), "Bo".to_string()])),
            subject: None,
        };
        let bytes = package(&metadata)
            .write_to(Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();

        let core = read_part(bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>Draft &lt;1&gt; &amp; notes</dc:title>"));
        assert!(core.contains("<dc:creator>Ann, Bo</dc:creator>"));
        assert!(!core.contains("dc:subject"));
        assert!(core.contains(r#"<dcterms:created xsi:type="dcterms:W3CDTF">"#));
    }

    #[test]
    fn test_document_wraps_body() {
        let mut pkg = package(&DocumentMetadata::default());
        pkg.set_body("<w:p><w:r><w:t>Hi</w:t></w:r></w:p>");
        let bytes = pkg.write_to(Cursor::new(Vec::new())).unwrap().into_inner();

        let document = read_part(bytes, "word/document.xml");
        assert!(document.starts_with(XML_DECLARATION));
        assert!(document.contains("<w:body><w:p><w:r><w:t>Hi</w:t></w:r></w:p><w:sectPr>"));
        assert!(document.ends_with("</w:body></w:document>"));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("nested").join("doc.docx");

        package(&DocumentMetadata::default()).save(&path).unwrap();
        assert!(path.exists());
    }
}
