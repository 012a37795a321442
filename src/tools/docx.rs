//! Minimal WordprocessingML (.docx) writer.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::DocumentError;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

// US Letter, 1 inch margins
const DOCUMENT_TAIL: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

#[derive(Debug, Clone, Default)]
pub struct Document {
    paragraphs: Vec<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a paragraph. Newlines become line breaks and tabs become tabs
    /// inside the same paragraph.
    pub fn add_paragraph(&mut self, text: impl Into<String>) -> &mut Self {
        self.paragraphs.push(text.into());
        self
    }

    /// Serialize the package into an in-memory buffer.
    pub fn save(&self) -> Result<Vec<u8>, DocumentError> {
        let body = self.document_xml()?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES_XML.as_bytes())?;
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(RELS_XML.as_bytes())?;
        zip.start_file("word/document.xml", options)?;
        zip.write_all(body.as_bytes())?;

        Ok(zip.finish()?.into_inner())
    }

    fn document_xml(&self) -> Result<String, DocumentError> {
        let mut xml = String::from(DOCUMENT_HEAD);
        for paragraph in &self.paragraphs {
            xml.push_str("<w:p>");
            if !paragraph.is_empty() {
                xml.push_str("<w:r>");
                push_run_content(&mut xml, paragraph)?;
                xml.push_str("</w:r>");
            }
            xml.push_str("</w:p>");
        }
        xml.push_str(DOCUMENT_TAIL);
        Ok(xml)
    }
}

fn push_run_content(xml: &mut String, text: &str) -> Result<(), DocumentError> {
    let mut pending = String::new();
    for c in text.chars() {
        match c {
            '\n' | '\r' => {
                flush_text(xml, &mut pending);
                xml.push_str("<w:br/>");
            }
            '\t' => {
                flush_text(xml, &mut pending);
                xml.push_str("<w:tab/>");
            }
            '&' => pending.push_str("&amp;"),
            '<' => pending.push_str("&lt;"),
            '>' => pending.push_str("&gt;"),
            '"' => pending.push_str("&quot;"),
            c if is_xml_char(c) => pending.push(c),
            c => return Err(DocumentError::InvalidCharacter(c)),
        }
    }
    flush_text(xml, &mut pending);
    Ok(())
}

fn flush_text(xml: &mut String, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    xml.push_str(r#"<w:t xml:space="preserve">"#);
    xml.push_str(pending);
    xml.push_str("</w:t>");
    pending.clear();
}

/// XML 1.0 `Char` production, minus the whitespace handled above.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn package_has_the_required_parts() {
        let mut doc = Document::new();
        doc.add_paragraph("Hello");
        let bytes = doc.save().unwrap();

        assert!(bytes.starts_with(b"PK"));
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"[Content_Types].xml"));
        assert!(names.contains(&"_rels/.rels"));
        assert!(names.contains(&"word/document.xml"));
    }

    #[test]
    fn single_paragraph_holds_the_text() {
        let mut doc = Document::new();
        doc.add_paragraph("Hello");
        let xml = part(&doc.save().unwrap(), "word/document.xml");

        assert_eq!(xml.matches("<w:p>").count(), 1);
        assert!(xml.contains(r#"<w:t xml:space="preserve">Hello</w:t>"#));
    }

    #[test]
    fn markup_is_escaped_and_breaks_are_preserved() {
        let mut doc = Document::new();
        doc.add_paragraph("SUBJECT: R&D <draft>\n\tBody");
        let xml = part(&doc.save().unwrap(), "word/document.xml");

        assert!(xml.contains("SUBJECT: R&amp;D &lt;draft&gt;</w:t><w:br/><w:tab/>"));
        assert_eq!(xml.matches("<w:p>").count(), 1);
    }

    #[test]
    fn empty_body_is_an_empty_paragraph() {
        let mut doc = Document::new();
        doc.add_paragraph("");
        let xml = part(&doc.save().unwrap(), "word/document.xml");
        assert!(xml.contains("<w:p></w:p>"));
    }

    #[test]
    fn control_characters_are_rejected() {
        let mut doc = Document::new();
        doc.add_paragraph("bell\u{7}");
        assert!(matches!(
            doc.save(),
            Err(DocumentError::InvalidCharacter('\u{7}'))
        ));
    }
}
