//! Serialize parsed blocks into a WordprocessingML (`.docx`) package.
//!
//! The package is assembled entirely in memory: the XML parts are built as
//! strings and zipped into a `Vec<u8>`, so the same bytes can be written to
//! disk by the CLI or streamed to the upload sink by the service.

use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::block::{Block, Span};

/// MIME type of the produced file.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Render blocks into the bytes of a complete `.docx` package.
pub fn render(blocks: &[Block]) -> Result<Vec<u8>> {
    let document = document_xml(blocks);
    let has_numbering = blocks
        .iter()
        .any(|block| matches!(block, Block::ListItem { .. }));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", opts)?;
    zip.write_all(content_types_xml(has_numbering).as_bytes())?;

    zip.start_file("_rels/.rels", opts)?;
    zip.write_all(RELS_XML.as_bytes())?;

    zip.start_file("word/document.xml", opts)?;
    zip.write_all(document.as_bytes())?;

    zip.start_file("word/styles.xml", opts)?;
    zip.write_all(STYLES_XML.as_bytes())?;

    if has_numbering {
        zip.start_file("word/numbering.xml", opts)?;
        zip.write_all(NUMBERING_XML.as_bytes())?;
    }

    zip.start_file("word/_rels/document.xml.rels", opts)?;
    zip.write_all(document_rels_xml(has_numbering).as_bytes())?;

    let cursor = zip.finish().context("finalize docx package")?;
    Ok(cursor.into_inner())
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn run_xml(text: &str, bold: bool, italic: bool) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = String::from("<w:r>");
    if bold || italic {
        out.push_str("<w:rPr>");
        if bold {
            out.push_str("<w:b/>");
        }
        if italic {
            out.push_str("<w:i/>");
        }
        out.push_str("</w:rPr>");
    }
    out.push_str("<w:t xml:space=\"preserve\">");
    out.push_str(&escape_xml(text));
    out.push_str("</w:t></w:r>");
    out
}

fn runs_xml(content: &[Span], out: &mut String) {
    for span in content {
        out.push_str(&run_xml(span.text(), span.bold(), span.italic()));
    }
}

fn heading_xml(level: u8, content: &[Span]) -> String {
    let mut out = String::from("<w:p><w:pPr>");
    out.push_str(&format!("<w:pStyle w:val=\"Heading{level}\"/>"));
    out.push_str("</w:pPr>");
    runs_xml(content, &mut out);
    out.push_str("</w:p>");
    out
}

fn paragraph_xml(content: &[Span]) -> String {
    let mut out = String::from("<w:p>");
    runs_xml(content, &mut out);
    out.push_str("</w:p>");
    out
}

fn list_item_xml(content: &[Span]) -> String {
    let mut out = String::from(
        "<w:p><w:pPr><w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"1\"/></w:numPr></w:pPr>",
    );
    runs_xml(content, &mut out);
    out.push_str("</w:p>");
    out
}

const PAGE_BREAK_XML: &str = "<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>";

fn cell_xml(text: &str, bold: bool, out: &mut String) {
    out.push_str("<w:tc><w:tcPr><w:tcW w:w=\"0\" w:type=\"auto\"/></w:tcPr><w:p>");
    out.push_str(&run_xml(text, bold, false));
    out.push_str("</w:p></w:tc>");
}

/// Emit one table. The parser forwards ragged rows untouched; this is the
/// layer that resolves them: every body row is padded or truncated to the
/// header width so the emitted grid is rectangular. Header cells are bold.
fn table_xml(headers: &[String], rows: &[Vec<String>]) -> String {
    let width = headers.len();
    if width == 0 {
        return String::new();
    }

    let mut out = String::from("<w:tbl><w:tblPr><w:tblW w:w=\"0\" w:type=\"auto\"/>");
    out.push_str(
        "<w:tblBorders>\
         <w:top w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:left w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:bottom w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:right w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:insideH w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:insideV w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         </w:tblBorders>",
    );
    out.push_str("</w:tblPr>");

    out.push_str("<w:tr>");
    for header in headers {
        cell_xml(header, true, &mut out);
    }
    out.push_str("</w:tr>");

    for row in rows {
        out.push_str("<w:tr>");
        for i in 0..width {
            let text = row.get(i).map(String::as_str).unwrap_or("");
            cell_xml(text, false, &mut out);
        }
        out.push_str("</w:tr>");
    }

    out.push_str("</w:tbl>");
    out
}

fn document_xml(blocks: &[Block]) -> String {
    let mut body = String::new();
    for block in blocks {
        match block {
            Block::Heading { level, content } => body.push_str(&heading_xml(*level, content)),
            Block::Paragraph { content } => body.push_str(&paragraph_xml(content)),
            Block::ListItem { content } => body.push_str(&list_item_xml(content)),
            Block::Table { headers, rows } => body.push_str(&table_xml(headers, rows)),
            Block::PageBreak => body.push_str(PAGE_BREAK_XML),
        }
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
 xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<w:body>{body}<w:sectPr>
<w:pgSz w:w="12240" w:h="15840"/>
<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>
<w:cols w:space="708"/>
</w:sectPr></w:body></w:document>"#
    )
}

fn content_types_xml(has_numbering: bool) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    out.push('\n');
    out.push_str(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    out.push('\n');
    out.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    out.push('\n');
    out.push_str(
        r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    );
    out.push('\n');
    out.push_str(
        r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
    );
    out.push('\n');
    if has_numbering {
        out.push_str(
            r#"<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#,
        );
        out.push('\n');
    }
    out.push_str("</Types>");
    out
}

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

fn document_rels_xml(has_numbering: bool) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    out.push('\n');
    out.push_str(
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    );
    out.push('\n');
    if has_numbering {
        out.push_str(
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>"#,
        );
        out.push('\n');
    }
    out.push_str("</Relationships>");
    out
}

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal">
<w:name w:val="Normal"/>
<w:qFormat/>
</w:style>
<w:style w:type="paragraph" w:styleId="Heading1">
<w:name w:val="heading 1"/>
<w:basedOn w:val="Normal"/>
<w:next w:val="Normal"/>
<w:qFormat/>
<w:pPr><w:keepNext/><w:spacing w:before="360" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr>
<w:rPr><w:b/><w:sz w:val="32"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Heading2">
<w:name w:val="heading 2"/>
<w:basedOn w:val="Normal"/>
<w:next w:val="Normal"/>
<w:qFormat/>
<w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="1"/></w:pPr>
<w:rPr><w:b/><w:sz w:val="28"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Heading3">
<w:name w:val="heading 3"/>
<w:basedOn w:val="Normal"/>
<w:next w:val="Normal"/>
<w:qFormat/>
<w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="2"/></w:pPr>
<w:rPr><w:b/><w:sz w:val="24"/></w:rPr>
</w:style>
</w:styles>"#;

const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:abstractNum w:abstractNumId="1">
<w:multiLevelType w:val="singleLevel"/>
<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl>
</w:abstractNum>
<w:num w:numId="1"><w:abstractNumId w:val="1"/></w:num>
</w:numbering>"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Span {
        Span::Text(value.to_string())
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn run_styles() {
        assert_eq!(
            run_xml("x", false, false),
            "<w:r><w:t xml:space=\"preserve\">x</w:t></w:r>"
        );
        assert_eq!(
            run_xml("x", true, false),
            "<w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">x</w:t></w:r>"
        );
        assert_eq!(
            run_xml("x", false, true),
            "<w:r><w:rPr><w:i/></w:rPr><w:t xml:space=\"preserve\">x</w:t></w:r>"
        );
        assert_eq!(
            run_xml("x", true, true),
            "<w:r><w:rPr><w:b/><w:i/></w:rPr><w:t xml:space=\"preserve\">x</w:t></w:r>"
        );
    }

    #[test]
    fn text_is_xml_escaped() {
        assert_eq!(escape_xml("a & b < c"), "a &amp; b &lt; c");
        assert!(run_xml("R&D", false, false).contains("R&amp;D"));
    }

    #[test]
    fn heading_uses_its_style() {
        assert_eq!(
            heading_xml(2, &[text("Scope")]),
            "<w:p><w:pPr><w:pStyle w:val=\"Heading2\"/></w:pPr>\
             <w:r><w:t xml:space=\"preserve\">Scope</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn list_item_carries_bullet_numbering() {
        let xml = list_item_xml(&[text("item")]);
        assert!(xml.contains("<w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"1\"/></w:numPr>"));
    }

    #[test]
    fn page_break_is_a_page_typed_break() {
        let xml = document_xml(&[Block::PageBreak]);
        assert!(xml.contains("<w:br w:type=\"page\"/>"));
        assert!(xml.contains("<w:sectPr>"));
    }

    #[test]
    fn header_row_is_bold_and_body_is_not() {
        let xml = table_xml(&strings(&["A"]), &[vec!["1".to_string()]]);
        let header_end = xml.find("</w:tr>").unwrap();
        assert!(xml[..header_end].contains("<w:b/>"));
        assert!(!xml[header_end..].contains("<w:b/>"));
    }

    #[test]
    fn ragged_rows_are_made_rectangular() {
        let xml = table_xml(
            &strings(&["A", "B"]),
            &[strings(&["1"]), strings(&["1", "2", "overflow"])],
        );
        assert_eq!(xml.matches("<w:tr>").count(), 3);
        assert_eq!(xml.matches("<w:tc>").count(), 6);
        assert!(!xml.contains("overflow"));
    }

    #[test]
    fn numbering_part_is_declared_only_for_lists() {
        assert!(content_types_xml(true).contains("numbering.xml"));
        assert!(!content_types_xml(false).contains("numbering.xml"));
        assert!(document_rels_xml(true).contains("numbering.xml"));
        assert!(!document_rels_xml(false).contains("numbering.xml"));
    }

    #[test]
    fn render_produces_a_zip_package() {
        let blocks = vec![
            Block::Heading {
                level: 1,
                content: vec![text("Title")],
            },
            Block::Paragraph {
                content: vec![text("body "), Span::Bold("bold".to_string())],
            },
            Block::ListItem {
                content: vec![text("item")],
            },
            Block::Table {
                headers: strings(&["A"]),
                rows: vec![strings(&["1"])],
            },
            Block::PageBreak,
        ];
        let bytes = render(&blocks).unwrap();
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }
}
