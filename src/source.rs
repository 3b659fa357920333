use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use tracing::info;

use crate::error::{ConvertError, Result};

const DOCUMENT_PART: &str = "word/document.xml";

/// Where paragraphs come from, picked by file extension.
#[derive(Debug, Clone)]
pub enum Source {
    Docx(PathBuf),
    Text(PathBuf),
}

impl Source {
    pub fn from_path(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Err(ConvertError::UnsupportedInput(path.to_path_buf()));
        }
        let is_docx = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
        Ok(if is_docx {
            Source::Docx(path.to_path_buf())
        } else {
            Source::Text(path.to_path_buf())
        })
    }

    pub fn path(&self) -> &Path {
        match self {
            Source::Docx(p) | Source::Text(p) => p,
        }
    }

    /// Every paragraph in document order, untrimmed, empties included.
    pub fn paragraphs(&self) -> Result<Vec<String>> {
        let paragraphs = match self {
            Source::Docx(path) => read_docx(path)?,
            Source::Text(path) => split_lines(&std::fs::read_to_string(path)?),
        };
        info!(path = %self.path().display(), paragraphs = paragraphs.len(), "Loaded document");
        Ok(paragraphs)
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

fn read_docx(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
    parse_document_xml(&xml)
}

/// Body-level `w:p` paragraphs of a WordprocessingML document part.
/// Paragraphs nested in tables or text boxes are skipped.
pub fn parse_document_xml(xml: &str) -> Result<Vec<String>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut nested = 0usize;
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => nested += 1,
                b"w:p" if nested == 0 => current = Some(String::new()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:p" if nested == 0 => paragraphs.push(String::new()),
                b"w:tab" => push_char(&mut current, '\t'),
                b"w:br" | b"w:cr" => push_char(&mut current, '\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                if let Some(p) = current.as_mut() {
                    p.push_str(&e.unescape()?);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => nested = nested.saturating_sub(1),
                b"w:p" if nested == 0 => {
                    if let Some(p) = current.take() {
                        paragraphs.push(p);
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(paragraphs)
}

fn push_char(current: &mut Option<String>, c: char) {
    if let Some(p) = current.as_mut() {
        p.push(c);
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:r><w:t>Accession Records</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t xml:space="preserve">Number </w:t></w:r><w:r><w:t>84-1-A</w:t></w:r></w:p>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell text</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
<w:p><w:r><w:t>Donor:</w:t><w:tab/><w:t>Smith &amp; Sons</w:t></w:r></w:p>
<w:p><w:r><w:t>line one</w:t><w:br/><w:t>line two</w:t></w:r></w:p>
</w:body>
</w:document>"#;

    #[test]
    fn body_paragraphs_in_order() {
        let paragraphs = parse_document_xml(DOC).unwrap();
        assert_eq!(
            paragraphs,
            vec![
                "Accession Records".to_string(),
                String::new(),
                "Number 84-1-A".to_string(),
                "Donor:\tSmith & Sons".to_string(),
                "line one\nline two".to_string(),
            ]
        );
    }

    #[test]
    fn reads_docx_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accessions.docx");
        {
            let file = File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file(DOCUMENT_PART, options).unwrap();
            zip.write_all(DOC.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        let source = Source::from_path(&path).unwrap();
        assert!(matches!(source, Source::Docx(_)));
        let paragraphs = source.paragraphs().unwrap();
        assert_eq!(paragraphs.len(), 5);
        assert_eq!(paragraphs[2], "Number 84-1-A");
    }

    #[test]
    fn docx_without_document_part_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        {
            let file = File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            zip.start_file("other.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"<x/>").unwrap();
            zip.finish().unwrap();
        }
        let err = Source::from_path(&path).unwrap().paragraphs().unwrap_err();
        assert!(matches!(err, ConvertError::Archive(_)));
    }

    #[test]
    fn text_source_keeps_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accessions.txt");
        std::fs::write(&path, "Number 84-1-A\r\n\r\n  Donor: X  \n").unwrap();
        let paragraphs = Source::from_path(&path).unwrap().paragraphs().unwrap();
        assert_eq!(paragraphs, vec!["Number 84-1-A", "", "  Donor: X  ", ""]);
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Source::from_path(dir.path()),
            Err(ConvertError::UnsupportedInput(_))
        ));
    }
}
