//! Per-format text parsers for PDF, Word and plain text

use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::DocumentFormat;

use super::encoding::decode_text;

/// Separator between pages and paragraphs
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Glyph names some PDF fonts leak into extracted text
const GLYPH_NAMES: &[(&str, char)] = &[
    // Hyphens and dashes
    ("uni2010", '\u{2010}'),
    ("uni2011", '\u{2011}'),
    ("uni2013", '\u{2013}'),
    ("uni2014", '\u{2014}'),
    // Quotation marks
    ("uni2018", '\u{2018}'),
    ("uni2019", '\u{2019}'),
    ("uni201C", '\u{201C}'),
    ("uni201D", '\u{201D}'),
    // Bullets and symbols
    ("uni2022", '\u{2022}'),
    ("uni2026", '\u{2026}'),
    ("uni00A0", '\u{00A0}'),
    // Ligatures
    ("f_i", '\u{FB01}'),
    ("f_l", '\u{FB02}'),
    ("f_f", '\u{FB00}'),
    ("f_f_i", '\u{FB03}'),
    ("f_f_l", '\u{FB04}'),
];

/// Typographic characters replaced with ASCII approximations
const ASCII_APPROXIMATIONS: &[(char, &str)] = &[
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "--"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2022}', "* "),
    ('\u{2026}', "..."),
    ('\u{00A0}', " "),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB00}', "ff"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\0', ""),
];

/// Clean up PDF text: resolve leaked glyph names, flatten typography, drop blank lines
pub fn cleanup_pdf_text(text: &str) -> String {
    let mut result = text.to_string();

    for (glyph_name, value) in GLYPH_NAMES {
        for pattern in [format!("({})", glyph_name), format!("<{}>", glyph_name)] {
            if result.contains(&pattern) {
                result = result.replace(&pattern, &value.to_string());
            }
        }
        if glyph_name.starts_with("uni") && result.contains(glyph_name) {
            result = result.replace(glyph_name, &value.to_string());
        }
    }

    for (from, to) in ASCII_APPROXIMATIONS {
        if result.contains(*from) {
            result = result.replace(*from, to);
        }
    }

    result
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format-specific parsing of raw file bytes into plain text.
///
/// Parsers assume non-empty input; callers handle zero-byte files.
pub struct FileParser;

impl FileParser {
    /// Parse file contents according to its format
    pub fn parse(
        format: DocumentFormat,
        filename: &str,
        data: &[u8],
        pdf_timeout: Duration,
    ) -> Result<String> {
        match format {
            DocumentFormat::Pdf => Self::parse_pdf(filename, data, pdf_timeout),
            DocumentFormat::Docx => Self::parse_docx(filename, data),
            DocumentFormat::Text => Self::parse_text(filename, data),
        }
    }

    /// Parse a PDF page by page, skipping pages without text
    fn parse_pdf(filename: &str, data: &[u8], timeout: Duration) -> Result<String> {
        let doc = match lopdf::Document::load_mem(data) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("lopdf could not load {}: {}, trying pdf-extract", filename, e);
                return Self::extract_pdf_with_timeout(filename, data, timeout);
            }
        };

        let pages = doc.get_pages();
        if pages.is_empty() {
            tracing::warn!("PDF has no pages: {}", filename);
            return Ok(String::new());
        }

        let mut page_texts = Vec::new();
        for &page_number in pages.keys() {
            match doc.extract_text(&[page_number]) {
                Ok(text) => {
                    let text = cleanup_pdf_text(&text);
                    if text.is_empty() {
                        tracing::debug!("Page {} of {} has no text", page_number, filename);
                    } else {
                        page_texts.push(text);
                    }
                }
                Err(e) => {
                    tracing::debug!("Could not extract page {} of {}: {}", page_number, filename, e);
                }
            }
        }

        if page_texts.is_empty() {
            tracing::debug!(
                "Per-page extraction of {} yielded nothing across {} pages, trying pdf-extract",
                filename,
                pages.len()
            );
            // The document itself loaded fine, so a failed fallback means no text
            return Self::extract_pdf_with_timeout(filename, data, timeout).or_else(|e| {
                tracing::warn!("No text found in {}: {}", filename, e);
                Ok(String::new())
            });
        }

        tracing::debug!("Extracted {}/{} pages from {}", page_texts.len(), pages.len(), filename);
        Ok(page_texts.join(BLOCK_SEPARATOR))
    }

    /// Whole-document extraction through pdf-extract on a worker thread.
    ///
    /// pdf-extract can hang on fonts it does not understand; the thread is
    /// abandoned when the timeout elapses.
    fn extract_pdf_with_timeout(filename: &str, data: &[u8], timeout: Duration) -> Result<String> {
        use std::sync::mpsc;
        use std::thread;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(Ok(text)) => Ok(text
                .split("\u{c}")
                .map(cleanup_pdf_text)
                .filter(|page| !page.is_empty())
                .collect::<Vec<_>>()
                .join(BLOCK_SEPARATOR)),
            Ok(Err(e)) => Err(Error::file_parse(filename, format!("pdf-extract failed: {}", e))),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::file_parse(
                filename,
                format!("PDF extraction timed out after {}s", timeout.as_secs()),
            )),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(Error::file_parse(filename, "PDF extraction thread crashed"))
            }
        }
    }

    /// Parse a DOCX document, keeping non-blank paragraphs
    fn parse_docx(filename: &str, data: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(data).map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut paragraphs = Vec::new();
        for child in doc.document.children {
            // Tables are not part of the paragraph text
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut text = String::new();
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
                if !text.trim().is_empty() {
                    paragraphs.push(text);
                }
            }
        }

        Ok(paragraphs.join(BLOCK_SEPARATOR))
    }

    /// Parse plain text through the encoding fallback ladder
    fn parse_text(filename: &str, data: &[u8]) -> Result<String> {
        let decoded = decode_text(data).ok_or_else(|| Error::Encoding(filename.to_string()))?;

        if decoded.text.trim().is_empty() {
            tracing::warn!("Empty text content: {}", filename);
            return Ok(String::new());
        }

        tracing::debug!("Decoded {} as {}", filename, decoded.encoding.label());
        Ok(decoded.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// One page per entry; empty strings become pages without text operators
    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_parse_pdf_joins_pages_and_skips_empty_ones() {
        let data = build_pdf(&["Page one", "", "Page two"]);
        let text = FileParser::parse(DocumentFormat::Pdf, "report.pdf", &data, Duration::from_secs(5))
            .unwrap();
        assert_eq!(text, "Page one\n\nPage two");
    }

    #[test]
    fn test_parse_pdf_without_pages_is_empty() {
        let data = build_pdf(&[]);
        let text = FileParser::parse(DocumentFormat::Pdf, "blank.pdf", &data, Duration::from_secs(5))
            .unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_cleanup_pdf_text() {
        let raw = "  The \u{FB01}rst line\u{2014}dash  \n\n\0\n (uni2019)quoted\u{2026} ";
        assert_eq!(cleanup_pdf_text(raw), "The first line--dash\n'quoted...");
    }

    #[test]
    fn test_parse_text_whitespace_only_is_empty() {
        let text = FileParser::parse(
            DocumentFormat::Text,
            "blank.txt",
            b" \n\t\n",
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_parse_text_latin1() {
        let text = FileParser::parse(
            DocumentFormat::Text,
            "legacy.txt",
            b"Se\xf1or L\xf3pez",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(text, "Señor López");
    }

    #[test]
    fn test_parse_garbage_pdf_fails() {
        let result = FileParser::parse(
            DocumentFormat::Pdf,
            "broken.pdf",
            b"this is not a pdf",
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(Error::FileParse { .. })));
    }

    #[test]
    fn test_parse_garbage_docx_fails() {
        let result = FileParser::parse(
            DocumentFormat::Docx,
            "broken.docx",
            b"PK not really a zip",
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(Error::FileParse { .. })));
    }
}
