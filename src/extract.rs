//! Format-dispatching text extraction for uploaded documents.
//!
//! Every supported format maps to one decoder: PDFs are read page by page
//! with `lopdf`, DOCX files paragraph by paragraph with `docx-rs`, and
//! `.txt`/`.csv` uploads are decoded as UTF-8 verbatim. CSV files are
//! intentionally treated as flat text; nothing downstream consumes tabular
//! structure.

use docx_rs::{DocumentChild, read_docx};
use lopdf::Document;
use std::ffi::OsStr;
use std::path::Path;
use thiserror::Error;

/// Errors raised while turning uploaded bytes into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Filename extension is not in the recognized set.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
    /// Bytes claimed to be a PDF but could not be parsed as one.
    #[error("Failed to process PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    /// Bytes claimed to be a DOCX archive but could not be parsed as one.
    #[error("Failed to process DOCX: {0}")]
    Docx(String),
    /// Plain-text upload was not valid UTF-8.
    #[error("Failed to decode text file: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Document formats the extractor understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Paginated PDF document.
    Pdf,
    /// Paragraph-structured Office document.
    Docx,
    /// Flat UTF-8 text (`.txt` and `.csv`).
    PlainText,
}

impl DocumentFormat {
    /// Resolve a format from a filename extension.
    ///
    /// The match is case-sensitive: `report.PDF` is not recognized.
    pub fn from_filename(filename: &str) -> Option<Self> {
        match Path::new(filename).extension().and_then(OsStr::to_str) {
            Some("pdf") => Some(Self::Pdf),
            Some("docx") => Some(Self::Docx),
            Some("txt") | Some("csv") => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Extract the textual content of an uploaded document.
///
/// Dispatches on the filename extension and returns the concatenated text in
/// source order. One attempt per upload; parse failures are surfaced
/// immediately with the underlying library's message.
pub fn extract(content: &[u8], filename: &str) -> Result<String, ExtractError> {
    let format = DocumentFormat::from_filename(filename)
        .ok_or_else(|| ExtractError::UnsupportedFileType(filename.to_string()))?;
    tracing::debug!(file = filename, format = ?format, bytes = content.len(), "Extracting document text");

    match format {
        DocumentFormat::Pdf => pdf_text(content),
        DocumentFormat::Docx => docx_text(content),
        DocumentFormat::PlainText => Ok(String::from_utf8(content.to_vec())?),
    }
}

/// Concatenate the plain text of every page, in page order, with no
/// separator between pages.
fn pdf_text(content: &[u8]) -> Result<String, ExtractError> {
    let document = Document::load_mem(content)?;
    let mut text = String::new();
    for (page_number, _object_id) in document.get_pages() {
        let page_text = document.extract_text(&[page_number])?;
        // lopdf terminates each page with a newline that is not part of the
        // page content; drop it so pages abut exactly.
        text.push_str(page_text.strip_suffix('\n').unwrap_or(&page_text));
    }
    Ok(text)
}

/// Concatenate paragraph texts, joined with a single newline.
fn docx_text(content: &[u8]) -> Result<String, ExtractError> {
    let document = read_docx(content).map_err(|err| ExtractError::Docx(err.to_string()))?;
    let paragraphs: Vec<String> = document
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph.raw_text()),
            _ => None,
        })
        .collect();
    Ok(paragraphs.join("\n"))
}
