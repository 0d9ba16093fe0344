pub mod chunker;
mod docx;
mod pdf;
mod txt;

use thiserror::Error;

/// MIME type for PDF uploads.
pub const MIME_PDF: &str = "application/pdf";
/// MIME type for Word (.docx) uploads.
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// MIME type for plain text uploads.
pub const MIME_TEXT: &str = "text/plain";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("DOCX extraction failed: {0}")]
    DocxError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract text from file bytes based on the declared MIME type.
pub fn extract_text(bytes: &[u8], mime: &str) -> Result<String, ExtractionError> {
    match mime {
        MIME_PDF => pdf::extract_pdf(bytes),
        MIME_DOCX => docx::extract_docx(bytes),
        MIME_TEXT => txt::extract_txt(bytes),
        other => Err(ExtractionError::UnsupportedType(other.to_string())),
    }
}
