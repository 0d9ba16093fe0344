use super::ExtractionError;

/// Extract all text from a PDF held in memory.
///
/// pdf-extract returns the whole document as one string with form feed
/// characters (`\x0C`) between pages; callers only need the flat text, so
/// page boundaries are left as-is for the whitespace chunker to absorb.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::PdfError(e.to_string()))?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        // Succeeded but no text found (scanned/image PDF).
        tracing::warn!("PDF contained no extractable text");
    }

    Ok(trimmed.to_string())
}
