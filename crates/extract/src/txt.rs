use super::ExtractionError;

/// Extract text from a plain text file (lossy UTF-8).
pub fn extract_txt(bytes: &[u8]) -> Result<String, ExtractionError> {
    Ok(String::from_utf8_lossy(bytes).into_owned())
}
