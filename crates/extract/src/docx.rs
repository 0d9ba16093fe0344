use std::io::{Cursor, Read};

use super::ExtractionError;

/// Extract text from DOCX bytes.
///
/// A .docx file is a ZIP archive; the body lives in `word/document.xml` as
/// WordprocessingML, with the actual text inside `<w:t>` runs. We pull those
/// runs out directly rather than building a full XML tree.
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let cursor = Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|e| ExtractionError::DocxError(format!("not a ZIP archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::DocxError(format!("missing word/document.xml: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::DocxError(format!("failed to read document.xml: {e}")))?;

    let text = collect_text_runs(&xml);
    if text.is_empty() {
        tracing::warn!("DOCX contained no text runs");
    }
    Ok(text)
}

/// Collect the contents of all `<w:t>` elements, separated by single spaces.
fn collect_text_runs(xml: &str) -> String {
    let mut text = String::new();
    let mut rest = xml;

    while let Some(start) = rest.find("<w:t") {
        let after = &rest[start + 4..];
        // Must be `<w:t>` or `<w:t attr...>`, not a longer tag like `<w:tbl>`.
        if !after.starts_with('>') && !after.starts_with(' ') {
            rest = after;
            continue;
        }
        let Some(open_end) = after.find('>') else {
            break;
        };
        // Self-closing `<w:t/>` carries no text.
        if after[..open_end].ends_with('/') {
            rest = &after[open_end + 1..];
            continue;
        }
        let content = &after[open_end + 1..];
        let Some(close) = content.find("</w:t>") else {
            break;
        };
        let run = &content[..close];
        if !run.trim().is_empty() {
            if !text.is_empty() && !text.ends_with(' ') {
                text.push(' ');
            }
            text.push_str(&unescape_xml(run));
        }
        rest = &content[close + "</w:t>".len()..];
    }

    text.trim().to_string()
}

/// Decode the five predefined XML entities.
fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
