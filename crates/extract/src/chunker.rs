//! Byte-bounded word chunking.
//!
//! Splits a document into chunks sized to fit one LLM call's input budget.
//! Words are never split: the bound applies to the UTF-8 byte length of the
//! accumulated words (join spaces not counted), and a single word longer than
//! the bound becomes its own oversized chunk rather than being dropped.

// ── Configuration ───────────────────────────────────────────────────────────

/// Configuration for the chunking engine.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum UTF-8 bytes of word content per chunk (default: 15000).
    pub max_chunk_bytes: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: 15_000,
        }
    }
}

// ── Public entry point ──────────────────────────────────────────────────────

/// Split `text` on whitespace and greedily pack words into chunks of at most
/// `max_chunk_bytes` of word content each, preserving word order.
///
/// Rejoining is lossy by design: words within a chunk are joined with single
/// spaces regardless of the original inter-word whitespace. Empty or
/// whitespace-only input yields no chunks. `max_chunk_bytes` must be > 0.
pub fn chunk(text: &str, max_chunk_bytes: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_bytes = 0usize;

    for word in text.split_whitespace() {
        if !current.is_empty() && current_bytes + word.len() > max_chunk_bytes {
            chunks.push(current.join(" "));
            current.clear();
            current_bytes = 0;
        }
        current.push(word);
        current_bytes += word.len();
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}

/// Byte length of a chunk's word content, excluding the join spaces.
pub fn content_bytes(chunk: &str) -> usize {
    chunk.split_whitespace().map(str::len).sum()
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Size invariant ──────────────────────────────────────────────────

    #[test]
    fn chunks_respect_byte_bound() {
        let text = (0..200).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        let chunks = chunk(&text, 50);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(
                content_bytes(c) <= 50,
                "chunk exceeds bound: {} bytes in {c:?}",
                content_bytes(c)
            );
        }
    }

    #[test]
    fn bound_counts_word_bytes_not_separators() {
        // Four 10-byte words fit a 40-byte bound exactly even though the
        // joined string is 43 bytes with spaces.
        let text = "aaaaaaaaaa bbbbbbbbbb cccccccccc dddddddddd";
        let chunks = chunk(text, 40);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 43);
    }

    #[test]
    fn utf8_words_measured_in_bytes() {
        // "ééééé" is 5 chars but 10 bytes.
        let text = "ééééé ééééé ééééé";
        let chunks = chunk(text, 20);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "ééééé ééééé");
        assert_eq!(chunks[1], "ééééé");
    }

    // ── Oversized words ─────────────────────────────────────────────────

    #[test]
    fn oversized_word_becomes_its_own_chunk() {
        let text = "short antidisestablishmentarianism end";
        let chunks = chunk(text, 10);
        assert_eq!(
            chunks,
            vec!["short", "antidisestablishmentarianism", "end"]
        );
    }

    #[test]
    fn bound_smaller_than_first_word_never_drops_content() {
        let chunks = chunk("agreement", 3);
        assert_eq!(chunks, vec!["agreement"]);
    }

    // ── Reconstruction ──────────────────────────────────────────────────

    #[test]
    fn words_survive_chunking_in_order() {
        let text = "whereas the party of the first part\nagrees\tto indemnify   the party of the second part";
        let original: Vec<&str> = text.split_whitespace().collect();

        for bound in [1, 7, 16, 64, 10_000] {
            let chunks = chunk(text, bound);
            let rejoined: Vec<&str> = chunks
                .iter()
                .flat_map(|c| c.split(' '))
                .collect();
            assert_eq!(rejoined, original, "bound {bound} lost or reordered words");
        }
    }

    // ── Edge cases ──────────────────────────────────────────────────────

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk("", 500).is_empty());
    }

    #[test]
    fn whitespace_only_input_yields_no_chunks() {
        assert!(chunk("   \n\t  ", 500).is_empty());
    }

    #[test]
    fn single_word_yields_single_chunk() {
        assert_eq!(chunk("contract", 500), vec!["contract"]);
    }

    #[test]
    fn exact_fit_does_not_split_early() {
        // Two 5-byte words exactly fill a 10-byte bound.
        let chunks = chunk("aaaaa bbbbb ccccc", 10);
        assert_eq!(chunks, vec!["aaaaa bbbbb", "ccccc"]);
    }

    #[test]
    fn default_config_bound() {
        assert_eq!(ChunkConfig::default().max_chunk_bytes, 15_000);
    }
}
