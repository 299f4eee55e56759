// Text chunking - overlapping fixed-size windows over one source file.
// Sizes are in characters; stored offsets are byte offsets so a chunk is
// always exactly `text[span.start..span.end]`.

/// Chunk size keeps each excerpt comfortably inside the model's context
/// budget once top-k of them are concatenated.
pub const CHUNK_SIZE: usize = 500;

/// Neighboring chunks share this many characters so a log line split at a
/// boundary still appears whole in one of them.
pub const CHUNK_OVERLAP: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Split `text` into overlapping chunks of `chunk_size` characters with
/// `overlap` characters shared between neighbors.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<ChunkSpan> {
    assert!(chunk_size > overlap, "chunk size must exceed overlap");

    if text.is_empty() {
        return Vec::new();
    }

    // byte offset of every char boundary, plus the end of the text
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let n_chars = bounds.len() - 1;

    let mut spans = Vec::new();
    let mut start_char = 0;
    loop {
        let end_char = (start_char + chunk_size).min(n_chars);
        let start = bounds[start_char];
        let end = bounds[end_char];
        spans.push(ChunkSpan {
            start,
            end,
            text: text[start..end].to_string(),
        });

        if end_char == n_chars {
            break;
        }
        start_char = end_char - overlap;
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let spans = split_text("short log line", 500, 50);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "short log line");
        assert_eq!(spans[0].start, 0);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(split_text("", 500, 50).is_empty());
    }

    #[test]
    fn test_chunks_overlap_and_cover() {
        let text = "abcdefghijklmnopqrstuvwxyz".repeat(10); // 260 chars
        let spans = split_text(&text, 100, 20);

        assert!(spans.len() > 1);
        // each chunk starts `overlap` chars before the previous one ended
        for pair in spans.windows(2) {
            assert_eq!(pair[1].start, pair[0].end - 20);
        }
        // full coverage: last chunk ends at the end of the text
        assert_eq!(spans.last().unwrap().end, text.len());
    }

    #[test]
    fn test_round_trip_against_source() {
        let text = "line one\nline two\nline three\n".repeat(40);
        for span in split_text(&text, 120, 30) {
            assert_eq!(span.text, &text[span.start..span.end]);
        }
    }

    #[test]
    fn test_multibyte_boundaries() {
        // chunk boundaries must not land inside a multi-byte char
        let text = "héllo wörld ünïcode ".repeat(30);
        for span in split_text(&text, 50, 10) {
            assert_eq!(span.text, &text[span.start..span.end]);
            assert!(span.text.chars().count() <= 50);
        }
    }

    #[test]
    fn test_paragraphs_produce_multiple_chunks() {
        // three paragraphs, chunk size smaller than a paragraph
        let paragraph = "a log paragraph with enough text to exceed the chunk size easily. ".repeat(3);
        let corpus = format!("{paragraph}\n\n{paragraph}\n\n{paragraph}");
        let spans = split_text(&corpus, 100, 20);
        assert!(spans.len() >= 3);
    }
}
