use std::char::REPLACEMENT_CHARACTER;

use kotoba_translator::ByteStream;
use kotoba_types::TranslationResult;

use crate::error::DecodeError;

/// Incremental UTF-8 decoder.
///
/// Incomplete multi-byte sequences at the end of a chunk are carried over to
/// the next one. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(bytes);

        let mut out = String::with_capacity(buf.len());
        let mut rest: &[u8] = &buf;

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));

                    match e.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        // Sequence continues in the next chunk
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = rest.to_vec();
        out
    }

    /// Flush at end of input; a dangling partial sequence becomes U+FFFD
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            REPLACEMENT_CHARACTER.to_string()
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Text decoded from one chunk, plus everything decoded so far
#[derive(Debug)]
pub struct DecodedChunk<'a> {
    pub chunk: String,
    pub accumulated: &'a str,
}

/// Accumulates a streamed translation document
#[derive(Debug, Default)]
pub struct StreamDecoder {
    utf8: Utf8StreamDecoder,
    accumulated: String,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> DecodedChunk<'_> {
        let chunk = self.utf8.decode(bytes);
        self.accumulated.push_str(&chunk);

        DecodedChunk {
            chunk,
            accumulated: &self.accumulated,
        }
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Strict parse of the complete document. The producer promises one
    /// full document by end of stream, so anything else is an error.
    pub fn finish(&mut self) -> Result<TranslationResult, DecodeError> {
        let tail = self.utf8.finish();
        self.accumulated.push_str(&tail);

        let result = serde_json::from_str(&self.accumulated)?;
        Ok(result)
    }
}

/// Pull `stream` to exhaustion, reporting `(chunk, accumulated)` after every
/// chunk, then parse the assembled document.
pub async fn decode_stream<F>(
    stream: &mut dyn ByteStream,
    mut on_chunk: F,
) -> Result<TranslationResult, DecodeError>
where
    F: FnMut(&str, &str),
{
    let mut decoder = StreamDecoder::new();

    while let Some(bytes) = stream.next_chunk().await? {
        let decoded = decoder.push(&bytes);
        on_chunk(&decoded.chunk, decoded.accumulated);
    }

    decoder.finish()
}

#[cfg(test)]
mod tests {
    use kotoba_translator::ChannelStream;

    use super::*;

    const DOCUMENT: &str = r#"{"englishTranslation":"I like cats","chunks":[{"text":"猫","meaning":"cat","reading":"ねこ"}]}"#;

    #[test]
    fn test_split_multibyte_sequence_is_carried_over() {
        let bytes = "猫".as_bytes();
        let mut decoder = Utf8StreamDecoder::new();

        assert_eq!(decoder.decode(&bytes[..1]), "");
        assert!(decoder.has_pending());
        assert_eq!(decoder.decode(&bytes[1..2]), "");
        assert_eq!(decoder.decode(&bytes[2..]), "猫");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_invalid_bytes_become_replacement_characters() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_dangling_sequence_at_end() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(&"ね".as_bytes()[..2]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_push_reports_chunk_and_accumulated() {
        let mut decoder = StreamDecoder::new();

        let first = decoder.push(b"{\"english");
        assert_eq!(first.chunk, "{\"english");
        assert_eq!(first.accumulated, "{\"english");

        let second = decoder.push(b"Translation\"");
        assert_eq!(second.chunk, "Translation\"");
        assert_eq!(second.accumulated, "{\"englishTranslation\"");
    }

    #[test]
    fn test_finish_rejects_truncated_document() {
        let mut decoder = StreamDecoder::new();
        decoder.push(&DOCUMENT.as_bytes()[..20]);

        assert!(matches!(
            decoder.finish(),
            Err(DecodeError::StreamDecode(_))
        ));
    }

    #[tokio::test]
    async fn test_decode_stream_byte_by_byte() {
        let (tx, mut stream) = ChannelStream::pair(DOCUMENT.len());
        for byte in DOCUMENT.as_bytes() {
            tx.send(vec![*byte]).await.unwrap();
        }
        drop(tx);

        let mut calls = 0;
        let mut last = String::new();
        let result = decode_stream(&mut stream, |_chunk, accumulated| {
            calls += 1;
            last = accumulated.to_string();
        })
        .await
        .unwrap();

        assert_eq!(calls, DOCUMENT.len());
        assert_eq!(last, DOCUMENT);
        assert_eq!(result.english_translation, "I like cats");
        assert_eq!(result.chunks[0].text, "猫");
    }
}
