//! Tolerant parsing of truncated JSON.
//!
//! The scanner walks brackets and field boundaries by hand and never fails:
//! on truncated or malformed input it returns the largest structurally valid
//! value it could recover. Unterminated containers are closed, a trailing key
//! without a complete value is dropped, and anything after the first
//! malformed token is ignored.

use kotoba_types::{PartialChunk, PartialSnapshot};
use serde_json::{Map, Number, Value};

/// Which truncated scalars may survive in the recovered value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allow {
    /// Keep an unterminated string as its prefix instead of dropping it
    pub strings: bool,
    /// Keep a number cut off at end of input (`12.` reads as `12`)
    pub numbers: bool,
}

impl Default for Allow {
    fn default() -> Self {
        Self {
            strings: true,
            numbers: true,
        }
    }
}

impl Allow {
    pub fn strict_scalars() -> Self {
        Self {
            strings: false,
            numbers: false,
        }
    }
}

pub fn parse_partial(text: &str) -> Value {
    parse_partial_with(text, Allow::default())
}

pub fn parse_partial_with(text: &str, allow: Allow) -> Value {
    let mut scanner = Scanner {
        src: text,
        pos: 0,
        allow,
    };

    match scanner.value() {
        Parsed::Complete(value) | Parsed::Partial(value) => value,
        Parsed::Missing => Value::Null,
    }
}

/// Best-effort translation snapshot of whatever has streamed in so far
pub fn snapshot_from_text(text: &str) -> PartialSnapshot {
    snapshot_from_value(&parse_partial(text))
}

pub fn snapshot_from_value(value: &Value) -> PartialSnapshot {
    let Some(object) = value.as_object() else {
        return PartialSnapshot::default();
    };

    let english_translation = object
        .get("englishTranslation")
        .and_then(Value::as_str)
        .map(str::to_string);

    let chunks = object
        .get("chunks")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|chunk| PartialChunk {
                    text: string_field(chunk, "text"),
                    meaning: string_field(chunk, "meaning"),
                    reading: string_field(chunk, "reading"),
                })
                .collect()
        })
        .unwrap_or_default();

    PartialSnapshot {
        english_translation,
        chunks,
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

enum Parsed {
    /// Fully closed value; scanning may continue after it
    Complete(Value),
    /// Recovered prefix; nothing after it is usable
    Partial(Value),
    /// Nothing recoverable here
    Missing,
}

enum Str {
    Closed(String),
    Open(String),
    Malformed,
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    allow: Allow,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> Parsed {
        self.skip_whitespace();

        match self.peek() {
            None => Parsed::Missing,
            Some(b'{') => {
                self.pos += 1;
                self.object()
            }
            Some(b'[') => {
                self.pos += 1;
                self.array()
            }
            Some(b'"') => match self.string() {
                Str::Closed(s) => Parsed::Complete(Value::String(s)),
                Str::Open(s) if self.allow.strings => Parsed::Partial(Value::String(s)),
                Str::Open(_) | Str::Malformed => Parsed::Missing,
            },
            Some(b't') => self.literal("true", Value::Bool(true)),
            Some(b'f') => self.literal("false", Value::Bool(false)),
            Some(b'n') => self.literal("null", Value::Null),
            Some(b'-' | b'0'..=b'9') => self.number(),
            Some(_) => Parsed::Missing,
        }
    }

    fn object(&mut self) -> Parsed {
        let mut map = Map::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Parsed::Partial(Value::Object(map)),
                Some(b'}') => {
                    self.pos += 1;
                    return Parsed::Complete(Value::Object(map));
                }
                Some(b',') if !map.is_empty() => {
                    self.pos += 1;
                    self.skip_whitespace();
                }
                Some(b'"') if map.is_empty() => {}
                Some(_) => return Parsed::Partial(Value::Object(map)),
            }

            // A key that is cut off or has no value yet is dropped
            let key = match self.peek() {
                Some(b'"') => match self.string() {
                    Str::Closed(key) => key,
                    Str::Open(_) | Str::Malformed => return Parsed::Partial(Value::Object(map)),
                },
                _ => return Parsed::Partial(Value::Object(map)),
            };

            self.skip_whitespace();
            if self.peek() != Some(b':') {
                return Parsed::Partial(Value::Object(map));
            }
            self.pos += 1;

            match self.value() {
                Parsed::Complete(value) => {
                    map.insert(key, value);
                }
                Parsed::Partial(value) => {
                    map.insert(key, value);
                    return Parsed::Partial(Value::Object(map));
                }
                Parsed::Missing => return Parsed::Partial(Value::Object(map)),
            }
        }
    }

    fn array(&mut self) -> Parsed {
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Parsed::Partial(Value::Array(items)),
                Some(b']') => {
                    self.pos += 1;
                    return Parsed::Complete(Value::Array(items));
                }
                Some(b',') if !items.is_empty() => {
                    self.pos += 1;
                }
                Some(_) if items.is_empty() => {}
                Some(_) => return Parsed::Partial(Value::Array(items)),
            }

            match self.value() {
                Parsed::Complete(value) => items.push(value),
                Parsed::Partial(value) => {
                    items.push(value);
                    return Parsed::Partial(Value::Array(items));
                }
                Parsed::Missing => return Parsed::Partial(Value::Array(items)),
            }
        }
    }

    /// Scans a string starting at the opening quote
    fn string(&mut self) -> Str {
        let src = self.src;
        let bytes = src.as_bytes();
        self.pos += 1;

        let mut out = String::new();
        let mut start = self.pos;

        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'"' => {
                    out.push_str(&src[start..self.pos]);
                    self.pos += 1;
                    return Str::Closed(out);
                }
                b'\\' => {
                    out.push_str(&src[start..self.pos]);
                    match self.escape() {
                        Some(Ok(c)) => out.push(c),
                        Some(Err(())) => return Str::Malformed,
                        None => return Str::Open(out),
                    }
                    start = self.pos;
                }
                // Raw control characters are not allowed inside strings
                0x00..=0x1f => return Str::Malformed,
                _ => self.pos += 1,
            }
        }

        out.push_str(&src[start..]);
        Str::Open(out)
    }

    /// Decodes one escape sequence at `pos` (the backslash). `None` means the
    /// input ends inside the escape.
    fn escape(&mut self) -> Option<Result<char, ()>> {
        let src = self.src;
        let bytes = src.as_bytes();
        let code = *bytes.get(self.pos + 1)?;
        self.pos += 2;

        let c = match code {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => return self.unicode_escape(),
            _ => return Some(Err(())),
        };

        Some(Ok(c))
    }

    fn unicode_escape(&mut self) -> Option<Result<char, ()>> {
        let high = match self.hex4()? {
            Ok(unit) => unit,
            Err(()) => return Some(Err(())),
        };

        if !(0xD800..0xDC00).contains(&high) {
            return Some(Ok(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER)));
        }

        // High surrogate: the pair may still be arriving
        let src = self.src;
        let bytes = src.as_bytes();
        if self.pos + 2 > bytes.len() {
            return None;
        }
        if &bytes[self.pos..self.pos + 2] != b"\\u" {
            return Some(Ok(char::REPLACEMENT_CHARACTER));
        }

        let save = self.pos;
        self.pos += 2;
        let low = match self.hex4()? {
            Ok(unit) => unit,
            Err(()) => return Some(Err(())),
        };

        if (0xDC00..0xE000).contains(&low) {
            let c = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            Some(Ok(char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER)))
        } else {
            // Lone high surrogate; reread the second escape on its own
            self.pos = save;
            Some(Ok(char::REPLACEMENT_CHARACTER))
        }
    }

    fn hex4(&mut self) -> Option<Result<u32, ()>> {
        let digits = self.src.get(self.pos..self.pos + 4)?;
        self.pos += 4;
        Some(u32::from_str_radix(digits, 16).map_err(|_| ()))
    }

    fn literal(&mut self, word: &'static str, value: Value) -> Parsed {
        let rest = &self.src[self.pos..];

        if rest.starts_with(word) {
            self.pos += word.len();
            Parsed::Complete(value)
        } else {
            // Either a cut-off literal or garbage; neither is kept
            Parsed::Missing
        }
    }

    fn number(&mut self) -> Parsed {
        let start = self.pos;
        while let Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') = self.peek() {
            self.pos += 1;
        }
        let token = &self.src[start..self.pos];

        if !self.at_end() {
            return match parse_number(token) {
                Some(number) => Parsed::Complete(Value::Number(number)),
                None => Parsed::Missing,
            };
        }

        if !self.allow.numbers {
            return Parsed::Missing;
        }

        // Cut off at end of input: keep the longest numeric prefix
        let trimmed = token.trim_end_matches(['-', '+', '.', 'e', 'E']);
        match parse_number(trimmed) {
            Some(number) => Parsed::Partial(Value::Number(number)),
            None => Parsed::Missing,
        }
    }
}

fn parse_number(token: &str) -> Option<Number> {
    if token.is_empty() {
        return None;
    }

    if let Ok(n) = token.parse::<i64>() {
        return Some(Number::from(n));
    }

    token.parse::<f64>().ok().and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {
    use kotoba_types::{PartialSnapshot, TranslationResult};
    use serde_json::json;

    use super::*;

    const DOCUMENT: &str = r#"{
  "englishTranslation": "I like cats",
  "chunks": [
    {"text": "猫", "meaning": "cat", "reading": "ねこ"},
    {"text": "が", "meaning": "subject marker", "reading": "が"},
    {"text": "好き", "meaning": "liked", "reading": "すき"}
  ]
}"#;

    #[test]
    fn test_complete_document() {
        let expected: Value = serde_json::from_str(DOCUMENT).unwrap();
        assert_eq!(parse_partial(DOCUMENT), expected);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_partial(""), Value::Null);
        assert_eq!(parse_partial("  \n"), Value::Null);
    }

    #[test]
    fn test_truncated_containers_are_closed() {
        assert_eq!(parse_partial("{"), json!({}));
        assert_eq!(parse_partial("[1, 2"), json!([1, 2]));
        assert_eq!(parse_partial(r#"{"a": [1, {"b": 2"#), json!({"a": [1, {"b": 2}]}));
    }

    #[test]
    fn test_incomplete_trailing_key_is_dropped() {
        assert_eq!(parse_partial(r#"{"a": 1, "b"#), json!({"a": 1}));
        assert_eq!(parse_partial(r#"{"a": 1, "b""#), json!({"a": 1}));
        assert_eq!(parse_partial(r#"{"a": 1, "b":"#), json!({"a": 1}));
        assert_eq!(parse_partial(r#"{"a": 1, "b": tr"#), json!({"a": 1}));
        assert_eq!(parse_partial(r#"{"a": 1,"#), json!({"a": 1}));
    }

    #[test]
    fn test_truncated_string_kept_as_prefix() {
        assert_eq!(
            parse_partial(r#"{"englishTranslation": "I li"#),
            json!({"englishTranslation": "I li"})
        );
    }

    #[test]
    fn test_truncated_string_dropped_when_disallowed() {
        let value = parse_partial_with(
            r#"{"a": "done", "b": "I li"#,
            Allow::strict_scalars(),
        );
        assert_eq!(value, json!({"a": "done"}));
    }

    #[test]
    fn test_truncated_numbers() {
        assert_eq!(parse_partial(r#"{"n": 12."#), json!({"n": 12}));
        assert_eq!(parse_partial(r#"{"n": -"#), json!({}));
        assert_eq!(
            parse_partial_with(r#"{"n": 12"#, Allow::strict_scalars()),
            json!({})
        );
    }

    #[test]
    fn test_escapes() {
        assert_eq!(parse_partial(r#""a\"b\n""#), json!("a\"b\n"));
        assert_eq!(parse_partial(r#""猫""#), json!("猫"));
        assert_eq!(parse_partial(r#""😺""#), json!("😺"));
        // Cut inside an escape: the escape is dropped, the prefix survives
        assert_eq!(parse_partial(r#""ab\u73"#), json!("ab"));
        assert_eq!(parse_partial(r#""ab\"#), json!("ab"));
        assert_eq!(parse_partial(r#""ab\ud83d"#), json!("ab"));
    }

    #[test]
    fn test_garbage_stops_the_scan() {
        assert_eq!(parse_partial(r#"{"a": 1 "b": 2}"#), json!({"a": 1}));
        assert_eq!(parse_partial(r#"[1, 2, ?]"#), json!([1, 2]));
        assert_eq!(parse_partial(r#"{"a": 1} trailing"#), json!({"a": 1}));
        assert_eq!(parse_partial("?"), Value::Null);
    }

    #[test]
    fn test_every_prefix_is_tolerated() {
        let full: TranslationResult = serde_json::from_str(DOCUMENT).unwrap();

        for (end, _) in DOCUMENT.char_indices() {
            let snapshot = snapshot_from_text(&DOCUMENT[..end]);
            assert!(
                snapshot.chunks.len() <= full.chunks.len(),
                "prefix {end} produced {} chunks",
                snapshot.chunks.len()
            );
        }
    }

    #[test]
    fn test_full_text_snapshot_equals_strict_parse() {
        let strict: TranslationResult = serde_json::from_str(DOCUMENT).unwrap();
        assert_eq!(snapshot_from_text(DOCUMENT), PartialSnapshot::from(strict));
    }

    #[test]
    fn test_snapshot_mid_chunk() {
        let cut = DOCUMENT.find("subject").unwrap() + 3;
        let snapshot = snapshot_from_text(&DOCUMENT[..cut]);

        assert_eq!(snapshot.english_translation.as_deref(), Some("I like cats"));
        assert_eq!(snapshot.chunks.len(), 2);
        assert_eq!(snapshot.chunks[1].text.as_deref(), Some("が"));
        assert_eq!(snapshot.chunks[1].meaning.as_deref(), Some("sub"));
        assert_eq!(snapshot.chunks[1].reading, None);
    }

    #[test]
    fn test_snapshot_ignores_wrong_shapes() {
        assert_eq!(snapshot_from_text("[1, 2]"), PartialSnapshot::default());
        let snapshot = snapshot_from_text(r#"{"englishTranslation": 5, "chunks": [1, {"text": "x"}]}"#);
        assert_eq!(snapshot.english_translation, None);
        assert_eq!(snapshot.chunks.len(), 1);
        assert_eq!(snapshot.chunks[0].text.as_deref(), Some("x"));
    }
}
