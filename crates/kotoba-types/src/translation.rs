use serde::{Deserialize, Serialize};

/// One vocabulary entry of the breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabChunk {
    pub text: String,
    pub meaning: String,
    /// Not shown by the popup, but part of the response contract
    pub reading: String,
}

/// Final, fully validated translation document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub english_translation: String,
    pub chunks: Vec<VocabChunk>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialChunk {
    pub text: Option<String>,
    pub meaning: Option<String>,
    pub reading: Option<String>,
}

/// Best-effort view of a translation that is still streaming.
///
/// Each snapshot is built from the whole accumulated text and replaces the
/// previous one outright.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSnapshot {
    pub english_translation: Option<String>,
    pub chunks: Vec<PartialChunk>,
}

impl PartialSnapshot {
    pub fn is_empty(&self) -> bool {
        self.english_translation.is_none() && self.chunks.is_empty()
    }
}

impl From<VocabChunk> for PartialChunk {
    fn from(chunk: VocabChunk) -> Self {
        Self {
            text: Some(chunk.text),
            meaning: Some(chunk.meaning),
            reading: Some(chunk.reading),
        }
    }
}

impl From<TranslationResult> for PartialSnapshot {
    fn from(result: TranslationResult) -> Self {
        Self {
            english_translation: Some(result.english_translation),
            chunks: result.chunks.into_iter().map(PartialChunk::from).collect(),
        }
    }
}

impl From<&TranslationResult> for PartialSnapshot {
    fn from(result: &TranslationResult) -> Self {
        result.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_uses_camel_case_wire_names() {
        let json = r#"{
            "englishTranslation": "I like cats",
            "chunks": [{"text": "猫", "meaning": "cat", "reading": "ねこ"}]
        }"#;

        let result: TranslationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.english_translation, "I like cats");
        assert_eq!(result.chunks[0].reading, "ねこ");
    }

    #[test]
    fn test_snapshot_from_result() {
        let result = TranslationResult {
            english_translation: "cat".to_string(),
            chunks: vec![VocabChunk {
                text: "猫".to_string(),
                meaning: "cat".to_string(),
                reading: "ねこ".to_string(),
            }],
        };

        let snapshot = PartialSnapshot::from(&result);
        assert_eq!(snapshot.english_translation.as_deref(), Some("cat"));
        assert_eq!(snapshot.chunks.len(), 1);
        assert_eq!(snapshot.chunks[0].meaning.as_deref(), Some("cat"));
        assert!(!snapshot.is_empty());
        assert!(PartialSnapshot::default().is_empty());
    }
}
