use kotoba_types::{Anchor, PartialSnapshot};

use crate::view::{Body, BreakdownLine, PopupContent, PopupView};

/// Pure presentation of a snapshot. Nothing is drawn without an anchor.
pub fn render(anchor: Option<&Anchor>, snapshot: &PartialSnapshot) -> Option<PopupView> {
    let anchor = anchor?;

    let body = if snapshot.chunks.is_empty() {
        Body::Loading
    } else {
        Body::Breakdown(
            snapshot
                .chunks
                .iter()
                .map(|chunk| BreakdownLine {
                    text: chunk.text.clone().unwrap_or_default(),
                    meaning: chunk.meaning.clone().unwrap_or_default(),
                })
                .collect(),
        )
    };

    Some(positioned(
        anchor,
        PopupContent::Translation {
            headline: snapshot.english_translation.clone(),
            body,
        },
    ))
}

pub fn render_trigger(anchor: &Anchor) -> PopupView {
    positioned(anchor, PopupContent::Trigger)
}

fn positioned(anchor: &Anchor, content: PopupContent) -> PopupView {
    PopupView {
        top: anchor.top,
        left: anchor.left,
        above: anchor.is_above_midpoint,
        right: anchor.is_right_of_midpoint,
        content,
    }
}

#[cfg(test)]
mod tests {
    use kotoba_types::PartialChunk;

    use super::*;

    fn anchor() -> Anchor {
        Anchor {
            top: 688.0,
            left: 100.0,
            is_above_midpoint: true,
            is_right_of_midpoint: false,
        }
    }

    #[test]
    fn test_no_anchor_renders_nothing() {
        assert_eq!(render(None, &PartialSnapshot::default()), None);
    }

    #[test]
    fn test_loading_until_first_chunk() {
        let snapshot = PartialSnapshot {
            english_translation: Some("I like".to_string()),
            chunks: vec![],
        };

        let view = render(Some(&anchor()), &snapshot).unwrap();
        assert!(view.above);
        assert!(!view.right);
        assert_eq!(
            view.content,
            PopupContent::Translation {
                headline: Some("I like".to_string()),
                body: Body::Loading,
            }
        );
    }

    #[test]
    fn test_breakdown_keeps_order_and_fills_gaps() {
        let snapshot = PartialSnapshot {
            english_translation: None,
            chunks: vec![
                PartialChunk {
                    text: Some("猫".to_string()),
                    meaning: Some("cat".to_string()),
                    reading: Some("ねこ".to_string()),
                },
                PartialChunk {
                    text: Some("が".to_string()),
                    meaning: None,
                    reading: None,
                },
            ],
        };

        let view = render(Some(&anchor()), &snapshot).unwrap();
        let PopupContent::Translation { headline, body } = &view.content else {
            panic!("expected translation content");
        };
        assert_eq!(headline, &None);
        assert_eq!(
            body,
            &Body::Breakdown(vec![
                BreakdownLine {
                    text: "猫".to_string(),
                    meaning: "cat".to_string(),
                },
                BreakdownLine {
                    text: "が".to_string(),
                    meaning: String::new(),
                },
            ])
        );
    }

    #[test]
    fn test_idempotent() {
        let snapshot = PartialSnapshot::default();
        assert_eq!(
            render(Some(&anchor()), &snapshot),
            render(Some(&anchor()), &snapshot)
        );
    }

    #[test]
    fn test_text_rendering() {
        let view = render_trigger(&anchor());
        assert_eq!(view.css_style(), "--popup-left: 100px; --popup-top: 688px;");
        assert_eq!(
            view.to_string(),
            "[popup top=688 left=100 above/left]\n  (translate)\n"
        );
    }
}
