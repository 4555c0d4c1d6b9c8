use serde::{Deserialize, Serialize};

/// Bounding rectangle of a selection, in viewport space (CSS pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }
}

/// Visible page area plus how far the document is scrolled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    pub fn scrolled(mut self, scroll_x: f64, scroll_y: f64) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }
}

/// Popup position in document space, fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub top: f64,
    pub left: f64,
    /// Popup opens upward, above the selection
    pub is_above_midpoint: bool,
    /// Popup hangs from the selection's right edge
    pub is_right_of_midpoint: bool,
}

/// A settled, non-empty selection read from the page
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEvent {
    text: String,
    rect: Rect,
}

impl SelectionEvent {
    /// Returns `None` when the text is empty after trimming
    pub fn new(text: &str, rect: Rect) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            rect,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_parts(self) -> (String, Rect) {
        (self.text, self.rect)
    }
}
