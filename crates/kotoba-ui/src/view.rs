use std::fmt;

/// Everything a host needs to draw the popup
#[derive(Debug, Clone, PartialEq)]
pub struct PopupView {
    pub top: f64,
    pub left: f64,
    /// Mirrors `data-above`: the popup grows upward from `top`
    pub above: bool,
    /// Mirrors `data-right`: the popup's right edge sits at `left`
    pub right: bool,
    pub content: PopupContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupContent {
    /// Button that starts the translation when pressed
    Trigger,
    Translation {
        headline: Option<String>,
        body: Body,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Loading,
    Breakdown(Vec<BreakdownLine>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownLine {
    pub text: String,
    pub meaning: String,
}

impl PopupView {
    /// Inline style carrying the position as CSS custom properties
    pub fn css_style(&self) -> String {
        format!(
            "--popup-left: {}px; --popup-top: {}px;",
            self.left, self.top
        )
    }
}

impl fmt::Display for PopupView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertical = if self.above { "above" } else { "below" };
        let horizontal = if self.right { "right" } else { "left" };
        writeln!(
            f,
            "[popup top={} left={} {vertical}/{horizontal}]",
            self.top, self.left
        )?;

        match &self.content {
            PopupContent::Trigger => writeln!(f, "  (translate)"),
            PopupContent::Translation { headline, body } => {
                if let Some(headline) = headline {
                    writeln!(f, "  {headline}")?;
                }
                match body {
                    Body::Loading => writeln!(f, "  ..."),
                    Body::Breakdown(lines) => {
                        for line in lines {
                            writeln!(f, "  {}: {}", line.text, line.meaning)?;
                        }
                        Ok(())
                    }
                }
            }
        }
    }
}
