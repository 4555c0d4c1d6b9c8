use kotoba_types::{Anchor, Rect, Viewport};

/// Gap between the selection and the popup edge
pub const MARGIN: f64 = 12.0;

/// Place the popup relative to a selection.
///
/// A selection whose bottom edge sits in the lower half of the viewport gets
/// a popup that opens upward; one that starts in the right half hangs the
/// popup from its right edge. The result is in document space so the popup
/// tracks page content on scroll.
pub fn resolve_anchor(rect: &Rect, viewport: &Viewport) -> Anchor {
    resolve_anchor_with_margin(rect, viewport, MARGIN)
}

pub fn resolve_anchor_with_margin(rect: &Rect, viewport: &Viewport, margin: f64) -> Anchor {
    let is_above_midpoint = rect.bottom > viewport.height / 2.0;
    let is_right_of_midpoint = rect.left > viewport.width / 2.0;

    let top = viewport.scroll_y
        + if is_above_midpoint {
            rect.top - margin
        } else {
            rect.bottom + margin
        };
    let left = viewport.scroll_x
        + if is_right_of_midpoint {
            rect.right
        } else {
            rect.left
        };

    Anchor {
        top,
        left,
        is_above_midpoint,
        is_right_of_midpoint,
    }
}
