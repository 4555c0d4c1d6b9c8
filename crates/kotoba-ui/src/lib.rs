pub mod render;
pub mod view;

pub use render::{render, render_trigger};
pub use view::{Body, BreakdownLine, PopupContent, PopupView};
