use kotoba_types::{Anchor, NodeId, Rect, Viewport};
use kotoba_ui::PopupView;

/// The live selection as the page reports it
#[derive(Debug, Clone, PartialEq)]
pub struct PageSelection {
    pub text: String,
    pub rect: Rect,
    /// Caret only, nothing actually selected
    pub collapsed: bool,
}

/// Whatever embeds the popup into a page
pub trait PageHost: Send + Sync + 'static {
    /// Current selection, if the page has one
    fn selection(&self) -> Option<PageSelection>;

    fn viewport(&self) -> Viewport;

    /// Attach an isolated render surface at `anchor` (document coordinates)
    fn mount(&self, anchor: &Anchor) -> anyhow::Result<Box<dyn MountedSurface>>;
}

/// A mounted popup region
pub trait MountedSurface: Send {
    /// Whether `target` lies inside the mounted region
    fn contains(&self, target: NodeId) -> bool;

    fn draw(&mut self, view: &PopupView);

    fn remove(self: Box<Self>);
}
