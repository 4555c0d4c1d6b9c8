pub mod events;
pub mod geometry;
pub mod translation;

pub use events::{NodeId, PageEvent, SessionEvent, SessionId, SessionPhase, SessionUpdate};
pub use geometry::{Anchor, Rect, SelectionEvent, Viewport};
pub use translation::{PartialChunk, PartialSnapshot, TranslationResult, VocabChunk};
