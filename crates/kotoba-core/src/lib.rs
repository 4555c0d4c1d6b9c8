pub mod decoder;
pub mod error;
pub mod geometry;
pub mod partial;
pub mod session;

pub use decoder::{DecodedChunk, StreamDecoder, Utf8StreamDecoder, decode_stream};
pub use error::{DecodeError, InvalidTransition, SessionError};
pub use geometry::{MARGIN, resolve_anchor, resolve_anchor_with_margin};
pub use partial::{Allow, parse_partial, parse_partial_with, snapshot_from_text, snapshot_from_value};
pub use session::{SessionInput, SessionState};
