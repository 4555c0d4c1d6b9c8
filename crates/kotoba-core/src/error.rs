use kotoba_translator::TransportError;
use kotoba_types::SessionPhase;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The stream ended but the accumulated text is not a translation document
    #[error("Failed to parse streamed translation response: {0}")]
    StreamDecode(#[from] serde_json::Error),

    #[error("Stream read failed: {0}")]
    Transport(#[from] TransportError),
}

/// Terminal failure of one translation session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Stream decode error: {0}")]
    StreamDecode(String),

    #[error("No data received for {0} ms")]
    Stalled(u64),
}

impl From<DecodeError> for SessionError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::StreamDecode(e) => SessionError::StreamDecode(e.to_string()),
            DecodeError::Transport(e) => SessionError::Transport(e.to_string()),
        }
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        SessionError::Transport(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid session transition: {input} while {from:?}")]
pub struct InvalidTransition {
    pub from: SessionPhase,
    pub input: &'static str,
}
