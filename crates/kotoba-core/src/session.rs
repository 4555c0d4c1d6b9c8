use kotoba_types::{PartialSnapshot, SessionPhase, TranslationResult};

use crate::decoder::StreamDecoder;
use crate::error::{InvalidTransition, SessionError};
use crate::partial::snapshot_from_text;

#[derive(Debug)]
pub enum SessionInput {
    /// Selection accepted, request about to be sent
    Accept,
    /// Request failed before the response body was reached
    TransportFailed(SessionError),
    /// Raw response bytes
    Bytes(Vec<u8>),
    /// Response body exhausted
    End,
    /// Reading the body failed partway through
    Abort(SessionError),
}

impl SessionInput {
    fn name(&self) -> &'static str {
        match self {
            SessionInput::Accept => "accept",
            SessionInput::TransportFailed(_) => "transport failure",
            SessionInput::Bytes(_) => "bytes",
            SessionInput::End => "end of stream",
            SessionInput::Abort(_) => "abort",
        }
    }
}

/// Lifecycle of one selection's request.
///
/// `Idle -> Requesting -> Streaming -> Complete | Failed`. Both terminal
/// states only leave through dismissal, which destroys the session.
#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Requesting,
    /// Holds the decoder that owns the raw text accumulated so far
    Streaming(StreamDecoder),
    Complete(TranslationResult),
    Failed(SessionError),
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::Requesting => SessionPhase::Requesting,
            SessionState::Streaming(_) => SessionPhase::Streaming,
            SessionState::Complete(_) => SessionPhase::Complete,
            SessionState::Failed(_) => SessionPhase::Failed,
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        match self {
            SessionState::Streaming(decoder) => Some(decoder.accumulated()),
            _ => None,
        }
    }

    /// What the popup should show for this state, if anything new
    pub fn snapshot(&self) -> Option<PartialSnapshot> {
        match self {
            SessionState::Idle | SessionState::Requesting => Some(PartialSnapshot::default()),
            SessionState::Streaming(decoder) => Some(snapshot_from_text(decoder.accumulated())),
            SessionState::Complete(result) => Some(PartialSnapshot::from(result)),
            SessionState::Failed(_) => None,
        }
    }

    pub fn apply(&mut self, input: SessionInput) -> Result<SessionPhase, InvalidTransition> {
        let from = self.phase();
        let invalid = InvalidTransition {
            from,
            input: input.name(),
        };

        let next = match (std::mem::take(self), input) {
            (SessionState::Idle, SessionInput::Accept) => SessionState::Requesting,

            (SessionState::Requesting, SessionInput::TransportFailed(err)) => {
                SessionState::Failed(err)
            }

            (SessionState::Requesting, SessionInput::Bytes(bytes)) => {
                let mut decoder = StreamDecoder::new();
                decoder.push(&bytes);
                SessionState::Streaming(decoder)
            }

            (SessionState::Streaming(mut decoder), SessionInput::Bytes(bytes)) => {
                let decoded = decoder.push(&bytes);
                tracing::trace!(
                    "chunk of {} chars, {} accumulated",
                    decoded.chunk.len(),
                    decoded.accumulated.len()
                );
                SessionState::Streaming(decoder)
            }

            // An empty body still has to parse; it will not
            (SessionState::Requesting, SessionInput::End) => {
                finish(StreamDecoder::new())
            }

            (SessionState::Streaming(decoder), SessionInput::End) => finish(decoder),

            (SessionState::Requesting | SessionState::Streaming(_), SessionInput::Abort(err)) => {
                SessionState::Failed(err)
            }

            (state, _) => {
                *self = state;
                return Err(invalid);
            }
        };

        *self = next;
        Ok(self.phase())
    }
}

fn finish(mut decoder: StreamDecoder) -> SessionState {
    match decoder.finish() {
        Ok(result) => SessionState::Complete(result),
        Err(err) => SessionState::Failed(err.into()),
    }
}
