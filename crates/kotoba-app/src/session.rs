use std::sync::Arc;
use std::time::Duration;

use kanal::AsyncSender;
use kotoba_core::{SessionError, SessionInput, SessionState};
use kotoba_translator::{ByteStream, Transport};
use kotoba_types::{SessionEvent, SessionId, SessionPhase, SessionUpdate};
use tokio_util::sync::CancellationToken;

use crate::watcher::WatcherInput;

/// One selection's request/response cycle.
///
/// Sends exactly one request, then republishes a fresh snapshot for every
/// chunk until the body ends. Cancelling the token abandons the response:
/// nothing more is published and the stream is dropped.
pub struct TranslationSession {
    pub id: SessionId,
    pub text: String,
    pub transport: Arc<dyn Transport>,
    /// Inbox of the watcher that owns this session
    pub updates: AsyncSender<WatcherInput>,
    pub cancel: CancellationToken,
    pub stall_timeout: Option<Duration>,
}

impl TranslationSession {
    pub async fn run(self) -> SessionState {
        let mut state = SessionState::Idle;
        self.advance(&mut state, SessionInput::Accept);
        if !self.publish(SessionEvent::Requesting).await {
            return state;
        }

        tracing::info!("[SESSION {}] Requesting translation", self.id);
        let response = tokio::select! {
            _ = self.cancel.cancelled() => {
                tracing::debug!("[SESSION {}] Dismissed before response", self.id);
                return state;
            }
            response = self.transport.translate(&self.text) => response,
        };

        let mut stream = match response {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("[SESSION {}] Request failed: {}", self.id, e);
                self.advance(&mut state, SessionInput::TransportFailed(e.into()));
                self.publish_outcome(&state).await;
                return state;
            }
        };

        loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!("[SESSION {}] Dismissed mid-stream, abandoning response", self.id);
                    return state;
                }
                next = self.next_chunk(stream.as_mut()) => next,
            };

            match next {
                Ok(Some(bytes)) => {
                    let first = state.phase() == SessionPhase::Requesting;
                    self.advance(&mut state, SessionInput::Bytes(bytes));

                    if first && !self.publish(SessionEvent::Streaming).await {
                        return state;
                    }
                    // Rebuilt from the whole raw text every time
                    let Some(snapshot) = state.snapshot() else {
                        continue;
                    };
                    if !self.publish(SessionEvent::Snapshot(snapshot)).await {
                        return state;
                    }
                }
                Ok(None) => {
                    self.advance(&mut state, SessionInput::End);
                    break;
                }
                Err(e) => {
                    tracing::warn!("[SESSION {}] Stream failed: {}", self.id, e);
                    self.advance(&mut state, SessionInput::Abort(e));
                    break;
                }
            }
        }

        drop(stream);
        self.publish_outcome(&state).await;
        state
    }

    async fn next_chunk(&self, stream: &mut dyn ByteStream) -> Result<Option<Vec<u8>>, SessionError> {
        match self.stall_timeout {
            Some(limit) => match tokio::time::timeout(limit, stream.next_chunk()).await {
                Ok(chunk) => chunk.map_err(SessionError::from),
                Err(_) => Err(SessionError::Stalled(
                    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                )),
            },
            None => stream.next_chunk().await.map_err(SessionError::from),
        }
    }

    fn advance(&self, state: &mut SessionState, input: SessionInput) {
        if let Err(e) = state.apply(input) {
            tracing::error!("[SESSION {}] {}", self.id, e);
        }
    }

    async fn publish_outcome(&self, state: &SessionState) {
        match state {
            SessionState::Complete(result) => {
                tracing::info!(
                    "[SESSION {}] Complete: {} chunks",
                    self.id,
                    result.chunks.len()
                );
                self.publish(SessionEvent::Completed(result.clone())).await;
            }
            SessionState::Failed(e) => {
                tracing::warn!("[SESSION {}] Failed: {}", self.id, e);
                self.publish(SessionEvent::Failed(e.to_string())).await;
            }
            _ => {}
        }
    }

    /// Returns false once nobody wants further updates
    async fn publish(&self, event: SessionEvent) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        let update = SessionUpdate {
            session: self.id,
            event,
        };
        self.updates.send(WatcherInput::Session(update)).await.is_ok()
    }
}
