use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::translation::{PartialSnapshot, TranslationResult};

/// Opaque identity of a page node, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Raw interaction events forwarded from the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    PointerUp { target: NodeId },
    PointerDown { target: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Requesting,
    Streaming,
    Complete,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Requesting,
    Streaming,
    Snapshot(PartialSnapshot),
    Completed(TranslationResult),
    Failed(String),
}

impl SessionEvent {
    /// Phase the session is in once this event has been published
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionEvent::Requesting => SessionPhase::Requesting,
            SessionEvent::Streaming | SessionEvent::Snapshot(_) => SessionPhase::Streaming,
            SessionEvent::Completed(_) => SessionPhase::Complete,
            SessionEvent::Failed(_) => SessionPhase::Failed,
        }
    }
}

/// Published by a running session to its single subscriber
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpdate {
    pub session: SessionId,
    pub event: SessionEvent,
}
