pub mod channel;
pub mod http;

pub use channel::{ChannelStream, ChannelTransport, PendingRequest};
pub use http::HttpTransport;

/// Incrementally readable response body
#[async_trait::async_trait]
pub trait ByteStream: Send {
    /// Next chunk of bytes, or `None` once the body is exhausted
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

/// Translation backend interface
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one translation request and hand back the streaming response
    /// body. Fails before any byte is read when the backend is unreachable
    /// or answers with a non-success status.
    async fn translate(&self, text: &str) -> Result<Box<dyn ByteStream>, TransportError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub streaming: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Backend answered with HTTP {0}")]
    Status(u16),

    #[error("Response stream closed unexpectedly")]
    Closed,

    #[error("Transport error: {0}")]
    Other(String),
}
