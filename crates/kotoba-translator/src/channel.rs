use async_trait::async_trait;
use kanal::{AsyncReceiver, AsyncSender};

use crate::{ByteStream, ProviderMetadata, Transport, TransportError};

/// Response body fed through a kanal channel. The body ends when every
/// sender has been dropped.
pub struct ChannelStream {
    rx: AsyncReceiver<Vec<u8>>,
}

impl ChannelStream {
    pub fn new(rx: AsyncReceiver<Vec<u8>>) -> Self {
        Self { rx }
    }

    pub fn pair(capacity: usize) -> (AsyncSender<Vec<u8>>, Self) {
        let (tx, rx) = kanal::bounded_async(capacity);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl ByteStream for ChannelStream {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.rx.recv().await {
            Ok(bytes) => Ok(Some(bytes)),
            // Senders gone, body complete
            Err(kanal::ReceiveError::SendClosed) => Ok(None),
            Err(kanal::ReceiveError::Closed) => Err(TransportError::Closed),
        }
    }
}

/// A request handed to whoever drives a [`ChannelTransport`]
pub struct PendingRequest {
    pub text: String,
    pub body: AsyncSender<Vec<u8>>,
}

/// Transport whose responses are written by another task: every
/// `translate` call surfaces as a [`PendingRequest`] on the driver side.
pub struct ChannelTransport {
    requests: AsyncSender<PendingRequest>,
    body_capacity: usize,
    fail_with: Option<u16>,
}

impl ChannelTransport {
    pub fn new(body_capacity: usize) -> (Self, AsyncReceiver<PendingRequest>) {
        let (requests, driver) = kanal::unbounded_async();
        (
            Self {
                requests,
                body_capacity,
                fail_with: None,
            },
            driver,
        )
    }

    /// Reject every request with the given HTTP status
    pub fn failing(mut self, status: u16) -> Self {
        self.fail_with = Some(status);
        self
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn translate(&self, text: &str) -> Result<Box<dyn ByteStream>, TransportError> {
        if let Some(status) = self.fail_with {
            return Err(TransportError::Status(status));
        }

        let (body, stream) = ChannelStream::pair(self.body_capacity);
        self.requests
            .send(PendingRequest {
                text: text.to_string(),
                body,
            })
            .await
            .map_err(|e| TransportError::Other(format!("request driver gone: {e}")))?;

        Ok(Box::new(stream))
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "channel".to_string(),
            streaming: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stream_ends_when_sender_dropped() {
        let (tx, mut stream) = ChannelStream::pair(4);

        tx.send(b"{\"a\"".to_vec()).await.unwrap();
        tx.send(b": 1}".to_vec()).await.unwrap();
        drop(tx);

        assert_eq!(stream.next_chunk().await.unwrap(), Some(b"{\"a\"".to_vec()));
        assert_eq!(stream.next_chunk().await.unwrap(), Some(b": 1}".to_vec()));
        assert_eq!(stream.next_chunk().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_transport_surfaces_requests() {
        let (transport, driver) = ChannelTransport::new(4);

        let mut stream = transport.translate("犬").await.unwrap();
        let request = driver.recv().await.unwrap();
        assert_eq!(request.text, "犬");

        request.body.send(b"{}".to_vec()).await.unwrap();
        drop(request);

        assert_eq!(stream.next_chunk().await.unwrap(), Some(b"{}".to_vec()));
        assert_eq!(stream.next_chunk().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failing_transport() {
        let (transport, _driver) = ChannelTransport::new(4);
        let transport = transport.failing(503);

        let result = transport.translate("犬").await;
        assert!(matches!(result, Err(TransportError::Status(503))));
    }
}
