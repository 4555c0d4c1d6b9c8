use async_trait::async_trait;

use crate::{ByteStream, ProviderMetadata, Transport, TransportError};

/// Streams translations from an HTTP backend that answers a JSON `POST`
/// with a chunked JSON document
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_url: String,
    text_field: String,
}

impl HttpTransport {
    pub fn new(api_url: String, text_field: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            text_field,
        }
    }

    pub fn request_body(&self, text: &str) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert(
            self.text_field.clone(),
            serde_json::Value::String(text.to_string()),
        );
        serde_json::Value::Object(body)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn translate(&self, text: &str) -> Result<Box<dyn ByteStream>, TransportError> {
        tracing::debug!("POST {} ({} chars)", self.api_url, text.chars().count());

        let response = self
            .client
            .post(&self.api_url)
            .json(&self.request_body(text))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        Ok(Box::new(ResponseStream { response }))
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "http".to_string(),
            streaming: true,
        }
    }
}

/// Body of an in-flight response; dropping it closes the connection
struct ResponseStream {
    response: reqwest::Response,
}

#[async_trait]
impl ByteStream for ResponseStream {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let chunk = self.response.chunk().await?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_uses_configured_field() {
        let transport = HttpTransport::new(
            "http://localhost:3000/translate".to_string(),
            "translationText".to_string(),
        );

        let body = transport.request_body("猫");
        assert_eq!(body, serde_json::json!({ "translationText": "猫" }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_transport_error() {
        // Port 9 (discard) is closed on test machines
        let transport = HttpTransport::new(
            "http://127.0.0.1:9/translate".to_string(),
            "translationText".to_string(),
        );

        let result = transport.translate("猫").await;
        assert!(matches!(result, Err(TransportError::Network(_))));
    }
}
