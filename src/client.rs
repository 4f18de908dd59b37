use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

use crate::endpoint::OllamaEndpoint;
use crate::error::OllamaError;
use crate::protocol;

/// Local inference is slow, so give the server minutes rather than seconds.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const RESOURCE_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    /// Health probes keep reqwest's default timeouts.
    probe: Client,
    endpoint: OllamaEndpoint,
}

impl OllamaClient {
    pub fn new(endpoint: OllamaEndpoint) -> Self {
        let client = Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(RESOURCE_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            probe: Client::new(),
            endpoint,
        }
    }

    /// GET /api/version. Returns the raw body on 200.
    pub async fn version(&self) -> Result<String, OllamaError> {
        let response = self.probe.get(self.endpoint.version_url()).send().await?;
        Self::ok_body(response).await
    }

    /// GET /api/tags and extract the model names.
    pub async fn list_models(&self) -> Result<Vec<String>, OllamaError> {
        let url = self.endpoint.tags_url();
        log::debug!("Fetching models from: {}", url);

        let response = self.client.get(&url).send().await?;
        let body = Self::ok_body(response).await?;
        protocol::parse_model_catalog(&body).map_err(OllamaError::Decode)
    }

    /// POST an already encoded generation request to /api/generate.
    ///
    /// The whole NDJSON body is buffered and returned undecoded.
    pub async fn generate(&self, body: Vec<u8>) -> Result<String, OllamaError> {
        let response = self
            .client
            .post(self.endpoint.generate_url())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        Self::ok_body(response).await
    }

    async fn ok_body(response: Response) -> Result<String, OllamaError> {
        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "No error message".to_string());
            return Err(OllamaError::Protocol {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one raw HTTP reply, then hang up.
    async fn serve_raw(reply: &'static str) -> OllamaEndpoint {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local_addr").port();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        OllamaEndpoint::new("127.0.0.1", port)
    }

    #[tokio::test]
    async fn error_status_survives_a_truncated_body() {
        let endpoint = serve_raw(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\nConnection: close\r\n\r\ncut short",
        )
        .await;
        let client = OllamaClient::new(endpoint);

        match client.generate(b"{}".to_vec()).await {
            Err(OllamaError::Protocol { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected a 500 protocol error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn error_status_keeps_the_body() {
        let endpoint = serve_raw(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 4\r\nConnection: close\r\n\r\nnope",
        )
        .await;

        match OllamaClient::new(endpoint).version().await {
            Err(OllamaError::Protocol { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "nope");
            }
            other => panic!("expected a 404 protocol error, got {:?}", other),
        }
    }
}
