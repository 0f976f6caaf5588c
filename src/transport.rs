use bytes::Bytes;
use futures::{Stream, StreamExt};
use hyper::ext::ReasonPhrase;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use tracing::info;

use crate::error::{PromptError, Result};

/// Type alias for the response body stream
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// An opened streaming response whose status has not been interpreted yet
pub struct StreamResponse {
    pub status: u16,
    pub status_text: String,
    pub body: ByteStream,
}

impl StreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Status line of a non-streaming response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub status: u16,
    pub status_text: String,
}

/// Type alias for the future returned by `open_stream`
pub type StreamFuture = Pin<Box<dyn Future<Output = Result<StreamResponse>> + Send>>;

/// Type alias for the future returned by `post_empty`
pub type StatusFuture = Pin<Box<dyn Future<Output = Result<StatusLine>> + Send>>;

/// HTTP seam between the prompt client and the backend
pub trait Transport: Send + Sync {
    /// POST a JSON body with bearer auth and keep the response open
    ///
    /// # Arguments
    /// * `url` - The prompt endpoint
    /// * `token` - Bearer token
    /// * `body` - Serialized JSON request
    ///
    /// # Returns
    /// The status line and body stream; non-2xx statuses are not errors here
    fn open_stream(&self, url: String, token: String, body: Bytes) -> StreamFuture;

    /// POST with bearer auth and no body, returning only the status
    fn post_empty(&self, url: String, token: String) -> StatusFuture;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder().build().map_err(|e| {
            PromptError::Transport(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn open_stream_impl(
        client: Client,
        url: String,
        token: String,
        body: Bytes,
    ) -> Result<StreamResponse> {
        info!("Prompt: Sending {} bytes to: {}", body.len(), url);

        // error text drops the URL so a port number cannot trip the 402 match
        let response = client
            .post(&url)
            .header("Content-Type", "application/json")
            .bearer_auth(&token)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                PromptError::Transport(format!("Prompt request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let status_text = reason_phrase(&response);
        info!("Prompt endpoint responded with status: {}", status);

        let body = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| {
                PromptError::Transport(format!("Stream read failed: {}", e.without_url()))
            })
        });

        Ok(StreamResponse {
            status: status.as_u16(),
            status_text,
            body: Box::pin(body),
        })
    }

    async fn post_empty_impl(client: Client, url: String, token: String) -> Result<StatusLine> {
        let response = client
            .post(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| {
                PromptError::Transport(format!("Stop request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let status_text = reason_phrase(&response);
        Ok(StatusLine {
            status: status.as_u16(),
            status_text,
        })
    }
}

/// Reason phrase as sent by the server, or the canonical one for the status
fn reason_phrase(response: &reqwest::Response) -> String {
    match response.extensions().get::<ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
    }
}

impl Transport for HttpTransport {
    fn open_stream(&self, url: String, token: String, body: Bytes) -> StreamFuture {
        let client = self.client.clone();
        Box::pin(async move { Self::open_stream_impl(client, url, token, body).await })
    }

    fn post_empty(&self, url: String, token: String) -> StatusFuture {
        let client = self.client.clone();
        Box::pin(async move { Self::post_empty_impl(client, url, token).await })
    }
}
