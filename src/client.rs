use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::error::{PromptError, Result};
use crate::request::{PromptOptions, RequestContext, build_request};
use crate::session::{Session, SessionProvider};
use crate::streaming::{EventDispatcher, StreamHandler};
use crate::transport::{HttpTransport, Transport};

/// Streaming prompt client with an out-of-band stop channel
///
/// Each `prompt` call owns its own decoder, accumulator and handler; the
/// client itself holds no per-call state and is cheap to clone.
#[derive(Clone)]
pub struct PromptClient {
    config: Arc<ClientConfig>,
    device_id: String,
    sessions: Arc<dyn SessionProvider>,
    transport: Arc<dyn Transport>,
}

impl PromptClient {
    pub fn new(config: ClientConfig, sessions: Arc<dyn SessionProvider>) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new()?);
        Self::with_transport(config, sessions, transport)
    }

    pub fn with_transport(
        config: ClientConfig,
        sessions: Arc<dyn SessionProvider>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;
        let device_id = config.device_id_or_generate();

        Ok(Self {
            config: Arc::new(config),
            device_id,
            sessions,
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Stream one prompt, returning the concatenated `chat.content` deltas
    pub async fn prompt<H: StreamHandler>(&self, options: PromptOptions, handler: H) -> Result<String> {
        let context = RequestContext::now(self.device_id.clone());
        self.prompt_with_context(options, &context, handler).await
    }

    /// Like [`PromptClient::prompt`] with an explicit device id and local time
    pub async fn prompt_with_context<H: StreamHandler>(
        &self,
        options: PromptOptions,
        context: &RequestContext,
        handler: H,
    ) -> Result<String> {
        let session = self.resolve_session().await?;

        let request = build_request(options, &session, context);
        let body = Bytes::from(serde_json::to_vec(&request)?);

        let response = self
            .transport
            .open_stream(self.config.prompt_url(), session.token, body)
            .await
            .map_err(PromptError::normalize)?;

        if response.status == 402 {
            return Err(PromptError::PaymentRequired);
        }
        if !response.is_success() {
            return Err(PromptError::Http {
                status: response.status,
                status_text: response.status_text,
            });
        }

        match EventDispatcher::new(handler).consume(response.body).await {
            Ok((text, stats)) => {
                debug!(
                    frames = stats.frames,
                    events = stats.events,
                    rejected = stats.rejected,
                    unknown = stats.unknown,
                    malformed = stats.malformed,
                    "Prompt stream closed"
                );
                info!("Completed streaming, total length: {} chars", text.chars().count());
                Ok(text)
            }
            Err(e) => {
                let e = e.normalize();
                error!("Prompt stream failed: {}", e);
                Err(e)
            }
        }
    }

    /// Ask the backend to stop whatever stream is active for the current user.
    ///
    /// Returns `true` only when the backend confirmed a stop. A 404 means no
    /// stream was running and is not treated as a failure; every other
    /// failure is logged and reported as `false`.
    pub async fn cancel(&self) -> bool {
        match self.try_cancel().await {
            Ok(stopped) => stopped,
            Err(e) => {
                error!("Failed to cancel prompt: {}", e);
                false
            }
        }
    }

    async fn try_cancel(&self) -> Result<bool> {
        let session = self.resolve_session().await?;
        let url = self.config.stop_url(&session.user_id);
        let line = self.transport.post_empty(url, session.token).await?;

        match line.status {
            404 => {
                debug!("No active prompt stream to cancel");
                Ok(false)
            }
            200..=299 => {
                info!("Prompt stream cancelled");
                Ok(true)
            }
            status => Err(PromptError::Http {
                status,
                status_text: line.status_text,
            }),
        }
    }

    async fn resolve_session(&self) -> Result<Session> {
        let session = self.sessions.session().await.map_err(|e| match e {
            PromptError::Session(_) => e,
            other => PromptError::Session(other.to_string()),
        })?;
        session.ensure_usable()
    }
}
