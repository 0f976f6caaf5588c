//! # Prompt Stream
//!
//! Client for a chat backend that streams AI-generated answers over a
//! long-lived Server-Sent-Events response.
//!
//! ## Overview
//!
//! One call to [`PromptClient::prompt`]:
//! - resolves `{user_id, token}` from a [`SessionProvider`]
//! - POSTs the prompt body (content parts plus device id, local time,
//!   personality and memory summaries)
//! - decodes SSE frames and dispatches them, in order, to a [`StreamHandler`]
//! - returns the concatenated `chat.content` deltas
//!
//! [`PromptClient::cancel`] is an independent request that stops whatever
//! stream is active for the user. The backend allows at most one active
//! stream per user, so cancellation is addressed by user rather than by call.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prompt_stream::{ClientConfig, ContentPart, PromptCallbacks, PromptClient, PromptOptions, StaticSession};
//! use std::sync::Arc;
//!
//! # async fn run() -> prompt_stream::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let client = PromptClient::new(config, Arc::new(StaticSession::new("user-1", "token")))?;
//!
//! let callbacks = PromptCallbacks::new().on_text(|delta| print!("{}", delta));
//! let answer = client
//!     .prompt(PromptOptions::new(vec![ContentPart::text("Hello")]), callbacks)
//!     .await?;
//! # let _ = answer;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`client`] - Prompt orchestration and cancellation
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and payment-required classification
//! - [`memory`] - Memory statistics summary for the request body
//! - [`models`] - Wire types: content parts, stream events, request body
//! - [`request`] - Request builder and ambient request context
//! - [`session`] - Credential provider seam
//! - [`streaming`] - SSE decoder, event dispatcher, response accumulator
//! - [`transport`] - HTTP transport seam and reqwest implementation

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod request;
pub mod session;
pub mod streaming;
pub mod transport;

pub use client::PromptClient;
pub use config::ClientConfig;
pub use error::{PromptError, Result};
pub use models::{ContentPart, ContentType, StreamEvent, ToolCallInfo};
pub use request::{PromptOptions, RequestContext};
pub use session::{Session, SessionProvider, StaticSession};
pub use streaming::{PromptCallbacks, StreamHandler};
