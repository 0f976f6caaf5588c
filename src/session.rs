use std::future::Future;
use std::pin::Pin;

use crate::error::{PromptError, Result};

/// Credentials resolved for a single call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub token: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    /// Reject sessions that cannot authenticate a request
    pub fn ensure_usable(self) -> Result<Self> {
        if self.user_id.is_empty() {
            return Err(PromptError::Session("missing user id".to_string()));
        }
        if self.token.is_empty() {
            return Err(PromptError::Session("missing token".to_string()));
        }
        Ok(self)
    }
}

pub type SessionFuture = Pin<Box<dyn Future<Output = Result<Session>> + Send>>;

/// Source of `{user_id, token}` pairs
///
/// Token acquisition and refresh live entirely behind this trait; the client
/// asks for a session on every call and never caches it.
pub trait SessionProvider: Send + Sync {
    fn session(&self) -> SessionFuture;
}

/// Provider that always returns the same credentials
#[derive(Debug, Clone)]
pub struct StaticSession {
    session: Session,
}

impl StaticSession {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            session: Session::new(user_id, token),
        }
    }

    /// Read credentials from `PROMPT_USER_ID` and `PROMPT_TOKEN`
    pub fn from_env() -> Result<Self> {
        let user_id = std::env::var("PROMPT_USER_ID")
            .map_err(|_| PromptError::Session("PROMPT_USER_ID not set".to_string()))?;
        let token = std::env::var("PROMPT_TOKEN")
            .map_err(|_| PromptError::Session("PROMPT_TOKEN not set".to_string()))?;
        Ok(Self::new(user_id, token))
    }
}

impl SessionProvider for StaticSession {
    fn session(&self) -> SessionFuture {
        let session = self.session.clone();
        Box::pin(async move { Ok(session) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_usable() {
        assert!(Session::new("u1", "tok").ensure_usable().is_ok());

        let err = Session::new("", "tok").ensure_usable().unwrap_err();
        assert!(matches!(err, PromptError::Session(_)));

        let err = Session::new("u1", "").ensure_usable().unwrap_err();
        assert!(err.to_string().contains("missing token"));
    }

    #[tokio::test]
    async fn test_static_session() {
        let provider = StaticSession::new("u1", "tok");
        let session = provider.session().await.unwrap();
        assert_eq!(session, Session::new("u1", "tok"));
    }
}
