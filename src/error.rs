use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    /// Billing or quota exhaustion signaled by the backend.
    #[error("Payment required")]
    PaymentRequired,

    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    /// Terminal `error` event received mid-stream.
    #[error("{0}")]
    Stream(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, PromptError>;

impl PromptError {
    pub fn is_payment_required(&self) -> bool {
        matches!(self, PromptError::PaymentRequired)
    }

    /// Fold any error whose message mentions a 402 into the `PaymentRequired` sentinel.
    ///
    /// Some transports only report status-derived failures as error text, so the
    /// check is applied both when opening the stream and to whatever escapes the
    /// frame loop.
    pub fn normalize(self) -> Self {
        if self.is_payment_required() {
            return self;
        }
        if mentions_payment_required(&self.to_string()) {
            PromptError::PaymentRequired
        } else {
            self
        }
    }
}

pub(crate) fn mentions_payment_required(message: &str) -> bool {
    message.contains("402") || message.contains("Payment Required")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_message_match() {
        let err = PromptError::Transport("server returned 402".to_string()).normalize();
        assert!(err.is_payment_required());

        let err = PromptError::Stream("Payment Required: top up".to_string()).normalize();
        assert!(err.is_payment_required());
    }

    #[test]
    fn test_normalize_leaves_other_errors() {
        let err = PromptError::Stream("quota exceeded".to_string()).normalize();
        assert_eq!(err.to_string(), "quota exceeded");

        let err = PromptError::Http {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        }
        .normalize();
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
    }

    #[test]
    fn test_payment_required_is_case_sensitive() {
        assert!(!mentions_payment_required("payment required"));
        assert!(mentions_payment_required("HTTP 402"));
    }
}
