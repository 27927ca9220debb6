use thiserror::Error;

/// Failure of a call to the inference service
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The last status check reported the service offline; no request was sent
    #[error("inference service is offline")]
    Offline,

    #[error("inference service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request to inference service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("inference request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Response text held no recoverable JSON, or the JSON had the wrong shape
    #[error("malformed response: {0}")]
    ResponseMalformed(String),
}

/// Coarse classification of a [`GatewayError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    Offline,
    HttpError,
    Transport,
    Timeout,
    ResponseMalformed,
}

impl GatewayError {
    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            GatewayError::Offline => GatewayErrorKind::Offline,
            GatewayError::Http { .. } => GatewayErrorKind::HttpError,
            GatewayError::Transport(_) => GatewayErrorKind::Transport,
            GatewayError::Timeout(_) => GatewayErrorKind::Timeout,
            GatewayError::ResponseMalformed(_) => GatewayErrorKind::ResponseMalformed,
        }
    }
}
