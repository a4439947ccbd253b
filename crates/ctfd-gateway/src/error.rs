use std::fmt;

/// Failure of a single remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Connection, TLS, timeout, or body read failure.
    Transport(String),
    /// Non-2xx status other than 404.
    Http { status: u16, message: String },
    /// The addressed remote object does not exist.
    NotFound { what: String },
    /// The response body could not be decoded.
    Decode(String),
    /// The remote envelope reported `success: false`.
    Rejected(String),
    /// The pass was cancelled; the call never reached the remote.
    Cancelled,
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, GatewayError::Cancelled)
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(msg) => write!(f, "transport error: {msg}"),
            GatewayError::Http { status, message } => {
                write!(f, "http status {status}: {message}")
            }
            GatewayError::NotFound { what } => write!(f, "not found: {what}"),
            GatewayError::Decode(msg) => write!(f, "undecodable response: {msg}"),
            GatewayError::Rejected(msg) => write!(f, "rejected by remote: {msg}"),
            GatewayError::Cancelled => write!(f, "cancelled before the call was issued"),
        }
    }
}

impl std::error::Error for GatewayError {}
