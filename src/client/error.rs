use thiserror::Error;

/// Failure taxonomy for the client-side session/request layer.
/// Nothing here is retried automatically; every failure propagates to the
/// caller, who decides whether to present it or retry by hand.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("missing required field '{0}'")]
    Validation(&'static str),

    /// Authenticated but not entitled — distinct from "not found".
    #[error("not permitted to access this resource")]
    Authorization,

    /// Sign-in rejected by the authority, or a session that must be
    /// re-established.
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("storage operation failed: {0}")]
    Storage(String),

    /// Any other non-success response, carrying the response text (or the
    /// canonical status reason when the body is empty).
    #[error("request failed with status {status}: {message}")]
    Request { status: u16, message: String },

    #[error("client configuration error: {0}")]
    Config(String),

    /// Connection-level failure before any response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(String),
}
