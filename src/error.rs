//! Error taxonomy shared by the engine, the OAuth flow and the token sources.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("access token expired")]
    TokenExpired,

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("track not found: '{title}' by '{artist}'")]
    TrackNotFound { title: String, artist: String },

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("missing required argument: {0}")]
    MissingArgument(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("API request failed: {0}")]
    ApiRequest(String),

    #[error("invalid state parameter in authorization callback")]
    CsrfStateMismatch,

    #[error("authorization denied: {error} - {description}")]
    AuthorizationDenied { error: String, description: String },

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("no token received")]
    NoTokenReceived,

    #[error("callback listener failed to start: {0}")]
    ListenerStartupFailed(String),

    #[error("no tracks were matched out of {total}; refusing to create an empty playlist")]
    EmptyResultSet { total: usize },

    #[error("operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// True for failures that come out of the authorization callback flow.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            Error::CsrfStateMismatch
                | Error::AuthorizationDenied { .. }
                | Error::TokenExchangeFailed(_)
                | Error::NoTokenReceived
                | Error::ListenerStartupFailed(_)
                | Error::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
