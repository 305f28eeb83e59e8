//! Token sources and the refresh-notification interceptor.
//!
//! A [`TokenSource`] hands out a currently valid token. [`RefreshingTokenSource`]
//! renews it through the provider's token endpoint shortly before expiry;
//! [`NotifyingTokenSource`] wraps any source and reports each distinct access
//! token it observes so the caller can persist it.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Mutex,
};

use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    oauth::TokenEndpoint,
    types::Token,
    utils,
};

/// Seconds before expiry at which a token is renewed.
pub const EXPIRY_BUFFER_SECS: u64 = 240;

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<Token>;
}

pub struct RefreshingTokenSource {
    endpoint: TokenEndpoint,
    current: tokio::sync::Mutex<Token>,
}

impl RefreshingTokenSource {
    pub fn new(endpoint: TokenEndpoint, token: Token) -> Self {
        Self {
            endpoint,
            current: tokio::sync::Mutex::new(token),
        }
    }
}

#[async_trait]
impl TokenSource for RefreshingTokenSource {
    async fn token(&self) -> Result<Token> {
        let mut current = self.current.lock().await;
        if !current.expires_within(utils::now_secs(), EXPIRY_BUFFER_SECS) {
            return Ok(current.clone());
        }

        if current.refresh_token.is_empty() {
            return Err(Error::RefreshFailed(
                "token expired and no refresh token is available".into(),
            ));
        }

        tracing::info!("access token near expiry; refreshing");
        let renewed = self.endpoint.refresh(&current.refresh_token).await?;
        *current = renewed.clone();
        Ok(renewed)
    }
}

pub type RefreshCallback = Box<dyn Fn(&Token) + Send + Sync>;

/// Calls `on_refresh` whenever the wrapped source yields an access token that
/// differs from the last one seen, including the very first.
///
/// The wrapped source's errors are returned untouched and never reach the
/// callback. A panicking callback is logged and does not affect the token
/// returned to the caller.
pub struct NotifyingTokenSource<S> {
    inner: S,
    last_seen: Mutex<Option<String>>,
    on_refresh: Option<RefreshCallback>,
}

impl<S: TokenSource> NotifyingTokenSource<S> {
    pub fn new(inner: S, on_refresh: Option<RefreshCallback>) -> Self {
        Self {
            inner,
            last_seen: Mutex::new(None),
            on_refresh,
        }
    }

    /// Treats `token` as already seen, so only later changes are reported.
    pub fn with_known(self, token: &Token) -> Self {
        self.remember(&token.access_token);
        self
    }

    /// Returns true if `access_token` differs from the last one seen.
    fn remember(&self, access_token: &str) -> bool {
        let mut last = match self.last_seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if last.as_deref() == Some(access_token) {
            return false;
        }
        *last = Some(access_token.to_string());
        true
    }
}

#[async_trait]
impl<S: TokenSource> TokenSource for NotifyingTokenSource<S> {
    async fn token(&self) -> Result<Token> {
        let token = self.inner.token().await?;

        if self.remember(&token.access_token) {
            if let Some(callback) = &self.on_refresh {
                if catch_unwind(AssertUnwindSafe(|| callback(&token))).is_err() {
                    tracing::error!("token refresh callback panicked");
                }
            }
        }

        Ok(token)
    }
}
