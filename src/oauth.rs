//! Local-callback OAuth2 authorization code flow with PKCE.
//!
//! [`Authenticator::authorize`] starts a short-lived listener on the
//! redirect address, sends the user to the provider's consent page and waits
//! for whichever comes first: the callback result, a listener failure, the
//! timeout or cancellation. The listener is shut down on every exit path.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::{
    api::CallbackState,
    config,
    error::{Error, Result},
    server::CallbackServer,
    types::{OAuthResult, Token},
    utils, warning,
};

/// How long the user has to complete consent in the browser.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);
/// Grace period for in-flight requests when the listener stops.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const DEFAULT_EXPIRES_IN: u64 = 3600;

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub auth_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub host: String,
    pub port: u16,
}

impl OAuthConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            auth_url: config::oauth_auth_url()?,
            token_url: config::oauth_token_url()?,
            client_id: config::oauth_client_id()?,
            client_secret: config::oauth_client_secret(),
            redirect_uri: config::oauth_redirect_uri()?,
            scope: config::oauth_scope()?,
            host: config::server_host(),
            port: config::server_port()?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Provider consent URL carrying the PKCE challenge and CSRF state.
    pub fn authorization_url(&self, state: &str, code_challenge: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "S256"),
                ("scope", self.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| Error::InvalidArgument(format!("invalid authorization URL: {e}")))?;
        Ok(url.into())
    }
}

/// Trades an authorization code for a token.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(&self, code: &str, code_verifier: &str) -> Result<Token>;
}

/// Opens the consent page for the user.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        webbrowser::open(url)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// The provider's token endpoint, used for both code exchange and refresh.
#[derive(Debug, Clone)]
pub struct TokenEndpoint {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
}

impl TokenEndpoint {
    pub fn new(config: &OAuthConfig) -> Self {
        Self {
            client: Client::new(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    /// Uses the `refresh_token` grant. A response without a new refresh token
    /// keeps the one that was presented.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token> {
        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
        ];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let token = self
            .request(&form)
            .await
            .map_err(|e| Error::RefreshFailed(e.to_string()))?;
        if token.access_token.is_empty() {
            return Err(Error::RefreshFailed("response had no access token".into()));
        }

        Ok(into_token(token, refresh_token))
    }

    async fn request(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let res = self.client.post(&self.token_url).form(form).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(Error::ApiRequest(format!("token endpoint returned {status}: {body}")));
        }

        Ok(res.json::<TokenResponse>().await?)
    }
}

#[async_trait]
impl TokenExchanger for TokenEndpoint {
    async fn exchange(&self, code: &str, code_verifier: &str) -> Result<Token> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("code", code),
            ("code_verifier", code_verifier),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let token = self
            .request(&form)
            .await
            .map_err(|e| Error::TokenExchangeFailed(e.to_string()))?;
        if token.access_token.is_empty() {
            return Err(Error::NoTokenReceived);
        }

        Ok(into_token(token, ""))
    }
}

fn into_token(res: TokenResponse, previous_refresh: &str) -> Token {
    Token {
        access_token: res.access_token,
        refresh_token: res
            .refresh_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| previous_refresh.to_string()),
        scope: res.scope.unwrap_or_default(),
        expires_in: res.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
        obtained_at: utils::now_secs(),
    }
}

pub struct Authenticator {
    config: OAuthConfig,
    exchanger: Arc<dyn TokenExchanger>,
    timeout: Duration,
}

impl Authenticator {
    pub fn new(config: OAuthConfig, exchanger: Arc<dyn TokenExchanger>) -> Self {
        Self {
            config,
            exchanger,
            timeout: CALLBACK_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Runs one authorization attempt and returns its single result.
    ///
    /// A browser that fails to open is not fatal: the consent URL is printed
    /// for manual navigation and the wait continues.
    pub async fn authorize(
        &self,
        cancel: &CancellationToken,
        browser: &dyn BrowserLauncher,
    ) -> OAuthResult {
        let state = utils::generate_state();
        let code_verifier = utils::generate_code_verifier();
        let code_challenge = utils::generate_code_challenge(&code_verifier);
        let auth_url = self.config.authorization_url(&state, &code_challenge)?;

        let (callback_state, result_rx) =
            CallbackState::new(state, code_verifier, Arc::clone(&self.exchanger));
        let mut server = CallbackServer::start(self.config.listen_addr(), callback_state);

        if let Err(e) = browser.open(&auth_url) {
            tracing::warn!(error = %e, "failed to open browser");
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                auth_url
            );
        }

        let outcome = tokio::select! {
            result = result_rx => result.unwrap_or(Err(Error::NoTokenReceived)),
            err = server.failed() => Err(err),
            _ = tokio::time::sleep(self.timeout) => Err(Error::Timeout(format!(
                "no authorization callback within {}s",
                self.timeout.as_secs()
            ))),
            _ = cancel.cancelled() => Err(Error::Cancelled),
        };

        server.shutdown(SHUTDOWN_GRACE).await;

        match &outcome {
            Ok(_) => tracing::info!("authorization completed"),
            Err(e) => tracing::warn!(error = %e, "authorization failed"),
        }
        outcome
    }
}
