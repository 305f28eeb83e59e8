use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use axum::{Extension, extract::Query, http::StatusCode, response::Html};
use tokio::sync::oneshot;

use crate::{error::Error, oauth::TokenExchanger, types::OAuthResult};

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Authorization Successful</title></head>
<body style="font-family: sans-serif; text-align: center; margin-top: 20vh;">
    <h2>Authorization successful.</h2>
    <p>You can close this window and return to the terminal.</p>
</body>
</html>"#;

/// Per-attempt state shared between the callback route and the waiting caller.
///
/// The first request flips `hit`; every later request is turned away. The
/// result sender is taken out of its slot on delivery, so at most one
/// [`OAuthResult`] ever reaches the receiver.
pub struct CallbackState {
    expected_state: String,
    code_verifier: String,
    exchanger: Arc<dyn TokenExchanger>,
    hit: AtomicBool,
    result_tx: Mutex<Option<oneshot::Sender<OAuthResult>>>,
}

impl CallbackState {
    pub fn new(
        expected_state: String,
        code_verifier: String,
        exchanger: Arc<dyn TokenExchanger>,
    ) -> (Arc<Self>, oneshot::Receiver<OAuthResult>) {
        let (tx, rx) = oneshot::channel();
        let state = Arc::new(Self {
            expected_state,
            code_verifier,
            exchanger,
            hit: AtomicBool::new(false),
            result_tx: Mutex::new(Some(tx)),
        });
        (state, rx)
    }

    /// Delivers the attempt's result. Returns false if one was already delivered.
    pub fn deliver(&self, result: OAuthResult) -> bool {
        let sender = match self.result_tx.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match sender {
            Some(tx) => {
                // The receiver may have given up after a timeout.
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }

    pub fn callback_received(&self) -> bool {
        self.hit.load(Ordering::Acquire)
    }

    fn claim(&self) -> bool {
        self.hit
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<CallbackState>>,
) -> (StatusCode, Html<&'static str>) {
    if !shared_state.claim() {
        tracing::warn!("rejecting repeated authorization callback");
        return (
            StatusCode::BAD_REQUEST,
            Html("<h4>Callback already processed.</h4>"),
        );
    }

    if params.get("state").map(String::as_str) != Some(shared_state.expected_state.as_str()) {
        tracing::warn!("authorization callback with mismatched state");
        shared_state.deliver(Err(Error::CsrfStateMismatch));
        return (
            StatusCode::BAD_REQUEST,
            Html("<h4>Invalid state parameter.</h4>"),
        );
    }

    let Some(code) = params.get("code").filter(|c| !c.is_empty()) else {
        let error = params.get("error").cloned().unwrap_or_default();
        let description = params
            .get("error_description")
            .cloned()
            .unwrap_or_default();
        tracing::warn!(%error, %description, "authorization denied");
        shared_state.deliver(Err(Error::AuthorizationDenied { error, description }));
        return (
            StatusCode::BAD_REQUEST,
            Html("<h4>Authorization failed.</h4>"),
        );
    };

    match shared_state
        .exchanger
        .exchange(code, &shared_state.code_verifier)
        .await
    {
        Ok(token) if token.access_token.is_empty() => {
            shared_state.deliver(Err(Error::NoTokenReceived));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h4>No token received.</h4>"),
            )
        }
        Ok(token) => {
            shared_state.deliver(Ok(token));
            (StatusCode::OK, Html(SUCCESS_PAGE))
        }
        Err(e) => {
            tracing::warn!(error = %e, "token exchange failed");
            shared_state.deliver(Err(exchange_failure(e)));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h4>Token exchange failed.</h4>"),
            )
        }
    }
}

fn exchange_failure(e: Error) -> Error {
    match e {
        Error::TokenExchangeFailed(_) | Error::NoTokenReceived => e,
        other => Error::TokenExchangeFailed(other.to_string()),
    }
}
