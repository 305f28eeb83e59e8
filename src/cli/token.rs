use std::sync::{Arc, Mutex};

use crate::{
    cli::fail,
    management::TokenManager,
    oauth::{OAuthConfig, TokenEndpoint},
    refresh::{NotifyingTokenSource, RefreshingTokenSource, TokenSource},
    types::Token,
    warning,
};

/// Prints a valid access token, refreshing and persisting it when needed.
pub async fn token() {
    let mut token_mgr = match TokenManager::load().await {
        Ok(mgr) => mgr,
        Err(e) => {
            warning!("No stored token. Please run plsync auth");
            fail(e);
        }
    };
    let config = match OAuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    let current = token_mgr.current_token().clone();
    let refreshed: Arc<Mutex<Option<Token>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&refreshed);

    let source = NotifyingTokenSource::new(
        RefreshingTokenSource::new(TokenEndpoint::new(&config), current.clone()),
        Some(Box::new(move |t: &Token| {
            if let Ok(mut slot) = slot.lock() {
                *slot = Some(t.clone());
            }
        })),
    )
    .with_known(&current);

    let token = match source.token().await {
        Ok(token) => token,
        Err(e) => fail(e),
    };

    let renewed = refreshed.lock().ok().and_then(|mut slot| slot.take());
    if let Some(renewed) = renewed {
        token_mgr.replace(renewed);
        if let Err(e) = token_mgr.persist().await {
            warning!("Failed to save refreshed token. Err: {}", e);
        }
    }

    println!("{}", token.access_token);
}
