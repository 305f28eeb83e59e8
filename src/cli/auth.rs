use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    cli::fail,
    info,
    management::TokenManager,
    oauth::{Authenticator, OAuthConfig, SystemBrowser, TokenEndpoint},
    success,
};

pub async fn auth(cancel: &CancellationToken) {
    let config = match OAuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    info!(
        "Waiting for authorization callback on {}...",
        config.listen_addr()
    );

    let exchanger = Arc::new(TokenEndpoint::new(&config));
    let authenticator = Authenticator::new(config, exchanger);

    let token = match authenticator.authorize(cancel, &SystemBrowser).await {
        Ok(token) => token,
        Err(e) => fail(e),
    };

    let token_manager = TokenManager::new(token);
    if let Err(e) = token_manager.persist().await {
        fail(e);
    }

    success!("Authentication successful!");
}
