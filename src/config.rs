//! Environment-driven configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the platform's local data directory:
//! - Linux: `~/.local/share/plsync/.env`
//! - macOS: `~/Library/Application Support/plsync/.env`
//! - Windows: `%LOCALAPPDATA%/plsync/.env`
//!
//! Variables already set in the environment win over the file.

use std::{env, path::PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Path of the optional `.env` file.
pub fn env_file() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("plsync/.env");
    path
}

/// Loads the `.env` file if there is one. A missing file is not an error.
pub async fn load_env() -> Result<()> {
    let path = env_file();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "loaded environment file");
            Ok(())
        }
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::InvalidArgument(format!(
            "failed to load {}: {e}",
            path.display()
        ))),
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::MissingArgument(format!(
            "environment variable {name} must be set"
        ))),
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Host the authorization callback listener binds to.
pub fn server_host() -> String {
    optional("PLSYNC_SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string())
}

pub fn server_port() -> Result<u16> {
    match optional("PLSYNC_SERVER_PORT") {
        None => Ok(DEFAULT_SERVER_PORT),
        Some(port) => port.trim().parse().map_err(|_| {
            Error::InvalidArgument(format!("PLSYNC_SERVER_PORT is not a valid port: {port}"))
        }),
    }
}

/// Provider consent page, e.g. `https://accounts.example.com/authorize`.
pub fn oauth_auth_url() -> Result<String> {
    required("OAUTH_AUTH_URL")
}

pub fn oauth_token_url() -> Result<String> {
    required("OAUTH_TOKEN_URL")
}

pub fn oauth_client_id() -> Result<String> {
    required("OAUTH_CLIENT_ID")
}

/// Only confidential clients have one; PKCE clients leave it unset.
pub fn oauth_client_secret() -> Option<String> {
    optional("OAUTH_CLIENT_SECRET")
}

pub fn oauth_redirect_uri() -> Result<String> {
    required("OAUTH_REDIRECT_URI")
}

pub fn oauth_scope() -> Result<String> {
    required("OAUTH_SCOPE")
}
