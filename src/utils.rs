use std::path::PathBuf;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use rand::{Rng, RngCore, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// URL-safe CSRF state carrying 32 bytes of entropy.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn generate_playlist_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(22)
        .map(char::from)
        .collect()
}

pub fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Share of `part` in `total` as a percentage; `0.0` for an empty total.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Parses a `label=dir` library registration.
pub fn parse_library(s: &str) -> Result<(String, PathBuf), String> {
    let Some((label, dir)) = s.split_once('=') else {
        return Err(format!("expected label=dir, got '{s}'"));
    };
    let label = label.trim();
    let dir = dir.trim();
    if label.is_empty() || dir.is_empty() {
        return Err(format!("expected label=dir, got '{s}'"));
    }
    Ok((label.to_string(), PathBuf::from(dir)))
}
