use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};

use super::CallbackState;

pub async fn health(Extension(shared_state): Extension<Arc<CallbackState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "callback_received": shared_state.callback_received(),
    }))
}
