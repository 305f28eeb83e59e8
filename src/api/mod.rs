//! HTTP routes served by the local authorization listener.
//!
//! - [`callback`] receives the provider redirect, validates `state`, performs
//!   the code exchange and delivers exactly one [`OAuthResult`](crate::types::OAuthResult)
//!   to the waiting caller. Repeated hits are answered with `400`.
//! - [`health`] reports liveness and whether the callback has been received.
//!
//! Both handlers read the per-attempt [`CallbackState`] from a request
//! extension installed by [`crate::server::router`].

mod callback;
mod health;

pub use callback::{CallbackState, callback};
pub use health::health;
