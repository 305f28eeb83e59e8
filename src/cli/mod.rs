//! Terminal front end.
//!
//! Each command builds what it needs, runs one engine or OAuth operation and
//! renders the outcome with the colored output macros and `tabled`. Progress
//! is drawn by a spinner task that drains the engine's progress queue.
//! Failures end the process through [`fail`].

mod auth;
mod export;
mod playlists;
mod progress;
mod token;
mod transfer;

pub use auth::auth;
pub use export::export;
pub use playlists::playlists;
pub use progress::spawn_spinner;
pub use token::token;
pub use transfer::{diff, run};

use crate::{error, error::Error, warning};

/// Reports a fatal error and exits. Cancellation exits with status 130.
pub fn fail(e: Error) -> ! {
    if e.is_cancelled() {
        warning!("Cancelled.");
        std::process::exit(130);
    }
    if e.is_authorization_failure() {
        warning!("Authorization did not complete. Run `plsync auth` to try again.");
    }
    error!("{}", e)
}
