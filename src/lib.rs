//! Playlist migration and reconciliation between music services.
//!
//! The crate moves a playlist from one provider to another by searching every
//! track on the destination, compares two playlists that may live on
//! different providers, and exports playlists in bulk. Providers plug in
//! through the [`service::Service`] trait; a directory-backed provider ships
//! in [`library`]. Authorization against a provider uses a local-callback
//! OAuth2 flow ([`oauth`]) and long-lived sessions are kept fresh through
//! [`refresh`].
//!
//! # Modules
//!
//! - `engine` - run, diff and bulk export
//! - `formatter` - export file formats (json, csv, markdown, txt)
//! - `matching` - track identity (ISRC, then normalized title and artist)
//! - `progress` - bounded progress stream consumed by the presentation layer
//! - `service` - provider capability trait and the label registry
//! - `library` - provider over a directory of JSON playlist exports
//! - `oauth`, `server`, `api` - authorization flow and its callback listener
//! - `refresh` - token sources and the refresh-notification interceptor
//! - `management` - token persistence for the command line
//! - `config`, `logging` - environment configuration and diagnostics
//! - `cli` - terminal commands
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use plsync::{engine::{PlaylistEngine, TransferRequest}, library::LibraryService, progress, service::ServiceRegistry};
//! use tokio_util::sync::CancellationToken;
//!
//! let registry = ServiceRegistry::new()
//!     .with("home", Arc::new(LibraryService::new("home", "/music/home")))
//!     .with("work", Arc::new(LibraryService::new("work", "/music/work")));
//! let engine = PlaylistEngine::new(registry);
//! let request = TransferRequest {
//!     from: "home".into(),
//!     to: "work".into(),
//!     source: "Road Trip".into(),
//!     dest_name: "Road Trip (copy)".into(),
//! };
//! let result = engine.run(&CancellationToken::new(), progress::discard(), &request).await?;
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod library;
pub mod logging;
pub mod management;
pub mod matching;
pub mod oauth;
pub mod progress;
pub mod refresh;
pub mod server;
pub mod service;
pub mod types;
pub mod utils;

pub use error::{Error, Result};

/// Prints a status line with a blue `o` marker on stdout.
///
/// ```rust,ignore
/// info!("Waiting for authorization callback on {}...", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a completion line with a green check mark on stdout.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line on stderr and exits with status 1.
///
/// Only the command line layer uses this; library code returns errors.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a notice with a yellow `!` marker on stdout.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
