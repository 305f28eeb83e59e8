use std::{path::PathBuf, sync::Arc};

use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tokio_util::sync::CancellationToken;

use plsync::{
    cli, config,
    engine::{BulkExportOptions, PlaylistEngine, PlaylistRef, TransferRequest},
    error,
    formatter::ExportFormat,
    library::LibraryService,
    logging,
    service::{Credentials, Service, ServiceRegistry},
    utils,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Register a playlist library directory under a label (label=dir); can be repeated
    #[clap(
        long = "library",
        global = true,
        value_parser = utils::parse_library,
        action = ArgAction::Append,
        num_args = 1
    )]
    libraries: Vec<(String, PathBuf)>,

    /// Diagnostics filter, overrides PLSYNC_LOG (e.g. "plsync=debug")
    #[clap(long, global = true)]
    log: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with the music provider
    Auth,

    /// Print a valid access token, refreshing it if needed
    Token,

    /// List playlists on a service
    Playlists(PlaylistsOptions),

    /// Migrate a playlist to another service
    Run(RunOptions),

    /// Compare two playlists, possibly on different services
    Diff(DiffOptions),

    /// Export playlists to files
    Export(ExportOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Service label
    label: String,

    /// Show at most this many playlists (0 shows all)
    #[clap(long, default_value_t = 0)]
    limit: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct RunOptions {
    /// Source service label
    from: String,
    /// Destination service label
    to: String,
    /// Source playlist id or exact name
    source: String,
    /// Name of the playlist to create
    name: String,
}

#[derive(Parser, Debug, Clone)]
pub struct DiffOptions {
    source_label: String,
    source_id: String,
    dest_label: String,
    dest_id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ExportOptions {
    /// Service label
    label: String,

    /// Playlist ids to export
    #[clap(required = true)]
    ids: Vec<String>,

    /// Output directory
    #[clap(long)]
    out: PathBuf,

    /// Concurrent exports (capped at 10)
    #[clap(long, default_value_t = 5)]
    workers: usize,

    /// Export requests per second
    #[clap(long, default_value_t = 5.0)]
    rate: f64,

    /// Output format: json, csv, markdown or txt
    #[clap(long, default_value_t = ExportFormat::Json)]
    format: ExportFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

async fn build_registry(libraries: &[(String, PathBuf)]) -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    for (label, dir) in libraries {
        let library = LibraryService::new(label.clone(), dir.clone());
        if let Err(e) = library.authenticate(&Credentials::new()).await {
            error!("Cannot use library '{}'. Err: {}", label, e);
        }
        registry.register(label.clone(), Arc::new(library));
    }
    registry
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
    cancel
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.log.as_deref());

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cancel = cancel_on_ctrl_c();

    match cli.command {
        Command::Auth => cli::auth(&cancel).await,
        Command::Token => cli::token().await,
        Command::Playlists(opt) => {
            let registry = build_registry(&cli.libraries).await;
            cli::playlists(&registry, &opt.label, opt.limit).await
        }
        Command::Run(opt) => {
            let engine = PlaylistEngine::new(build_registry(&cli.libraries).await);
            let request = TransferRequest {
                from: opt.from,
                to: opt.to,
                source: opt.source,
                dest_name: opt.name,
            };
            cli::run(&engine, &cancel, request).await
        }
        Command::Diff(opt) => {
            let engine = PlaylistEngine::new(build_registry(&cli.libraries).await);
            cli::diff(
                &engine,
                &cancel,
                PlaylistRef::new(&opt.source_label, &opt.source_id),
                PlaylistRef::new(&opt.dest_label, &opt.dest_id),
            )
            .await
        }
        Command::Export(opt) => {
            let engine = PlaylistEngine::new(build_registry(&cli.libraries).await);
            let mut options = BulkExportOptions::new(opt.out);
            options.workers = opt.workers;
            options.rate_limit = opt.rate;
            options.format = opt.format;
            cli::export(&engine, &cancel, &opt.label, &opt.ids, options).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
