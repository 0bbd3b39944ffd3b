use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use chroma_overlay::{
    app::OverlayApp,
    chroma::KeyColor,
    config::Config,
    control::{spawn_console, SharedState},
    error::OverlayError,
    video::DefaultMediaOpener,
};

/// Exit status when the user closes the file dialog without choosing anything
const EXIT_NO_SELECTION: u8 = 2;

#[derive(Parser)]
#[command(
    name = "chroma-overlay",
    version,
    about = "Play videos as chroma-keyed desktop overlays",
    long_about = "Chroma-Overlay plays videos in a borderless, always-on-top window and keys out their background color so only the subject floats on the desktop. Type 'info', 'tolerance', 'reset', 'auto', 'pause', 'next', 'prev' or 'quit' on stdin to control it."
)]
struct Cli {
    /// Media files to play in order; opens a file dialog when omitted
    files: Vec<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Detect the key color from each video's border on load
    #[arg(short, long)]
    auto_chroma: bool,

    /// Color tolerance (0-255)
    #[arg(short, long)]
    tolerance: Option<u8>,

    /// Key color as R,G,B or #RRGGBB
    #[arg(short, long)]
    key_color: Option<KeyColor>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<OverlayError>() {
            Some(err) if err.is_empty_selection() => {
                info!("{}", err.user_message());
                ExitCode::from(EXIT_NO_SELECTION)
            }
            Some(err) => {
                error!("{}", err.user_message());
                ExitCode::FAILURE
            }
            None => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("Starting Chroma-Overlay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    if let Some(key_color) = cli.key_color {
        config.chroma.key_color = key_color;
    }
    if let Some(tolerance) = cli.tolerance {
        config.chroma.tolerance = tolerance;
    }
    if cli.auto_chroma {
        config.chroma.auto_detect = true;
    }
    config.validate()?;

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(config.playback.mask_threads)
        .build_global()
    {
        warn!("Using the default mask thread pool: {}", e);
    }

    let shared = Arc::new(SharedState::new(
        config.chroma.key_color,
        config.chroma.default_tolerance(),
        config.chroma.auto_detect,
    ));
    info!(
        "Key color {} with tolerance {}{}",
        config.chroma.key_color,
        config.chroma.tolerance,
        if config.chroma.auto_detect { ", auto-detect on" } else { "" }
    );

    // The control console is the only async task; one worker is enough
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_io()
        .build()
        .context("failed to start the control runtime")?;
    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    spawn_console(runtime.handle(), intent_tx, Arc::clone(&shared));

    let mut app = OverlayApp::new(
        &config,
        Arc::clone(&shared),
        intent_rx,
        Box::new(DefaultMediaOpener::new()),
    )?;
    let result = app.start(cli.files).and_then(|()| app.run());
    app.teardown();

    // Blocked stdin reads would otherwise hold the process open
    runtime.shutdown_background();
    result.map_err(Into::into)
}
