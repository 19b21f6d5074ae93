//! LOOKOUT - Detection Alert Dashboard
//!
//! A terminal dashboard for a video-based object/event detector: a rolling
//! list of detection alerts merged live from a polled snapshot endpoint and
//! an optional push channel, alongside a liveness view of the proxied video
//! stream.
//!
//! ## Usage
//!
//! ```bash
//! # With a config file at ~/.lookout/config.yaml
//! lookout
//!
//! # Entirely from the command line
//! lookout --alerts-url http://detector:9000/api/alerts \
//!         --push-url http://detector:9000/api/push \
//!         --feed-url http://detector:9000/api/video-feed
//!
//! # With verbose logging
//! lookout -v
//! ```

use std::panic;
use std::process::ExitCode;

use clap::Parser;
use lookout_core::{config::DashboardConfig, init_logging, LogGuard, LookoutError};
use lookout_feed::{FeedCoordinator, HttpPushSource, MediaMonitor};
use lookout_tui::App;
use tracing::{error, info};

/// LOOKOUT Detection Alert Dashboard
///
/// A terminal interface for watching live detection alerts and the
/// detector's video feed.
#[derive(Parser, Debug)]
#[command(name = "lookout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.lookout/logs/)
    #[arg(long)]
    log_dir: Option<std::path::PathBuf>,

    /// Configuration file (defaults to ~/.lookout/config.yaml)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Alerts snapshot endpoint (overrides the config file)
    #[arg(long)]
    alerts_url: Option<String>,

    /// Live push channel address (overrides the config file)
    #[arg(long)]
    push_url: Option<String>,

    /// Media proxy stream address (overrides the config file)
    #[arg(long)]
    feed_url: Option<String>,

    /// Snapshot poll interval in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Maximum number of retained alerts
    #[arg(long)]
    history_cap: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(guidance) = e.guidance() {
                eprintln!("  {guidance}");
            }
            return ExitCode::from(1);
        }
    };

    // Initialize logging
    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::from(1);
        }
    };

    // Install panic hook to ensure terminal cleanup
    install_panic_hook();

    info!(alerts_url = %config.alerts_url, "starting LOOKOUT dashboard");

    match run_app(config) {
        Ok(()) => {
            info!("LOOKOUT dashboard exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("LOOKOUT dashboard error: {e}");
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Build the effective configuration: config file (if present or explicitly
/// given) with CLI flags layered on top. A missing default config file is
/// fine when `--alerts-url` supplies the one required field.
fn load_config(cli: &Cli) -> lookout_core::Result<DashboardConfig> {
    let mut config = match DashboardConfig::load(cli.config.clone()) {
        Ok(config) => config,
        Err(LookoutError::ConfigNotFound { path, source }) => {
            if cli.config.is_none() && cli.alerts_url.is_some() {
                DashboardConfig::default()
            } else {
                return Err(LookoutError::ConfigNotFound { path, source });
            }
        }
        Err(e) => return Err(e),
    };

    if let Some(url) = &cli.alerts_url {
        config.alerts_url = url.clone();
    }
    if let Some(url) = &cli.push_url {
        config.push_url = Some(url.clone());
    }
    if let Some(url) = &cli.feed_url {
        config.feed_url = Some(url.clone());
    }
    if let Some(ms) = cli.poll_interval_ms {
        config.poll_interval_ms = ms;
    }
    if let Some(cap) = cli.history_cap {
        config.history_cap = cap;
    }

    config.validate()?;
    Ok(config)
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> lookout_core::Result<LogGuard> {
    let debug = cli.verbose > 0;
    init_logging(cli.log_dir.clone(), debug)
}

/// Install a panic hook that restores the terminal before printing the
/// panic message, so a panic in raw mode leaves a usable terminal behind.
fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = lookout_tui::app::restore_terminal();
        original_hook(panic_info);
    }));
}

/// Spawn the feed on a background runtime and run the TUI on this thread.
fn run_app(config: DashboardConfig) -> lookout_tui::AppResult<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    // Spawn the background tasks inside the runtime context, then release
    // the guard so the shutdown block_on below runs outside it.
    let (feed, media) = {
        let _enter = runtime.enter();

        // Optional push channel: absence disables the feature, silently.
        let push_source = match &config.push_url {
            Some(url) => {
                let source = HttpPushSource::new(url.clone())?;
                Some(Box::new(source) as Box<dyn lookout_feed::EventSource>)
            }
            None => None,
        };

        let feed = FeedCoordinator::spawn(&config, push_source)?;
        let media = config.feed_url.clone().map(MediaMonitor::spawn);
        (feed, media)
    };

    let mut app = App::new(&feed, media.as_ref());
    let result = app.run();

    // Teardown: stop the poll timer and push stream; a fetch completing
    // after this point is discarded, never applied.
    if let Some(media) = media {
        media.shutdown();
    }
    runtime.block_on(feed.shutdown());

    result
}
