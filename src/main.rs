//! slate
//!
//! A small tiling window manager for X11: master/stack layout, focus
//! follows the pointer, modifier-drag to move, and a handful of key
//! bindings to launch programs and close windows.

mod config;
mod shared;
mod wm;

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tokio::runtime::Handle;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use wm::WindowManager;
use wm::display::X11Display;
use wm::spawn::TokioSpawner;

const USAGE: &str = "\
Usage: slate [--config <path>] [--preset <tiling|statusbar>]

Options:
  -c, --config <path>   Read configuration from <path>
  -p, --preset <name>   Use a built-in configuration instead of the file
  -h, --help            Show this help
";

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    preset: Option<String>,
    help: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "-p" | "--preset" => {
                parsed.preset = Some(args.next().context("--preset needs a name")?);
            }
            "-h" | "--help" => parsed.help = true,
            other => bail!("Unknown argument '{}'\n\n{}", other, USAGE),
        }
    }
    Ok(parsed)
}

fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.preset {
        Some(name) => {
            if args.config.is_some() {
                warn!("--preset given, ignoring --config");
            }
            info!("Using built-in preset '{}'", name);
            Config::preset(name)?
        }
        None => Config::load(args.config.as_deref()).context("Failed to load configuration")?,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "slate=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        print!("{}", USAGE);
        return Ok(());
    }

    info!("Starting slate");
    let config = load_config(&args)?;

    let mut display = X11Display::connect(&config)?;
    let mut manager = WindowManager::new(config.layout_params());
    let existing = display.existing_windows()?;
    manager.adopt(&mut display, &existing)?;

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    // The X event loop blocks on the connection, so it gets its own thread;
    // the runtime stays free to reap launched programs and watch signals.
    let spawner = TokioSpawner::new(Handle::current());
    let event_loop = tokio::task::spawn_blocking(move || manager.run(&mut display, &spawner));

    tokio::select! {
        result = event_loop => {
            result.context("Event loop task failed")??;
            info!("Exiting");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
            // the blocked event loop thread cannot be joined; closing the
            // connection on exit releases any grab we hold
            std::process::exit(0);
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
            std::process::exit(0);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(args(&[]).unwrap(), Args::default());
    }

    #[test]
    fn test_parse_config_and_preset() {
        let parsed = args(&["--config", "/tmp/slate.toml", "-p", "statusbar"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("/tmp/slate.toml")));
        assert_eq!(parsed.preset.as_deref(), Some("statusbar"));
        assert!(!parsed.help);
    }

    #[test]
    fn test_parse_rejects_unknown_and_missing_values() {
        assert!(args(&["--replace"]).is_err());
        assert!(args(&["--config"]).is_err());
    }

    #[test]
    fn test_preset_overrides_config_file() {
        let parsed = Args {
            config: Some(PathBuf::from("/nonexistent/slate.toml")),
            preset: Some("statusbar".into()),
            help: false,
        };
        let config = load_config(&parsed).unwrap();
        assert!(config.status_bar.enabled);
    }
}
