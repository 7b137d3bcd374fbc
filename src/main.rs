#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

use std::env;

use anyhow::{Context, Result};
use labyrinth::{app::App, constants::LOOP_TIME, formatter::TickFormatter};
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

fn init_logging() -> Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().event_format(TickFormatter))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber).context("Could not set the global tracing subscriber")
}

/// Runs a headless session, optionally starting from the level given as the first argument.
pub fn main() -> Result<()> {
    init_logging()?;

    let start_level = match env::args().nth(1) {
        Some(arg) => arg
            .parse::<usize>()
            .with_context(|| format!("Starting level must be a number, got {arg:?}"))?,
        None => 0,
    };

    let mut app = App::new(start_level).context("Could not create app")?;

    info!(loop_time = ?LOOP_TIME, start_level, "Starting game loop");
    while app.run() {}

    Ok(())
}
