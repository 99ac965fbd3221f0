//! auo-harness - serve the AuO UI for browser-driven tests.

mod cli;

use anyhow::Result;
use auo_harness::config::HarnessConfig;
use auo_harness::server::{ContentServer, ServeOptions};
use auo_harness::{log, logger};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let mut config = HarnessConfig::load(&cli.config)?;
    cli.apply(&mut config);
    config.validate()?;

    match &cli.command {
        Commands::Serve { .. } => serve(&config),
    }
}

/// Run the content server in the foreground until it is stopped.
fn serve(config: &HarnessConfig) -> Result<()> {
    let server = Arc::new(ContentServer::with_options(ServeOptions::from(
        &config.serve,
    ))?);

    let handle = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        if let Err(e) = handle.terminate() {
            log!("error"; "{e}");
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))?;

    log!("serve"; "test page: {}", server.test_url());
    log!("serve"; "stop with {}stop or Ctrl+C", server.url());

    server.wait();
    server.terminate()?;
    Ok(())
}
