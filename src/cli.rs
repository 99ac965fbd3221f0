//! Command-line interface definitions.

use auo_harness::config::{CONFIG_FILE, HarnessConfig};
use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Browser UI test harness for the AuO audio editor
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: auo.toml)
    #[arg(short = 'C', long, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Log every request and wait
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the content root until `/stop` is requested or Ctrl+C
    #[command(visible_alias = "s")]
    Serve {
        /// Content root (overrides [serve] root)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        root: Option<PathBuf>,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on (0 = any free port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Request worker threads
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut HarnessConfig) {
        match &self.command {
            Commands::Serve {
                root,
                interface,
                port,
                workers,
            } => {
                if let Some(root) = root {
                    config.serve.root.clone_from(root);
                }
                if let Some(interface) = interface {
                    config.serve.interface = *interface;
                }
                if let Some(port) = port {
                    config.serve.port = *port;
                }
                if let Some(workers) = workers {
                    config.serve.workers = *workers;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from(["auo-harness", "serve", "-r", "www", "-p", "8123", "-w", "2"]);
        let mut config = HarnessConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.serve.root, PathBuf::from("www"));
        assert_eq!(config.serve.port, 8123);
        assert_eq!(config.serve.workers, 2);
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let cli = Cli::parse_from(["auo-harness", "--verbose", "s"]);
        let mut config = HarnessConfig::default();
        cli.apply(&mut config);

        assert!(cli.verbose);
        assert_eq!(config.serve.port, 0);
        assert_eq!(config.serve.root, PathBuf::from("lib"));
    }
}
