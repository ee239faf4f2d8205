// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tracing::error;

use vigil::config::Config;
use vigil::focus::commands::{self, StartArgs};
use vigil::store::Store;

#[derive(Parser)]
#[command(
    name = "vigil",
    version,
    about = "Personal telemetry daemon with AI-moderated focus enforcement."
)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    subcommand: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start a focus session; the running daemon enforces it.
    FocusStart(StartArgs),
    /// End the active focus session.
    FocusStop,
    /// Show capture and session status.
    Status,
}

fn open_store(config: &Config) -> Store {
    match Store::open(&config.resolved_data_dir()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    match cli.subcommand {
        Some(Commands::FocusStart(args)) => {
            let store = open_store(&cli.config);
            match commands::start(&store, &args) {
                Ok(message) => println!("{message}"),
                Err(e) => {
                    eprintln!("error: {e:#}");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::FocusStop) => {
            let store = open_store(&cli.config);
            match commands::stop(&store) {
                Ok(message) => println!("{message}"),
                Err(e) => {
                    eprintln!("error: {e:#}");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Status) => {
            let store = open_store(&cli.config);
            println!("{}", commands::status(&store));
        }
        None => {
            if let Err(e) = vigil::run::run(cli.config).await {
                error!("fatal: {e:#}");
                std::process::exit(1);
            }
        }
    }
}
