//! CLI harness over the acquisition coordinator (dnvm). Mirrors the
//! teacher's `vx-cli` crate shape: a `Cli`/`Commands` clap tree, one handler
//! module, and a `run()` entry point the root binary calls into.

mod cli;
mod commands;
mod tracing_setup;

pub use cli::{Cli, Commands};
pub use tracing_setup::setup_tracing;

use clap::Parser;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match cli.command {
        Commands::Acquire {
            version,
            requesting_extension_id,
            mode,
            install_type,
            architecture,
            timeout_seconds,
        } => {
            commands::acquire(
                version,
                requesting_extension_id,
                mode,
                install_type,
                architecture,
                timeout_seconds,
            )
            .await
        }
        Commands::FindPath { version, mode, architecture } => {
            commands::find_path(version, mode, architecture).await
        }
        Commands::Uninstall { install_id } => commands::uninstall(install_id).await,
        Commands::UninstallAll => commands::uninstall_all().await,
        Commands::List => commands::list(),
    }
}
