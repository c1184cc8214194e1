//! Argument parsing, modeled on the teacher's flat `Commands` enum with one
//! variant per subcommand and `clap`-derived field docs doubling as `--help` text.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dnvm")]
#[command(about = "Acquires and tracks .NET SDK/runtime installations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Acquire (install if needed) a version, printing the resolved host path
    Acquire {
        /// Loose version spec, e.g. "8.0", "6.0.3xx", "8.0.103"
        version: String,
        /// Requesting extension/tool identifier
        #[arg(long, default_value = "dnvm-cli")]
        requesting_extension_id: String,
        /// sdk, runtime, or aspnetcore
        #[arg(long, default_value = "sdk")]
        mode: String,
        /// local or global
        #[arg(long, default_value = "local")]
        install_type: String,
        /// Target architecture override, e.g. x64, arm64
        #[arg(long)]
        architecture: Option<String>,
        #[arg(long, default_value_t = 300)]
        timeout_seconds: u64,
    },

    /// Check whether a requirement is already satisfied, printing the host path if so
    FindPath {
        version: String,
        #[arg(long, default_value = "sdk")]
        mode: String,
        #[arg(long)]
        architecture: Option<String>,
    },

    /// Remove a specific tracked install
    Uninstall {
        /// Install id (hex), as printed by `list`
        install_id: String,
    },

    /// Remove every tracked install
    UninstallAll,

    /// List tracked installs as JSON
    List,
}
