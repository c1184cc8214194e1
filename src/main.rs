//! dnvm - .NET SDK/runtime acquisition CLI
//!
//! Main binary entry point that delegates to the CLI implementation.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotnet_cli::run().await
}
