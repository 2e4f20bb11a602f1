use anyhow::Result;
use clap::Parser;

mod auth;
mod cache;
mod cli;
mod config;
mod content;
mod handlers;
mod media;
mod router;
mod schemas;
mod services;
#[cfg(test)]
mod tests;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.run().await?;

    Ok(())
}
