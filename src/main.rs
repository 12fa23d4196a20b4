use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::process::exit;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;

use cli::{execute_command, Cli};

fn main() -> Result<()> {
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    // Run the requested mode and hand its exit code to the OS
    let code = execute_command(&cli).with_context(|| "command execution failed")?;
    exit(code)
}

// Diagnostics go to stderr so stdout only carries the run output
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
