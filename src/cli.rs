use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};

use omniweave::runner::{run, RunOptions, SystemClock};
use omniweave::{ModeEntry, ModeRegistry};

// CLI arguments parsing structure
#[derive(Parser)]
#[command(name = "omniweave", author, version, about, long_about = None)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(short = 'j', long)]
    pub json: bool,

    /// List the recognized modes and exit
    #[arg(short = 'l', long)]
    pub list_modes: bool,

    /// Mode to run (status, demo); anything after the first token is ignored
    #[arg(value_name = "MODE", trailing_var_arg = true, allow_hyphen_values = true)]
    pub tokens: Vec<String>,
}

/// Execute the selected command and return the process exit code
///
/// # Errors
///
/// Returns an error if the mode listing cannot be written. Faults during a
/// mode run are reported by the runner itself and surface as exit code 1.
pub fn execute_command(cli: &Cli) -> Result<i32> {
    if cli.list_modes {
        cmd_list(cli.json)?;
        return Ok(0);
    }

    let options = RunOptions { json: cli.json };
    let stdout = io::stdout();
    let stderr = io::stderr();
    Ok(run(
        &cli.tokens,
        &SystemClock,
        options,
        &mut stdout.lock(),
        &mut stderr.lock(),
    ))
}

fn cmd_list(json_output: bool) -> Result<()> {
    let registry = ModeRegistry::builtin();
    let mut out = io::stdout().lock();

    if json_output {
        let json = serde_json::to_string_pretty(registry.entries())
            .context("failed to serialize mode list to JSON")?;
        writeln!(out, "{json}").context("failed to write mode list")?;
        return Ok(());
    }

    // Find the longest mode name for alignment
    let max_name_length = registry
        .entries()
        .iter()
        .map(|entry| entry.name.len())
        .max()
        .unwrap_or(0);

    writeln!(out, "\u{001b}[4mAvailable modes:\u{001b}[0m").context("failed to write mode list")?;
    for entry in registry.entries() {
        print_mode_entry(&mut out, entry, max_name_length)?;
    }

    Ok(())
}

// Helper function to print a mode with its description
fn print_mode_entry<W: Write>(out: &mut W, entry: &ModeEntry, max_name_length: usize) -> Result<()> {
    let padded_name = format!("{:<width$}", entry.name, width = max_name_length);

    let written = if entry.desc.is_empty() {
        writeln!(out, "  {padded_name}")
    } else {
        writeln!(out, "  {padded_name}  {}", entry.desc)
    };
    written.with_context(|| format!("failed to write mode {}", entry.name))
}
