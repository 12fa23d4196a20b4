use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::io::Write;
use tracing::{debug, info};

use crate::{resolve_mode, ModeRegistry, BANNER_PREFIX, FALLBACK_NOTICE};

// Source of the startup timestamp
pub trait Clock {
    /// Current wall-clock time
    ///
    /// # Errors
    ///
    /// Returns an error if the time cannot be read.
    fn now(&self) -> Result<DateTime<Utc>>;
}

// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<Utc>> {
        Ok(Utc::now())
    }
}

// Output options chosen on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub json: bool,
}

// Outcome of a single run
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: String,
    pub mode: String,
    pub recognized: bool,
    #[serde(serialize_with = "serialize_millis")]
    pub started_at: DateTime<Utc>,
}

// RFC 3339 UTC with millisecond precision, e.g. "2026-01-01T00:00:00.000Z"
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_millis<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(at))
}

// Banner line, e.g. "[OmniWeave] core online @ 2026-01-01T00:00:00.000Z"
#[must_use]
pub fn banner(started_at: &DateTime<Utc>) -> String {
    format!("{BANNER_PREFIX} core online @ {}", format_timestamp(started_at))
}

/// Resolve, report and execute the requested mode.
///
/// Unknown modes are reported with the fallback notice but the resolved mode
/// is left untouched, and the run still counts as a success.
///
/// # Errors
///
/// Returns an error if the clock cannot be read, the mode action fails, or
/// writing to `out` fails.
pub fn dispatch<S, W>(
    tokens: &[S],
    registry: &ModeRegistry,
    clock: &dyn Clock,
    options: RunOptions,
    out: &mut W,
) -> Result<ExecutionResult>
where
    S: AsRef<str>,
    W: Write,
{
    let started_at = clock.now().context("failed to read startup time")?;
    if !options.json {
        writeln!(out, "{}", banner(&started_at)).context("failed to write banner")?;
    }

    let mode = resolve_mode(tokens);
    debug!(mode = mode.as_str(), "resolved mode");
    if !options.json {
        writeln!(out, "{BANNER_PREFIX} mode={mode}").context("failed to write mode")?;
    }

    let (recognized, message) = match registry.get(mode.as_str()) {
        Some(entry) => {
            let message = entry
                .invoke()
                .with_context(|| format!("mode {mode} failed"))?;
            (true, message)
        }
        None => {
            info!(mode = mode.as_str(), "mode not registered");
            if !options.json {
                writeln!(out, "{BANNER_PREFIX} {FALLBACK_NOTICE}")
                    .context("failed to write fallback notice")?;
            }
            (false, FALLBACK_NOTICE.to_string())
        }
    };

    let result = ExecutionResult {
        success: true,
        message,
        mode: mode.as_str().to_string(),
        recognized,
        started_at,
    };

    if options.json {
        serde_json::to_writer(&mut *out, &result)
            .context("failed to serialize execution result to JSON")?;
        writeln!(out).context("failed to write execution result")?;
    }
    out.flush().context("failed to flush output")?;

    info!(mode = %result.mode, recognized, "run complete");
    Ok(result)
}

/// Write a fault summary followed by its cause chain.
///
/// # Errors
///
/// Returns an error if the sink cannot be written.
pub fn report_fault<E: Write>(fault: &anyhow::Error, err: &mut E) -> std::io::Result<()> {
    writeln!(err, "{BANNER_PREFIX} Fatal error: {fault}")?;
    writeln!(err, "{fault:?}")?;
    err.flush()
}

// Run the built-in registry against the given tokens and map the outcome to an exit code
pub fn run<S, W, E>(
    tokens: &[S],
    clock: &dyn Clock,
    options: RunOptions,
    out: &mut W,
    err: &mut E,
) -> i32
where
    S: AsRef<str>,
    W: Write,
    E: Write,
{
    let registry = ModeRegistry::builtin();
    match dispatch(tokens, &registry, clock, options, out) {
        Ok(_) => 0,
        Err(fault) => {
            // Nothing left to report to if stderr is gone too
            let _ = report_fault(&fault, err);
            1
        }
    }
}
