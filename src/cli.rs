use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Collect Accelerated Reader quiz reports as normalized JSON records.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,

    /// Log aggregate score figures once the batch is collected
    #[arg(long)]
    pub summary: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Normalize saved report pages (HTML) or payloads (JSON)
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Fetch every quiz in the student's inbox from the portal API
    Fetch,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable output
    Pretty,
    /// One JSON object per line
    Json,
}

fn default_tracing_format() -> TracingFormat {
    if cfg!(debug_assertions) {
        TracingFormat::Pretty
    } else {
        TracingFormat::Json
    }
}
