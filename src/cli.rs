//! Command-line arguments.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Human-readable console output.
    Pretty,
    /// Newline-delimited JSON for log collectors.
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "ilram", about = "Course catalog and timetable optimization service")]
pub struct Args {
    /// Log output format.
    #[arg(long, value_enum, default_value = "pretty")]
    pub tracing: TracingFormat,

    /// Lecture table path, overriding DATA_PATH from the environment.
    #[arg(long)]
    pub data_path: Option<PathBuf>,
}
