//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::project::ProjectArgs;
use crate::commands::report::ReportArgs;
use crate::commands::simulate::SimulateArgs;

/// Attendance tracker.
///
/// Reads an attendance report exported from a student portal and works out
/// how many classes to attend to reach a target, or how many can be skipped.
#[derive(Debug, Parser)]
#[command(name = "att", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the attendance table, summary and target projection for a report.
    Report(ReportArgs),

    /// Project classes to attend or skip from raw counts.
    Project(ProjectArgs),

    /// Simulate skipping future classes.
    Simulate(SimulateArgs),

    /// Show the effective configuration.
    Config,
}
