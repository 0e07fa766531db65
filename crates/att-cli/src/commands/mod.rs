//! CLI subcommand implementations.

pub mod config;
pub mod project;
pub mod report;
pub mod simulate;
pub mod util;
