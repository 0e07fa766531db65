//! Project command: the projection engine on raw numbers.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use att_core::{
    Outlook, TargetQuery, attendance_percent, classes_can_leave, classes_needed, outlook,
};
use clap::Args;
use serde::Serialize;

use super::util::{describe_can_leave, describe_needed, format_percent, validate_target};
use crate::Config;

#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Classes attended, including on-duty and makeup classes that count.
    #[arg(long)]
    pub present: u64,

    /// Classes held so far.
    #[arg(long)]
    pub total: u64,

    /// Attendance target in percent.
    #[arg(long)]
    pub target: Option<f64>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct JsonProjection {
    #[serde(flatten)]
    query: TargetQuery,
    percent: Option<f64>,
    classes_needed: Option<u64>,
    classes_can_leave: Option<u64>,
    outlook: Option<Outlook>,
}

/// Formats both answers for a query.
pub fn format_projection(query: &TargetQuery) -> String {
    let mut output = String::new();
    let percent = attendance_percent(query.effective_present, query.total);

    writeln!(
        output,
        "Attendance: {} ({} of {})",
        format_percent(percent),
        query.effective_present,
        query.total
    )
    .unwrap();
    writeln!(output, "Target:     {:.2}%", query.target_percent).unwrap();
    writeln!(
        output,
        "{}",
        describe_needed(&classes_needed(
            query.effective_present,
            query.total,
            query.target_percent
        ))
    )
    .unwrap();
    writeln!(
        output,
        "{}",
        describe_can_leave(&classes_can_leave(
            query.effective_present,
            query.total,
            query.target_percent
        ))
    )
    .unwrap();

    output
}

fn format_projection_json(query: &TargetQuery) -> Result<String> {
    let TargetQuery {
        effective_present,
        total,
        target_percent,
    } = *query;
    let projection = JsonProjection {
        query: *query,
        percent: attendance_percent(effective_present, total),
        classes_needed: classes_needed(effective_present, total, target_percent).ok(),
        classes_can_leave: classes_can_leave(effective_present, total, target_percent).ok(),
        outlook: outlook(query).ok(),
    };
    Ok(serde_json::to_string_pretty(&projection)?)
}

/// Runs the project command.
pub fn run<W: Write>(writer: &mut W, args: &ProjectArgs, config: &Config) -> Result<()> {
    let target_percent = validate_target(args.target.unwrap_or(config.target_percent))?;
    anyhow::ensure!(
        args.present <= args.total,
        "present ({}) cannot exceed total ({})",
        args.present,
        args.total
    );

    let query = TargetQuery::new(args.present, args.total, target_percent);
    tracing::debug!(?query, "projecting attendance");

    if args.json {
        writeln!(writer, "{}", format_projection_json(&query)?)?;
    } else {
        write!(writer, "{}", format_projection(&query))?;
    }
    Ok(())
}
