//! Simulate command: attendance after skipping future classes.

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use att_core::{LeaveScenario, PresencePolicy, Summary, leave_schedule, parse_report};
use clap::Args;

use super::util::{format_percent, outlook_label, read_input, validate_target};
use crate::Config;

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Report file to read (defaults to stdin).
    pub file: Option<PathBuf>,

    /// Simulate skipping up to this many classes.
    #[arg(long, default_value_t = 10)]
    pub max_skip: u64,

    /// Attendance target in percent.
    #[arg(long)]
    pub target: Option<f64>,

    /// Presence policy: standard, makeup-only, strict or <on_duty>:<makeup>.
    #[arg(long)]
    pub policy: Option<PresencePolicy>,

    /// Simulate a single subject instead of the overall total.
    #[arg(long)]
    pub subject: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Formats a leave schedule as a table.
pub fn format_schedule(label: &str, target_percent: f64, schedule: &[LeaveScenario]) -> String {
    let mut output = String::new();
    writeln!(
        output,
        "LEAVE SIMULATION: {label} (target {target_percent:.2}%)"
    )
    .unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "{:>7}  {:>7}  {:>5}  {:>7}  {:<6}  OUTLOOK",
        "SKIPPED", "PRESENT", "TOTAL", "PERCENT", "STATUS"
    )
    .unwrap();

    for scenario in schedule {
        let status = if scenario.meets_target { "OK" } else { "LOW" };
        writeln!(
            output,
            "{:>7}  {:>7}  {:>5}  {:>7}  {status:<6}  {}",
            scenario.skipped,
            scenario.effective_present,
            scenario.total,
            format_percent(Some(scenario.percent)),
            outlook_label(&scenario.outlook)
        )
        .unwrap();
    }
    output
}

/// Runs the simulate command.
pub fn run<W: Write>(writer: &mut W, args: &SimulateArgs, config: &Config) -> Result<()> {
    let target_percent = validate_target(args.target.unwrap_or(config.target_percent))?;
    let policy = args.policy.unwrap_or(config.policy);
    let text = read_input(args.file.as_deref())?;
    let parsed = parse_report(&text).context("failed to parse attendance report")?;

    let (label, query) = match &args.subject {
        Some(name) => {
            let record = parsed
                .records
                .iter()
                .find(|r| r.subject.eq_ignore_ascii_case(name))
                .with_context(|| format!("subject not found in report: {name}"))?;
            (
                record.subject.clone(),
                record.counts.query(policy, target_percent)?,
            )
        }
        None => (
            "Overall".to_string(),
            Summary::from_records(&parsed.records, policy)?.query(target_percent),
        ),
    };

    let schedule = leave_schedule(&query, args.max_skip)
        .with_context(|| format!("cannot simulate leave for {label}"))?;
    tracing::debug!(%label, scenarios = schedule.len(), "simulated leave");

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&schedule)?)?;
    } else {
        write!(
            writer,
            "{}",
            format_schedule(&label, target_percent, &schedule)
        )?;
    }
    Ok(())
}
