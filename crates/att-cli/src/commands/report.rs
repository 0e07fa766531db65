//! Report command for attendance tables and target projections.
//!
//! This module implements `att report`: parse a portal export or CSV file,
//! apply any hypothetical extra on-duty/makeup classes, and print the
//! per-subject table, the overall summary and the target optimizer, either
//! human-readable or as JSON.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use att_core::{
    Adjustment, AttendanceCount, Outlook, PresencePolicy, ProjectionError, SubjectProjection,
    Summary, apply_adjustments, classes_can_leave, classes_needed, outlook, parse_report,
    project_roster,
};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use super::util::{
    SubjectCount, build_adjustments, describe_can_leave, describe_needed, format_percent,
    outlook_result_label, parse_subject_count, read_input, validate_target,
};
use crate::Config;

/// Subject names longer than this are truncated in the table.
const SUBJECT_WIDTH: usize = 24;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Report file to read (defaults to stdin).
    pub file: Option<PathBuf>,

    /// Attendance target in percent.
    #[arg(long)]
    pub target: Option<f64>,

    /// Presence policy: standard, makeup-only, strict or <on_duty>:<makeup>.
    #[arg(long)]
    pub policy: Option<PresencePolicy>,

    /// Extra on-duty classes for a subject, as SUBJECT=N. Repeatable.
    #[arg(long = "extra-od", value_name = "SUBJECT=N", value_parser = parse_subject_count)]
    pub extra_od: Vec<SubjectCount>,

    /// Extra makeup classes for a subject, as SUBJECT=N. Repeatable.
    #[arg(long = "extra-makeup", value_name = "SUBJECT=N", value_parser = parse_subject_count)]
    pub extra_makeup: Vec<SubjectCount>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub target_percent: f64,
    pub policy: PresencePolicy,
    pub subjects: Vec<SubjectProjection>,
    pub summary: Summary,
    pub classes_needed: Result<u64, ProjectionError>,
    pub classes_can_leave: Result<u64, ProjectionError>,
    pub outlook: Result<Outlook, ProjectionError>,
    pub skipped_lines: usize,
}

// ========== Report Generation ==========

/// Parses the report text and projects every subject and the overall total.
pub fn generate_report_data(
    text: &str,
    target_percent: f64,
    policy: PresencePolicy,
    adjustments: &BTreeMap<String, Adjustment>,
    generated_at: DateTime<Utc>,
) -> Result<ReportData> {
    let parsed = parse_report(text).context("failed to parse attendance report")?;

    let (records, unmatched) = apply_adjustments(&parsed.records, adjustments)?;
    for subject in &unmatched {
        tracing::warn!(%subject, "adjustment does not match any subject in the report");
    }

    let subjects = project_roster(&records, policy, target_percent)?;
    let summary = Summary::from_records(&records, policy)?;
    let query = summary.query(target_percent);

    Ok(ReportData {
        generated_at,
        target_percent,
        policy,
        subjects,
        classes_needed: classes_needed(query.effective_present, query.total, target_percent),
        classes_can_leave: classes_can_leave(query.effective_present, query.total, target_percent),
        outlook: outlook(&query),
        summary,
        skipped_lines: parsed.skipped_lines,
    })
}

fn truncate_subject(subject: &str) -> String {
    if subject.chars().count() <= SUBJECT_WIDTH {
        return subject.to_string();
    }
    let mut short: String = subject.chars().take(SUBJECT_WIDTH - 1).collect();
    short.push('…');
    short
}

fn status_label(projection: &SubjectProjection) -> &'static str {
    if projection.percent.is_none() {
        "-"
    } else if projection.meets_target() {
        "OK"
    } else {
        "LOW"
    }
}

#[expect(
    clippy::too_many_arguments,
    reason = "one argument per table column keeps header and rows aligned"
)]
fn table_row(
    subject: &str,
    present: &str,
    on_duty: &str,
    makeup: &str,
    absent: &str,
    total: &str,
    percent: &str,
    status: &str,
    outlook: &str,
) -> String {
    format!(
        "{subject:<24}  {present:>7}  {on_duty:>3}  {makeup:>6}  {absent:>6}  {total:>5}  {percent:>7}  {status:<6}  {outlook}"
    )
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "ATTENDANCE REPORT (target {:.2}%, policy {})",
        data.target_percent, data.policy
    )
    .unwrap();
    writeln!(output).unwrap();

    writeln!(
        output,
        "{}",
        table_row(
            "SUBJECT", "PRESENT", "OD", "MAKEUP", "ABSENT", "TOTAL", "PERCENT", "STATUS",
            "OUTLOOK"
        )
    )
    .unwrap();
    for subject in &data.subjects {
        let counts = subject.counts;
        writeln!(
            output,
            "{}",
            table_row(
                &truncate_subject(&subject.subject),
                &counts.present.to_string(),
                &counts.on_duty.to_string(),
                &counts.makeup.to_string(),
                &counts.absent.to_string(),
                &subject.query.total.to_string(),
                &format_percent(subject.percent),
                status_label(subject),
                &outlook_result_label(&subject.outlook),
            )
        )
        .unwrap();
    }

    // SUMMARY section
    let summary = &data.summary;
    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Subjects:          {}", summary.subjects).unwrap();
    writeln!(output, "Present:           {}", summary.counts.present).unwrap();
    writeln!(output, "Absent:            {}", summary.counts.absent).unwrap();
    writeln!(output, "On duty:           {}", summary.counts.on_duty).unwrap();
    writeln!(output, "Makeup:            {}", summary.counts.makeup).unwrap();
    writeln!(output, "Effective present: {}", summary.effective_present).unwrap();
    writeln!(output, "Total classes:     {}", summary.total).unwrap();
    writeln!(output, "Attendance:        {}", format_percent(summary.percent)).unwrap();

    // TARGET OPTIMIZER section
    writeln!(output).unwrap();
    writeln!(output, "TARGET OPTIMIZER").unwrap();
    writeln!(output, "────────────────").unwrap();
    writeln!(output, "{}", describe_needed(&data.classes_needed)).unwrap();
    writeln!(output, "{}", describe_can_leave(&data.classes_can_leave)).unwrap();

    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub generated_at: String,
    pub target_percent: f64,
    pub policy: PresencePolicy,
    pub skipped_lines: usize,
    pub subjects: Vec<JsonSubject>,
    pub overall: JsonOverall,
}

#[derive(Debug, Serialize)]
pub struct JsonSubject {
    pub subject: String,
    #[serde(flatten)]
    pub counts: AttendanceCount,
    pub effective_present: u64,
    pub total: u64,
    pub percent: Option<f64>,
    pub meets_target: bool,
    pub outlook: Option<Outlook>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonOverall {
    #[serde(flatten)]
    pub counts: AttendanceCount,
    pub effective_present: u64,
    pub total: u64,
    pub percent: Option<f64>,
    pub classes_needed: Option<u64>,
    pub classes_can_leave: Option<u64>,
    pub outlook: Option<Outlook>,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let subjects = data
        .subjects
        .iter()
        .map(|s| JsonSubject {
            subject: s.subject.clone(),
            counts: s.counts,
            effective_present: s.query.effective_present,
            total: s.query.total,
            percent: s.percent,
            meets_target: s.meets_target(),
            outlook: s.outlook.as_ref().ok().copied(),
            error: s.outlook.as_ref().err().map(ToString::to_string),
        })
        .collect();

    let report = JsonReport {
        generated_at: data.generated_at.to_rfc3339(),
        target_percent: data.target_percent,
        policy: data.policy,
        skipped_lines: data.skipped_lines,
        subjects,
        overall: JsonOverall {
            counts: data.summary.counts,
            effective_present: data.summary.effective_present,
            total: data.summary.total,
            percent: data.summary.percent,
            classes_needed: data.classes_needed.as_ref().ok().copied(),
            classes_can_leave: data.classes_can_leave.as_ref().ok().copied(),
            outlook: data.outlook.as_ref().ok().copied(),
        },
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W: Write>(writer: &mut W, args: &ReportArgs, config: &Config) -> Result<()> {
    let target_percent = validate_target(args.target.unwrap_or(config.target_percent))?;
    let policy = args.policy.unwrap_or(config.policy);
    let text = read_input(args.file.as_deref())?;
    let adjustments = build_adjustments(&args.extra_od, &args.extra_makeup);

    let data = generate_report_data(&text, target_percent, policy, &adjustments, Utc::now())?;
    tracing::info!(
        subjects = data.summary.subjects,
        percent = ?data.summary.percent,
        target_percent,
        "attendance report generated"
    );

    if args.json {
        writeln!(writer, "{}", format_report_json(&data)?)?;
    } else {
        write!(writer, "{}", format_report(&data))?;
    }

    Ok(())
}
