//! Attendance report parsing.
//!
//! Two input shapes are accepted:
//!
//! - The tab-separated report copied from the student portal. Data rows start
//!   with a serial number and carry at least nine columns; the subject name
//!   is in column 2 and the present, on-duty, makeup and absent counts are in
//!   columns 4 to 7. Every other row (headers, totals, blank lines) is skipped.
//! - A comma-separated file with a `subject,present,absent,on_duty,makeup`
//!   header. `on_duty` (alias `od`) and `makeup` are optional.
//!
//! The format is chosen from the first non-empty line.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::types::{AttendanceCount, SubjectRecord};

/// Column separator in portal reports.
static TAB_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\t+").unwrap());

/// Serial number that marks a data row.
static SERIAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

const MIN_PORTAL_COLUMNS: usize = 9;
const SUBJECT_COLUMN: usize = 2;
const PRESENT_COLUMN: usize = 4;
const ON_DUTY_COLUMN: usize = 5;
const MAKEUP_COLUMN: usize = 6;
const ABSENT_COLUMN: usize = 7;

/// Errors from parsing an attendance report.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A count column did not hold a non-negative integer.
    #[error("line {line}: invalid {column} count {value:?}")]
    InvalidCount {
        line: usize,
        column: &'static str,
        value: String,
    },

    /// A data row had no subject name.
    #[error("line {line}: subject name is empty")]
    EmptySubject { line: usize },

    /// The CSV header lacked a required column.
    #[error("missing required column: {column}")]
    MissingColumn { column: &'static str },

    /// A CSV row could not be read.
    #[error("invalid CSV input: {0}")]
    Csv(#[from] csv::Error),

    /// The input contained no data rows.
    #[error("no attendance records found")]
    NoRecords,
}

/// Result of parsing a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReport {
    pub records: Vec<SubjectRecord>,
    /// Non-empty lines that were not data rows.
    pub skipped_lines: usize,
}

/// Parses a portal report or CSV file into per-subject counts.
pub fn parse_report(text: &str) -> Result<ParsedReport, RecordError> {
    let first_line = text.lines().map(str::trim).find(|line| !line.is_empty());
    let is_csv = first_line.is_some_and(|line| {
        line.split(',')
            .next()
            .is_some_and(|head| head.trim().eq_ignore_ascii_case("subject"))
    });

    let report = if is_csv {
        parse_csv(text)?
    } else {
        parse_portal(text)?
    };

    if report.records.is_empty() {
        return Err(RecordError::NoRecords);
    }
    tracing::debug!(
        records = report.records.len(),
        skipped = report.skipped_lines,
        csv = is_csv,
        "parsed attendance report"
    );
    Ok(report)
}

fn parse_count(line: usize, column: &'static str, raw: &str) -> Result<u64, RecordError> {
    raw.trim().parse().map_err(|_| RecordError::InvalidCount {
        line,
        column,
        value: raw.to_string(),
    })
}

fn parse_portal(text: &str) -> Result<ParsedReport, RecordError> {
    let mut records = Vec::new();
    let mut skipped_lines = 0;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let parts: Vec<&str> = TAB_RUN_RE.split(trimmed).collect();
        if parts.len() < MIN_PORTAL_COLUMNS || !SERIAL_RE.is_match(parts[0]) {
            tracing::debug!(line = line_no, columns = parts.len(), "skipping non-data row");
            skipped_lines += 1;
            continue;
        }

        let subject = parts[SUBJECT_COLUMN].trim();
        if subject.is_empty() {
            return Err(RecordError::EmptySubject { line: line_no });
        }

        let counts = AttendanceCount {
            present: parse_count(line_no, "present", parts[PRESENT_COLUMN])?,
            on_duty: parse_count(line_no, "on_duty", parts[ON_DUTY_COLUMN])?,
            makeup: parse_count(line_no, "makeup", parts[MAKEUP_COLUMN])?,
            absent: parse_count(line_no, "absent", parts[ABSENT_COLUMN])?,
        };
        records.push(SubjectRecord {
            subject: subject.to_string(),
            counts,
        });
    }

    Ok(ParsedReport {
        records,
        skipped_lines,
    })
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    subject: String,
    present: u64,
    absent: u64,
    #[serde(default, alias = "od")]
    on_duty: u64,
    #[serde(default)]
    makeup: u64,
}

fn parse_csv(text: &str) -> Result<ParsedReport, RecordError> {
    let body = text.trim_start();
    // Lines dropped by trim_start, so record positions map back to the input
    let line_offset = text[..text.len() - body.len()].matches('\n').count();

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers: csv::StringRecord = reader
        .headers()?
        .iter()
        .map(str::to_ascii_lowercase)
        .collect();
    for column in ["subject", "present", "absent"] {
        if !headers.iter().any(|h| h == column) {
            return Err(RecordError::MissingColumn { column });
        }
    }

    let mut records = Vec::new();
    let mut raw = csv::StringRecord::new();
    while reader.read_record(&mut raw)? {
        let row: CsvRow = raw.deserialize(Some(&headers))?;
        let subject = row.subject.trim();
        if subject.is_empty() {
            let line = raw
                .position()
                .and_then(|position| usize::try_from(position.line()).ok())
                .map_or(0, |line| line + line_offset);
            return Err(RecordError::EmptySubject { line });
        }
        records.push(SubjectRecord {
            subject: subject.to_string(),
            counts: AttendanceCount {
                present: row.present,
                absent: row.absent,
                on_duty: row.on_duty,
                makeup: row.makeup,
            },
        });
    }

    Ok(ParsedReport {
        records,
        skipped_lines: 0,
    })
}
