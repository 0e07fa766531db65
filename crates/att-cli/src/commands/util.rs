//! Shared utilities for CLI commands.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use att_core::{Adjustment, Outlook, ProjectionError};
use regex::Regex;

/// Pre-compiled regex for `SUBJECT=N` arguments.
static SUBJECT_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(.+?)\s*=\s*(\d+)\s*$").unwrap());

/// A per-subject count given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCount {
    pub subject: String,
    pub count: u64,
}

/// Parses `SUBJECT=N`, e.g. "Data Structures=2".
pub fn parse_subject_count(s: &str) -> Result<SubjectCount, String> {
    let Some(caps) = SUBJECT_COUNT_RE.captures(s) else {
        return Err(format!("expected SUBJECT=N, got {s:?}"));
    };
    let count = caps[2]
        .parse()
        .map_err(|_| format!("count too large in {s:?}"))?;
    Ok(SubjectCount {
        subject: caps[1].to_string(),
        count,
    })
}

/// Merges `--extra-od` and `--extra-makeup` values into per-subject adjustments.
pub fn build_adjustments(
    extra_on_duty: &[SubjectCount],
    extra_makeup: &[SubjectCount],
) -> BTreeMap<String, Adjustment> {
    let mut adjustments: BTreeMap<String, Adjustment> = BTreeMap::new();
    for entry in extra_on_duty {
        let adjustment = adjustments.entry(entry.subject.clone()).or_default();
        adjustment.extra_on_duty = adjustment.extra_on_duty.saturating_add(entry.count);
    }
    for entry in extra_makeup {
        let adjustment = adjustments.entry(entry.subject.clone()).or_default();
        adjustment.extra_makeup = adjustment.extra_makeup.saturating_add(entry.count);
    }
    adjustments
}

/// Reads the report from `path`, or from stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read report from stdin")?;
    Ok(text)
}

/// Checks that a target percentage is usable.
pub fn validate_target(target_percent: f64) -> Result<f64> {
    anyhow::ensure!(
        (0.0..=100.0).contains(&target_percent),
        "target must be between 0 and 100, got {target_percent}"
    );
    Ok(target_percent)
}

/// Formats a percentage with two decimals, or "n/a".
pub fn format_percent(percent: Option<f64>) -> String {
    percent.map_or_else(|| "n/a".to_string(), |p| format!("{p:.2}%"))
}

/// Short label for an outlook, as shown in table columns.
pub fn outlook_label(outlook: &Outlook) -> String {
    match outlook {
        Outlook::Attend(n) => format!("attend {n}"),
        Outlook::CanLeave(n) => format!("can leave {n}"),
        Outlook::Unbounded => "unbounded".to_string(),
        Outlook::Unreachable => "unreachable".to_string(),
    }
}

/// Label for an outlook that may have failed (e.g. no classes recorded).
pub fn outlook_result_label(outlook: &Result<Outlook, ProjectionError>) -> String {
    outlook.as_ref().map_or_else(|_| "n/a".to_string(), outlook_label)
}

/// Sentence for the result of `classes_needed`.
pub fn describe_needed(result: &Result<u64, ProjectionError>) -> String {
    match result {
        Ok(n) => format!("Attend {n} more classes"),
        Err(e) => format!("Attend: {e}"),
    }
}

/// Sentence for the result of `classes_can_leave`.
pub fn describe_can_leave(result: &Result<u64, ProjectionError>) -> String {
    match result {
        Ok(n) => format!("Can leave {n} classes safely"),
        Err(e) => format!("Can leave: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subject_counts() {
        assert_eq!(
            parse_subject_count("Data Structures=2").unwrap(),
            SubjectCount {
                subject: "Data Structures".to_string(),
                count: 2,
            }
        );
        assert_eq!(parse_subject_count(" Maths = 10 ").unwrap().count, 10);
    }

    #[test]
    fn rejects_malformed_subject_counts() {
        assert!(parse_subject_count("Maths").is_err());
        assert!(parse_subject_count("Maths=-1").is_err());
        assert!(parse_subject_count("=3").is_err());
        assert!(parse_subject_count("Maths=99999999999999999999999").is_err());
    }

    #[test]
    fn merges_adjustments_per_subject() {
        let od = vec![
            parse_subject_count("Maths=1").unwrap(),
            parse_subject_count("Maths=2").unwrap(),
        ];
        let makeup = vec![parse_subject_count("Physics=4").unwrap()];
        let adjustments = build_adjustments(&od, &makeup);

        assert_eq!(
            adjustments["Maths"],
            Adjustment {
                extra_on_duty: 3,
                extra_makeup: 0,
            }
        );
        assert_eq!(adjustments["Physics"].extra_makeup, 4);
    }

    #[test]
    fn validates_target_range() {
        assert!(validate_target(75.0).is_ok());
        assert!(validate_target(0.0).is_ok());
        assert!(validate_target(100.0).is_ok());
        assert!(validate_target(-5.0).is_err());
        assert!(validate_target(150.0).is_err());
        assert!(validate_target(f64::NAN).is_err());
    }

    #[test]
    fn formats_percent_and_outcomes() {
        assert_eq!(format_percent(Some(200.0 / 3.0)), "66.67%");
        assert_eq!(format_percent(None), "n/a");
        assert_eq!(outlook_label(&Outlook::CanLeave(3)), "can leave 3");
        assert_eq!(describe_needed(&Ok(10)), "Attend 10 more classes");
        assert_eq!(
            describe_needed(&Err(ProjectionError::Unreachable {
                target_percent: 100.0
            })),
            "Attend: a target of 100% cannot be reached"
        );
        assert_eq!(describe_can_leave(&Ok(0)), "Can leave 0 classes safely");
    }
}
