//! Summing per-subject counts into overall figures.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ProjectionError;
use crate::projection::attendance_percent;
use crate::types::{Adjustment, AttendanceCount, PresencePolicy, SubjectRecord, TargetQuery};

/// Sums the counts of all records.
pub fn aggregate(records: &[SubjectRecord]) -> Result<AttendanceCount, ProjectionError> {
    records
        .iter()
        .try_fold(AttendanceCount::default(), |acc, record| {
            acc.checked_add(record.counts)
        })
        .ok_or_else(|| ProjectionError::invalid("attendance counts overflow when summed"))
}

/// Applies extra on-duty/makeup classes to the matching subjects.
///
/// Subjects are matched case-insensitively. Returns the adjusted records and
/// the adjustment keys that matched no subject.
pub fn apply_adjustments(
    records: &[SubjectRecord],
    adjustments: &BTreeMap<String, Adjustment>,
) -> Result<(Vec<SubjectRecord>, Vec<String>), ProjectionError> {
    let mut adjusted = Vec::with_capacity(records.len());
    for record in records {
        let mut counts = record.counts;
        for (subject, adjustment) in adjustments {
            if subject.eq_ignore_ascii_case(&record.subject) {
                counts = counts.with_adjustment(*adjustment).ok_or_else(|| {
                    ProjectionError::invalid(format!(
                        "adjusted counts for {} overflow",
                        record.subject
                    ))
                })?;
            }
        }
        adjusted.push(SubjectRecord {
            subject: record.subject.clone(),
            counts,
        });
    }

    let unmatched = adjustments
        .keys()
        .filter(|subject| {
            !records
                .iter()
                .any(|record| record.subject.eq_ignore_ascii_case(subject))
        })
        .cloned()
        .collect();

    Ok((adjusted, unmatched))
}

/// Overall attendance across all subjects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub subjects: usize,
    pub counts: AttendanceCount,
    pub policy: PresencePolicy,
    pub effective_present: u64,
    pub total: u64,
    /// `None` when no classes were recorded at all.
    pub percent: Option<f64>,
}

impl Summary {
    pub fn from_records(
        records: &[SubjectRecord],
        policy: PresencePolicy,
    ) -> Result<Self, ProjectionError> {
        let counts = aggregate(records)?;
        let (Some(effective_present), Some(total)) =
            (counts.effective_present(policy), counts.total(policy))
        else {
            return Err(ProjectionError::invalid(
                "attendance counts overflow when summed",
            ));
        };
        Ok(Self {
            subjects: records.len(),
            counts,
            policy,
            effective_present,
            total,
            percent: attendance_percent(effective_present, total),
        })
    }

    /// Projection query for the overall counts.
    pub const fn query(&self, target_percent: f64) -> TargetQuery {
        TargetQuery::new(self.effective_present, self.total, target_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subject: &str, counts: AttendanceCount) -> SubjectRecord {
        SubjectRecord {
            subject: subject.to_string(),
            counts,
        }
    }

    fn roster() -> Vec<SubjectRecord> {
        vec![
            record("Data Structures", AttendanceCount::new(30, 5, 2, 1)),
            record("Operating Systems", AttendanceCount::new(20, 10, 0, 0)),
        ]
    }

    #[test]
    fn aggregate_sums_each_category() {
        assert_eq!(
            aggregate(&roster()).unwrap(),
            AttendanceCount::new(50, 15, 2, 1)
        );
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        assert_eq!(aggregate(&[]).unwrap(), AttendanceCount::default());
    }

    #[test]
    fn aggregate_reports_overflow() {
        let records = vec![
            record("a", AttendanceCount::new(u64::MAX, 0, 0, 0)),
            record("b", AttendanceCount::new(1, 0, 0, 0)),
        ];
        assert!(aggregate(&records).unwrap_err().is_invalid_input());
    }

    #[test]
    fn summary_applies_policy() {
        let summary = Summary::from_records(&roster(), PresencePolicy::STANDARD).unwrap();
        assert_eq!(summary.subjects, 2);
        assert_eq!(summary.effective_present, 53);
        assert_eq!(summary.total, 68);
        let query = summary.query(75.0);
        assert_eq!(query.effective_present, 53);
        assert_eq!(query.total, 68);

        let strict = Summary::from_records(&roster(), PresencePolicy::STRICT).unwrap();
        assert_eq!(strict.effective_present, 50);
        assert_eq!(strict.total, 68);
    }

    #[test]
    fn summary_reports_policy_overflow() {
        // Each category fits, but present plus absent does not
        let records = vec![record("Huge", AttendanceCount::new(u64::MAX, 5, 0, 0))];
        let err = Summary::from_records(&records, PresencePolicy::STANDARD).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn summary_percent_is_none_without_classes() {
        let records = vec![record("Empty", AttendanceCount::default())];
        let summary = Summary::from_records(&records, PresencePolicy::STANDARD).unwrap();
        assert_eq!(summary.percent, None);
    }

    #[test]
    fn adjustments_match_subjects_case_insensitively() {
        let mut adjustments = BTreeMap::new();
        adjustments.insert(
            "operating systems".to_string(),
            Adjustment {
                extra_on_duty: 2,
                extra_makeup: 1,
            },
        );
        adjustments.insert(
            "Compilers".to_string(),
            Adjustment {
                extra_on_duty: 1,
                extra_makeup: 0,
            },
        );

        let (adjusted, unmatched) = apply_adjustments(&roster(), &adjustments).unwrap();
        assert_eq!(adjusted[0].counts, AttendanceCount::new(30, 5, 2, 1));
        assert_eq!(adjusted[1].counts, AttendanceCount::new(20, 10, 2, 1));
        assert_eq!(unmatched, vec!["Compilers".to_string()]);
    }
}
