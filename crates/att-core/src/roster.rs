//! Batch projection over every subject of a report.

use rayon::prelude::*;

use crate::error::ProjectionError;
use crate::projection::{Outlook, attendance_percent, meets_target, outlook};
use crate::types::{AttendanceCount, PresencePolicy, SubjectRecord, TargetQuery};

/// Projection of a single subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectProjection {
    pub subject: String,
    pub counts: AttendanceCount,
    pub query: TargetQuery,
    pub percent: Option<f64>,
    pub outlook: Result<Outlook, ProjectionError>,
}

impl SubjectProjection {
    fn from_record(
        record: &SubjectRecord,
        policy: PresencePolicy,
        target_percent: f64,
    ) -> Result<Self, ProjectionError> {
        let query = record.counts.query(policy, target_percent)?;
        Ok(Self {
            subject: record.subject.clone(),
            counts: record.counts,
            query,
            percent: attendance_percent(query.effective_present, query.total),
            outlook: outlook(&query),
        })
    }

    /// Whether the subject is at or above the target.
    pub fn meets_target(&self) -> bool {
        self.percent.is_some()
            && meets_target(
                self.query.effective_present,
                self.query.total,
                self.query.target_percent,
            )
    }
}

/// Projects every subject independently, preserving input order.
///
/// Fails only when a subject's counts overflow under `policy`; projection
/// errors of individual subjects are kept in [`SubjectProjection::outlook`].
pub fn project_roster(
    records: &[SubjectRecord],
    policy: PresencePolicy,
    target_percent: f64,
) -> Result<Vec<SubjectProjection>, ProjectionError> {
    records
        .par_iter()
        .map(|record| SubjectProjection::from_record(record, policy, target_percent))
        .collect()
}
