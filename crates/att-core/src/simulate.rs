//! Leave simulation: what happens to attendance if future classes are skipped.

use serde::Serialize;

use crate::error::ProjectionError;
use crate::projection::{Outlook, attendance_percent, meets_target, outlook};
use crate::types::TargetQuery;

/// Longest schedule [`leave_schedule`] will produce.
pub const MAX_SCHEDULE_LEN: u64 = 1_000;

/// State after skipping some number of future classes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaveScenario {
    pub skipped: u64,
    pub effective_present: u64,
    pub total: u64,
    pub percent: f64,
    pub meets_target: bool,
    pub outlook: Outlook,
}

/// Projects the query after `skipped` more classes are missed.
pub fn simulate_leave(query: &TargetQuery, skipped: u64) -> Result<LeaveScenario, ProjectionError> {
    let after = query.with_skipped(skipped);
    let percent = attendance_percent(after.effective_present, after.total).ok_or_else(|| {
        ProjectionError::invalid("total must be greater than zero (no classes recorded)")
    })?;

    Ok(LeaveScenario {
        skipped,
        effective_present: after.effective_present,
        total: after.total,
        percent,
        meets_target: meets_target(after.effective_present, after.total, after.target_percent),
        outlook: outlook(&after)?,
    })
}

/// Scenarios for skipping `0..=max_skipped` classes.
pub fn leave_schedule(
    query: &TargetQuery,
    max_skipped: u64,
) -> Result<Vec<LeaveScenario>, ProjectionError> {
    if max_skipped > MAX_SCHEDULE_LEN {
        return Err(ProjectionError::invalid(format!(
            "schedule length {max_skipped} exceeds the limit of {MAX_SCHEDULE_LEN}"
        )));
    }
    (0..=max_skipped)
        .map(|skipped| simulate_leave(query, skipped))
        .collect()
}
