//! Core domain logic for the attendance tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Projection: classes to attend to reach a target, and classes that can be skipped
//! - Records: parsing attendance reports exported from a student portal
//! - Aggregation: summing per-subject counts into overall figures
//! - Simulation: projecting the effect of skipping future classes

pub mod aggregate;
mod error;
pub mod projection;
pub mod record;
mod roster;
pub mod simulate;
pub mod types;

pub use aggregate::{Summary, aggregate, apply_adjustments};
pub use error::ProjectionError;
pub use projection::{
    Outlook, attendance_percent, classes_can_leave, classes_needed, meets_target, outlook, project,
};
pub use record::{ParsedReport, RecordError, parse_report};
pub use roster::{SubjectProjection, project_roster};
pub use simulate::{LeaveScenario, leave_schedule, simulate_leave};
pub use types::{
    Adjustment, AttendanceCount, CategoryTreatment, PresencePolicy, ProjectionResult,
    SubjectRecord, TargetQuery, ValidationError,
};
