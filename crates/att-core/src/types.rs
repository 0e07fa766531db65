//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ProjectionError;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Unrecognized category treatment.
    #[error("invalid category treatment: {value} (expected attended, absent or ignored)")]
    InvalidTreatment { value: String },

    /// Unrecognized presence policy.
    #[error(
        "invalid presence policy: {value} (expected standard, makeup-only, strict or <on_duty>:<makeup>)"
    )]
    InvalidPolicy { value: String },
}

/// How a class category contributes to the attendance ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryTreatment {
    /// Counts toward both the present count and the total.
    Attended,
    /// Counts toward the total only.
    Absent,
    /// Dropped from both.
    Ignored,
}

impl CategoryTreatment {
    /// String representation used in configuration files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attended => "attended",
            Self::Absent => "absent",
            Self::Ignored => "ignored",
        }
    }

    const fn present_share(self, count: u64) -> u64 {
        match self {
            Self::Attended => count,
            Self::Absent | Self::Ignored => 0,
        }
    }

    const fn total_share(self, count: u64) -> u64 {
        match self {
            Self::Attended | Self::Absent => count,
            Self::Ignored => 0,
        }
    }
}

impl fmt::Display for CategoryTreatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CategoryTreatment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attended" => Ok(Self::Attended),
            "absent" => Ok(Self::Absent),
            "ignored" => Ok(Self::Ignored),
            _ => Err(ValidationError::InvalidTreatment {
                value: s.to_string(),
            }),
        }
    }
}

/// Which of the on-duty and makeup categories count as attended.
///
/// Portals disagree on this, so it is always an explicit choice. Parsed from
/// a preset name or an `<on_duty>:<makeup>` pair such as `attended:ignored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PresencePolicy {
    pub on_duty: CategoryTreatment,
    pub makeup: CategoryTreatment,
}

impl PresencePolicy {
    /// On-duty and makeup classes both count as attended.
    pub const STANDARD: Self = Self {
        on_duty: CategoryTreatment::Attended,
        makeup: CategoryTreatment::Attended,
    };

    /// Makeup classes count as attended; on-duty classes are dropped.
    pub const MAKEUP_ONLY: Self = Self {
        on_duty: CategoryTreatment::Ignored,
        makeup: CategoryTreatment::Attended,
    };

    /// On-duty and makeup classes both count as absences.
    pub const STRICT: Self = Self {
        on_duty: CategoryTreatment::Absent,
        makeup: CategoryTreatment::Absent,
    };

    const PRESETS: [(&'static str, Self); 3] = [
        ("standard", Self::STANDARD),
        ("makeup-only", Self::MAKEUP_ONLY),
        ("strict", Self::STRICT),
    ];

    /// Returns the preset name, if this policy matches one.
    pub fn preset_name(&self) -> Option<&'static str> {
        Self::PRESETS
            .iter()
            .find(|(_, policy)| policy == self)
            .map(|(name, _)| *name)
    }
}

impl Default for PresencePolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Display for PresencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.preset_name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "{}:{}", self.on_duty, self.makeup),
        }
    }
}

impl FromStr for PresencePolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((_, policy)) = Self::PRESETS.iter().find(|(name, _)| *name == s) {
            return Ok(*policy);
        }

        let invalid = || ValidationError::InvalidPolicy {
            value: s.to_string(),
        };
        let (on_duty, makeup) = s.split_once(':').ok_or_else(invalid)?;
        Ok(Self {
            on_duty: on_duty.trim().parse().map_err(|_| invalid())?,
            makeup: makeup.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for PresencePolicy {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PresencePolicy> for String {
    fn from(policy: PresencePolicy) -> Self {
        policy.to_string()
    }
}

/// Raw class counts for one subject (or a sum of subjects).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttendanceCount {
    pub present: u64,
    pub absent: u64,
    pub on_duty: u64,
    pub makeup: u64,
}

impl AttendanceCount {
    pub const fn new(present: u64, absent: u64, on_duty: u64, makeup: u64) -> Self {
        Self {
            present,
            absent,
            on_duty,
            makeup,
        }
    }

    /// Classes that count as attended under `policy`, or `None` on overflow.
    pub fn effective_present(&self, policy: PresencePolicy) -> Option<u64> {
        self.present
            .checked_add(policy.on_duty.present_share(self.on_duty))?
            .checked_add(policy.makeup.present_share(self.makeup))
    }

    /// Classes that count toward the denominator under `policy`, or `None`
    /// on overflow.
    pub fn total(&self, policy: PresencePolicy) -> Option<u64> {
        self.present
            .checked_add(self.absent)?
            .checked_add(policy.on_duty.total_share(self.on_duty))?
            .checked_add(policy.makeup.total_share(self.makeup))
    }

    /// Component-wise sum, or `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        Some(Self {
            present: self.present.checked_add(other.present)?,
            absent: self.absent.checked_add(other.absent)?,
            on_duty: self.on_duty.checked_add(other.on_duty)?,
            makeup: self.makeup.checked_add(other.makeup)?,
        })
    }

    /// Adds hypothetical extra on-duty and makeup classes.
    pub fn with_adjustment(self, adjustment: Adjustment) -> Option<Self> {
        Some(Self {
            on_duty: self.on_duty.checked_add(adjustment.extra_on_duty)?,
            makeup: self.makeup.checked_add(adjustment.extra_makeup)?,
            ..self
        })
    }

    /// Builds the projection query for these counts.
    pub fn query(
        &self,
        policy: PresencePolicy,
        target_percent: f64,
    ) -> Result<TargetQuery, ProjectionError> {
        match (self.effective_present(policy), self.total(policy)) {
            (Some(effective_present), Some(total)) => Ok(TargetQuery {
                effective_present,
                total,
                target_percent,
            }),
            _ => Err(ProjectionError::invalid(format!(
                "attendance counts overflow under policy {policy}"
            ))),
        }
    }
}

/// Hypothetical additional on-duty and makeup classes for a subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub extra_on_duty: u64,
    pub extra_makeup: u64,
}

impl Adjustment {
    pub const fn is_empty(&self) -> bool {
        self.extra_on_duty == 0 && self.extra_makeup == 0
    }
}

/// Attendance counts for a named subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub subject: String,
    pub counts: AttendanceCount,
}

/// Input to the projection engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetQuery {
    pub effective_present: u64,
    pub total: u64,
    /// Target attendance in percent, within \[0, 100\].
    pub target_percent: f64,
}

impl TargetQuery {
    pub const fn new(effective_present: u64, total: u64, target_percent: f64) -> Self {
        Self {
            effective_present,
            total,
            target_percent,
        }
    }

    /// The same query with `extra` more classes in the denominator only.
    pub const fn with_skipped(&self, extra: u64) -> Self {
        Self {
            total: self.total.saturating_add(extra),
            ..*self
        }
    }
}

/// Both answers of the projection engine for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub classes_to_attend: u64,
    pub classes_can_leave: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_policy_counts_everything_as_attended() {
        let counts = AttendanceCount::new(30, 5, 2, 1);
        let policy = PresencePolicy::STANDARD;
        assert_eq!(counts.effective_present(policy), Some(33));
        assert_eq!(counts.total(policy), Some(38));
    }

    #[test]
    fn makeup_only_policy_drops_on_duty() {
        let counts = AttendanceCount::new(30, 5, 2, 1);
        let policy = PresencePolicy::MAKEUP_ONLY;
        assert_eq!(counts.effective_present(policy), Some(31));
        assert_eq!(counts.total(policy), Some(36));
    }

    #[test]
    fn strict_policy_counts_categories_in_total_only() {
        let counts = AttendanceCount::new(30, 5, 2, 1);
        let policy = PresencePolicy::STRICT;
        assert_eq!(counts.effective_present(policy), Some(30));
        assert_eq!(counts.total(policy), Some(38));
    }

    #[test]
    fn effective_present_never_exceeds_total() {
        let counts = AttendanceCount::new(7, 3, 4, 9);
        let treatments = [
            CategoryTreatment::Attended,
            CategoryTreatment::Absent,
            CategoryTreatment::Ignored,
        ];
        for on_duty in treatments {
            for makeup in treatments {
                let policy = PresencePolicy { on_duty, makeup };
                assert!(counts.effective_present(policy).unwrap() <= counts.total(policy).unwrap());
            }
        }
    }

    #[test]
    fn policy_parses_presets_and_pairs() {
        assert_eq!(
            "standard".parse::<PresencePolicy>().unwrap(),
            PresencePolicy::STANDARD
        );
        assert_eq!(
            "makeup-only".parse::<PresencePolicy>().unwrap(),
            PresencePolicy::MAKEUP_ONLY
        );
        assert_eq!(
            "absent:attended".parse::<PresencePolicy>().unwrap(),
            PresencePolicy {
                on_duty: CategoryTreatment::Absent,
                makeup: CategoryTreatment::Attended,
            }
        );
        assert!("lenient".parse::<PresencePolicy>().is_err());
        assert!("attended:present".parse::<PresencePolicy>().is_err());
    }

    #[test]
    fn policy_display_prefers_preset_name() {
        assert_eq!(PresencePolicy::STRICT.to_string(), "strict");
        assert_eq!(
            "attended:ignored".parse::<PresencePolicy>().unwrap().to_string(),
            "attended:ignored"
        );
        // A pair that spells out a preset displays as the preset
        assert_eq!(
            "ignored:attended".parse::<PresencePolicy>().unwrap().to_string(),
            "makeup-only"
        );
    }

    #[test]
    fn policy_serde_uses_string_form() {
        let json = serde_json::to_string(&PresencePolicy::MAKEUP_ONLY).unwrap();
        assert_eq!(json, "\"makeup-only\"");
        let parsed: PresencePolicy = serde_json::from_str("\"absent:ignored\"").unwrap();
        assert_eq!(parsed.on_duty, CategoryTreatment::Absent);
        assert_eq!(parsed.makeup, CategoryTreatment::Ignored);
        assert!(serde_json::from_str::<PresencePolicy>("\"bogus\"").is_err());
    }

    #[test]
    fn checked_add_detects_overflow() {
        let a = AttendanceCount::new(u64::MAX, 0, 0, 0);
        let b = AttendanceCount::new(1, 0, 0, 0);
        assert!(a.checked_add(b).is_none());
        assert_eq!(
            AttendanceCount::new(1, 2, 3, 4).checked_add(AttendanceCount::new(4, 3, 2, 1)),
            Some(AttendanceCount::new(5, 5, 5, 5))
        );
    }

    #[test]
    fn adjustment_adds_extra_categories() {
        let counts = AttendanceCount::new(10, 4, 0, 1)
            .with_adjustment(Adjustment {
                extra_on_duty: 2,
                extra_makeup: 3,
            })
            .unwrap();
        assert_eq!(counts, AttendanceCount::new(10, 4, 2, 4));
    }

    #[test]
    fn counts_that_overflow_do_not_saturate() {
        let counts = AttendanceCount::new(u64::MAX, 5, 0, 0);
        let policy = PresencePolicy::STANDARD;
        assert_eq!(counts.effective_present(policy), Some(u64::MAX));
        assert_eq!(counts.total(policy), None);

        let err = counts.query(policy, 75.0).unwrap_err();
        assert!(err.is_invalid_input());

        let on_duty = AttendanceCount::new(u64::MAX, 0, 1, 0);
        assert_eq!(on_duty.effective_present(policy), None);
        assert_eq!(on_duty.effective_present(PresencePolicy::STRICT), Some(u64::MAX));
    }

    #[test]
    fn query_uses_policy_counts() {
        let query = AttendanceCount::new(30, 5, 2, 1)
            .query(PresencePolicy::STRICT, 80.0)
            .unwrap();
        assert_eq!(query, TargetQuery::new(30, 38, 80.0));
    }

    #[test]
    fn query_with_skipped_inflates_total_only() {
        let query = TargetQuery::new(25, 30, 75.0).with_skipped(3);
        assert_eq!(query.effective_present, 25);
        assert_eq!(query.total, 33);
    }
}
