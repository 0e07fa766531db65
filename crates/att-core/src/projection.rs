//! Attendance projection.
//!
//! Answers the two inverse questions about an attendance ratio `p / t`
//! against a target `T` (in percent):
//!
//! 1. `classes_needed`: the smallest `n` with `(p + n) / (t + n) >= T / 100`.
//!    Solving `(p + x) / (t + x) = T / 100` gives `x = (t*T - 100*p) / (100 - T)`.
//! 2. `classes_can_leave`: the largest `n` with `p / (t + n) * 100 >= T`,
//!    which is `floor(p*100 / T - t)`.
//!
//! The closed forms are evaluated in floating point only to get a starting
//! point. The answer itself comes from a galloping search over the exact
//! inequality `p * 100 >= T * t` in integer arithmetic, with the target taken
//! at its shortest decimal representation: `99.999999` means exactly
//! 99.999999, not the nearest binary fraction.

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::types::{ProjectionResult, TargetQuery};

/// What a caller should tell the student about a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "classes", rename_all = "snake_case")]
pub enum Outlook {
    /// Below target: attend this many more classes.
    Attend(u64),
    /// At or above target: this many classes can be skipped.
    CanLeave(u64),
    /// A target of 0% is met no matter how many classes are skipped.
    Unbounded,
    /// A target of 100% that is not met can never be reached.
    Unreachable,
}

/// A target percentage in \[0, 100\] as the exact decimal `digits / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExactPercent {
    digits: u128,
    scale: u32,
}

impl ExactPercent {
    /// `None` for targets outside \[0, 100\], NaN included.
    fn parse(target_percent: f64) -> Option<Self> {
        if !(0.0..=100.0).contains(&target_percent) {
            return None;
        }
        // `{:e}` prints the shortest decimal that round-trips, e.g. "9.9999999e1"
        let text = format!("{:e}", target_percent.abs());
        let (mantissa, exponent) = text.split_once('e')?;
        let exponent: i32 = exponent.parse().ok()?;
        let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let digits: u128 = format!("{whole}{fraction}").parse().ok()?;
        let power = exponent - i32::try_from(fraction.len()).ok()?;

        if power >= 0 {
            Some(Self {
                digits: digits.checked_mul(10u128.checked_pow(power.unsigned_abs())?)?,
                scale: 0,
            })
        } else {
            Some(Self {
                digits,
                scale: power.unsigned_abs(),
            })
        }
    }

    /// Exact `present * 100 >= target * total`.
    fn is_met(self, present: u64, total: u64) -> bool {
        // digits has at most 17 significant digits, so the product fits
        let scaled = self.digits * u128::from(total);
        let required = 10u128
            .checked_pow(self.scale)
            .map_or(u128::from(scaled > 0), |divisor| scaled.div_ceil(divisor));
        u128::from(present) * 100 >= required
    }
}

/// Attendance percentage, or `None` when no classes were held.
pub fn attendance_percent(effective_present: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(approx(effective_present) / approx(total) * 100.0)
}

/// Whether `effective_present / total` is at or above `target_percent`.
///
/// Evaluated exactly as `p * 100 >= T * t` for targets within \[0, 100\].
pub fn meets_target(effective_present: u64, total: u64, target_percent: f64) -> bool {
    ExactPercent::parse(target_percent).map_or_else(
        || approx(effective_present) * 100.0 >= target_percent * approx(total),
        |target| target.is_met(effective_present, total),
    )
}

fn validate(
    effective_present: u64,
    total: u64,
    target_percent: f64,
) -> Result<ExactPercent, ProjectionError> {
    let target = ExactPercent::parse(target_percent).ok_or_else(|| {
        ProjectionError::invalid(format!(
            "target percent must be within [0, 100], got {target_percent}"
        ))
    })?;
    if effective_present > total {
        return Err(ProjectionError::invalid(format!(
            "effective present ({effective_present}) exceeds total ({total})"
        )));
    }
    Ok(target)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "counts only feed display percentages and search hints"
)]
fn approx(count: u64) -> f64 {
    count as f64
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "float-to-int casts saturate and the result is only a search hint"
)]
fn hint(value: f64) -> u64 {
    value as u64
}

fn out_of_range() -> ProjectionError {
    ProjectionError::invalid("projection exceeds the representable class count")
}

/// Smallest `n` in `0..=limit` for which `holds` is true, where `holds` is
/// false up to some point and true after it.
///
/// Gallops outward from `start` to bracket the answer, then bisects, so a
/// close start costs only a few evaluations.
fn first_passing(start: u64, limit: u64, holds: impl Fn(u64) -> bool) -> Option<u64> {
    let start = start.min(limit);
    let (mut low, mut high) = if holds(start) {
        let mut high = start;
        let mut step = 1u64;
        loop {
            if high == 0 {
                return Some(0);
            }
            let candidate = start.saturating_sub(step);
            if !holds(candidate) {
                break (candidate + 1, high);
            }
            high = candidate;
            step = step.saturating_mul(2);
        }
    } else {
        let mut failing = start;
        let mut step = 1u64;
        loop {
            if failing == limit {
                return None;
            }
            let candidate = start.saturating_add(step).min(limit);
            if holds(candidate) {
                break (failing + 1, candidate);
            }
            failing = candidate;
            step = step.saturating_mul(2);
        }
    };

    while low < high {
        let mid = low + (high - low) / 2;
        if holds(mid) {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    Some(high)
}

/// Minimum number of additional attended classes to reach `target_percent`.
///
/// Returns 0 when the target is already met. A target of 100% that is not
/// already met fails with [`ProjectionError::Unreachable`].
pub fn classes_needed(
    effective_present: u64,
    total: u64,
    target_percent: f64,
) -> Result<u64, ProjectionError> {
    if total == 0 {
        return Err(ProjectionError::invalid(
            "total must be greater than zero (no classes recorded)",
        ));
    }
    let target = validate(effective_present, total, target_percent)?;

    if target.is_met(effective_present, total) {
        return Ok(0);
    }
    if target_percent >= 100.0 {
        return Err(ProjectionError::Unreachable { target_percent });
    }

    let deficit =
        target_percent.mul_add(approx(total), -(100.0 * approx(effective_present)));
    let start = hint((deficit / (100.0 - target_percent)).ceil());

    // Totals beyond u64::MAX cannot be represented
    first_passing(start, u64::MAX - total, |n| {
        target.is_met(effective_present + n, total + n)
    })
    .ok_or_else(out_of_range)
}

/// Maximum number of future classes that can be skipped while staying at or
/// above `target_percent`.
///
/// Skipped classes grow the total only. A target of 0% is unbounded and
/// fails with [`ProjectionError::InvalidInput`].
pub fn classes_can_leave(
    effective_present: u64,
    total: u64,
    target_percent: f64,
) -> Result<u64, ProjectionError> {
    let target = validate(effective_present, total, target_percent)?;
    if target_percent <= 0.0 {
        return Err(ProjectionError::invalid(
            "a target of 0% allows an unbounded number of skipped classes",
        ));
    }
    if effective_present == 0 || !target.is_met(effective_present, total) {
        return Ok(0);
    }

    let headroom = (approx(effective_present) * 100.0 / target_percent - approx(total)).floor();
    let start = hint(headroom).saturating_add(1);

    // The first count that drops below target is one past the answer
    let first_short = first_passing(start, u64::MAX - total, |n| {
        !target.is_met(effective_present, total + n)
    })
    .ok_or_else(out_of_range)?;
    Ok(first_short - 1)
}

/// Runs both operations for a query.
pub fn project(query: &TargetQuery) -> Result<ProjectionResult, ProjectionError> {
    Ok(ProjectionResult {
        classes_to_attend: classes_needed(
            query.effective_present,
            query.total,
            query.target_percent,
        )?,
        classes_can_leave: classes_can_leave(
            query.effective_present,
            query.total,
            query.target_percent,
        )?,
    })
}

/// Picks the answer relevant to the current state of a query.
///
/// Below target the caller wants [`classes_needed`]; at or above target it
/// wants [`classes_can_leave`]. The 0% and 100% edge cases are reported as
/// [`Outlook::Unbounded`] and [`Outlook::Unreachable`] instead of errors.
pub fn outlook(query: &TargetQuery) -> Result<Outlook, ProjectionError> {
    let TargetQuery {
        effective_present,
        total,
        target_percent,
    } = *query;

    if total == 0 {
        return Err(ProjectionError::invalid(
            "total must be greater than zero (no classes recorded)",
        ));
    }
    validate(effective_present, total, target_percent)?;

    if meets_target(effective_present, total, target_percent) {
        if target_percent <= 0.0 {
            return Ok(Outlook::Unbounded);
        }
        return classes_can_leave(effective_present, total, target_percent).map(Outlook::CanLeave);
    }

    match classes_needed(effective_present, total, target_percent) {
        Ok(n) => Ok(Outlook::Attend(n)),
        Err(ProjectionError::Unreachable { .. }) => Ok(Outlook::Unreachable),
        Err(e) => Err(e),
    }
}
