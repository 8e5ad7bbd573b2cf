//! Preference budgets
//!
//! Each person gets a monthly allowance of WANT points and AVOID points
//! (independent of each other) and a small number of LOCK dates. Budgets are
//! enforced when a preference is submitted; the engine itself only reads the
//! resulting records.

use chrono::NaiveDate;
use thiserror::Error;

use crate::{EngineConfig, Preference, PreferenceKind};

/// Rejected preference submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    #[error("Points must be between 0 and {max} (got {points})")]
    PointsOutOfRange { points: u8, max: u8 },

    #[error("{kind} budget of {budget} points exceeded: {remaining} points left")]
    BudgetExceeded {
        kind: &'static str,
        budget: u32,
        remaining: u32,
    },

    #[error("Only {max} locked day(s) per month; already locked {existing}")]
    LockLimit { max: u32, existing: NaiveDate },
}

/// What to do with an accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetDecision {
    /// Insert or replace the preference for that date
    Upsert,
    /// A zero-point WANT/AVOID clears the date
    Remove,
}

/// Points and locks already spent by one person in one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetUsage {
    pub want: u32,
    pub avoid: u32,
    pub locks: u32,
}

impl BudgetUsage {
    /// Tally `preferences`, skipping any dated `except`
    pub fn tally<'a>(
        preferences: impl IntoIterator<Item = &'a Preference>,
        except: Option<NaiveDate>,
    ) -> Self {
        let mut usage = Self::default();
        for pref in preferences {
            if Some(pref.date) == except {
                continue;
            }
            match pref.kind {
                PreferenceKind::Want(points) => usage.want += u32::from(points),
                PreferenceKind::Avoid(points) => usage.avoid += u32::from(points),
                PreferenceKind::Lock => usage.locks += 1,
            }
        }
        usage
    }

    /// Whether the tally fits the configured budgets
    pub fn within(&self, config: &EngineConfig) -> bool {
        self.want <= config.want_budget
            && self.avoid <= config.avoid_budget
            && self.locks <= config.max_locks
    }
}

/// Check a submission against the person's existing preferences for the month.
///
/// `existing` must hold only that person's preferences for the same month.
/// Any existing record on the candidate's date is treated as being replaced.
/// `admin` lifts the LOCK limit (administrators may lock on someone's behalf).
pub fn check_submission(
    existing: &[Preference],
    candidate: &Preference,
    config: &EngineConfig,
    admin: bool,
) -> Result<BudgetDecision, BudgetError> {
    let points = candidate.kind.points();
    if points > config.max_points {
        return Err(BudgetError::PointsOutOfRange {
            points,
            max: config.max_points,
        });
    }

    let usage = BudgetUsage::tally(existing, Some(candidate.date));

    let (used, budget) = match candidate.kind {
        PreferenceKind::Want(_) => (usage.want, config.want_budget),
        PreferenceKind::Avoid(_) => (usage.avoid, config.avoid_budget),
        PreferenceKind::Lock => {
            if !admin && usage.locks >= config.max_locks {
                let existing = existing
                    .iter()
                    .filter(|p| p.date != candidate.date && p.kind == PreferenceKind::Lock)
                    .map(|p| p.date)
                    .min()
                    .unwrap_or(candidate.date);
                return Err(BudgetError::LockLimit {
                    max: config.max_locks,
                    existing,
                });
            }
            return Ok(BudgetDecision::Upsert);
        }
    };

    if points == 0 {
        return Ok(BudgetDecision::Remove);
    }

    if used + u32::from(points) > budget {
        return Err(BudgetError::BudgetExceeded {
            kind: candidate.kind.label(),
            budget,
            remaining: budget.saturating_sub(used),
        });
    }

    Ok(BudgetDecision::Upsert)
}
