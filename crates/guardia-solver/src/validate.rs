//! Manual assignment validation and schedule audits
//!
//! The search only produces schedules that satisfy every hard rule, but
//! shifts can also be entered by hand. These functions apply the same rules
//! to a proposed shift or to a whole month and report each violation with a
//! stable code.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use guardia_core::{Assignment, EngineConfig, MonthData, PersonId};

use crate::checker::{ConstraintChecker, PairConflict, Rejection};
use crate::state::Snapshot;

/// Stable identifier of a broken rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    SameUser,
    UserNotFound,
    OutsideMonth,
    DuplicateDate,
    GroupConflict,
    ExclusiveGroupConflict,
    Vacation,
    BlockedDay,
    MonthlyLimit,
    Separation,
    ThursdayLimit,
    FridayLimit,
    WeekendLimit,
}

impl ViolationCode {
    fn of(rejection: &Rejection) -> Self {
        match rejection {
            Rejection::Vacation => ViolationCode::Vacation,
            Rejection::Locked => ViolationCode::BlockedDay,
            Rejection::MonthlyCap { .. } => ViolationCode::MonthlyLimit,
            Rejection::RestSeparation { .. } => ViolationCode::Separation,
            Rejection::ThursdayCap { .. } => ViolationCode::ThursdayLimit,
            Rejection::FridayCap { .. } => ViolationCode::FridayLimit,
            Rejection::WeekendCap { .. } => ViolationCode::WeekendLimit,
        }
    }
}

/// A broken rule on a given date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub code: ViolationCode,
    pub date: NaiveDate,
    /// Person at fault, when the rule concerns one person
    pub person: Option<PersonId>,
    pub message: String,
}

impl Violation {
    fn new(code: ViolationCode, date: NaiveDate, person: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code,
            date,
            person: person.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.person {
            Some(person) => write!(f, "{} [{:?}] {}: {}", self.date, self.code, person, self.message),
            None => write!(f, "{} [{:?}] {}", self.date, self.code, self.message),
        }
    }
}

/// Check a proposed manual shift on `date`.
///
/// The month's existing assignments are taken from `data.fixed`; whatever is
/// currently on `date` is ignored since the proposal replaces it.
pub fn validate_assignment(
    data: &MonthData,
    config: &EngineConfig,
    date: NaiveDate,
    first: &str,
    second: &str,
) -> Vec<Violation> {
    let others = data.fixed.iter().filter(|a| a.date != date);
    let snapshot = Snapshot::with_assignments(data, config, others);
    let mut violations = Vec::new();

    if !data.month.contains(date) {
        violations.push(Violation::new(
            ViolationCode::OutsideMonth,
            date,
            None,
            format!("date is outside {}", data.month),
        ));
    }
    check_slots(&snapshot, config, date, first, second, &mut violations);
    violations
}

/// Re-check every hard rule over a month of assignments
pub fn audit_schedule(data: &MonthData, config: &EngineConfig, assignments: &[Assignment]) -> Vec<Violation> {
    let mut snapshot = Snapshot::with_assignments(data, config, std::iter::empty::<&Assignment>());
    let mut sorted: Vec<&Assignment> = assignments.iter().collect();
    sorted.sort_by_key(|a| a.date);

    let mut violations = Vec::new();
    let mut dates = HashSet::new();

    for assignment in sorted {
        let date = assignment.date;
        if !data.month.contains(date) {
            violations.push(Violation::new(
                ViolationCode::OutsideMonth,
                date,
                None,
                format!("date is outside {}", data.month),
            ));
        }
        if !dates.insert(date) {
            violations.push(Violation::new(
                ViolationCode::DuplicateDate,
                date,
                None,
                "more than one assignment on this date",
            ));
        }

        check_slots(&snapshot, config, date, &assignment.first, &assignment.second, &mut violations);

        for id in assignment.people() {
            if let Some(index) = snapshot.index_of(id) {
                snapshot.assign(index, date);
            }
        }
    }

    violations
}

fn check_slots(
    snapshot: &Snapshot,
    config: &EngineConfig,
    date: NaiveDate,
    first: &str,
    second: &str,
    violations: &mut Vec<Violation>,
) {
    let checker = ConstraintChecker::new(config);

    if first == second {
        violations.push(Violation::new(
            ViolationCode::SameUser,
            date,
            Some(first),
            "both slots must be different people",
        ));
    }

    let slots = [first, second];
    let slots = if first == second { &slots[..1] } else { &slots[..] };
    for &id in slots {
        match snapshot.by_id(id) {
            Some(state) => {
                for rejection in checker.rejections(state, date) {
                    violations.push(Violation::new(
                        ViolationCode::of(&rejection),
                        date,
                        Some(id),
                        rejection.to_string(),
                    ));
                }
            }
            None => violations.push(Violation::new(
                ViolationCode::UserNotFound,
                date,
                Some(id),
                "unknown person",
            )),
        }
    }

    if first != second {
        if let (Some(a), Some(b)) = (snapshot.by_id(first), snapshot.by_id(second)) {
            if let Some(conflict) = checker.pair_conflict(a, b) {
                let code = match conflict {
                    PairConflict::SameGroup(_) => ViolationCode::GroupConflict,
                    PairConflict::ExclusiveGroups(..) => ViolationCode::ExclusiveGroupConflict,
                };
                violations.push(Violation::new(code, date, None, conflict.to_string()));
            }
        }
    }
}
