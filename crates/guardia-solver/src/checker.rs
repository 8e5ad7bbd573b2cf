//! Hard constraints
//!
//! Decides whether a person may take a date, and whether two people may
//! share one. Checks only read the [`PersonState`]; they never mutate it.

use chrono::NaiveDate;
use std::fmt;
use std::ops::ControlFlow;

use guardia_core::calendar::{days_apart, is_friday, is_thursday, weekend_week};
use guardia_core::{EngineConfig, GroupId};

use crate::state::PersonState;

/// Why a person cannot take a date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Vacation,
    Locked,
    MonthlyCap { cap: u32 },
    RestSeparation { nearby: NaiveDate },
    ThursdayCap { max: u32 },
    FridayCap { max: u32 },
    WeekendCap { max: u32 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Vacation => write!(f, "on approved vacation"),
            Rejection::Locked => write!(f, "has locked this date"),
            Rejection::MonthlyCap { cap } => write!(f, "monthly limit of {} shifts reached", cap),
            Rejection::RestSeparation { nearby } => {
                write!(f, "needs rest days between shifts (also on call {})", nearby)
            }
            Rejection::ThursdayCap { max } => write!(f, "already has {} Thursday(s) this month", max),
            Rejection::FridayCap { max } => write!(f, "already has {} Friday(s) this month", max),
            Rejection::WeekendCap { max } => write!(f, "already has {} weekends this month", max),
        }
    }
}

/// Why two people cannot share a date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairConflict {
    SameGroup(GroupId),
    ExclusiveGroups(GroupId, GroupId),
}

impl fmt::Display for PairConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairConflict::SameGroup(group) => {
                write!(f, "people from group {} cannot work together", group)
            }
            PairConflict::ExclusiveGroups(a, b) => {
                write!(f, "groups {} and {} cannot share a shift", a, b)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConstraintChecker<'a> {
    config: &'a EngineConfig,
}

impl<'a> ConstraintChecker<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Whether `person` may take `date`
    pub fn admissible(&self, person: &PersonState, date: NaiveDate) -> bool {
        self.rejection(person, date).is_none()
    }

    /// The first failing rule, cheapest first
    pub fn rejection(&self, person: &PersonState, date: NaiveDate) -> Option<Rejection> {
        match self.evaluate(person, date, |r| ControlFlow::Break(r)) {
            ControlFlow::Break(rejection) => Some(rejection),
            ControlFlow::Continue(()) => None,
        }
    }

    /// Every failing rule
    pub fn rejections(&self, person: &PersonState, date: NaiveDate) -> Vec<Rejection> {
        let mut found = Vec::new();
        let _ = self.evaluate(person, date, |r| {
            found.push(r);
            ControlFlow::<Rejection>::Continue(())
        });
        found
    }

    fn evaluate(
        &self,
        person: &PersonState,
        date: NaiveDate,
        mut report: impl FnMut(Rejection) -> ControlFlow<Rejection>,
    ) -> ControlFlow<Rejection> {
        let config = self.config;

        if person.on_vacation(date) {
            report(Rejection::Vacation)?;
        }
        if person.is_locked(date) {
            report(Rejection::Locked)?;
        }

        if person.assigned_count() >= person.cap {
            report(Rejection::MonthlyCap { cap: person.cap })?;
        }

        let rest = i64::from(config.rest_days);
        if let Some(nearby) = person
            .assigned()
            .iter()
            .copied()
            .find(|d| days_apart(*d, date) <= rest)
        {
            report(Rejection::RestSeparation { nearby })?;
        }

        if is_thursday(date) && person.thursdays() >= config.max_thursdays {
            report(Rejection::ThursdayCap {
                max: config.max_thursdays,
            })?;
        }
        if is_friday(date) && person.fridays() >= config.max_fridays {
            report(Rejection::FridayCap {
                max: config.max_fridays,
            })?;
        }

        if let Some(week) = weekend_week(date) {
            if !person.has_weekend_week(week) && person.weekend_week_count() >= config.max_weekend_weeks {
                report(Rejection::WeekendCap {
                    max: config.max_weekend_weeks,
                })?;
            }
        }

        ControlFlow::Continue(())
    }

    /// Whether `a` and `b` may share a date
    pub fn pair_admissible(&self, a: &PersonState, b: &PersonState) -> bool {
        !self
            .config
            .groups_conflict(a.group.as_deref(), b.group.as_deref())
    }

    pub fn pair_conflict(&self, a: &PersonState, b: &PersonState) -> Option<PairConflict> {
        if self.pair_admissible(a, b) {
            return None;
        }
        match (&a.group, &b.group) {
            (Some(ga), Some(gb)) if ga == gb => Some(PairConflict::SameGroup(ga.clone())),
            (Some(ga), Some(gb)) => Some(PairConflict::ExclusiveGroups(ga.clone(), gb.clone())),
            _ => None,
        }
    }
}
