//! Backtracking search
//!
//! Walks the days of the month in order. A fixed day is accepted as is; an
//! open day tries every admissible pair in score order, recursing into the
//! next day and undoing the tentative pair when the rest of the month cannot
//! be completed. Every recursive call counts against the attempt ceiling.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

use guardia_core::{
    Assignment, EngineConfig, FailureCause, MonthData, Schedule, ScheduleError, SearchStats,
};

use crate::checker::ConstraintChecker;
use crate::scorer::Scorer;
use crate::state::{PersonIndex, Snapshot};

/// Outcome of one call frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Every remaining day is covered
    Found,
    /// No pair works from here; the caller should try its next pair
    DeadEnd,
    /// Attempt ceiling exceeded; unwind without trying anything else
    Aborted,
}

/// State of one generation run.
///
/// Owns everything it mutates, so independent runs never share state.
pub struct BacktrackingSearch<'a> {
    data: &'a MonthData,
    config: &'a EngineConfig,
    days: Vec<NaiveDate>,
    fixed: HashMap<NaiveDate, Assignment>,
    snapshot: Snapshot,
    checker: ConstraintChecker<'a>,
    scorer: Scorer<'a>,
    rng: Option<StdRng>,
    path: Vec<Assignment>,
    stats: SearchStats,
}

impl<'a> BacktrackingSearch<'a> {
    /// Prepare a run. `data` is expected to have passed input validation.
    pub fn new(data: &'a MonthData, config: &'a EngineConfig) -> Self {
        let days: Vec<NaiveDate> = data.month.days().collect();
        let fixed: HashMap<NaiveDate, Assignment> =
            data.fixed.iter().map(|a| (a.date, a.clone())).collect();

        let fixed_days = days.iter().filter(|d| fixed.contains_key(d)).count();
        let stats = SearchStats {
            fixed_days,
            open_days: days.len() - fixed_days,
            ..SearchStats::default()
        };

        Self {
            data,
            config,
            snapshot: Snapshot::build(data, config),
            checker: ConstraintChecker::new(config),
            scorer: Scorer::new(&config.scoring),
            rng: config.scoring.tie_break_seed.map(StdRng::seed_from_u64),
            path: Vec::with_capacity(days.len()),
            days,
            fixed,
            stats,
        }
    }

    /// Run to completion: a full month of assignments or a failure cause
    pub fn run(mut self) -> Result<Schedule, ScheduleError> {
        let started = Instant::now();
        info!(
            month = %self.data.month,
            people = self.snapshot.len(),
            fixed_days = self.stats.fixed_days,
            open_days = self.stats.open_days,
            attempt_ceiling = self.config.attempt_ceiling,
            "generation started"
        );

        let step = self.descend(0);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match step {
            Step::Found => {
                info!(
                    month = %self.data.month,
                    attempts = self.stats.attempts,
                    backtracks = self.stats.backtracks,
                    elapsed_ms,
                    "generation succeeded"
                );
                Ok(Schedule {
                    month: self.data.month,
                    assignments: self.path,
                    stats: self.stats,
                })
            }
            Step::DeadEnd => {
                let deepest = self
                    .days
                    .get(self.stats.deepest_day)
                    .copied()
                    .unwrap_or_else(|| self.data.month.first_day());
                info!(
                    month = %self.data.month,
                    attempts = self.stats.attempts,
                    %deepest,
                    elapsed_ms,
                    "generation infeasible"
                );
                Err(ScheduleError::Infeasible(FailureCause::Exhausted { deepest }))
            }
            Step::Aborted => {
                info!(
                    month = %self.data.month,
                    attempts = self.stats.attempts,
                    deepest_day = self.stats.deepest_day,
                    elapsed_ms,
                    "generation aborted at attempt ceiling"
                );
                Err(ScheduleError::Infeasible(FailureCause::AttemptCeiling {
                    attempts: self.stats.attempts,
                }))
            }
        }
    }

    fn descend(&mut self, day: usize) -> Step {
        self.stats.attempts += 1;
        if self.stats.attempts > self.config.attempt_ceiling {
            debug!(day, attempts = self.stats.attempts, "attempt ceiling exceeded");
            return Step::Aborted;
        }
        if day == self.days.len() {
            return Step::Found;
        }
        self.stats.deepest_day = self.stats.deepest_day.max(day);

        let date = self.days[day];

        if let Some(fixed) = self.fixed.get(&date).cloned() {
            self.path.push(fixed);
            let step = self.descend(day + 1);
            if step != Step::Found {
                self.path.pop();
            }
            return step;
        }

        let candidates = self.candidates(date);
        for (pos, &a) in candidates.iter().enumerate() {
            for &b in &candidates[pos + 1..] {
                if !self
                    .checker
                    .pair_admissible(self.snapshot.get(a), self.snapshot.get(b))
                {
                    continue;
                }

                self.place(a, b, date);
                match self.descend(day + 1) {
                    Step::Found => return Step::Found,
                    Step::Aborted => {
                        self.undo(a, b, date);
                        return Step::Aborted;
                    }
                    Step::DeadEnd => {
                        self.undo(a, b, date);
                        self.stats.backtracks += 1;
                    }
                }
            }
        }

        debug!(%date, candidates = candidates.len(), "no admissible pair");
        Step::DeadEnd
    }

    /// Admissible people for `date`, best first
    fn candidates(&mut self, date: NaiveDate) -> Vec<PersonIndex> {
        let mut candidates: Vec<PersonIndex> = self
            .snapshot
            .iter()
            .filter(|(_, person)| self.checker.admissible(person, date))
            .map(|(i, _)| i)
            .collect();
        self.scorer
            .rank(&self.snapshot, &mut candidates, date, self.rng.as_mut());
        candidates
    }

    fn place(&mut self, a: PersonIndex, b: PersonIndex, date: NaiveDate) {
        self.snapshot.assign(a, date);
        self.snapshot.assign(b, date);
        self.path.push(Assignment::new(
            date,
            self.snapshot.get(a).id.clone(),
            self.snapshot.get(b).id.clone(),
        ));
    }

    fn undo(&mut self, a: PersonIndex, b: PersonIndex, date: NaiveDate) {
        self.path.pop();
        self.snapshot.unassign(b, date);
        self.snapshot.unassign(a, date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardia_core::calendar::YearMonth;
    use guardia_core::Person;
    use pretty_assertions::assert_eq;

    fn month_data(year: i32, month: u32, people: usize) -> MonthData {
        let mut data = MonthData::new(YearMonth::new(year, month).unwrap());
        data.people = (0..people).map(|i| Person::new(format!("p{i}"))).collect();
        data
    }

    #[test]
    fn fills_every_day_in_order() {
        let data = month_data(2024, 4, 12);
        let config = EngineConfig::default();

        let schedule = BacktrackingSearch::new(&data, &config).run().unwrap();

        assert_eq!(schedule.assignments.len(), 30);
        let dates: Vec<_> = schedule.assignments.iter().map(|a| a.date).collect();
        let expected: Vec<_> = data.month.days().collect();
        assert_eq!(dates, expected);
        assert_eq!(schedule.stats.open_days, 30);
        assert_eq!(schedule.stats.fixed_days, 0);
    }

    #[test]
    fn too_few_people_is_exhausted() {
        let data = month_data(2024, 4, 3);
        let config = EngineConfig::default();

        let err = BacktrackingSearch::new(&data, &config).run().unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Infeasible(FailureCause::Exhausted { .. })
        ));
    }

    #[test]
    fn tiny_ceiling_aborts() {
        // Feasible input, but the ceiling stops the search on day 3
        let data = month_data(2024, 4, 12);
        let config = EngineConfig {
            attempt_ceiling: 3,
            ..EngineConfig::default()
        };

        let err = BacktrackingSearch::new(&data, &config).run().unwrap_err();
        match err {
            ScheduleError::Infeasible(FailureCause::AttemptCeiling { attempts }) => {
                assert_eq!(attempts, 4);
            }
            other => panic!("expected attempt ceiling, got {other:?}"),
        }
    }

    #[test]
    fn all_fixed_month_needs_no_people() {
        let mut data = month_data(2026, 2, 0);
        data.fixed = data
            .month
            .days()
            .map(|d| Assignment::new(d, "x", "y"))
            .collect();
        let config = EngineConfig::default();

        let schedule = BacktrackingSearch::new(&data, &config).run().unwrap();
        assert_eq!(schedule.assignments, data.fixed);
        assert_eq!(schedule.stats.fixed_days, 28);
        assert_eq!(schedule.stats.attempts, 29);
    }
}
