//! # guardia-solver
//!
//! Backtracking solver for monthly on-call rosters.
//!
//! This crate provides:
//! - Hard constraint checks (vacations, locks, caps, rest, weekday and weekend limits, pairing)
//! - Soft scoring (WANT/AVOID preferences, lifetime equity)
//! - Depth-first search with undo and an attempt ceiling
//! - Input validation, manual assignment validation and monthly statistics
//!
//! ## Example
//!
//! ```rust
//! use guardia_core::{calendar::YearMonth, MonthData, Person, ShiftGenerator};
//! use guardia_solver::ShiftSolver;
//!
//! let mut data = MonthData::new(YearMonth::new(2024, 4).unwrap());
//! data.people = (0..12).map(|i| Person::new(format!("p{i}"))).collect();
//!
//! let schedule = ShiftSolver::new().generate(&data).unwrap();
//! assert_eq!(schedule.assignments.len(), 30);
//! ```

pub mod checker;
pub mod input;
pub mod scorer;
pub mod search;
pub mod state;
pub mod stats;
pub mod validate;

use guardia_core::{EngineConfig, MonthData, Schedule, ScheduleError, ShiftGenerator};

pub use checker::{ConstraintChecker, PairConflict, Rejection};
pub use input::validate_input;
pub use scorer::Scorer;
pub use search::BacktrackingSearch;
pub use state::{PersonState, Snapshot};
pub use stats::{month_stats, PersonStats};
pub use validate::{audit_schedule, validate_assignment, Violation, ViolationCode};

/// Backtracking shift generator
#[derive(Debug, Clone, Default)]
pub struct ShiftSolver {
    pub config: EngineConfig,
}

impl ShiftSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl ShiftGenerator for ShiftSolver {
    fn generate(&self, data: &MonthData) -> Result<Schedule, ScheduleError> {
        validate_input(data, &self.config)?;
        BacktrackingSearch::new(data, &self.config).run()
    }
}

/// Validate `data` and run one search with `config`
pub fn generate(data: &MonthData, config: &EngineConfig) -> Result<Schedule, ScheduleError> {
    validate_input(data, config)?;
    BacktrackingSearch::new(data, config).run()
}
