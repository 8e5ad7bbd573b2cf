//! Generation reports
//!
//! An immutable record of one successful generation run, kept for audit and
//! history. Written by the caller after the assignments have been persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::{Assignment, Schedule};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub month: YearMonth,
    /// The full accepted assignment list
    pub assignments: Vec<Assignment>,
    pub generated_at: DateTime<Utc>,
    /// Who requested the run, when known
    #[serde(default)]
    pub initiator: Option<String>,
}

impl GenerationReport {
    /// Report for `schedule`, stamped now
    pub fn new(schedule: &Schedule, initiator: Option<String>) -> Self {
        Self::at(schedule, initiator, Utc::now())
    }

    pub fn at(schedule: &Schedule, initiator: Option<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            month: schedule.month,
            assignments: schedule.assignments.clone(),
            generated_at,
            initiator,
        }
    }
}
