//! # guardia-core
//!
//! Core domain model and traits for the guardia on-call scheduling engine.
//!
//! This crate provides:
//! - Domain types: `Person`, `Preference`, `Vacation`, `Assignment`, `MonthData`, `Schedule`
//! - Core traits: `ShiftGenerator`, `MonthRepository`, `Renderer`
//! - Calendar utilities, engine configuration and preference budgets
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use guardia_core::{calendar::YearMonth, MonthData, Person, Preference};
//!
//! let mut data = MonthData::new(YearMonth::new(2024, 3).unwrap());
//! data.people.push(Person::new("ana").name("Ana").group("MAMA"));
//! data.people.push(Person::new("luis").name("Luis").cap(2));
//! data.preferences.push(Preference::want(
//!     "ana",
//!     NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
//!     10,
//! ));
//! assert!(data.person("luis").is_some());
//! ```

pub mod budget;
pub mod calendar;
pub mod config;
pub mod report;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use calendar::YearMonth;
pub use config::{ConfigError, EngineConfig, GroupPair, ScoringConfig};
pub use report::GenerationReport;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a person
pub type PersonId = String;

/// Group tag (team affiliation used by pairing rules)
pub type GroupId = String;

// ============================================================================
// Person
// ============================================================================

/// Someone who can take on-call shifts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier
    pub id: PersonId,
    /// Human-readable name
    pub name: String,
    /// Group affiliation; `None` never conflicts
    #[serde(default)]
    pub group: Option<GroupId>,
    /// Monthly shift cap; `None` uses the configured default
    #[serde(default)]
    pub monthly_cap: Option<u32>,
    /// Shifts held over all time, used for equity only
    #[serde(default)]
    pub lifetime_shifts: u32,
}

impl Person {
    /// Create a new person with the given ID
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            group: None,
            monthly_cap: None,
            lifetime_shifts: 0,
        }
    }

    /// Set the display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the group
    pub fn group(mut self, group: impl Into<GroupId>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set an explicit monthly cap
    pub fn cap(mut self, cap: u32) -> Self {
        self.monthly_cap = Some(cap);
        self
    }

    /// Set the lifetime shift count
    pub fn lifetime(mut self, shifts: u32) -> Self {
        self.lifetime_shifts = shifts;
        self
    }
}

// ============================================================================
// Preferences and Vacations
// ============================================================================

/// What a person declared about a date
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreferenceKind {
    /// Wants to work the date; points express strength
    Want(u8),
    /// Would rather not work the date; penalised, never excluded
    Avoid(u8),
    /// Must not work the date
    Lock,
}

impl PreferenceKind {
    pub fn points(&self) -> u8 {
        match self {
            PreferenceKind::Want(points) | PreferenceKind::Avoid(points) => *points,
            PreferenceKind::Lock => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PreferenceKind::Want(_) => "WANT",
            PreferenceKind::Avoid(_) => "AVOID",
            PreferenceKind::Lock => "LOCK",
        }
    }
}

impl fmt::Display for PreferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceKind::Lock => write!(f, "LOCK"),
            other => write!(f, "{} ({} pts)", other.label(), other.points()),
        }
    }
}

/// A declared preference for a single date
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub person: PersonId,
    pub date: NaiveDate,
    pub kind: PreferenceKind,
}

impl Preference {
    pub fn new(person: impl Into<PersonId>, date: NaiveDate, kind: PreferenceKind) -> Self {
        Self {
            person: person.into(),
            date,
            kind,
        }
    }

    pub fn want(person: impl Into<PersonId>, date: NaiveDate, points: u8) -> Self {
        Self::new(person, date, PreferenceKind::Want(points))
    }

    pub fn avoid(person: impl Into<PersonId>, date: NaiveDate, points: u8) -> Self {
        Self::new(person, date, PreferenceKind::Avoid(points))
    }

    pub fn lock(person: impl Into<PersonId>, date: NaiveDate) -> Self {
        Self::new(person, date, PreferenceKind::Lock)
    }
}

/// Approved leave on a single date
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacation {
    pub person: PersonId,
    pub date: NaiveDate,
}

impl Vacation {
    pub fn new(person: impl Into<PersonId>, date: NaiveDate) -> Self {
        Self {
            person: person.into(),
            date,
        }
    }
}

// ============================================================================
// Assignment
// ============================================================================

/// The two people on call for one date
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub date: NaiveDate,
    pub first: PersonId,
    pub second: PersonId,
}

impl Assignment {
    pub fn new(date: NaiveDate, first: impl Into<PersonId>, second: impl Into<PersonId>) -> Self {
        Self {
            date,
            first: first.into(),
            second: second.into(),
        }
    }

    /// Whether `person` holds either slot
    pub fn involves(&self, person: &str) -> bool {
        self.first == person || self.second == person
    }

    pub fn people(&self) -> [&PersonId; 2] {
        [&self.first, &self.second]
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} + {}", self.date, self.first, self.second)
    }
}

// ============================================================================
// Month input
// ============================================================================

/// Everything a generation run reads, loaded once at the start
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthData {
    /// Target month
    pub month: YearMonth,
    /// All people eligible for shifts
    pub people: Vec<Person>,
    /// Preferences dated within the month
    #[serde(default)]
    pub preferences: Vec<Preference>,
    /// Approved vacations dated within the month
    #[serde(default)]
    pub vacations: Vec<Vacation>,
    /// Pre-existing assignments; never altered by the engine
    #[serde(default)]
    pub fixed: Vec<Assignment>,
}

impl MonthData {
    pub fn new(month: YearMonth) -> Self {
        Self {
            month,
            people: Vec::new(),
            preferences: Vec::new(),
            vacations: Vec::new(),
            fixed: Vec::new(),
        }
    }

    /// Get a person by ID
    pub fn person(&self, id: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }
}

// ============================================================================
// Schedule (Result)
// ============================================================================

/// Counters describing how a generation run went
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Recursive search steps taken
    pub attempts: u64,
    /// Tentative pairs undone after a failed subtree
    pub backtracks: u64,
    /// Days covered by fixed assignments
    pub fixed_days: usize,
    /// Days the engine had to fill
    pub open_days: usize,
    /// Furthest day index reached (0-based)
    pub deepest_day: usize,
}

/// A complete month of assignments
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub month: YearMonth,
    /// One assignment per day, in date order
    pub assignments: Vec<Assignment>,
    pub stats: SearchStats,
}

impl Schedule {
    /// Assignment on `date`
    pub fn on(&self, date: NaiveDate) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.date == date)
    }

    /// Assignments held by `person`
    pub fn shifts_of<'a>(&'a self, person: &'a str) -> impl Iterator<Item = &'a Assignment> + 'a {
        self.assignments.iter().filter(move |a| a.involves(person))
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Core generation abstraction
pub trait ShiftGenerator: Send + Sync {
    /// Produce a complete schedule for the month, or fail without a partial result
    fn generate(&self, data: &MonthData) -> Result<Schedule, ScheduleError>;
}

/// Persistence collaborator: read once at the start, write once at the end
pub trait MonthRepository {
    /// Load people, preferences, approved vacations and existing assignments
    fn load_month(&self, month: YearMonth) -> Result<MonthData, StoreError>;

    /// Upsert the report's assignments by date and record the report.
    ///
    /// Both are persisted together or not at all.
    fn save_generation(&mut self, report: GenerationReport) -> Result<(), StoreError>;
}

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a schedule; `people` resolves IDs to names
    fn render(&self, schedule: &Schedule, people: &[Person]) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Why a search ended without a schedule
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCause {
    /// Every candidate pair was tried; no day arrangement works
    Exhausted { deepest: NaiveDate },
    /// The attempt ceiling was hit before the search finished
    AttemptCeiling { attempts: u64 },
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Exhausted { deepest } => {
                write!(f, "search exhausted, furthest day reached {}", deepest)
            }
            FailureCause::AttemptCeiling { attempts } => {
                write!(f, "attempt ceiling reached after {} attempts", attempts)
            }
        }
    }
}

/// Generation error
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Could not generate a valid schedule satisfying all constraints: {0}")]
    Infeasible(FailureCause),

    #[error("Duplicate person: {0}")]
    DuplicatePerson(PersonId),

    #[error("Unknown person '{person}' referenced by {context}")]
    UnknownPerson { person: PersonId, context: String },

    #[error("Assignment on {date} puts '{person}' in both slots")]
    SamePersonTwice { date: NaiveDate, person: PersonId },

    #[error("{context} on {date} is outside {month}")]
    OutsideMonth {
        context: String,
        date: NaiveDate,
        month: YearMonth,
    },

    #[error("More than one fixed assignment on {0}")]
    DuplicateFixedDate(NaiveDate),

    #[error("More than one preference for '{person}' on {date}")]
    DuplicatePreference { person: PersonId, date: NaiveDate },

    #[error("Preference of '{person}' on {date} has {points} points (expected 1 to {max})")]
    PointsOutOfRange {
        person: PersonId,
        date: NaiveDate,
        points: u8,
        max: u8,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScheduleError {
    /// Whether this is the expected "no schedule" outcome rather than bad input
    pub fn is_infeasible(&self) -> bool {
        matches!(self, ScheduleError::Infeasible(_))
    }
}

/// Storage error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),
}

// ============================================================================
// Tests
// ============================================================================
