//! JSON roster file
//!
//! The whole roster (people, preferences, vacations, shifts and generation
//! reports) lives in one pretty-printed JSON document. A command loads it
//! once, mutates it in memory and writes it back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use guardia_core::calendar::YearMonth;
use guardia_core::{
    Assignment, GenerationReport, GroupId, MonthData, MonthRepository, Person, PersonId,
    Preference, StoreError, Vacation,
};

/// A person as stored, before lifetime counts are derived
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPerson {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub group: Option<GroupId>,
    #[serde(default)]
    pub monthly_cap: Option<u32>,
    /// Shifts worked before this roster file was started
    #[serde(default)]
    pub prior_shifts: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VacationStatus {
    Approved,
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredVacation {
    pub person: PersonId,
    pub date: NaiveDate,
    pub status: VacationStatus,
}

/// A persisted shift
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub date: NaiveDate,
    pub first: PersonId,
    pub second: PersonId,
    /// Entered by hand despite rule violations
    #[serde(default)]
    pub forced: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Shift {
    pub fn involves(&self, person: &str) -> bool {
        self.first == person || self.second == person
    }

    pub fn assignment(&self) -> Assignment {
        Assignment::new(self.date, self.first.clone(), self.second.clone())
    }
}

impl From<&Assignment> for Shift {
    fn from(assignment: &Assignment) -> Self {
        Self {
            date: assignment.date,
            first: assignment.first.clone(),
            second: assignment.second.clone(),
            forced: false,
            reason: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub people: Vec<StoredPerson>,
    #[serde(default)]
    pub preferences: Vec<Preference>,
    #[serde(default)]
    pub vacations: Vec<StoredVacation>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub reports: Vec<GenerationReport>,
}

/// Roster file on disk
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    roster: Roster,
}

impl JsonStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StoreError::NotFound(format!("roster file {}", path.display())));
        }
        let content = fs::read_to_string(path)?;
        let roster = serde_json::from_str(&content)
            .map_err(|e| StoreError::Format(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            path: path.to_path_buf(),
            roster,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Write the roster back to its file
    pub fn save(&self) -> Result<(), StoreError> {
        write_roster(&self.path, &self.roster)
    }

    /// Prior shifts plus stored shifts outside `month`
    pub fn lifetime_shifts(&self, person: &StoredPerson, month: YearMonth) -> u32 {
        let stored = self
            .roster
            .shifts
            .iter()
            .filter(|s| !month.contains(s.date) && s.involves(&person.id))
            .count() as u32;
        person.prior_shifts + stored
    }

    /// Stored shifts of `month`, by date
    pub fn shifts_in(&self, month: YearMonth) -> Vec<&Shift> {
        let mut shifts: Vec<&Shift> = self
            .roster
            .shifts
            .iter()
            .filter(|s| month.contains(s.date))
            .collect();
        shifts.sort_by_key(|s| s.date);
        shifts
    }

    pub fn person(&self, id: &str) -> Option<&StoredPerson> {
        self.roster.people.iter().find(|p| p.id == id)
    }

    /// Preferences of `person` dated within `month`
    pub fn preferences_of(&self, person: &str, month: YearMonth) -> Vec<Preference> {
        self.roster
            .preferences
            .iter()
            .filter(|p| p.person == person && month.contains(p.date))
            .cloned()
            .collect()
    }

    /// Replace any shift on the same date
    pub fn put_shift(&mut self, shift: Shift) {
        put_shift(&mut self.roster, shift);
    }

    /// Remove every shift of `month`, returning how many were removed
    pub fn reset_month(&mut self, month: YearMonth) -> usize {
        let before = self.roster.shifts.len();
        self.roster.shifts.retain(|s| !month.contains(s.date));
        before - self.roster.shifts.len()
    }

    /// Insert or replace the preference of a person on a date
    pub fn upsert_preference(&mut self, preference: Preference) {
        self.remove_preference(&preference.person, preference.date);
        self.roster.preferences.push(preference);
    }

    pub fn remove_preference(&mut self, person: &str, date: NaiveDate) -> bool {
        let before = self.roster.preferences.len();
        self.roster
            .preferences
            .retain(|p| !(p.person == person && p.date == date));
        before != self.roster.preferences.len()
    }
}

impl MonthRepository for JsonStore {
    fn load_month(&self, month: YearMonth) -> Result<MonthData, StoreError> {
        let mut data = MonthData::new(month);

        data.people = self
            .roster
            .people
            .iter()
            .map(|p| Person {
                id: p.id.clone(),
                name: p.name.clone(),
                group: p.group.clone(),
                monthly_cap: p.monthly_cap,
                lifetime_shifts: self.lifetime_shifts(p, month),
            })
            .collect();

        data.preferences = self
            .roster
            .preferences
            .iter()
            .filter(|p| month.contains(p.date))
            .cloned()
            .collect();

        data.vacations = self
            .roster
            .vacations
            .iter()
            .filter(|v| v.status == VacationStatus::Approved && month.contains(v.date))
            .map(|v| Vacation::new(v.person.clone(), v.date))
            .collect();

        data.fixed = self.shifts_in(month).into_iter().map(Shift::assignment).collect();

        Ok(data)
    }

    fn save_generation(&mut self, report: GenerationReport) -> Result<(), StoreError> {
        let mut updated = self.roster.clone();
        merge_assignments(&mut updated, &report.assignments);
        updated.reports.push(report);
        write_roster(&self.path, &updated)?;
        self.roster = updated;
        Ok(())
    }
}

fn write_roster(path: &Path, roster: &Roster) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(roster).map_err(|e| StoreError::Format(e.to_string()))?;
    fs::write(path, json + "\n")?;
    Ok(())
}

fn put_shift(roster: &mut Roster, shift: Shift) {
    roster.shifts.retain(|s| s.date != shift.date);
    roster.shifts.push(shift);
    roster.shifts.sort_by_key(|s| s.date);
}

fn merge_assignments(roster: &mut Roster, assignments: &[Assignment]) {
    for assignment in assignments {
        // Re-saving a day unchanged keeps its forced flag and reason
        let unchanged = roster.shifts.iter().any(|s| {
            s.date == assignment.date && s.first == assignment.first && s.second == assignment.second
        });
        if !unchanged {
            put_shift(roster, Shift::from(assignment));
        }
    }
}
