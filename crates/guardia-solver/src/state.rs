//! Search-local person state
//!
//! Built once per run from the month data. Assigned dates grow and shrink as
//! the search advances and backtracks; weekday counters are maintained
//! alongside so the constraint checks never rescan the date list for them.
//!
//! Undo is strictly LIFO: every [`Snapshot::assign`] is paired with an
//! [`Snapshot::unassign`] of the same person and date in the same call frame.

use chrono::{IsoWeek, NaiveDate};
use std::collections::{HashMap, HashSet};

use guardia_core::calendar::{is_friday, is_thursday, weekend_week};
use guardia_core::{Assignment, EngineConfig, GroupId, MonthData, Person, PersonId, PreferenceKind};

/// Position of a person inside a [`Snapshot`]
pub type PersonIndex = usize;

/// Mutable state of one person during a run
#[derive(Debug, Clone)]
pub struct PersonState {
    pub id: PersonId,
    pub group: Option<GroupId>,
    /// Effective monthly cap
    pub cap: u32,
    pub lifetime_shifts: u32,
    assigned: Vec<NaiveDate>,
    thursdays: u32,
    fridays: u32,
    /// Weekend ISO weeks worked, with the number of weekend days in each
    weekend_weeks: Vec<(IsoWeek, u32)>,
    preferences: HashMap<NaiveDate, PreferenceKind>,
    vacations: HashSet<NaiveDate>,
}

impl PersonState {
    pub fn new(person: &Person, cap: u32) -> Self {
        Self {
            id: person.id.clone(),
            group: person.group.clone(),
            cap,
            lifetime_shifts: person.lifetime_shifts,
            assigned: Vec::new(),
            thursdays: 0,
            fridays: 0,
            weekend_weeks: Vec::new(),
            preferences: HashMap::new(),
            vacations: HashSet::new(),
        }
    }

    /// Dates held this run, in assignment order
    pub fn assigned(&self) -> &[NaiveDate] {
        &self.assigned
    }

    pub fn assigned_count(&self) -> u32 {
        self.assigned.len() as u32
    }

    pub fn thursdays(&self) -> u32 {
        self.thursdays
    }

    pub fn fridays(&self) -> u32 {
        self.fridays
    }

    /// Distinct weekend weeks held this run
    pub fn weekend_week_count(&self) -> u32 {
        self.weekend_weeks.len() as u32
    }

    pub fn has_weekend_week(&self, week: IsoWeek) -> bool {
        self.weekend_weeks.iter().any(|(w, _)| *w == week)
    }

    /// Lifetime shifts plus shifts held this run
    pub fn total_shifts(&self) -> u64 {
        u64::from(self.lifetime_shifts) + self.assigned.len() as u64
    }

    pub fn preference(&self, date: NaiveDate) -> Option<PreferenceKind> {
        self.preferences.get(&date).copied()
    }

    pub fn on_vacation(&self, date: NaiveDate) -> bool {
        self.vacations.contains(&date)
    }

    pub fn is_locked(&self, date: NaiveDate) -> bool {
        self.preference(date) == Some(PreferenceKind::Lock)
    }

    pub(crate) fn set_preference(&mut self, date: NaiveDate, kind: PreferenceKind) {
        self.preferences.insert(date, kind);
    }

    pub(crate) fn add_vacation(&mut self, date: NaiveDate) {
        self.vacations.insert(date);
    }

    fn push(&mut self, date: NaiveDate) {
        self.assigned.push(date);
        if is_thursday(date) {
            self.thursdays += 1;
        }
        if is_friday(date) {
            self.fridays += 1;
        }
        if let Some(week) = weekend_week(date) {
            match self.weekend_weeks.iter_mut().find(|(w, _)| *w == week) {
                Some((_, days)) => *days += 1,
                None => self.weekend_weeks.push((week, 1)),
            }
        }
    }

    fn pop(&mut self) -> Option<NaiveDate> {
        let date = self.assigned.pop()?;
        if is_thursday(date) {
            self.thursdays -= 1;
        }
        if is_friday(date) {
            self.fridays -= 1;
        }
        if let Some(week) = weekend_week(date) {
            if let Some(pos) = self.weekend_weeks.iter().position(|(w, _)| *w == week) {
                self.weekend_weeks[pos].1 -= 1;
                if self.weekend_weeks[pos].1 == 0 {
                    self.weekend_weeks.remove(pos);
                }
            }
        }
        Some(date)
    }
}

/// All person states of one run
#[derive(Debug, Clone)]
pub struct Snapshot {
    people: Vec<PersonState>,
    index: HashMap<PersonId, PersonIndex>,
}

impl Snapshot {
    /// Build from month data, preloading the fixed assignments
    pub fn build(data: &MonthData, config: &EngineConfig) -> Self {
        Self::with_assignments(data, config, &data.fixed)
    }

    /// Build from month data, preloading `assignments` instead of the fixed ones.
    ///
    /// Records naming unknown people are skipped; input validation reports them.
    pub fn with_assignments<'a>(
        data: &MonthData,
        config: &EngineConfig,
        assignments: impl IntoIterator<Item = &'a Assignment>,
    ) -> Self {
        let people: Vec<PersonState> = data
            .people
            .iter()
            .map(|p| PersonState::new(p, config.effective_cap(p)))
            .collect();
        let index = people
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();

        let mut snapshot = Self { people, index };

        for pref in &data.preferences {
            if let Some(i) = snapshot.index_of(&pref.person) {
                snapshot.people[i].set_preference(pref.date, pref.kind);
            }
        }
        for vacation in &data.vacations {
            if let Some(i) = snapshot.index_of(&vacation.person) {
                snapshot.people[i].add_vacation(vacation.date);
            }
        }

        let mut preload: Vec<&Assignment> = assignments.into_iter().collect();
        preload.sort_by_key(|a| a.date);
        for assignment in preload {
            for id in assignment.people() {
                if let Some(i) = snapshot.index_of(id) {
                    snapshot.people[i].push(assignment.date);
                }
            }
        }

        snapshot
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn get(&self, index: PersonIndex) -> &PersonState {
        &self.people[index]
    }

    pub fn index_of(&self, id: &str) -> Option<PersonIndex> {
        self.index.get(id).copied()
    }

    pub fn by_id(&self, id: &str) -> Option<&PersonState> {
        self.index_of(id).map(|i| &self.people[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (PersonIndex, &PersonState)> {
        self.people.iter().enumerate()
    }

    /// Record `date` for a person
    pub fn assign(&mut self, person: PersonIndex, date: NaiveDate) {
        self.people[person].push(date);
    }

    /// Undo the most recent [`assign`](Self::assign) of `date` for a person
    pub fn unassign(&mut self, person: PersonIndex, date: NaiveDate) {
        let undone = self.people[person].pop();
        debug_assert_eq!(undone, Some(date), "unassign out of order for {}", self.people[person].id);
    }
}
