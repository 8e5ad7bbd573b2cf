//! Input validation
//!
//! Malformed month data is a caller bug. It is rejected before the search
//! starts so it can never corrupt search state.

use std::collections::{HashMap, HashSet};
use tracing::warn;

use guardia_core::budget::BudgetUsage;
use guardia_core::{EngineConfig, MonthData, PersonId, Preference, PreferenceKind, ScheduleError};

/// Check `data` and `config` for everything the search assumes
pub fn validate_input(data: &MonthData, config: &EngineConfig) -> Result<(), ScheduleError> {
    config.validate()?;

    let mut people = HashSet::new();
    for person in &data.people {
        if !people.insert(person.id.as_str()) {
            return Err(ScheduleError::DuplicatePerson(person.id.clone()));
        }
    }

    let known = |id: &PersonId, context: &str| {
        if people.contains(id.as_str()) {
            Ok(())
        } else {
            Err(ScheduleError::UnknownPerson {
                person: id.clone(),
                context: context.to_string(),
            })
        }
    };
    let inside = |date, context: &str| {
        if data.month.contains(date) {
            Ok(())
        } else {
            Err(ScheduleError::OutsideMonth {
                context: context.to_string(),
                date,
                month: data.month,
            })
        }
    };

    let mut fixed_dates = HashSet::new();
    for assignment in &data.fixed {
        let context = format!("fixed assignment on {}", assignment.date);
        inside(assignment.date, "fixed assignment")?;
        known(&assignment.first, &context)?;
        known(&assignment.second, &context)?;
        if assignment.first == assignment.second {
            return Err(ScheduleError::SamePersonTwice {
                date: assignment.date,
                person: assignment.first.clone(),
            });
        }
        if !fixed_dates.insert(assignment.date) {
            return Err(ScheduleError::DuplicateFixedDate(assignment.date));
        }
    }

    let mut seen = HashSet::new();
    let mut by_person: HashMap<&str, Vec<&Preference>> = HashMap::new();
    for pref in &data.preferences {
        known(&pref.person, &format!("preference on {}", pref.date))?;
        inside(pref.date, "preference")?;
        if !seen.insert((pref.person.as_str(), pref.date)) {
            return Err(ScheduleError::DuplicatePreference {
                person: pref.person.clone(),
                date: pref.date,
            });
        }
        let points = pref.kind.points();
        let weighted = matches!(pref.kind, PreferenceKind::Want(_) | PreferenceKind::Avoid(_));
        if points > config.max_points || (weighted && points == 0) {
            return Err(ScheduleError::PointsOutOfRange {
                person: pref.person.clone(),
                date: pref.date,
                points,
                max: config.max_points,
            });
        }
        by_person.entry(pref.person.as_str()).or_default().push(pref);
    }

    for vacation in &data.vacations {
        known(&vacation.person, &format!("vacation on {}", vacation.date))?;
        inside(vacation.date, "vacation")?;
    }

    // Budgets are enforced at submission time; administrators may exceed them.
    for (person, prefs) in by_person {
        let usage = BudgetUsage::tally(prefs, None);
        if !usage.within(config) {
            warn!(
                person,
                want = usage.want,
                avoid = usage.avoid,
                locks = usage.locks,
                "preference budget exceeded in input"
            );
        }
    }

    Ok(())
}
