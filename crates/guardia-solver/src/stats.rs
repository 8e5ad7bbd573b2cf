//! Per-person shift statistics for a month

use chrono::Datelike;
use serde::Serialize;
use std::collections::HashSet;

use guardia_core::calendar::DayClass;
use guardia_core::{Assignment, Person, PersonId};

/// How one person's month looks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonStats {
    pub person: PersonId,
    pub total: u32,
    pub thursdays: u32,
    pub fridays: u32,
    /// Saturday and Sunday shifts
    pub weekend_days: u32,
    /// Distinct ISO weeks with a weekend shift
    pub weekend_weeks: u32,
}

/// Statistics for every person, in input order.
///
/// Assignments naming someone not in `people` are ignored.
pub fn month_stats(people: &[Person], assignments: &[Assignment]) -> Vec<PersonStats> {
    people
        .iter()
        .map(|person| {
            let mut stats = PersonStats {
                person: person.id.clone(),
                ..PersonStats::default()
            };
            let mut weeks = HashSet::new();

            for assignment in assignments.iter().filter(|a| a.involves(&person.id)) {
                let date = assignment.date;
                stats.total += 1;
                match DayClass::of(date) {
                    DayClass::Thursday => stats.thursdays += 1,
                    DayClass::Friday => stats.fridays += 1,
                    DayClass::Weekend => {
                        stats.weekend_days += 1;
                        weeks.insert(date.iso_week());
                    }
                    DayClass::Regular => {}
                }
            }

            stats.weekend_weeks = weeks.len() as u32;
            stats
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn counts_day_classes() {
        let people = vec![Person::new("a"), Person::new("b"), Person::new("idle")];
        // Thu 7, Fri 8, Sat 16, Sun 17, Sun 31
        let assignments = vec![
            Assignment::new(day(7), "a", "b"),
            Assignment::new(day(8), "b", "ghost"),
            Assignment::new(day(16), "a", "b"),
            Assignment::new(day(17), "b", "a"),
            Assignment::new(day(31), "a", "b"),
        ];

        let stats = month_stats(&people, &assignments);
        assert_eq!(
            stats[0],
            PersonStats {
                person: "a".into(),
                total: 4,
                thursdays: 1,
                fridays: 0,
                weekend_days: 3,
                weekend_weeks: 2,
            }
        );
        assert_eq!(stats[1].total, 5);
        assert_eq!(stats[1].fridays, 1);
        assert_eq!(stats[2], PersonStats {
            person: "idle".into(),
            ..PersonStats::default()
        });
    }
}
