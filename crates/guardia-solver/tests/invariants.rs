//! Property tests: whatever the input, a generated schedule breaks no hard rule

use chrono::NaiveDate;
use proptest::prelude::*;
use std::collections::HashSet;

use guardia_core::calendar::YearMonth;
use guardia_core::{EngineConfig, MonthData, Person, Preference, PreferenceKind, Vacation};
use guardia_solver::{audit_schedule, generate, month_stats};

const GROUPS: [Option<&str>; 4] = [None, Some("STANDARD"), Some("MAMA"), Some("URGENCIAS")];

/// Per-person input: group, cap, lifetime count and dated marks
#[derive(Debug, Clone)]
struct Profile {
    group: usize,
    cap: Option<u32>,
    lifetime: u32,
    lock: Option<u32>,
    vacations: Vec<u32>,
    wants: Vec<(u32, u8)>,
    avoids: Vec<(u32, u8)>,
}

fn profile() -> impl Strategy<Value = Profile> {
    (
        0..GROUPS.len(),
        prop::option::of(3u32..8),
        0u32..40,
        prop::option::of(1u32..=28),
        prop::collection::vec(1u32..=28, 0..4),
        prop::collection::vec((1u32..=28, 1u8..=20), 0..3),
        prop::collection::vec((1u32..=28, 1u8..=20), 0..3),
    )
        .prop_map(|(group, cap, lifetime, lock, vacations, wants, avoids)| Profile {
            group,
            cap,
            lifetime,
            lock,
            vacations,
            wants,
            avoids,
        })
}

fn build(year: i32, month: u32, profiles: &[Profile]) -> MonthData {
    let month = YearMonth::new(year, month).unwrap();
    let day = |d: u32| NaiveDate::from_ymd_opt(month.year(), month.month(), d).unwrap();
    let mut data = MonthData::new(month);

    for (i, profile) in profiles.iter().enumerate() {
        let id = format!("p{i:02}");
        let mut person = Person::new(id.clone()).lifetime(profile.lifetime);
        person.group = GROUPS[profile.group].map(str::to_string);
        person.monthly_cap = profile.cap;
        data.people.push(person);

        // One preference per person and date; the first mark wins
        let mut taken = HashSet::new();
        let mut mark = |d: u32, kind: PreferenceKind, data: &mut MonthData| {
            if taken.insert(d) {
                data.preferences.push(Preference::new(id.clone(), day(d), kind));
            }
        };
        if let Some(d) = profile.lock {
            mark(d, PreferenceKind::Lock, &mut data);
        }
        for &(d, points) in &profile.wants {
            mark(d, PreferenceKind::Want(points), &mut data);
        }
        for &(d, points) in &profile.avoids {
            mark(d, PreferenceKind::Avoid(points), &mut data);
        }

        for &d in &profile.vacations {
            data.vacations.push(Vacation::new(id.clone(), day(d)));
        }
    }

    data
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn generated_schedules_satisfy_every_hard_rule(
        profiles in prop::collection::vec(profile(), 10..17),
        which in 0usize..3,
        seed in prop::option::of(any::<u64>()),
    ) {
        let (year, month) = [(2026, 2), (2024, 9), (2024, 3)][which];
        let data = build(year, month, &profiles);
        let mut config = EngineConfig {
            attempt_ceiling: 20_000,
            ..EngineConfig::default().exclusive("MAMA", "URGENCIAS")
        };
        config.scoring.tie_break_seed = seed;

        // Infeasibility is a legitimate outcome; only successes are checked
        if let Ok(schedule) = generate(&data, &config) {
            prop_assert_eq!(schedule.assignments.len(), data.month.num_days() as usize);

            let violations = audit_schedule(&data, &config, &schedule.assignments);
            prop_assert!(violations.is_empty(), "violations: {:#?}", violations);

            for stats in month_stats(&data.people, &schedule.assignments) {
                let person = data.person(&stats.person).unwrap();
                prop_assert!(stats.total <= config.effective_cap(person));
                prop_assert!(stats.thursdays <= 1);
                prop_assert!(stats.fridays <= 1);
                prop_assert!(stats.weekend_weeks <= 2);
            }
        }
    }

    #[test]
    fn fixed_days_survive_generation(
        count in 14usize..17,
        fixed_day in 1u32..=28,
    ) {
        let profiles: Vec<Profile> = (0..count)
            .map(|_| Profile {
                group: 0,
                cap: None,
                lifetime: 0,
                lock: None,
                vacations: Vec::new(),
                wants: Vec::new(),
                avoids: Vec::new(),
            })
            .collect();
        let mut data = build(2024, 3, &profiles);
        let fixed = guardia_core::Assignment::new(
            NaiveDate::from_ymd_opt(2024, 3, fixed_day).unwrap(),
            "p03",
            "p07",
        );
        data.fixed.push(fixed.clone());
        let config = EngineConfig::default();

        if let Ok(schedule) = generate(&data, &config) {
            prop_assert_eq!(schedule.on(fixed.date), Some(&fixed));
            let violations = audit_schedule(&data, &config, &schedule.assignments);
            prop_assert!(violations.is_empty(), "violations: {:#?}", violations);
        }
    }
}
