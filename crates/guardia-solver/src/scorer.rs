//! Soft criteria
//!
//! Orders admissible candidates for a date. Scores never exclude anyone;
//! exclusion belongs to the [`ConstraintChecker`](crate::checker::ConstraintChecker).

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use guardia_core::{PreferenceKind, ScoringConfig};

use crate::state::{PersonIndex, PersonState, Snapshot};

#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    scoring: &'a ScoringConfig,
}

impl<'a> Scorer<'a> {
    pub fn new(scoring: &'a ScoringConfig) -> Self {
        Self { scoring }
    }

    /// Desirability of giving `date` to `person`; higher is better
    pub fn score(&self, person: &PersonState, date: NaiveDate) -> i64 {
        let score = match person.preference(date) {
            Some(PreferenceKind::Want(points)) => self.scoring.want_bonus.saturating_add(i64::from(points)),
            Some(PreferenceKind::Avoid(points)) => {
                0i64.saturating_sub(self.scoring.avoid_penalty.saturating_add(i64::from(points)))
            }
            _ => 0,
        };

        let total = i64::try_from(person.total_shifts()).unwrap_or(i64::MAX);
        score.saturating_sub(self.scoring.equity_weight.saturating_mul(total))
    }

    /// Sort `candidates` by descending score.
    ///
    /// The sort is stable; with an `rng` the candidates are shuffled first so
    /// equal scores come out in seeded random order.
    pub fn rank(
        &self,
        snapshot: &Snapshot,
        candidates: &mut Vec<PersonIndex>,
        date: NaiveDate,
        rng: Option<&mut StdRng>,
    ) {
        if let Some(rng) = rng {
            candidates.shuffle(rng);
        }
        let mut scored: Vec<(i64, PersonIndex)> = candidates
            .iter()
            .map(|&i| (self.score(snapshot.get(i), date), i))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        candidates.clear();
        candidates.extend(scored.into_iter().map(|(_, i)| i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardia_core::calendar::YearMonth;
    use guardia_core::config::MAX_WEIGHT;
    use guardia_core::{EngineConfig, MonthData, Person, Preference};
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn data() -> MonthData {
        let mut data = MonthData::new(YearMonth::new(2024, 3).unwrap());
        data.people = vec![
            Person::new("veteran").lifetime(30),
            Person::new("rookie"),
            Person::new("eager").lifetime(50),
            Person::new("reluctant"),
        ];
        data.preferences = vec![
            Preference::want("eager", day(15), 20),
            Preference::avoid("reluctant", day(15), 5),
        ];
        data
    }

    #[test]
    fn scores_follow_policy() {
        let config = EngineConfig::default();
        let snapshot = Snapshot::build(&data(), &config);
        let scorer = Scorer::new(&config.scoring);
        let score = |id: &str| scorer.score(snapshot.by_id(id).unwrap(), day(15));

        assert_eq!(score("rookie"), 0);
        assert_eq!(score("veteran"), -300);
        assert_eq!(score("eager"), 1000 + 20 - 500);
        assert_eq!(score("reluctant"), -(1000 + 5));
    }

    #[test]
    fn shifts_this_run_count_for_equity() {
        let config = EngineConfig::default();
        let mut snapshot = Snapshot::build(&data(), &config);
        let scorer = Scorer::new(&config.scoring);
        let rookie = snapshot.index_of("rookie").unwrap();

        snapshot.assign(rookie, day(1));
        snapshot.assign(rookie, day(5));
        assert_eq!(scorer.score(snapshot.get(rookie), day(20)), -20);
    }

    #[test]
    fn rank_orders_want_first_and_avoid_last() {
        let config = EngineConfig::default();
        let snapshot = Snapshot::build(&data(), &config);
        let scorer = Scorer::new(&config.scoring);

        let mut candidates: Vec<_> = (0..snapshot.len()).collect();
        scorer.rank(&snapshot, &mut candidates, day(15), None);

        let order: Vec<_> = candidates.iter().map(|&i| snapshot.get(i).id.as_str()).collect();
        assert_eq!(order, vec!["eager", "rookie", "veteran", "reluctant"]);
    }

    #[test]
    fn avoid_ranks_last_at_the_weight_bounds() {
        let mut data = MonthData::new(YearMonth::new(2024, 3).unwrap());
        data.people = vec![
            Person::new("reluctant"),
            Person::new("plain"),
            Person::new("eager"),
            Person::new("other"),
        ];
        data.preferences = vec![
            Preference::avoid("reluctant", day(15), 1),
            Preference::want("eager", day(15), 1),
        ];

        let weights = [
            (1000, 1000, 10),
            (0, 0, 0),
            (MAX_WEIGHT, 0, MAX_WEIGHT),
            (0, MAX_WEIGHT, 0),
            (MAX_WEIGHT, MAX_WEIGHT, MAX_WEIGHT),
        ];
        for (want_bonus, avoid_penalty, equity_weight) in weights {
            let mut config = EngineConfig::default();
            config.scoring.want_bonus = want_bonus;
            config.scoring.avoid_penalty = avoid_penalty;
            config.scoring.equity_weight = equity_weight;
            assert!(config.validate().is_ok());

            let snapshot = Snapshot::build(&data, &config);
            let scorer = Scorer::new(&config.scoring);
            let mut candidates: Vec<_> = (0..snapshot.len()).collect();
            scorer.rank(&snapshot, &mut candidates, day(15), None);

            let order: Vec<_> = candidates.iter().map(|&i| snapshot.get(i).id.as_str()).collect();
            assert_eq!(order, vec!["eager", "plain", "other", "reluctant"], "{:?}", config.scoring);
        }
    }

    #[test]
    fn extreme_weights_saturate() {
        let mut data = MonthData::new(YearMonth::new(2024, 3).unwrap());
        data.people = vec![Person::new("eager").lifetime(u32::MAX), Person::new("reluctant")];
        data.preferences = vec![
            Preference::want("eager", day(15), 20),
            Preference::avoid("reluctant", day(15), 20),
        ];
        let scoring = ScoringConfig {
            want_bonus: i64::MAX,
            avoid_penalty: i64::MAX,
            equity_weight: i64::MAX,
            tie_break_seed: None,
        };
        let config = EngineConfig::default();
        let snapshot = Snapshot::build(&data, &config);
        let scorer = Scorer::new(&scoring);

        assert_eq!(scorer.score(snapshot.by_id("reluctant").unwrap(), day(15)), -i64::MAX);
        assert_eq!(scorer.score(snapshot.by_id("eager").unwrap(), day(15)), 0);
    }

    #[test]
    fn ties_keep_input_order_without_seed() {
        let config = EngineConfig::default();
        let mut data = MonthData::new(YearMonth::new(2024, 3).unwrap());
        data.people = (0..6).map(|i| Person::new(format!("p{i}"))).collect();
        let snapshot = Snapshot::build(&data, &config);
        let scorer = Scorer::new(&config.scoring);

        let mut candidates: Vec<_> = (0..6).collect();
        scorer.rank(&snapshot, &mut candidates, day(2), None);
        assert_eq!(candidates, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn seeded_tie_breaking_is_reproducible() {
        let config = EngineConfig::default();
        let mut data = MonthData::new(YearMonth::new(2024, 3).unwrap());
        data.people = (0..8).map(|i| Person::new(format!("p{i}"))).collect();
        data.people.push(Person::new("busy").lifetime(3));
        let snapshot = Snapshot::build(&data, &config);
        let scorer = Scorer::new(&config.scoring);

        let ranked = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut candidates: Vec<_> = (0..snapshot.len()).collect();
            scorer.rank(&snapshot, &mut candidates, day(2), Some(&mut rng));
            candidates
        };

        let first = ranked(42);
        assert_eq!(first, ranked(42));
        // The lower-scored person stays last whatever the seed
        assert_eq!(first.last(), Some(&8));
        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..9).collect::<Vec<_>>());
    }
}
