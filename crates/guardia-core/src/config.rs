//! Engine configuration
//!
//! Every rule limit the engine enforces is a recognised option here. The
//! configuration is usually read from a TOML file:
//!
//! ```toml
//! default_monthly_cap = 7
//! rest_days = 2
//! exclusive_groups = [["MAMA", "URGENCIAS"]]
//!
//! [scoring]
//! equity_weight = 10
//! tie_break_seed = 42
//! ```
//!
//! Missing keys fall back to [`EngineConfig::default`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::{GroupId, Person};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Two groups whose members may never share a day
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPair(pub GroupId, pub GroupId);

impl GroupPair {
    pub fn new(a: impl Into<GroupId>, b: impl Into<GroupId>) -> Self {
        Self(a.into(), b.into())
    }

    /// Whether `{a, b}` is this pair, in either order
    pub fn matches(&self, a: &str, b: &str) -> bool {
        (self.0 == a && self.1 == b) || (self.0 == b && self.1 == a)
    }
}

/// Largest accepted scoring weight
pub const MAX_WEIGHT: i64 = 1_000_000_000;

/// Soft-criteria weights used to order candidates
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Fixed bonus for a WANT preference (points are added on top)
    pub want_bonus: i64,
    /// Fixed penalty for an AVOID preference (points are added on top)
    pub avoid_penalty: i64,
    /// Score lost per shift already held (lifetime + this run)
    pub equity_weight: i64,
    /// Seed for shuffling equally scored candidates; `None` keeps input order
    pub tie_break_seed: Option<u64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            want_bonus: 1000,
            avoid_penalty: 1000,
            equity_weight: 10,
            tie_break_seed: None,
        }
    }
}

impl ScoringConfig {
    /// Every weight must lie in `0..=MAX_WEIGHT`
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in [
            ("want_bonus", self.want_bonus),
            ("avoid_penalty", self.avoid_penalty),
            ("equity_weight", self.equity_weight),
        ] {
            if !(0..=MAX_WEIGHT).contains(&weight) {
                return Err(ConfigError::Invalid(format!(
                    "scoring.{name} must be between 0 and {MAX_WEIGHT}, got {weight}"
                )));
            }
        }
        Ok(())
    }
}

/// Engine configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Cap applied to people without an explicit monthly cap
    pub default_monthly_cap: u32,
    /// Full rest days required between two shifts of the same person
    pub rest_days: u32,
    /// Thursdays per person per month
    pub max_thursdays: u32,
    /// Fridays per person per month
    pub max_fridays: u32,
    /// Distinct ISO weekend weeks per person per month
    pub max_weekend_weeks: u32,
    /// WANT points per person per month
    pub want_budget: u32,
    /// AVOID points per person per month
    pub avoid_budget: u32,
    /// Upper bound of a single preference's points
    pub max_points: u8,
    /// LOCK preferences per person per month
    pub max_locks: u32,
    /// Group tag that never conflicts with itself
    pub neutral_group: GroupId,
    /// Mutually exclusive group pairs
    pub exclusive_groups: Vec<GroupPair>,
    /// Recursive search steps before the run gives up
    pub attempt_ceiling: u64,
    pub scoring: ScoringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_monthly_cap: 7,
            rest_days: 2,
            max_thursdays: 1,
            max_fridays: 1,
            max_weekend_weeks: 2,
            want_budget: 20,
            avoid_budget: 20,
            max_points: 20,
            max_locks: 1,
            neutral_group: "STANDARD".into(),
            exclusive_groups: Vec::new(),
            attempt_ceiling: 100_000,
            scoring: ScoringConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attempt_ceiling == 0 {
            return Err(ConfigError::Invalid("attempt_ceiling must be positive".into()));
        }
        if self.neutral_group.trim().is_empty() {
            return Err(ConfigError::Invalid("neutral_group must not be empty".into()));
        }
        self.scoring.validate()?;
        if let Some(pair) = self.exclusive_groups.iter().find(|p| p.0 == p.1) {
            return Err(ConfigError::Invalid(format!(
                "exclusive group pair [{}, {}] names the same group twice",
                pair.0, pair.1
            )));
        }
        Ok(())
    }

    /// Builder-style override of the exclusive group pairs
    pub fn exclusive(mut self, a: impl Into<GroupId>, b: impl Into<GroupId>) -> Self {
        self.exclusive_groups.push(GroupPair::new(a, b));
        self
    }

    /// Monthly cap for `person`, falling back to the default
    pub fn effective_cap(&self, person: &Person) -> u32 {
        person.monthly_cap.unwrap_or(self.default_monthly_cap)
    }

    /// Whether two people's groups forbid them from sharing a day
    pub fn groups_conflict(&self, a: Option<&str>, b: Option<&str>) -> bool {
        let (Some(a), Some(b)) = (a, b) else {
            return false;
        };
        if a == b {
            return a != self.neutral_group;
        }
        self.exclusive_groups.iter().any(|pair| pair.matches(a, b))
    }
}
