use super::models::{LevelProgress, LevelRange};
use crate::progress::{Outcome, ProgressError};

/// Level assigned when no range matches
pub const FLOOR_LEVEL: i32 = 1;

/// Returns the level whose range contains `experience`, or [`FLOOR_LEVEL`]
/// when nothing matches (including an empty table).
pub fn level_for_experience(experience: i64, levels: &[LevelRange]) -> i32 {
    levels
        .iter()
        .find(|range| range.contains(experience))
        .map(|range| range.level)
        .unwrap_or(FLOOR_LEVEL)
}

/// Experience to add to the patient's total for a finished play attempt.
///
/// Only a win with a positive amount moves the total.
pub fn experience_delta(outcome: Outcome, exp_earned: Option<i64>) -> i64 {
    match (outcome, exp_earned) {
        (Outcome::Won, Some(earned)) if earned > 0 => earned,
        _ => 0,
    }
}

/// Sorted, non-overlapping level table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    ranges: Vec<LevelRange>,
}

impl LevelTable {
    /// Validates and sorts `ranges` by their lower bound
    pub fn new(mut ranges: Vec<LevelRange>) -> Result<Self, ProgressError> {
        ranges.sort_by_key(|range| range.exp_min);

        for range in &ranges {
            if let Some(max) = range.exp_max {
                if max < range.exp_min {
                    return Err(ProgressError::Validation(format!(
                        "level {} has exp_maxima {} below exp_minima {}",
                        range.level, max, range.exp_min
                    )));
                }
            }
        }

        for pair in ranges.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            let overlaps = lower.exp_max.map_or(true, |max| max >= upper.exp_min);
            if overlaps {
                return Err(ProgressError::Validation(format!(
                    "levels {} and {} overlap",
                    lower.level, upper.level
                )));
            }
        }

        Ok(Self { ranges })
    }

    /// Seed table used by the in-memory store
    pub fn default_table() -> Self {
        Self {
            ranges: vec![
                LevelRange::new(1, 0, Some(99)),
                LevelRange::new(2, 100, Some(199)),
                LevelRange::new(3, 200, None),
            ],
        }
    }

    pub fn ranges(&self) -> &[LevelRange] {
        &self.ranges
    }

    pub fn into_ranges(self) -> Vec<LevelRange> {
        self.ranges
    }

    pub fn level_for(&self, experience: i64) -> i32 {
        level_for_experience(experience, &self.ranges)
    }

    pub fn progress_for(&self, experience: i64) -> LevelProgress {
        let next_level_at = self
            .ranges
            .iter()
            .map(|range| range.exp_min)
            .find(|&min| min > experience);

        LevelProgress {
            experience,
            level: self.level_for(experience),
            next_level_at,
        }
    }
}
