use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the level reference table (`niveles`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LevelRange {
    #[sqlx(rename = "nivel")]
    pub level: i32,
    #[sqlx(rename = "exp_minima")]
    pub exp_min: i64,
    /// Inclusive upper bound; `None` means the range is open-ended
    #[sqlx(rename = "exp_maxima")]
    pub exp_max: Option<i64>,
}

impl LevelRange {
    pub fn new(level: i32, exp_min: i64, exp_max: Option<i64>) -> Self {
        Self {
            level,
            exp_min,
            exp_max,
        }
    }

    pub fn contains(&self, experience: i64) -> bool {
        experience >= self.exp_min && self.exp_max.map_or(true, |max| experience <= max)
    }
}

/// A patient's experience together with the level derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub experience: i64,
    pub level: i32,
    /// Experience at which the next level starts, absent at the top level
    pub next_level_at: Option<i64>,
}
