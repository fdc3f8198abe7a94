use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::EntityId;
use crate::progress::{GameInstance, Outcome};

/// Win/loss counts over a slice of the game-instance ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Finished attempts only; in-progress rows are not counted
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    /// Percentage of finished attempts that were won, rounded half-up
    pub average_score: u32,
    pub last_played_at: Option<DateTime<Utc>>,
}

impl GameSummary {
    fn record(&mut self, instance: &GameInstance) {
        // Input is newest first, so the first instance seen is the latest
        if self.last_played_at.is_none() {
            self.last_played_at = Some(instance.played_at);
        }
        match instance.outcome {
            Outcome::Won => self.won += 1,
            Outcome::Lost => self.lost += 1,
            Outcome::InProgress => {}
        }
    }

    fn finish(mut self) -> Self {
        self.played = self.won + self.lost;
        self.average_score = average_score(self.won, self.played);
        self
    }
}

/// `round(won / played * 100)` with halves rounded up; `0` when nothing was played
pub fn average_score(won: u32, played: u32) -> u32 {
    if played == 0 {
        return 0;
    }
    let (won, played) = (u64::from(won), u64::from(played));
    ((200 * won + played) / (2 * played)) as u32
}

/// Summarizes instances ordered by `played_at` descending
pub fn summarize<'a, I>(instances: I) -> GameSummary
where
    I: IntoIterator<Item = &'a GameInstance>,
{
    instances
        .into_iter()
        .fold(GameSummary::default(), |mut summary, instance| {
            summary.record(instance);
            summary
        })
        .finish()
}

/// Overall summary plus one summary per game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    pub summary: GameSummary,
    pub by_game: BTreeMap<EntityId, GameSummary>,
}

/// Builds a report in one pass over instances ordered newest first
pub fn build_report<'a, I>(instances: I) -> StatsReport
where
    I: IntoIterator<Item = &'a GameInstance>,
{
    let mut overall = GameSummary::default();
    let mut by_game: BTreeMap<EntityId, GameSummary> = BTreeMap::new();

    for instance in instances {
        overall.record(instance);
        by_game.entry(instance.game_id).or_default().record(instance);
    }

    StatsReport {
        summary: overall.finish(),
        by_game: by_game
            .into_iter()
            .map(|(game_id, summary)| (game_id, summary.finish()))
            .collect(),
    }
}
