use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};

use super::ProgressError;
use crate::ids::EntityId;

/// Result of one play attempt, stored as its Spanish label
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Outcome {
    #[serde(rename = "GANADO")]
    #[strum(serialize = "GANADO")]
    Won,
    #[serde(rename = "PERDIDO")]
    #[strum(serialize = "PERDIDO")]
    Lost,
    #[serde(rename = "EN_CURSO")]
    #[strum(serialize = "EN_CURSO")]
    InProgress,
}

impl Outcome {
    pub fn parse(raw: &str) -> Result<Self, ProgressError> {
        Outcome::from_str(raw.trim())
            .map_err(|_| ProgressError::Validation(format!("unknown game outcome: {:?}", raw)))
    }
}

/// Database model for the `pacientes` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PatientModel {
    pub id: EntityId,
    pub fono_id: EntityId,
    #[sqlx(rename = "nombre")]
    pub name: String,
    #[sqlx(rename = "experiencia")]
    pub experience: i64,
}

impl PatientModel {
    pub fn new(id: EntityId, fono_id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            fono_id,
            name: name.into(),
            experience: 0,
        }
    }
}

/// Database model for the `juegos` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct GameModel {
    pub id: EntityId,
    #[sqlx(rename = "nombre")]
    pub name: String,
}

impl GameModel {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One recorded play attempt. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInstance {
    pub id: EntityId,
    pub patient_id: EntityId,
    pub game_id: EntityId,
    pub outcome: Outcome,
    /// Present only when the attempt was won
    pub exp_earned: Option<i64>,
    pub played_at: DateTime<Utc>,
}

/// A play attempt about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGameInstance {
    pub patient_id: EntityId,
    pub game_id: EntityId,
    pub outcome: Outcome,
    pub exp_earned: Option<i64>,
    pub played_at: DateTime<Utc>,
}

impl NewGameInstance {
    /// Stamps the attempt with the current time. The earned amount is dropped
    /// unless the attempt was won.
    pub fn new(
        patient_id: EntityId,
        game_id: EntityId,
        outcome: Outcome,
        exp_earned: Option<i64>,
    ) -> Self {
        Self {
            patient_id,
            game_id,
            outcome,
            exp_earned: exp_earned.filter(|_| outcome == Outcome::Won),
            played_at: Utc::now(),
        }
    }
}

/// Raw `instancias_juego` row; the outcome is checked when converting
#[derive(Debug, FromRow)]
pub(crate) struct GameInstanceRow {
    pub id: EntityId,
    #[sqlx(rename = "paciente_id")]
    pub patient_id: EntityId,
    #[sqlx(rename = "juego_id")]
    pub game_id: EntityId,
    #[sqlx(rename = "estado")]
    pub outcome: String,
    #[sqlx(rename = "exp_ganada")]
    pub exp_earned: Option<i64>,
    #[sqlx(rename = "jugado_en")]
    pub played_at: DateTime<Utc>,
}

impl TryFrom<GameInstanceRow> for GameInstance {
    type Error = ProgressError;

    fn try_from(row: GameInstanceRow) -> Result<Self, Self::Error> {
        let outcome = Outcome::from_str(&row.outcome).map_err(|_| {
            ProgressError::Storage(format!(
                "game instance {} has unrecognised estado {:?}",
                row.id, row.outcome
            ))
        })?;

        Ok(GameInstance {
            id: row.id,
            patient_id: row.patient_id,
            game_id: row.game_id,
            outcome,
            exp_earned: row.exp_earned,
            played_at: row.played_at,
        })
    }
}

/// Which slice of the game-instance ledger to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceFilter {
    Patient(EntityId),
    /// Every patient owned by this therapist
    Fono(EntityId),
}
