use serde::{Deserialize, Serialize};

use crate::experience::LevelProgress;
use crate::ids::EntityId;

/// Request payload for recording a play attempt
///
/// `outcome` stays a raw string here so unknown values surface as a
/// validation error rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RecordGameInstanceRequest {
    /// Required for therapists; patients may omit it (defaults to themselves)
    pub patient_id: Option<EntityId>,
    pub game_id: EntityId,
    pub outcome: String,
    pub exp_earned: Option<i64>,
}

/// Response for patient progress queries
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PatientProgressResponse {
    pub patient_id: EntityId,
    pub experience: i64,
    pub level: i32,
    pub next_level_at: Option<i64>,
}

impl PatientProgressResponse {
    pub fn new(patient_id: EntityId, progress: LevelProgress) -> Self {
        Self {
            patient_id,
            experience: progress.experience,
            level: progress.level,
            next_level_at: progress.next_level_at,
        }
    }
}
