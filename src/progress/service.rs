use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{InstanceFilter, NewGameInstance, Outcome, PatientModel},
    repository::ProgressRepository,
    GameInstance, ProgressError,
};
use crate::experience::{experience_delta, LevelProgress, LevelRange, LevelTable};
use crate::ids::EntityId;

/// Records play attempts and answers level queries
pub struct ProgressService {
    repository: Arc<dyn ProgressRepository>,
    max_experience_per_session: i64,
}

impl ProgressService {
    pub fn new(repository: Arc<dyn ProgressRepository>, max_experience_per_session: i64) -> Self {
        Self {
            repository,
            max_experience_per_session,
        }
    }

    /// Records one play attempt and, for a win with positive experience,
    /// credits the patient in the same atomic write.
    #[instrument(skip(self))]
    pub async fn record_session(
        &self,
        patient_id: EntityId,
        game_id: EntityId,
        outcome: Outcome,
        exp_earned: Option<i64>,
    ) -> Result<GameInstance, ProgressError> {
        // Non-wins carry no experience, so only the amount that will be kept is checked.
        let instance = NewGameInstance::new(patient_id, game_id, outcome, exp_earned);
        if let Some(earned) = instance.exp_earned {
            if earned < 0 {
                return Err(ProgressError::Validation(format!(
                    "exp_earned must not be negative, got {}",
                    earned
                )));
            }
            if earned > self.max_experience_per_session {
                warn!(
                    earned,
                    max = self.max_experience_per_session,
                    "Rejecting experience above the per-session cap"
                );
                return Err(ProgressError::Validation(format!(
                    "exp_earned {} exceeds the per-session maximum of {}",
                    earned, self.max_experience_per_session
                )));
            }
        }

        let delta = experience_delta(outcome, instance.exp_earned);

        let recorded = self
            .repository
            .record_game_instance(&instance, delta)
            .await?;

        info!(
            instance_id = %recorded.id,
            outcome = %recorded.outcome,
            delta,
            "Game session recorded"
        );
        Ok(recorded)
    }

    /// Current experience and level of a patient
    #[instrument(skip(self))]
    pub async fn patient_progress(
        &self,
        patient_id: EntityId,
    ) -> Result<LevelProgress, ProgressError> {
        let experience = self.repository.get_patient_experience(patient_id).await?;
        let table = self.level_table().await?;
        Ok(table.progress_for(experience))
    }

    pub async fn list_levels(&self) -> Result<Vec<LevelRange>, ProgressError> {
        Ok(self.level_table().await?.into_ranges())
    }

    /// The patient's play history, newest first
    #[instrument(skip(self))]
    pub async fn list_history(
        &self,
        patient_id: EntityId,
    ) -> Result<Vec<GameInstance>, ProgressError> {
        self.get_patient(patient_id).await?;
        self.repository
            .list_game_instances(InstanceFilter::Patient(patient_id))
            .await
    }

    /// Fails with `Reference` when the patient does not exist
    pub async fn get_patient(&self, patient_id: EntityId) -> Result<PatientModel, ProgressError> {
        self.repository
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| ProgressError::Reference(format!("patient {} does not exist", patient_id)))
    }

    async fn level_table(&self) -> Result<LevelTable, ProgressError> {
        let ranges = self.repository.list_level_ranges().await?;
        if ranges.is_empty() {
            warn!("Level table is empty, every patient stays at the floor level");
        }
        LevelTable::new(ranges).map_err(|e| {
            warn!(error = %e, "Stored level table is inconsistent");
            ProgressError::Storage(format!("stored level table is inconsistent: {}", e))
        })
    }
}
