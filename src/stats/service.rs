use std::sync::Arc;
use tracing::{debug, instrument};

use super::summary::{build_report, StatsReport};
use crate::ids::EntityId;
use crate::progress::{InstanceFilter, ProgressError, ProgressRepository};

/// Read-only statistics over the game-instance ledger
pub struct StatsService {
    repository: Arc<dyn ProgressRepository>,
}

impl StatsService {
    pub fn new(repository: Arc<dyn ProgressRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn patient_report(&self, patient_id: EntityId) -> Result<StatsReport, ProgressError> {
        self.report(InstanceFilter::Patient(patient_id)).await
    }

    /// Aggregates over every patient the therapist owns
    #[instrument(skip(self))]
    pub async fn fono_report(&self, fono_id: EntityId) -> Result<StatsReport, ProgressError> {
        self.report(InstanceFilter::Fono(fono_id)).await
    }

    async fn report(&self, filter: InstanceFilter) -> Result<StatsReport, ProgressError> {
        let instances = self.repository.list_game_instances(filter).await?;
        let report = build_report(&instances);

        debug!(
            instances = instances.len(),
            played = report.summary.played,
            won = report.summary.won,
            "Statistics aggregated"
        );
        Ok(report)
    }
}
