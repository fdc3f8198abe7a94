use async_trait::async_trait;
use futures::{future, TryStreamExt};
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::{
    models::{GameInstanceRow, GameModel, InstanceFilter, NewGameInstance, PatientModel},
    GameInstance, ProgressError,
};
use crate::experience::{LevelRange, LevelTable};
use crate::ids::EntityId;

/// Persistence contract for patients, levels and the game-instance ledger
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn get_patient(&self, patient_id: EntityId)
        -> Result<Option<PatientModel>, ProgressError>;

    /// Fails with `Reference` when the patient does not exist
    async fn get_patient_experience(&self, patient_id: EntityId) -> Result<i64, ProgressError>;

    /// Inserts the instance and adds `experience_delta` to the patient's total
    /// as one atomic unit. A delta of zero leaves the patient untouched.
    async fn record_game_instance(
        &self,
        instance: &NewGameInstance,
        experience_delta: i64,
    ) -> Result<GameInstance, ProgressError>;

    /// Newest first
    async fn list_game_instances(
        &self,
        filter: InstanceFilter,
    ) -> Result<Vec<GameInstance>, ProgressError>;

    /// Sorted by lower bound
    async fn list_level_ranges(&self) -> Result<Vec<LevelRange>, ProgressError>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    patients: HashMap<EntityId, PatientModel>,
    games: HashMap<EntityId, GameModel>,
    instances: Vec<GameInstance>,
    levels: Vec<LevelRange>,
    next_instance_id: i64,
}

/// In-memory implementation of ProgressRepository for development and testing
///
/// All state sits behind a single lock, so an insert and its experience
/// increment are never observed separately.
pub struct InMemoryProgressRepository {
    state: Mutex<InMemoryState>,
}

impl Default for InMemoryProgressRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProgressRepository {
    /// Creates an empty repository seeded with the default level table
    pub fn new() -> Self {
        Self::with_levels(LevelTable::default_table())
    }

    pub fn with_levels(levels: LevelTable) -> Self {
        Self {
            state: Mutex::new(InMemoryState {
                levels: levels.into_ranges(),
                next_instance_id: 1,
                ..InMemoryState::default()
            }),
        }
    }

    pub async fn add_patient(&self, patient: PatientModel) {
        let mut state = self.state.lock().await;
        state.patients.insert(patient.id, patient);
    }

    pub async fn add_game(&self, game: GameModel) {
        let mut state = self.state.lock().await;
        state.games.insert(game.id, game);
    }

    pub async fn instance_count(&self) -> usize {
        self.state.lock().await.instances.len()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    #[instrument(skip(self))]
    async fn get_patient(
        &self,
        patient_id: EntityId,
    ) -> Result<Option<PatientModel>, ProgressError> {
        let state = self.state.lock().await;
        Ok(state.patients.get(&patient_id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_patient_experience(&self, patient_id: EntityId) -> Result<i64, ProgressError> {
        let state = self.state.lock().await;
        state
            .patients
            .get(&patient_id)
            .map(|patient| patient.experience)
            .ok_or_else(|| {
                ProgressError::Reference(format!("patient {} does not exist", patient_id))
            })
    }

    #[instrument(skip(self, instance), fields(patient_id = %instance.patient_id, game_id = %instance.game_id))]
    async fn record_game_instance(
        &self,
        instance: &NewGameInstance,
        experience_delta: i64,
    ) -> Result<GameInstance, ProgressError> {
        let mut state = self.state.lock().await;

        if !state.patients.contains_key(&instance.patient_id) {
            warn!("Patient not found, nothing recorded");
            return Err(ProgressError::Reference(format!(
                "patient {} does not exist",
                instance.patient_id
            )));
        }
        if !state.games.contains_key(&instance.game_id) {
            warn!("Game not found, nothing recorded");
            return Err(ProgressError::Reference(format!(
                "game {} does not exist",
                instance.game_id
            )));
        }

        let id = EntityId::new(state.next_instance_id);
        state.next_instance_id += 1;

        let recorded = GameInstance {
            id,
            patient_id: instance.patient_id,
            game_id: instance.game_id,
            outcome: instance.outcome,
            exp_earned: instance.exp_earned,
            played_at: instance.played_at,
        };
        state.instances.push(recorded.clone());

        if experience_delta > 0 {
            if let Some(patient) = state.patients.get_mut(&instance.patient_id) {
                patient.experience += experience_delta;
                debug!(
                    delta = experience_delta,
                    experience = patient.experience,
                    "Patient experience incremented in memory"
                );
            }
        }

        debug!(instance_id = %id, "Game instance recorded in memory");
        Ok(recorded)
    }

    #[instrument(skip(self))]
    async fn list_game_instances(
        &self,
        filter: InstanceFilter,
    ) -> Result<Vec<GameInstance>, ProgressError> {
        let state = self.state.lock().await;

        let mut instances: Vec<GameInstance> = state
            .instances
            .iter()
            .filter(|instance| match filter {
                InstanceFilter::Patient(patient_id) => instance.patient_id == patient_id,
                InstanceFilter::Fono(fono_id) => state
                    .patients
                    .get(&instance.patient_id)
                    .is_some_and(|patient| patient.fono_id == fono_id),
            })
            .cloned()
            .collect();

        instances.sort_by(|a, b| b.played_at.cmp(&a.played_at).then(b.id.cmp(&a.id)));

        debug!(count = instances.len(), "Game instances listed from memory");
        Ok(instances)
    }

    async fn list_level_ranges(&self) -> Result<Vec<LevelRange>, ProgressError> {
        let state = self.state.lock().await;
        Ok(state.levels.clone())
    }
}

/// PostgreSQL implementation of progress repository
pub struct PostgresProgressRepository {
    pool: PgPool,
}

impl PostgresProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSTANCE_COLUMNS: &str = "i.id, i.paciente_id, i.juego_id, i.estado, i.exp_ganada, i.jugado_en";

fn storage_error(e: sqlx::Error) -> ProgressError {
    warn!(error = %e, "Progress storage operation failed");
    ProgressError::Storage(e.to_string())
}

/// Foreign key violations on insert mean the patient or game is missing
fn insert_error(e: sqlx::Error) -> ProgressError {
    if let Some(db_error) = e.as_database_error() {
        if db_error.is_foreign_key_violation() {
            let constraint = db_error.constraint().unwrap_or("unknown constraint");
            warn!(constraint, "Game instance references a missing record");
            return ProgressError::Reference(format!(
                "referenced patient or game does not exist ({})",
                constraint
            ));
        }
    }
    storage_error(e)
}

#[async_trait]
impl ProgressRepository for PostgresProgressRepository {
    #[instrument(skip(self))]
    async fn get_patient(
        &self,
        patient_id: EntityId,
    ) -> Result<Option<PatientModel>, ProgressError> {
        debug!("Fetching patient from database");

        sqlx::query_as::<_, PatientModel>(
            "SELECT id, fono_id, nombre, experiencia FROM pacientes WHERE id = $1",
        )
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)
    }

    #[instrument(skip(self))]
    async fn get_patient_experience(&self, patient_id: EntityId) -> Result<i64, ProgressError> {
        sqlx::query_scalar::<_, i64>("SELECT experiencia FROM pacientes WHERE id = $1")
            .bind(patient_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| {
                ProgressError::Reference(format!("patient {} does not exist", patient_id))
            })
    }

    #[instrument(skip(self, instance), fields(patient_id = %instance.patient_id, game_id = %instance.game_id))]
    async fn record_game_instance(
        &self,
        instance: &NewGameInstance,
        experience_delta: i64,
    ) -> Result<GameInstance, ProgressError> {
        debug!(delta = experience_delta, "Recording game instance in database");

        // Dropping the transaction on any early return rolls both writes back.
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let row = sqlx::query_as::<_, GameInstanceRow>(
            "INSERT INTO instancias_juego (paciente_id, juego_id, estado, exp_ganada, jugado_en)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, paciente_id, juego_id, estado, exp_ganada, jugado_en",
        )
        .bind(instance.patient_id)
        .bind(instance.game_id)
        .bind(instance.outcome.as_ref())
        .bind(instance.exp_earned)
        .bind(instance.played_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(insert_error)?;

        if experience_delta > 0 {
            // Single-statement increment: the row lock serializes concurrent writers.
            let result =
                sqlx::query("UPDATE pacientes SET experiencia = experiencia + $2 WHERE id = $1")
                    .bind(instance.patient_id)
                    .bind(experience_delta)
                    .execute(&mut *tx)
                    .await
                    .map_err(storage_error)?;

            if result.rows_affected() == 0 {
                warn!("Patient vanished before experience increment");
                return Err(ProgressError::Reference(format!(
                    "patient {} does not exist",
                    instance.patient_id
                )));
            }
        }

        // Converted before commit so a malformed row rolls the increment back too.
        let recorded = GameInstance::try_from(row)?;
        tx.commit().await.map_err(storage_error)?;

        debug!(instance_id = %recorded.id, "Game instance recorded in database");
        Ok(recorded)
    }

    #[instrument(skip(self))]
    async fn list_game_instances(
        &self,
        filter: InstanceFilter,
    ) -> Result<Vec<GameInstance>, ProgressError> {
        let (sql, owner_id) = match filter {
            InstanceFilter::Patient(patient_id) => (
                format!(
                    "SELECT {INSTANCE_COLUMNS} FROM instancias_juego i
                     WHERE i.paciente_id = $1
                     ORDER BY i.jugado_en DESC, i.id DESC"
                ),
                patient_id,
            ),
            InstanceFilter::Fono(fono_id) => (
                format!(
                    "SELECT {INSTANCE_COLUMNS} FROM instancias_juego i
                     JOIN pacientes p ON p.id = i.paciente_id
                     WHERE p.fono_id = $1
                     ORDER BY i.jugado_en DESC, i.id DESC"
                ),
                fono_id,
            ),
        };

        let instances: Vec<GameInstance> = sqlx::query_as::<_, GameInstanceRow>(&sql)
            .bind(owner_id)
            .fetch(&self.pool)
            .map_err(storage_error)
            .and_then(|row| future::ready(GameInstance::try_from(row)))
            .try_collect()
            .await?;

        debug!(count = instances.len(), "Game instances listed from database");
        Ok(instances)
    }

    #[instrument(skip(self))]
    async fn list_level_ranges(&self) -> Result<Vec<LevelRange>, ProgressError> {
        sqlx::query_as::<_, LevelRange>(
            "SELECT nivel, exp_minima, exp_maxima FROM niveles ORDER BY exp_minima ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)
    }
}
