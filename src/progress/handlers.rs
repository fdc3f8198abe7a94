use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, instrument, warn};

use super::{
    models::Outcome,
    types::{PatientProgressResponse, RecordGameInstanceRequest},
    GameInstance,
};
use crate::auth::{ensure_patient_access, AuthContext, Role};
use crate::experience::LevelRange;
use crate::ids::EntityId;
use crate::shared::{AppError, AppState};

/// HTTP handler for recording a play attempt
///
/// POST /game-instances
/// Returns the stored game instance
#[instrument(name = "record_game_instance", skip(state, auth, payload), fields(caller = %auth.user_id))]
pub async fn record_game_instance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<RecordGameInstanceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GameInstance>), AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected game instance payload");
        AppError::Validation(rejection.body_text())
    })?;

    let patient_id = match (auth.role, request.patient_id) {
        (Role::Paciente, None) => auth.user_id,
        (_, Some(patient_id)) => patient_id,
        (Role::Fono, None) => {
            return Err(AppError::Validation(
                "patient_id is required when a therapist records a session".to_string(),
            ))
        }
    };

    let outcome = Outcome::parse(&request.outcome)?;

    let service = state.progress_service();
    let patient = service.get_patient(patient_id).await?;
    ensure_patient_access(&auth, &patient)?;

    let instance = service
        .record_session(patient_id, request.game_id, outcome, request.exp_earned)
        .await?;

    info!(
        instance_id = %instance.id,
        patient_id = %patient_id,
        "Game instance created"
    );

    Ok((StatusCode::CREATED, Json(instance)))
}

/// HTTP handler for a patient's experience and level
///
/// GET /patients/:id/progress
#[instrument(name = "get_patient_progress", skip(state, auth))]
pub async fn get_patient_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(patient_id): Path<EntityId>,
) -> Result<Json<PatientProgressResponse>, AppError> {
    let service = state.progress_service();
    let patient = service.get_patient(patient_id).await?;
    ensure_patient_access(&auth, &patient)?;

    let progress = service.patient_progress(patient_id).await?;
    Ok(Json(PatientProgressResponse::new(patient_id, progress)))
}

/// HTTP handler for a patient's play history, newest first
///
/// GET /patients/:id/game-instances
#[instrument(name = "list_patient_history", skip(state, auth))]
pub async fn list_patient_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(patient_id): Path<EntityId>,
) -> Result<Json<Vec<GameInstance>>, AppError> {
    let service = state.progress_service();
    let patient = service.get_patient(patient_id).await?;
    ensure_patient_access(&auth, &patient)?;

    let history = service.list_history(patient_id).await?;
    info!(count = history.len(), "History listed");
    Ok(Json(history))
}

/// HTTP handler for the level table
///
/// GET /levels
#[instrument(name = "list_levels", skip(state))]
pub async fn list_levels(State(state): State<AppState>) -> Result<Json<Vec<LevelRange>>, AppError> {
    let levels = state.progress_service().list_levels().await?;
    Ok(Json(levels))
}
