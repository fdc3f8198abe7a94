use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::{info, instrument};

use super::summary::StatsReport;
use crate::auth::{ensure_patient_access, require_fono, AuthContext};
use crate::ids::EntityId;
use crate::shared::{AppError, AppState};

/// HTTP handler for one patient's statistics
///
/// GET /patients/:id/stats
#[instrument(name = "get_patient_stats", skip(state, auth))]
pub async fn get_patient_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(patient_id): Path<EntityId>,
) -> Result<Json<StatsReport>, AppError> {
    let patient = state.progress_service().get_patient(patient_id).await?;
    ensure_patient_access(&auth, &patient)?;

    let report = state.stats_service().patient_report(patient_id).await?;
    info!(played = report.summary.played, "Patient statistics computed");
    Ok(Json(report))
}

/// HTTP handler for statistics across all of the caller's patients
///
/// GET /fono/stats
#[instrument(name = "get_fono_stats", skip(state, auth))]
pub async fn get_fono_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<StatsReport>, AppError> {
    let fono_id = require_fono(&auth)?;

    let report = state.stats_service().fono_report(fono_id).await?;
    info!(fono_id = %fono_id, played = report.summary.played, "Therapist statistics computed");
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{jwt_auth, Role};
    use crate::progress::repository::tests::helpers::*;
    use crate::progress::Outcome;
    use crate::shared::test_utils::{bearer, AppStateBuilder};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    async fn app() -> (Router, AppState) {
        let repo = Arc::new(seeded_repository().await);
        let state = AppStateBuilder::new()
            .with_progress_repository(repo)
            .build();

        let service = state.progress_service();
        service
            .record_session(PATIENT, GAME, Outcome::Won, Some(20))
            .await
            .unwrap();
        service
            .record_session(PATIENT, GAME, Outcome::Lost, None)
            .await
            .unwrap();

        let router = Router::new()
            .route("/patients/:id/stats", get(get_patient_stats))
            .route("/fono/stats", get(get_fono_stats))
            .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth))
            .with_state(state.clone());
        (router, state)
    }

    fn get_with(uri: &str, auth: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("Authorization", auth)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_patient_reads_own_stats() {
        let (app, state) = app().await;
        let auth = bearer(&state, PATIENT, Role::Paciente);

        let response = app
            .oneshot(get_with("/patients/100/stats", &auth))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let report: StatsReport = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.summary.played, 2);
        assert_eq!(report.summary.average_score, 50);
        assert!(report.by_game.contains_key(&GAME));
    }

    #[tokio::test]
    async fn test_unknown_patient_stats_is_not_found() {
        let (app, state) = app().await;
        let auth = bearer(&state, FONO, Role::Fono);

        let response = app
            .oneshot(get_with("/patients/999/stats", &auth))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_fono_stats_aggregate_own_patients() {
        let (app, state) = app().await;
        let auth = bearer(&state, FONO, Role::Fono);

        let response = app.oneshot(get_with("/fono/stats", &auth)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let report: StatsReport = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.summary.won, 1);
        assert_eq!(report.summary.lost, 1);
    }

    #[tokio::test]
    async fn test_patient_cannot_read_fono_stats() {
        let (app, state) = app().await;
        let auth = bearer(&state, PATIENT, Role::Paciente);

        let response = app.oneshot(get_with("/fono/stats", &auth)).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
