use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth, progress, shared::AppState, stats};

/// Builds the HTTP router. Everything except `/health` requires a bearer token.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/levels", get(progress::list_levels))
        .route("/game-instances", post(progress::record_game_instance))
        .route("/patients/:id/progress", get(progress::get_patient_progress))
        .route(
            "/patients/:id/game-instances",
            get(progress::list_patient_history),
        )
        .route("/patients/:id/stats", get(stats::get_patient_stats))
        .route("/fono/stats", get(stats::get_fono_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::jwt_auth,
        ));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
