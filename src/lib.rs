// Library crate for the fono progress service
// This file exposes the public API for integration tests

pub mod app;
pub mod auth;
pub mod config;
pub mod experience;
pub mod ids;
pub mod progress;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use auth::{AuthContext, Role, TokenConfig};
pub use config::AppConfig;
pub use experience::{level_for_experience, LevelRange, LevelTable};
pub use ids::EntityId;
pub use progress::{
    GameInstance, InMemoryProgressRepository, Outcome, ProgressError, ProgressRepository,
    ProgressService,
};
pub use shared::{AppError, AppState};
pub use stats::{summarize, GameSummary, StatsReport, StatsService};
