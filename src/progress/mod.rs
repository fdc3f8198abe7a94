// Public API - what other modules can use
pub use errors::ProgressError;
pub use handlers::{get_patient_progress, list_levels, list_patient_history, record_game_instance};
pub use models::{GameInstance, GameModel, InstanceFilter, NewGameInstance, Outcome, PatientModel};
pub use repository::{InMemoryProgressRepository, PostgresProgressRepository, ProgressRepository};
pub use service::ProgressService;

// Internal modules
mod errors;
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
