// Public API - what other modules can use
pub use handlers::{get_fono_stats, get_patient_stats};
pub use service::StatsService;
pub use summary::{average_score, build_report, summarize, GameSummary, StatsReport};

// Internal modules
mod handlers;
pub mod service;
pub mod summary;
