pub mod ledger;
pub mod models;

pub use ledger::{experience_delta, level_for_experience, LevelTable, FLOOR_LEVEL};
pub use models::{LevelProgress, LevelRange};
