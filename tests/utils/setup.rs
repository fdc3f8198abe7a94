use axum::Router;
use std::sync::Arc;

use fono::{
    app,
    progress::{GameModel, PatientModel},
    AppConfig, AppState, EntityId, InMemoryProgressRepository, LevelTable, ProgressService, Role,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const FONO: EntityId = EntityId::new(1);
pub const OTHER_FONO: EntityId = EntityId::new(2);
pub const GAME: EntityId = EntityId::new(900);
pub const SECOND_GAME: EntityId = EntityId::new(901);

pub struct TestSetup {
    pub repository: Arc<InMemoryProgressRepository>,
    pub state: AppState,
    pub router: Router,
    pub patients: Vec<EntityId>,
}

impl TestSetup {
    pub fn progress_service(&self) -> ProgressService {
        self.state.progress_service()
    }

    /// `Authorization` header value for the given caller
    pub fn bearer(&self, user_id: EntityId, role: Role) -> String {
        let token = self
            .state
            .token_config
            .create_token(user_id, role)
            .expect("token creation should succeed");
        format!("Bearer {}", token)
    }
}

pub struct TestSetupBuilder {
    patients: Vec<(EntityId, EntityId, String)>,
    levels: LevelTable,
    config: AppConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            patients: vec![],
            levels: LevelTable::default_table(),
            config: AppConfig::default(),
        }
    }

    pub fn with_patient(mut self, id: i64, fono: EntityId, name: &str) -> Self {
        self.patients
            .push((EntityId::new(id), fono, name.to_string()));
        self
    }

    /// Two patients for FONO and one for OTHER_FONO
    pub fn with_practice(self) -> Self {
        self.with_patient(100, FONO, "Lucia")
            .with_patient(101, FONO, "Tomas")
            .with_patient(200, OTHER_FONO, "Mateo")
    }

    pub fn with_levels(mut self, levels: LevelTable) -> Self {
        self.levels = levels;
        self
    }

    pub async fn build(self) -> TestSetup {
        let repository = Arc::new(InMemoryProgressRepository::with_levels(self.levels));

        for (id, fono, name) in &self.patients {
            repository
                .add_patient(PatientModel::new(*id, *fono, name.as_str()))
                .await;
        }
        repository.add_game(GameModel::new(GAME, "Memotest")).await;
        repository
            .add_game(GameModel::new(SECOND_GAME, "Rimas"))
            .await;

        let state = AppState::new(repository.clone(), &self.config);
        let router = app::router(state.clone());

        TestSetup {
            repository,
            state,
            router,
            patients: self.patients.iter().map(|(id, _, _)| *id).collect(),
        }
    }
}
