//! Runtime state shared across the orchestrator and its services.

pub mod machine;
pub mod puzzles;
pub mod ratings;
pub mod session;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    dao::puzzles::DailyPuzzleSource,
    engine::RulesEngine,
    services::outbound::{BoardRenderer, ChatOutbound},
    state::{puzzles::PuzzleCatalog, ratings::RatingLedger, session::SessionStore},
};

/// Shared, cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state owning the session registry, the rating ledger,
/// the puzzle catalog and the handles to external collaborators.
///
/// Everything external (rules engine, renderer, transport, daily-puzzle
/// source, rating snapshot storage) comes in through trait objects so the
/// core stays testable without a running chat client.
pub struct AppState {
    config: AppConfig,
    engine: Arc<dyn RulesEngine>,
    sessions: SessionStore,
    ratings: RatingLedger,
    catalog: PuzzleCatalog,
    daily: Option<Arc<dyn DailyPuzzleSource>>,
    renderer: Arc<dyn BoardRenderer>,
    outbound: Arc<dyn ChatOutbound>,
}

impl AppState {
    /// Assemble the state and wrap it in an [`Arc`] so it can be cloned
    /// cheaply into background tasks.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: AppConfig,
        engine: Arc<dyn RulesEngine>,
        catalog: PuzzleCatalog,
        daily: Option<Arc<dyn DailyPuzzleSource>>,
        renderer: Arc<dyn BoardRenderer>,
        outbound: Arc<dyn ChatOutbound>,
        ratings: RatingLedger,
    ) -> SharedState {
        Arc::new(Self {
            config,
            engine,
            sessions: SessionStore::new(),
            ratings,
            catalog,
            daily,
            renderer,
            outbound,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The rules engine adapter.
    pub fn engine(&self) -> &Arc<dyn RulesEngine> {
        &self.engine
    }

    /// The session registry.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// The rating ledger.
    pub fn ratings(&self) -> &RatingLedger {
        &self.ratings
    }

    /// The loaded puzzle catalog.
    pub fn catalog(&self) -> &PuzzleCatalog {
        &self.catalog
    }

    /// Remote daily-puzzle source, if one is configured.
    pub fn daily(&self) -> Option<&Arc<dyn DailyPuzzleSource>> {
        self.daily.as_ref()
    }

    /// The board renderer.
    pub fn renderer(&self) -> &Arc<dyn BoardRenderer> {
        &self.renderer
    }

    /// The chat transport's outbound side.
    pub fn outbound(&self) -> &Arc<dyn ChatOutbound> {
        &self.outbound
    }
}
