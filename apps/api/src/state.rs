use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::analysis::AnalysisCache;
use crate::models::recommendation::RecommendationResult;
use crate::profile::SkillProfileStore;
use crate::service_client::RecommendationService;
use crate::session::RecommendationSession;

/// Shared application state injected into all route handlers via Axum extractors.
/// One process is one user session: the profile, handoff slot, and analysis
/// cache all belong to that single user.
#[derive(Clone)]
pub struct AppState {
    pub profile: Arc<Mutex<SkillProfileStore>>,
    pub session: RecommendationSession,
    /// Pluggable recommendation backend. Default: `RecommendationClient`.
    pub recommender: Arc<dyn RecommendationService>,
    pub analysis: AnalysisCache,
    /// Results of the most recent recommendation fetch, in served order.
    /// Analysis requests are built from these.
    pub results: Arc<RwLock<Vec<RecommendationResult>>>,
}

impl AppState {
    pub fn new(
        profile: SkillProfileStore,
        session: RecommendationSession,
        recommender: Arc<dyn RecommendationService>,
        analysis: AnalysisCache,
    ) -> Self {
        Self {
            profile: Arc::new(Mutex::new(profile)),
            session,
            recommender,
            analysis,
            results: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn find_result(&self, project_id: &str) -> Option<RecommendationResult> {
        self.results
            .read()
            .iter()
            .find(|r| r.project_id == project_id)
            .cloned()
    }
}
