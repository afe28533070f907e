use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::recommend::recommender::{
    FallbackRecommender, GiftRecommender, HeuristicRecommender, LlmRecommender,
};

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; nothing here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Endpoint A strategy.
    pub heuristic: Arc<dyn GiftRecommender>,
    /// Endpoint B strategy. Wrapped in a fallback to `heuristic` when
    /// LLM_FALLBACK_TO_HEURISTIC is enabled.
    pub generated: Arc<dyn GiftRecommender>,
}

impl AppState {
    pub fn new(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        let heuristic: Arc<dyn GiftRecommender> = Arc::new(HeuristicRecommender);
        let llm: Arc<dyn GiftRecommender> =
            Arc::new(LlmRecommender::new(generator, config.validation_policy));

        let generated = if config.fallback_to_heuristic {
            Arc::new(FallbackRecommender::new(llm, heuristic.clone())) as Arc<dyn GiftRecommender>
        } else {
            llm
        };

        Self {
            config,
            heuristic,
            generated,
        }
    }
}
