//! Recommendation strategies: pluggable, trait-based generators of a bundle.
//!
//! `HeuristicRecommender` is pure and never calls out. `LlmRecommender` goes
//! through the `TextGenerator` seam. `FallbackRecommender` chains the two when
//! a deployment opts in.
//!
//! `AppState` holds each strategy as an `Arc<dyn GiftRecommender>`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ValidationPolicy;
use crate::errors::AppError;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::recommendation::{RecommendationBundle, RecommendationRequest, Strategy};
use crate::recommend::assemble::{assemble_generated, assemble_heuristic};
use crate::recommend::extract::parse_generated;
use crate::recommend::prompts::{build_prompt, GIFT_SYSTEM};

/// Raw generator output logged on validation failure is cut to this many chars.
const LOGGED_RAW_CHARS: usize = 500;

#[async_trait]
pub trait GiftRecommender: Send + Sync {
    fn strategy(&self) -> Strategy;

    async fn recommend(
        &self,
        request_id: Uuid,
        request: &RecommendationRequest,
    ) -> Result<RecommendationBundle, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicRecommender
// ────────────────────────────────────────────────────────────────────────────

/// Keyword scorer plus template fill. Deterministic, no I/O.
pub struct HeuristicRecommender;

#[async_trait]
impl GiftRecommender for HeuristicRecommender {
    fn strategy(&self) -> Strategy {
        Strategy::Heuristic
    }

    async fn recommend(
        &self,
        request_id: Uuid,
        request: &RecommendationRequest,
    ) -> Result<RecommendationBundle, AppError> {
        let bundle = assemble_heuristic(request.clone());
        let dominant_style = bundle.style_profile.as_ref().and_then(|profile| {
            profile
                .axes()
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(axis, _)| axis.as_str())
        });
        info!(
            %request_id,
            strategy = "heuristic",
            tags = ?bundle.tags,
            dominant_style = dominant_style.unwrap_or("none"),
            "Recommendation assembled"
        );
        Ok(bundle)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmRecommender
// ────────────────────────────────────────────────────────────────────────────

/// Prompt → one generator call → extract/validate → bundle. Never retries.
pub struct LlmRecommender {
    generator: Arc<dyn TextGenerator>,
    policy: ValidationPolicy,
}

impl LlmRecommender {
    pub fn new(generator: Arc<dyn TextGenerator>, policy: ValidationPolicy) -> Self {
        Self { generator, policy }
    }
}

#[async_trait]
impl GiftRecommender for LlmRecommender {
    fn strategy(&self) -> Strategy {
        Strategy::Generated
    }

    async fn recommend(
        &self,
        request_id: Uuid,
        request: &RecommendationRequest,
    ) -> Result<RecommendationBundle, AppError> {
        let prompt = build_prompt(request);

        let raw = self
            .generator
            .complete(&prompt, GIFT_SYSTEM)
            .await
            .map_err(llm_error_to_app)?;

        let payload = parse_generated(&raw, self.policy).map_err(|e| {
            let excerpt: String = raw.chars().take(LOGGED_RAW_CHARS).collect();
            warn!(
                %request_id,
                error = %e,
                raw = %excerpt,
                "Generator output failed validation"
            );
            AppError::MalformedResponse(e.to_string())
        })?;

        info!(
            %request_id,
            strategy = "generated",
            recommendations = payload.recommendations.len(),
            "Recommendation assembled"
        );

        Ok(assemble_generated(request.clone(), payload))
    }
}

fn llm_error_to_app(e: LlmError) -> AppError {
    let message = e.to_string();
    match e {
        LlmError::MissingApiKey => AppError::Configuration(message),
        LlmError::EmptyContent => AppError::MalformedResponse(message),
        _ => AppError::Generator(message),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FallbackRecommender
// ────────────────────────────────────────────────────────────────────────────

/// Serves `fallback` when `primary` fails at generation time.
/// Configuration and input errors are never masked.
pub struct FallbackRecommender {
    primary: Arc<dyn GiftRecommender>,
    fallback: Arc<dyn GiftRecommender>,
}

impl FallbackRecommender {
    pub fn new(primary: Arc<dyn GiftRecommender>, fallback: Arc<dyn GiftRecommender>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl GiftRecommender for FallbackRecommender {
    fn strategy(&self) -> Strategy {
        self.primary.strategy()
    }

    async fn recommend(
        &self,
        request_id: Uuid,
        request: &RecommendationRequest,
    ) -> Result<RecommendationBundle, AppError> {
        match self.primary.recommend(request_id, request).await {
            Err(e) if e.is_generation_failure() => {
                warn!(%request_id, error = %e, "Primary strategy failed, serving fallback");
                self.fallback.recommend(request_id, request).await
            }
            result => result,
        }
    }
}
