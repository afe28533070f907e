//! Axum route handlers for the Recommendation API.

use anyhow::anyhow;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::recommendation::{
    GiftIdea, RecommendationBundle, RecommendationRequest, Strategy, StyleProfile,
};
use crate::recommend::normalize::{normalize, RawRecommendationRequest};
use crate::recommend::recommender::GiftRecommender;
use crate::recommend::share::{decode_bundle, encode_bundle};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ShortLongCard {
    pub short: String,
    pub long: String,
}

/// Endpoint A wire shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeuristicResponse {
    pub profile_tags: Vec<String>,
    pub style_radar: StyleProfile,
    pub gifts: Vec<GiftIdea>,
    pub card: ShortLongCard,
    pub share_caption: String,
    pub share_data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub title: String,
    pub reason: String,
    pub price_range: String,
}

#[derive(Debug, Serialize)]
pub struct TitledCard {
    pub title: String,
    pub message: String,
    pub signature: String,
}

/// Endpoint B wire shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedResponse {
    pub ok: bool,
    pub strategy: Strategy,
    pub received: RecommendationRequest,
    pub tags: Vec<String>,
    pub recommendations: Vec<RecommendationItem>,
    pub card: TitledCard,
    pub share_caption: String,
    pub share_data: String,
}

#[derive(Debug, Deserialize)]
pub struct ShareQuery {
    pub data: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub ok: bool,
    pub result: Option<RecommendationBundle>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/recommend
///
/// Heuristic recommendation. Deterministic, no outbound calls.
pub async fn handle_recommend(
    State(state): State<AppState>,
    payload: Result<Json<RawRecommendationRequest>, JsonRejection>,
) -> Result<Json<HeuristicResponse>, AppError> {
    let bundle = run_pipeline(&state, state.heuristic.as_ref(), payload).await?;
    let share_data = share_data(&bundle)?;

    let style_radar = bundle
        .style_profile
        .ok_or_else(|| AppError::Internal(anyhow!("heuristic bundle has no style profile")))?;

    Ok(Json(HeuristicResponse {
        profile_tags: bundle.tags,
        style_radar,
        gifts: bundle.gifts,
        card: ShortLongCard {
            short: bundle.card.short,
            long: bundle.card.long,
        },
        share_caption: bundle.share_caption,
        share_data,
    }))
}

/// POST /api/v1/recommend/generate (also the legacy POST /api/recommand)
///
/// Generator-backed recommendation: prompt → one LLM call → extract/validate.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<RawRecommendationRequest>, JsonRejection>,
) -> Result<Json<GeneratedResponse>, AppError> {
    let bundle = run_pipeline(&state, state.generated.as_ref(), payload).await?;
    let share_data = share_data(&bundle)?;

    let card = bundle.card;
    Ok(Json(GeneratedResponse {
        ok: true,
        strategy: bundle.strategy,
        received: bundle.received,
        tags: bundle.tags,
        recommendations: bundle
            .gifts
            .into_iter()
            .map(|g| RecommendationItem {
                title: g.title,
                reason: g.reason,
                price_range: g.price_range,
            })
            .collect(),
        card: TitledCard {
            title: card.title.unwrap_or(card.short),
            message: card.long,
            signature: card.signature.unwrap_or_default(),
        },
        share_caption: bundle.share_caption,
        share_data,
    }))
}

/// GET /api/v1/share?data=…
///
/// Decodes a shared bundle. Missing or malformed data, including a query
/// string that does not deserialize, yields `result: null`.
pub async fn handle_share(
    query: Result<Query<ShareQuery>, QueryRejection>,
) -> Json<ShareResponse> {
    let data = match query {
        Ok(Query(query)) => query.data,
        Err(rejection) => {
            debug!("Share query rejected: {}", rejection.body_text());
            None
        }
    };
    let result = data.as_deref().and_then(decode_bundle);
    Json(ShareResponse { ok: true, result })
}

// ────────────────────────────────────────────────────────────────────────────
// Shared pipeline entry
// ────────────────────────────────────────────────────────────────────────────

/// Body → canonical request → strategy → bundle.
async fn run_pipeline(
    state: &AppState,
    recommender: &dyn GiftRecommender,
    payload: Result<Json<RawRecommendationRequest>, JsonRejection>,
) -> Result<RecommendationBundle, AppError> {
    let Json(raw) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let request = normalize(raw, state.config.budget_policy)?;

    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        strategy = ?recommender.strategy(),
        relationship = %request.relationship,
        occasion = %request.occasion,
        "Recommendation requested"
    );

    recommender.recommend(request_id, &request).await
}

fn share_data(bundle: &RecommendationBundle) -> Result<String, AppError> {
    encode_bundle(bundle).map_err(|e| AppError::Internal(e.into()))
}
