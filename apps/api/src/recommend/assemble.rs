//! Bundle Assembler: merges either strategy's output into a `RecommendationBundle`.

use crate::models::recommendation::{
    CardText, GiftIdea, RecommendationBundle, RecommendationRequest, Strategy,
};
use crate::recommend::extract::{GeneratedCard, GeneratedPayload};
use crate::recommend::scoring::{card_text, gift_ideas, profile_tags, score_style};

/// Same text for every bundle; never generated.
pub const SHARE_CAPTION: &str =
    "我用「送禮物救星」找到超適合的禮物靈感了 🎁 不知道送什麼的你也來試試看！";

pub fn assemble_heuristic(request: RecommendationRequest) -> RecommendationBundle {
    RecommendationBundle {
        strategy: Strategy::Heuristic,
        tags: profile_tags(&request),
        style_profile: Some(score_style(&request)),
        gifts: gift_ideas(&request),
        card: card_text(&request),
        share_caption: SHARE_CAPTION.to_string(),
        received: request,
    }
}

pub fn assemble_generated(
    request: RecommendationRequest,
    payload: GeneratedPayload,
) -> RecommendationBundle {
    let gifts = payload
        .recommendations
        .into_iter()
        .map(|r| GiftIdea {
            title: r.title,
            reason: r.reason,
            price_range: r.price_range,
            tags: Vec::new(),
        })
        .collect();

    RecommendationBundle {
        strategy: Strategy::Generated,
        received: request,
        tags: payload.tags,
        style_profile: None,
        gifts,
        card: card_from_generated(payload.card),
        share_caption: SHARE_CAPTION.to_string(),
    }
}

/// The generator writes a titled message; its title doubles as the short form.
fn card_from_generated(card: GeneratedCard) -> CardText {
    let short = if card.title.trim().is_empty() {
        card.message
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default()
            .to_string()
    } else {
        card.title.clone()
    };

    CardText {
        title: Some(card.title).filter(|t| !t.trim().is_empty()),
        short,
        long: card.message,
        signature: Some(card.signature).filter(|s| !s.trim().is_empty()),
    }
}
