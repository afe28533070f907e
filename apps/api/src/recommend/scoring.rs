//! Heuristic Scorer: deterministic keyword matching over the request text.
//!
//! No external calls. The same request always yields the same profile, tags,
//! gift ideas and card.

use crate::models::recommendation::{CardText, GiftIdea, RecommendationRequest, StyleProfile};

const PRACTICAL_MARKERS: &[&str] = &["實用"];
const ENGINEERING_MARKERS: &[&str] = &["工程"];
const ROMANTIC_MARKERS: &[&str] = &["情人", "告白"];
const TRENDY_MARKERS: &[&str] = &["潮", "時尚", "日系"];
const CUTE_MARKERS: &[&str] = &["可愛", "毛", "療癒"];
const MINIMAL_MARKERS: &[&str] = &["極簡", "黑白", "質感"];

const CLASSMATE_MARKER: &str = "同學";

pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Case-folded concatenation of every textual field, in fixed order.
fn scoring_text(request: &RecommendationRequest) -> String {
    format!(
        "{} {} {} {} {}",
        request.relationship,
        request.occasion,
        request.budget,
        request.interests,
        request.impression
    )
    .to_lowercase()
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| text.contains(m))
}

/// Each axis is scored independently: a baseline, raised when a marker matches.
pub fn score_style(request: &RecommendationRequest) -> StyleProfile {
    let text = scoring_text(request);
    let pick = |markers: &[&str], hit: f64, base: f64| {
        clamp01(if contains_any(&text, markers) { hit } else { base })
    };

    let practical_bonus = if contains_any(&text, ENGINEERING_MARKERS) {
        0.15
    } else {
        0.0
    };

    StyleProfile {
        practical: clamp01(pick(PRACTICAL_MARKERS, 0.8, 0.45) + practical_bonus),
        romantic: pick(ROMANTIC_MARKERS, 0.85, 0.35),
        trendy: pick(TRENDY_MARKERS, 0.8, 0.4),
        cute: pick(CUTE_MARKERS, 0.8, 0.35),
        minimal: pick(MINIMAL_MARKERS, 0.8, 0.45),
    }
}

/// Exactly four tags: relationship, occasion, interests, impression.
pub fn profile_tags(request: &RecommendationRequest) -> Vec<String> {
    let relationship_tag = if request.relationship.contains(CLASSMATE_MARKER) {
        "同儕友誼"
    } else {
        "關係親密度可調"
    };

    vec![
        relationship_tag.to_string(),
        request.occasion.clone(),
        if request.interests.is_empty() {
            "興趣未知".to_string()
        } else {
            format!("興趣：{}", request.interests)
        },
        if request.impression.is_empty() {
            "印象未知".to_string()
        } else {
            format!("印象：{}", request.impression)
        },
    ]
}

/// Three fixed archetypes: a home item, a customizable gift box, a shared-memory item.
pub fn gift_ideas(request: &RecommendationRequest) -> Vec<GiftIdea> {
    let box_reason = if request.interests.is_empty() {
        "可用口味/產地做客製，讓禮物看起來更有心。".to_string()
    } else {
        format!(
            "你填了興趣「{}」，這類禮盒很容易做出「懂他」的感覺。",
            request.interests
        )
    };

    vec![
        GiftIdea {
            title: "質感香氛蠟燭／擴香（中性安全牌）".to_string(),
            reason: format!(
                "適合「{}」，不容易踩雷；如果對方偏「質感/極簡」，更加分。",
                request.occasion
            ),
            price_range: "NT$600–1500".to_string(),
            tags: tags(&["安全牌", "質感", "居家"]),
        },
        GiftIdea {
            title: "手沖咖啡小禮盒／茶包禮盒（可客製口味）".to_string(),
            reason: box_reason,
            price_range: "NT$400–1200".to_string(),
            tags: tags(&["客製", "日常", "不尷尬"]),
        },
        GiftIdea {
            title: "拍立得相機底片／相片小卡組（互動性）".to_string(),
            reason: format!(
                "如果你們是「{}」，這種禮物會把「一起用」變成記憶點。",
                request.relationship
            ),
            price_range: "NT$300–900".to_string(),
            tags: tags(&["互動", "回憶", "可延伸"]),
        },
    ]
}

pub fn card_text(request: &RecommendationRequest) -> CardText {
    let short = format!(
        "祝你在「{}」這天超開心！希望這份小禮物能陪你更常笑～",
        request.occasion
    );

    let impression = if request.impression.is_empty() {
        String::new()
    } else {
        format!("（尤其是「{}」）", request.impression)
    };
    let long = format!(
        "嗨！\n\n\
         一直覺得你給人的感覺很特別{impression}。\n\
         這次想送你一份不只是「東西」，而是能讓你在日常也覺得被好好照顧的小禮物。\n\n\
         祝「{}」快樂！\n\
         — 送你禮物的人",
        request.occasion
    );

    CardText {
        title: None,
        short,
        long,
        signature: None,
    }
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
