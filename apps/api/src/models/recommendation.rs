use std::fmt;

use serde::{Deserialize, Serialize};

/// Budget as supplied by the caller. Numeric input becomes `Amount` (TWD),
/// anything else is kept verbatim so the heuristic text still sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Budget {
    Amount(u32),
    Text(String),
}

impl Budget {
    pub fn amount(&self) -> Option<u32> {
        match self {
            Budget::Amount(n) => Some(*n),
            Budget::Text(_) => None,
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Budget::Amount(n) => write!(f, "{n}"),
            Budget::Text(s) => f.write_str(s),
        }
    }
}

/// Canonical, post-normalization recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub relationship: String,
    pub occasion: String,
    pub budget: Budget,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub impression: String,
    /// Free-text social profile hint. Only ever embedded into the prompt.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub social_hint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleAxis {
    Practical,
    Romantic,
    Trendy,
    Cute,
    Minimal,
}

impl StyleAxis {
    pub const ALL: [StyleAxis; 5] = [
        StyleAxis::Practical,
        StyleAxis::Romantic,
        StyleAxis::Trendy,
        StyleAxis::Cute,
        StyleAxis::Minimal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleAxis::Practical => "practical",
            StyleAxis::Romantic => "romantic",
            StyleAxis::Trendy => "trendy",
            StyleAxis::Cute => "cute",
            StyleAxis::Minimal => "minimal",
        }
    }
}

/// Style affinity over the five fixed axes. Every value lies in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub practical: f64,
    pub romantic: f64,
    pub trendy: f64,
    pub cute: f64,
    pub minimal: f64,
}

impl StyleProfile {
    pub fn get(&self, axis: StyleAxis) -> f64 {
        match axis {
            StyleAxis::Practical => self.practical,
            StyleAxis::Romantic => self.romantic,
            StyleAxis::Trendy => self.trendy,
            StyleAxis::Cute => self.cute,
            StyleAxis::Minimal => self.minimal,
        }
    }

    /// All axes in fixed order.
    pub fn axes(&self) -> impl Iterator<Item = (StyleAxis, f64)> + '_ {
        StyleAxis::ALL.into_iter().map(move |axis| (axis, self.get(axis)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftIdea {
    pub title: String,
    pub reason: String,
    pub price_range: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Greeting card text shared by both strategies.
///
/// The heuristic path fills `short`/`long` from templates; the generator path
/// supplies `title`, `long` (its message) and `signature`, and `short` is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub short: String,
    pub long: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Heuristic,
    Generated,
}

/// The complete recommendation returned to a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBundle {
    pub strategy: Strategy,
    pub received: RecommendationRequest,
    pub tags: Vec<String>,
    /// Heuristic path only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_profile: Option<StyleProfile>,
    pub gifts: Vec<GiftIdea>,
    pub card: CardText,
    pub share_caption: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_untagged_serde() {
        let amount: Budget = serde_json::from_str("800").unwrap();
        assert_eq!(amount, Budget::Amount(800));
        let text: Budget = serde_json::from_str(r#""大概一千""#).unwrap();
        assert_eq!(text, Budget::Text("大概一千".to_string()));
        assert_eq!(serde_json::to_string(&Budget::Amount(1200)).unwrap(), "1200");
    }

    #[test]
    fn test_budget_display_and_amount() {
        assert_eq!(Budget::Amount(800).to_string(), "800");
        assert_eq!(Budget::Text("看情況".into()).to_string(), "看情況");
        assert_eq!(Budget::Text("看情況".into()).amount(), None);
    }

    #[test]
    fn test_style_profile_axes_fixed_order() {
        let profile = StyleProfile {
            practical: 0.1,
            romantic: 0.2,
            trendy: 0.3,
            cute: 0.4,
            minimal: 0.5,
        };
        let names: Vec<&str> = profile.axes().map(|(a, _)| a.as_str()).collect();
        assert_eq!(names, ["practical", "romantic", "trendy", "cute", "minimal"]);
        assert_eq!(profile.get(StyleAxis::Cute), 0.4);
    }

    #[test]
    fn test_request_social_hint_omitted_when_empty() {
        let request = RecommendationRequest {
            relationship: "朋友".into(),
            occasion: "生日".into(),
            budget: Budget::Amount(800),
            interests: String::new(),
            impression: String::new(),
            social_hint: String::new(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("socialHint").is_none());
        assert_eq!(value["budget"], 800);
    }
}
