//! Input Normalizer: turns a loosely-typed request body into a canonical request.

use serde::Deserialize;
use tracing::debug;

use crate::config::BudgetPolicy;
use crate::errors::AppError;
use crate::models::recommendation::{Budget, RecommendationRequest};

/// Request body as it arrives on the wire. Every field is optional here;
/// the required set is enforced by [`normalize`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecommendationRequest {
    pub relationship: Option<String>,
    pub occasion: Option<String>,
    pub budget: Option<RawBudget>,
    pub interests: Option<String>,
    pub impression: Option<String>,
    pub social_hint: Option<String>,
}

/// The form posts a number, older clients post a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawBudget {
    Number(f64),
    Text(String),
}

/// Trims every field and checks the required set.
///
/// All missing fields are reported together, in declaration order.
pub fn normalize(
    raw: RawRecommendationRequest,
    policy: BudgetPolicy,
) -> Result<RecommendationRequest, AppError> {
    let relationship = trimmed(raw.relationship);
    let occasion = trimmed(raw.occasion);
    let budget = raw.budget.and_then(parse_budget);

    let mut missing = Vec::new();
    if relationship.is_empty() {
        missing.push("relationship");
    }
    if occasion.is_empty() {
        missing.push("occasion");
    }

    let budget = match (budget, policy) {
        (Some(budget), _) => Some(budget),
        (None, BudgetPolicy::DefaultTo(amount)) => {
            debug!("No budget supplied, applying configured default of {amount}");
            Some(Budget::Amount(amount))
        }
        (None, BudgetPolicy::Require) => {
            missing.push("budget");
            None
        }
    };

    match budget {
        Some(budget) if missing.is_empty() => Ok(RecommendationRequest {
            relationship,
            occasion,
            budget,
            interests: trimmed(raw.interests),
            impression: trimmed(raw.impression),
            social_hint: trimmed(raw.social_hint),
        }),
        _ => Err(AppError::Validation { missing }),
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// `None` means "no budget given"; a non-numeric string is still a budget.
fn parse_budget(raw: RawBudget) -> Option<Budget> {
    match raw {
        RawBudget::Number(n) => Some(amount_from_f64(n).map_or_else(
            || Budget::Text(n.to_string()),
            Budget::Amount,
        )),
        RawBudget::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(parse_amount(text).map_or_else(|| Budget::Text(text.to_string()), Budget::Amount))
        }
    }
}

/// Parses "800", "1,200", "NT$ 1500" or "$600" into a whole TWD amount.
pub fn parse_amount(text: &str) -> Option<u32> {
    let text = text.trim();
    let text = text
        .strip_prefix("NT$")
        .or_else(|| text.strip_prefix("nt$"))
        .or_else(|| text.strip_prefix('$'))
        .unwrap_or(text);
    let digits: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok().and_then(amount_from_f64)
}

fn amount_from_f64(n: f64) -> Option<u32> {
    if n.is_finite() && n >= 0.0 && n <= u32::MAX as f64 {
        Some(n.round() as u32)
    } else {
        None
    }
}
