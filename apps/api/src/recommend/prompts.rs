// Prompt Builder: all LLM prompt text for gift generation lives here.

use tracing::warn;

use crate::models::recommendation::RecommendationRequest;

/// Used in the prompt when the budget is not numeric.
pub const FALLBACK_BUDGET_TWD: u32 = 800;

/// Shown for optional fields the caller left empty.
const NOT_PROVIDED: &str = "（未提供）";

/// System prompt for gift generation. Enforces JSON-only output.
pub const GIFT_SYSTEM: &str = "You are a thoughtful gift-giving assistant for users in Taiwan. \
    You MUST respond with valid JSON only — a single JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Gift generation prompt template.
/// Replace: {relationship}, {occasion}, {budget}, {interests}, {impression}, {social_hint}
pub const GIFT_PROMPT_TEMPLATE: &str = r#"You are 送禮物救星, a gift recommendation assistant. Suggest gifts and write a greeting card for the situation below.

SITUATION:
- Relationship to the recipient: {relationship}
- Occasion: {occasion}
- Budget: NT$ {budget}
- Recipient interests: {interests}
- Giver's impression of the recipient: {impression}
- Social profile hint: {social_hint}

Return a JSON object with this EXACT shape (no extra fields):
{
  "tags": ["露營愛好者", "實用派"],
  "recommendations": [
    {
      "title": "輕量露營折疊杯組",
      "reason": "他週末常跑戶外，一組好收納的杯子每次出門都用得到",
      "priceRange": "NT$500–800"
    }
  ],
  "card": {
    "title": "生日快樂！",
    "message": "祝你新的一歲天天都有好天氣可以出去玩。",
    "signature": "你的朋友"
  }
}

HARD RULES:
1. Output ONLY the JSON object — no prose before or after, no code fences
2. Write every string in Traditional Chinese (zh-TW)
3. `tags`: 3 to 5 short descriptors of the recipient, on-topic for the situation
4. `recommendations`: 3 to 5 gifts; `priceRange` must fit the budget (slightly above is acceptable)
5. Every `reason` must be concrete and tied to the situation above — never generic filler
6. `card.message` is 2 to 4 sentences matching the relationship and occasion"#;

/// Fills the generation template with the request's fields.
pub fn build_prompt(request: &RecommendationRequest) -> String {
    let budget = request.budget.amount().unwrap_or_else(|| {
        warn!(
            "Budget '{}' is not numeric, using NT$ {FALLBACK_BUDGET_TWD} in the prompt",
            request.budget
        );
        FALLBACK_BUDGET_TWD
    });

    let budget = budget.to_string();
    fill_template(GIFT_PROMPT_TEMPLATE, |name| match name {
        "relationship" => Some(request.relationship.as_str()),
        "occasion" => Some(request.occasion.as_str()),
        "budget" => Some(budget.as_str()),
        "interests" => Some(or_placeholder(&request.interests)),
        "impression" => Some(or_placeholder(&request.impression)),
        "social_hint" => Some(or_placeholder(&request.social_hint)),
        _ => None,
    })
}

/// Substitutes `{name}` tokens in one pass over the template. Inserted values
/// are never rescanned, and braces that do not form a known token are copied
/// through (the example JSON in the template relies on this).
fn fill_template<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            let is_token = !name.is_empty()
                && name.chars().all(|c| c.is_ascii_lowercase() || c == '_');
            is_token
                .then(|| lookup(name))
                .flatten()
                .map(|value| (value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn or_placeholder(value: &str) -> &str {
    if value.is_empty() {
        NOT_PROVIDED
    } else {
        value
    }
}
