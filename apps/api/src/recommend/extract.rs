//! Response Extractor/Validator: recovers the JSON payload from free-form
//! generator output and checks it against the required shape.
//!
//! Extraction never fails loudly: any parse error becomes "no payload".
//! Validation depth is chosen by [`ValidationPolicy`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::ValidationPolicy;

const REQUIRED_KEYS: [&str; 3] = ["tags", "recommendations", "card"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("no JSON object found in generator output")]
    NoPayload,

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("payload is missing `{0}`")]
    MissingField(&'static str),

    #[error("`{field}` {reason}")]
    InvalidField { field: String, reason: &'static str },
}

/// The structured answer the generator is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPayload {
    pub tags: Vec<String>,
    pub recommendations: Vec<GeneratedRecommendation>,
    pub card: GeneratedCard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecommendation {
    pub title: String,
    pub reason: String,
    pub price_range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCard {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub signature: String,
}

/// Extracts and validates in one step.
pub fn parse_generated(raw: &str, policy: ValidationPolicy) -> Result<GeneratedPayload, ExtractError> {
    let value = extract_payload(raw).ok_or(ExtractError::NoPayload)?;
    validate_payload(&value, policy)
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Locates the embedded JSON value in `raw`.
///
/// 1. String-aware scan for balanced `{…}` blocks. The first block carrying
///    every required key wins; otherwise the first block that parses at all.
/// 2. Naive slice from the first `{` to the last `}`.
/// 3. With no ordered brace pair, the whole text.
pub fn extract_payload(raw: &str) -> Option<Value> {
    if let Some(value) = scan_balanced_objects(raw) {
        return Some(value);
    }

    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&raw[start..=end]).ok(),
        _ => serde_json::from_str(raw.trim()).ok(),
    }
}

fn scan_balanced_objects(raw: &str) -> Option<Value> {
    let mut first_object = None;
    let mut search_from = 0;

    while let Some(offset) = raw[search_from..].find('{') {
        let start = search_from + offset;
        let Some(len) = balanced_object_len(&raw.as_bytes()[start..]) else {
            search_from = start + 1;
            continue;
        };

        match serde_json::from_str::<Value>(&raw[start..start + len]) {
            Ok(Value::Object(object)) => {
                if has_required_keys(&object) {
                    return Some(Value::Object(object));
                }
                first_object.get_or_insert(Value::Object(object));
                search_from = start + len;
            }
            _ => search_from = start + 1,
        }
    }

    first_object
}

/// Byte length of the object opening at `bytes[0]`, honouring string
/// literals and escapes so braces inside strings are ignored.
fn balanced_object_len(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

fn has_required_keys(object: &Map<String, Value>) -> bool {
    REQUIRED_KEYS.iter().all(|k| object.contains_key(*k))
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Checks the parsed value and converts it into a typed payload.
///
/// Both policies require `tags`, `recommendations` and `card` to be present
/// and non-null. `Shallow` coerces whatever is inside them; `Strict` rejects
/// empty strings, wrong types and an empty recommendation list.
pub fn validate_payload(value: &Value, policy: ValidationPolicy) -> Result<GeneratedPayload, ExtractError> {
    let object = value.as_object().ok_or(ExtractError::NotAnObject)?;

    for key in REQUIRED_KEYS {
        if object.get(key).map_or(true, Value::is_null) {
            return Err(ExtractError::MissingField(key));
        }
    }

    match policy {
        ValidationPolicy::Shallow => Ok(coerce_shallow(object)),
        ValidationPolicy::Strict => validate_strict(object),
    }
}

fn coerce_shallow(object: &Map<String, Value>) -> GeneratedPayload {
    let tags = match &object["tags"] {
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    };

    let recommendations = match &object["recommendations"] {
        Value::Array(items) => items
            .iter()
            .map(|item| GeneratedRecommendation {
                title: lenient_str(item, "title"),
                reason: lenient_str(item, "reason"),
                price_range: lenient_str(item, "priceRange"),
            })
            .collect(),
        _ => Vec::new(),
    };

    let card = match &object["card"] {
        Value::String(message) => GeneratedCard {
            title: String::new(),
            message: message.clone(),
            signature: String::new(),
        },
        card => GeneratedCard {
            title: lenient_str(card, "title"),
            message: lenient_str(card, "message"),
            signature: lenient_str(card, "signature"),
        },
    };

    GeneratedPayload {
        tags,
        recommendations,
        card,
    }
}

fn lenient_str(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn validate_strict(object: &Map<String, Value>) -> Result<GeneratedPayload, ExtractError> {
    let tags = object["tags"]
        .as_array()
        .ok_or_else(|| invalid("tags", "must be an array of strings"))?
        .iter()
        .enumerate()
        .map(|(i, tag)| required_str(Some(tag), || format!("tags[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let items = object["recommendations"]
        .as_array()
        .ok_or_else(|| invalid("recommendations", "must be an array"))?;
    if items.is_empty() {
        return Err(invalid("recommendations", "must contain at least one item"));
    }
    let recommendations = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if !item.is_object() {
                return Err(invalid(format!("recommendations[{i}]"), "must be an object"));
            }
            Ok(GeneratedRecommendation {
                title: required_str(item.get("title"), || format!("recommendations[{i}].title"))?,
                reason: required_str(item.get("reason"), || format!("recommendations[{i}].reason"))?,
                price_range: required_str(item.get("priceRange"), || {
                    format!("recommendations[{i}].priceRange")
                })?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let card = &object["card"];
    if !card.is_object() {
        return Err(invalid("card", "must be an object"));
    }
    let signature = match card.get("signature") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(invalid("card.signature", "must be a string")),
    };
    let card = GeneratedCard {
        title: required_str(card.get("title"), || "card.title".to_string())?,
        message: required_str(card.get("message"), || "card.message".to_string())?,
        signature,
    };

    Ok(GeneratedPayload {
        tags,
        recommendations,
        card,
    })
}

fn required_str(value: Option<&Value>, field: impl FnOnce() -> String) -> Result<String, ExtractError> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(invalid(field(), "must not be empty")),
        None | Some(Value::Null) => Err(invalid(field(), "is missing")),
        Some(_) => Err(invalid(field(), "must be a string")),
    }
}

fn invalid(field: impl Into<String>, reason: &'static str) -> ExtractError {
    ExtractError::InvalidField {
        field: field.into(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"tags":["酷"],"recommendations":[{"title":"A","reason":"B","priceRange":"NT$100"}],"card":{"title":"T","message":"M","signature":"S"}}"#;

    fn strict(raw: &str) -> Result<GeneratedPayload, ExtractError> {
        parse_generated(raw, ValidationPolicy::Strict)
    }

    #[test]
    fn test_exact_payload_round_trips() {
        let payload = GeneratedPayload {
            tags: vec!["文青".to_string(), "咖啡控".to_string()],
            recommendations: vec![GeneratedRecommendation {
                title: "手沖壺".to_string(),
                reason: "他每天早上都自己煮咖啡".to_string(),
                price_range: "NT$900–1200".to_string(),
            }],
            card: GeneratedCard {
                title: "生日快樂".to_string(),
                message: "願你新的一歲每天都有好咖啡。".to_string(),
                signature: "小明".to_string(),
            },
        };
        let raw = serde_json::to_string(&payload).unwrap();
        assert_eq!(strict(&raw).unwrap(), payload);
    }

    #[test]
    fn test_recovered_strings_keep_edge_whitespace() {
        let raw = r#"{"tags":[" 酷 "],"recommendations":[{"title":" A","reason":"B ","priceRange":"NT$100"}],"card":{"title":"T","message":"M\n","signature":" S"}}"#;
        for policy in [ValidationPolicy::Strict, ValidationPolicy::Shallow] {
            let payload = parse_generated(raw, policy).unwrap();
            assert_eq!(payload.tags, vec![" 酷 "]);
            assert_eq!(payload.recommendations[0].title, " A");
            assert_eq!(payload.recommendations[0].reason, "B ");
            assert_eq!(payload.card.message, "M\n");
            assert_eq!(payload.card.signature, " S");
        }
    }

    #[test]
    fn test_recovers_payload_after_prose() {
        let raw = format!("Here you go:\n{VALID}");
        let payload = strict(&raw).unwrap();
        assert_eq!(payload.tags, vec!["酷"]);
        assert_eq!(payload.recommendations.len(), 1);
        assert_eq!(payload.recommendations[0].price_range, "NT$100");
        assert_eq!(payload.card.signature, "S");
    }

    #[test]
    fn test_recovers_payload_inside_code_fence() {
        let raw = format!("Sure! ```json\n{VALID}\n```\nLet me know if you need more.");
        assert_eq!(strict(&raw).unwrap().card.title, "T");
    }

    #[test]
    fn test_braces_inside_strings_do_not_confuse_scanner() {
        let raw = r#"Result: {"tags":["{特別}"],"recommendations":[{"title":"印章 }{","reason":"刻名字 \"{}\"","priceRange":"NT$300"}],"card":{"title":"T","message":"M}"}} trailing }"#;
        let payload = strict(raw).unwrap();
        assert_eq!(payload.tags, vec!["{特別}"]);
        assert_eq!(payload.recommendations[0].title, "印章 }{");
        assert_eq!(payload.recommendations[0].reason, "刻名字 \"{}\"");
        assert_eq!(payload.card.message, "M}");
    }

    #[test]
    fn test_prefers_block_with_required_keys() {
        let raw = format!("Format is {{\"example\": true}} and the answer is {VALID}");
        assert_eq!(strict(&raw).unwrap().tags, vec!["酷"]);
    }

    #[test]
    fn test_no_braces_and_not_json_is_no_payload() {
        assert_eq!(strict("Sorry, I can't help with that."), Err(ExtractError::NoPayload));
        assert_eq!(extract_payload("Sorry, I can't help with that."), None);
    }

    #[test]
    fn test_unbalanced_output_is_no_payload() {
        assert_eq!(strict(r#"{"tags": ["a"], "card": {"#), Err(ExtractError::NoPayload));
        assert_eq!(strict("} reversed {"), Err(ExtractError::NoPayload));
    }

    #[test]
    fn test_whole_text_json_without_object_is_not_an_object() {
        assert_eq!(strict("[1, 2, 3]"), Err(ExtractError::NotAnObject));
    }

    #[test]
    fn test_missing_top_level_keys() {
        for key in REQUIRED_KEYS {
            let mut value: Value = serde_json::from_str(VALID).unwrap();
            value.as_object_mut().unwrap().remove(key);
            assert_eq!(
                validate_payload(&value, ValidationPolicy::Shallow),
                Err(ExtractError::MissingField(key))
            );
            assert_eq!(
                validate_payload(&value, ValidationPolicy::Strict),
                Err(ExtractError::MissingField(key))
            );
        }
    }

    #[test]
    fn test_null_top_level_key_counts_as_missing() {
        let raw = r#"{"tags": null, "recommendations": [], "card": {}}"#;
        assert_eq!(strict(raw), Err(ExtractError::MissingField("tags")));
    }

    #[test]
    fn test_strict_rejects_empty_recommendations() {
        let raw = r#"{"tags":["a"],"recommendations":[],"card":{"title":"T","message":"M"}}"#;
        assert!(matches!(
            strict(raw),
            Err(ExtractError::InvalidField { ref field, .. }) if field == "recommendations"
        ));
    }

    #[test]
    fn test_strict_rejects_blank_item_fields() {
        let raw = r#"{"tags":["a"],"recommendations":[{"title":"A","reason":"  ","priceRange":"NT$1"}],"card":{"title":"T","message":"M"}}"#;
        assert_eq!(
            strict(raw),
            Err(ExtractError::InvalidField {
                field: "recommendations[0].reason".to_string(),
                reason: "must not be empty",
            })
        );
    }

    #[test]
    fn test_strict_rejects_non_string_tag() {
        let raw = r#"{"tags":["a", 3],"recommendations":[{"title":"A","reason":"B","priceRange":"C"}],"card":{"title":"T","message":"M"}}"#;
        assert_eq!(
            strict(raw),
            Err(ExtractError::InvalidField {
                field: "tags[1]".to_string(),
                reason: "must be a string",
            })
        );
    }

    #[test]
    fn test_strict_allows_missing_signature() {
        let raw = r#"{"tags":[],"recommendations":[{"title":"A","reason":"B","priceRange":"C"}],"card":{"title":"T","message":"M"}}"#;
        let payload = strict(raw).unwrap();
        assert_eq!(payload.card.signature, "");
        assert!(payload.tags.is_empty());
    }

    #[test]
    fn test_strict_requires_card_message() {
        let raw = r#"{"tags":["a"],"recommendations":[{"title":"A","reason":"B","priceRange":"C"}],"card":{"title":"T"}}"#;
        assert_eq!(
            strict(raw),
            Err(ExtractError::InvalidField {
                field: "card.message".to_string(),
                reason: "is missing",
            })
        );
    }

    #[test]
    fn test_shallow_accepts_loose_inner_shapes() {
        let raw = r#"{"tags":["a", 3],"recommendations":[{"title":"A"}],"card":"卡片內容"}"#;
        let payload = parse_generated(raw, ValidationPolicy::Shallow).unwrap();
        assert_eq!(payload.tags, vec!["a", "3"]);
        assert_eq!(payload.recommendations[0].title, "A");
        assert_eq!(payload.recommendations[0].reason, "");
        assert_eq!(payload.card.message, "卡片內容");
    }

    #[test]
    fn test_shallow_accepts_empty_recommendations() {
        let raw = r#"{"tags":[],"recommendations":[],"card":{}}"#;
        let payload = parse_generated(raw, ValidationPolicy::Shallow).unwrap();
        assert!(payload.recommendations.is_empty());
        assert_eq!(payload.card.title, "");
    }
}
