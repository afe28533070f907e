//! Share codec: carries a bundle through a URL query parameter.
//!
//! Encoding is JSON → UTF-8 → URL-safe base64 without padding. Decoding also
//! accepts the standard alphabet, padding, and `+` mangled into a space by
//! form decoding. Anything undecodable is "no result", never an error.

use base64::{
    engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD},
    Engine as _,
};
use thiserror::Error;
use tracing::debug;

use crate::models::recommendation::RecommendationBundle;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("failed to serialize bundle: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub fn encode_bundle(bundle: &RecommendationBundle) -> Result<String, ShareError> {
    let json = serde_json::to_vec(bundle)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_bundle(data: &str) -> Option<RecommendationBundle> {
    let normalized: String = data
        .trim()
        .chars()
        .filter(|c| *c != '=')
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            ' ' => '+',
            other => other,
        })
        .collect();
    if normalized.is_empty() {
        return None;
    }

    let bytes = STANDARD_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| debug!("Share data is not base64: {e}"))
        .ok()?;
    let text = String::from_utf8(bytes)
        .map_err(|e| debug!("Share data is not UTF-8: {e}"))
        .ok()?;
    serde_json::from_str(&text)
        .map_err(|e| debug!("Share data is not a bundle: {e}"))
        .ok()
}
