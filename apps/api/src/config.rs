use anyhow::{bail, Context, Result};

/// What the normalizer does when a request carries no budget at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetPolicy {
    /// Missing budget is a validation error.
    Require,
    /// Missing budget is replaced with this amount (TWD).
    DefaultTo(u32),
}

/// How deeply generator output is checked after it parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Only `tags`, `recommendations` and `card` must be present.
    Shallow,
    /// Field-level checks on every tag, recommendation and the card.
    Strict,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent key only disables the generator-backed endpoint.
    pub anthropic_api_key: Option<String>,
    pub budget_policy: BudgetPolicy,
    pub validation_policy: ValidationPolicy,
    pub fallback_to_heuristic: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            budget_policy: match optional_env("BUDGET_DEFAULT") {
                Some(raw) => BudgetPolicy::DefaultTo(
                    raw.parse::<u32>()
                        .context("BUDGET_DEFAULT must be a non-negative integer")?,
                ),
                None => BudgetPolicy::Require,
            },
            validation_policy: parse_validation_policy(optional_env("LLM_VALIDATION").as_deref())?,
            fallback_to_heuristic: parse_flag(
                "LLM_FALLBACK_TO_HEURISTIC",
                optional_env("LLM_FALLBACK_TO_HEURISTIC").as_deref(),
            )?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads a variable, treating blank values the same as unset ones.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_validation_policy(raw: Option<&str>) -> Result<ValidationPolicy> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        None | Some("strict") => Ok(ValidationPolicy::Strict),
        Some("shallow") => Ok(ValidationPolicy::Shallow),
        Some(other) => bail!("LLM_VALIDATION must be 'strict' or 'shallow', got '{other}'"),
    }
}

fn parse_flag(key: &str, raw: Option<&str>) -> Result<bool> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        None | Some("false") | Some("0") | Some("no") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some(other) => bail!("{key} must be true or false, got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_policy_defaults_to_strict() {
        assert_eq!(parse_validation_policy(None).unwrap(), ValidationPolicy::Strict);
        assert_eq!(
            parse_validation_policy(Some("SHALLOW")).unwrap(),
            ValidationPolicy::Shallow
        );
        assert!(parse_validation_policy(Some("lenient")).is_err());
    }

    #[test]
    fn test_flag_parsing() {
        assert!(!parse_flag("X", None).unwrap());
        assert!(parse_flag("X", Some("true")).unwrap());
        assert!(parse_flag("X", Some("1")).unwrap());
        assert!(!parse_flag("X", Some("no")).unwrap());
        let err = parse_flag("X", Some("maybe")).unwrap_err();
        assert!(err.to_string().contains("X must be true or false"));
    }
}
