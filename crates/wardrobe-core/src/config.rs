//! ============================================================================
//! Wardrobe Configuration
//! ============================================================================
//! Runtime settings read from the environment (the CLI loads `.env` first
//! via dotenvy). Every knob has a default except the API key, which is only
//! required once an AI call is made.
//! ============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::WardrobeError;

/// Gemini REST base URL
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model for classification, trip planning and critique
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Model for try-on image generation
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Client-side ceiling on trip generation
pub const DEFAULT_TRIP_TIMEOUT_SECS: u64 = 30;

/// Bulk upload processes one photo at a time unless configured otherwise
pub const DEFAULT_BATCH_CONCURRENCY: usize = 1;

pub const DEFAULT_TOUR_READY_TIMEOUT_MS: u64 = 3000;

pub const DEFAULT_ONBOARDING_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardrobeConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub trip_timeout_secs: u64,
    pub batch_concurrency: usize,
    pub tour_ready_timeout_ms: u64,
    pub onboarding_delay_ms: u64,
}

impl Default for WardrobeConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            trip_timeout_secs: DEFAULT_TRIP_TIMEOUT_SECS,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            tour_ready_timeout_ms: DEFAULT_TOUR_READY_TIMEOUT_MS,
            onboarding_delay_ms: DEFAULT_ONBOARDING_DELAY_MS,
        }
    }
}

impl WardrobeConfig {
    /// Build from process environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            gemini_api_key: lookup("GEMINI_API_KEY")
                .or_else(|| lookup("API_KEY"))
                .filter(|k| !k.trim().is_empty()),
            gemini_base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            text_model: lookup("WARDROBE_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: lookup("WARDROBE_IMAGE_MODEL").unwrap_or(defaults.image_model),
            trip_timeout_secs: parse_or(
                &lookup,
                "WARDROBE_TRIP_TIMEOUT_SECS",
                defaults.trip_timeout_secs,
            ),
            batch_concurrency: parse_or(
                &lookup,
                "WARDROBE_BATCH_CONCURRENCY",
                defaults.batch_concurrency,
            )
            .max(1),
            tour_ready_timeout_ms: parse_or(
                &lookup,
                "WARDROBE_TOUR_READY_TIMEOUT_MS",
                defaults.tour_ready_timeout_ms,
            ),
            onboarding_delay_ms: parse_or(
                &lookup,
                "WARDROBE_ONBOARDING_DELAY_MS",
                defaults.onboarding_delay_ms,
            ),
        }
    }

    pub fn require_api_key(&self) -> Result<&str, WardrobeError> {
        self.gemini_api_key
            .as_deref()
            .ok_or_else(|| WardrobeError::Config("GEMINI_API_KEY is not set".into()))
    }

    pub fn trip_timeout(&self) -> Duration {
        Duration::from_secs(self.trip_timeout_secs)
    }

    pub fn tour_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.tour_ready_timeout_ms)
    }

    pub fn onboarding_delay(&self) -> Duration {
        Duration::from_millis(self.onboarding_delay_ms)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!("Ignoring invalid {}={:?}, using default", key, raw);
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = WardrobeConfig::from_lookup(lookup_from(&[]));
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.trip_timeout_secs, 30);
        assert_eq!(config.batch_concurrency, 1);
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = WardrobeConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k-123"),
            ("WARDROBE_TRIP_TIMEOUT_SECS", "45"),
            ("WARDROBE_BATCH_CONCURRENCY", "0"),
            ("WARDROBE_TOUR_READY_TIMEOUT_MS", "soon"),
        ]));
        assert_eq!(config.require_api_key().unwrap(), "k-123");
        assert_eq!(config.trip_timeout(), Duration::from_secs(45));
        // Zero concurrency would stall the queue
        assert_eq!(config.batch_concurrency, 1);
        assert_eq!(config.tour_ready_timeout_ms, DEFAULT_TOUR_READY_TIMEOUT_MS);
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config = WardrobeConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")]));
        assert!(config.gemini_api_key.is_none());
    }
}
