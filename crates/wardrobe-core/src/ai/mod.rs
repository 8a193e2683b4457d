//! ============================================================================
//! AI Module - Boundary to the generative AI service
//! ============================================================================
//! The wardrobe delegates three jobs to an external model:
//! - Clothing classification: one image in, structured tags out
//! - Trip planning: trip metadata + condensed inventory in, lookbook out
//! - Try-on: image generation from face + garments, then a critique pass
//!
//! Everything above this module talks to [`StylistBackend`]; the production
//! implementation is [`GeminiStylist`].
//! ============================================================================

mod gemini;
pub mod prompts;

#[cfg(test)]
pub(crate) mod fake;

pub use gemini::GeminiStylist;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{
    Angle, CriticVerdict, ImageData, ItemAnalysis, TripPlan, TripPreferences, WardrobeError,
};

/// Condensed wardrobe entry sent to the trip planner (never the image)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub id: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
}

/// Everything the trip planner needs in one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlanRequest {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub event_description: String,
    pub preferences: TripPreferences,
    pub inventory: Vec<InventoryEntry>,
    /// Only present when the user opted into personalisation
    pub profile_summary: Option<String>,
}

/// One garment passed to try-on generation
#[derive(Debug, Clone)]
pub struct GarmentImage {
    pub label: String,
    pub image: ImageData,
}

/// Try-on image generation request
#[derive(Debug, Clone)]
pub struct TryOnRequest {
    pub angle: Angle,
    pub face: Option<ImageData>,
    pub garments: Vec<GarmentImage>,
    pub profile_summary: String,
    /// Previously generated front view, used to keep side/back consistent
    pub reference: Option<ImageData>,
}

/// The generative AI collaborator.
/// Implementations must return an error (never a half-filled value) when the
/// service responds with missing or malformed data; callers decide whether to
/// degrade to defaults.
#[async_trait]
pub trait StylistBackend: Send + Sync {
    async fn classify_item(&self, image: &ImageData) -> Result<ItemAnalysis, WardrobeError>;

    async fn plan_trip(&self, request: &TripPlanRequest) -> Result<TripPlan, WardrobeError>;

    async fn generate_try_on(&self, request: &TryOnRequest) -> Result<ImageData, WardrobeError>;

    async fn critique(
        &self,
        image: &ImageData,
        face: Option<&ImageData>,
    ) -> Result<CriticVerdict, WardrobeError>;
}
