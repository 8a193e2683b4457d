//! ============================================================================
//! Core Types for the Wardrobe
//! ============================================================================
//! Flat records held in the in-memory application state. Records are
//! replaced wholesale on update, never patched in place behind a reference.
//! Wire-facing records (AI analysis, trip plans, critic verdicts) use
//! camelCase field names to match the structured responses of the AI service.
//! ============================================================================

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Images
// ============================================================================

/// An encoded image (JPEG, PNG, ...) with its mime type.
/// Serialized as base64 so records can round-trip through JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Transport encoding used by the AI service
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn from_base64(mime_type: impl Into<String>, data: &str) -> Result<Self, WardrobeError> {
        let bytes = STANDARD
            .decode(data)
            .map_err(|e| WardrobeError::Ai(format!("Failed to decode base64 image: {}", e)))?;
        Ok(Self::new(mime_type, bytes))
    }

    /// File extension matching the mime type, for saving to disk
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/heic" => "heic",
            _ => "jpg",
        }
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Clothing
// ============================================================================

/// Top-level garment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Top,
    Bottom,
    Outerwear,
    Shoes,
    Accessory,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Top,
        Category::Bottom,
        Category::Outerwear,
        Category::Shoes,
        Category::Accessory,
        Category::Other,
    ];

    /// Lenient parse of a category label returned by the classifier.
    /// Anything unrecognised lands in `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "top" | "tops" | "shirt" | "t-shirt" | "blouse" | "sweater" => Category::Top,
            "bottom" | "bottoms" | "pants" | "trousers" | "skirt" | "shorts" | "jeans" => {
                Category::Bottom
            }
            "outerwear" | "jacket" | "coat" => Category::Outerwear,
            "shoes" | "shoe" | "footwear" | "sneakers" | "boots" => Category::Shoes,
            "accessory" | "accessories" | "bag" | "jewelry" | "hat" => Category::Accessory,
            _ => Category::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "Top",
            Category::Bottom => "Bottom",
            Category::Outerwear => "Outerwear",
            Category::Shoes => "Shoes",
            Category::Accessory => "Accessory",
            Category::Other => "Other",
        }
    }
}

/// Season an item is best suited for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
    AllSeason,
    Unknown,
}

impl Season {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "spring" => Season::Spring,
            "summer" => Season::Summer,
            "fall" | "autumn" => Season::Fall,
            "winter" => Season::Winter,
            "all" | "all season" | "all-season" | "allseason" | "all seasons" => Season::AllSeason,
            _ => Season::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
            Season::AllSeason => "All Season",
            Season::Unknown => "Unknown",
        }
    }
}

/// A cataloged garment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: String,
    pub image: ImageData,
    pub category: Category,
    pub sub_category: String,
    pub primary_color: String,
    pub season: Season,
    pub tags: Vec<String>,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}

impl ClothingItem {
    /// Build an item from a classifier result
    pub fn from_analysis(image: ImageData, analysis: ItemAnalysis) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            image,
            category: Category::parse(&analysis.category),
            sub_category: analysis.sub_category,
            primary_color: analysis.primary_color,
            season: Season::parse(&analysis.season),
            tags: analysis.style_tags,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Short human description, used when condensing the wardrobe for prompts
    pub fn describe(&self) -> String {
        format!("{} {}", self.primary_color, self.sub_category)
            .trim()
            .to_string()
    }
}

/// Structured result of the clothing classifier.
/// All fields are required on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAnalysis {
    pub category: String,
    pub sub_category: String,
    pub primary_color: String,
    pub season: String,
    pub style_tags: Vec<String>,
}

impl Default for ItemAnalysis {
    /// Fallback used when classification fails, so the item can still be
    /// saved and edited manually.
    fn default() -> Self {
        Self {
            category: "Other".to_string(),
            sub_category: "Unknown".to_string(),
            primary_color: "Unknown".to_string(),
            season: "Unknown".to_string(),
            style_tags: Vec::new(),
        }
    }
}

// ============================================================================
// Outfits & Schedule
// ============================================================================

/// A saved look. Items are point-in-time copies, not references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: String,
    pub name: String,
    pub items: Vec<ClothingItem>,
    pub created_at: i64,
}

/// One outfit assigned to one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub outfit_id: String,
}

// ============================================================================
// Trips
// ============================================================================

/// Packing strategy flags chosen in the trip wizard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripPreferences {
    /// Only use items already in the wardrobe (prompt hint, not enforced by the AI)
    pub strict_closet_only: bool,
    /// Allow the same item on several days
    pub allow_repeats: bool,
}

/// Item references chosen for one day of a trip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoe_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outerwear_id: Option<String>,
    #[serde(default)]
    pub notes: String,
}

impl LookSlots {
    /// All referenced item ids, in slot order
    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        [
            &self.top_id,
            &self.bottom_id,
            &self.shoe_id,
            &self.outerwear_id,
        ]
        .into_iter()
        .filter_map(|id| id.as_deref())
    }
}

/// One day of a trip lookbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLook {
    pub day: u32,
    pub date: String,
    pub event_description: String,
    pub weather_forecast: String,
    pub outfit: LookSlots,
}

/// Which packing list a line item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackingCategory {
    Clothes,
    Toiletries,
    Misc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackingList {
    #[serde(default)]
    pub clothes: Vec<String>,
    #[serde(default)]
    pub toiletries: Vec<String>,
    #[serde(default)]
    pub misc: Vec<String>,
}

impl PackingList {
    pub fn list(&self, category: PackingCategory) -> &Vec<String> {
        match category {
            PackingCategory::Clothes => &self.clothes,
            PackingCategory::Toiletries => &self.toiletries,
            PackingCategory::Misc => &self.misc,
        }
    }

    pub fn list_mut(&mut self, category: PackingCategory) -> &mut Vec<String> {
        match category {
            PackingCategory::Clothes => &mut self.clothes,
            PackingCategory::Toiletries => &mut self.toiletries,
            PackingCategory::Misc => &mut self.misc,
        }
    }

    pub fn len(&self) -> usize {
        self.clothes.len() + self.toiletries.len() + self.misc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Structured trip plan returned by the AI service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    pub weather_summary: String,
    pub daily_plan: Vec<DailyLook>,
    pub packing_list: PackingList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub event_description: String,
    pub preferences: TripPreferences,
    pub weather_summary: String,
    pub daily_plan: Vec<DailyLook>,
    pub packing_list: PackingList,
    pub created_at: i64,
}

impl Trip {
    /// Whether `date` falls inside the trip (inclusive on both ends)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Number of calendar days covered
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
}

impl Gender {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "female" | "f" | "woman" => Some(Gender::Female),
            "male" | "m" | "man" => Some(Gender::Male),
            "non-binary" | "nonbinary" | "non_binary" | "nb" => Some(Gender::NonBinary),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::NonBinary => "non-binary",
        }
    }
}

/// The singleton user profile produced by onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub gender: Gender,
    pub height_cm: u32,
    pub weight_kg: u32,
    pub body_shape: String,
    pub skin_tone: String,
    pub style_tags: Vec<String>,
    /// Whether the profile may be shared with the AI for personalised plans
    pub personalization_opt_in: bool,
    pub face_photo: Option<ImageData>,
    pub onboarding_complete: bool,
}

impl UserProfile {
    /// A profile only unlocks the app once onboarding has finished
    pub fn is_complete(&self) -> bool {
        self.onboarding_complete && !self.name.trim().is_empty()
    }

    /// Text profile attached to AI prompts (biometrics + style)
    pub fn style_summary(&self) -> String {
        let styles = if self.style_tags.is_empty() {
            "no stated preference".to_string()
        } else {
            self.style_tags.join(", ")
        };
        format!(
            "{} person, {} cm, {} kg, {} body shape, {} skin tone. Style: {}.",
            self.gender.as_str(),
            self.height_cm,
            self.weight_kg,
            self.body_shape,
            self.skin_tone,
            styles
        )
    }
}

// ============================================================================
// Try-On
// ============================================================================

/// Camera angle of a generated try-on image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Angle {
    Front,
    Side,
    Back,
}

impl Angle {
    pub const ALL: [Angle; 3] = [Angle::Front, Angle::Side, Angle::Back];

    pub fn as_str(&self) -> &'static str {
        match self {
            Angle::Front => "front",
            Angle::Side => "side",
            Angle::Back => "back",
        }
    }
}

/// AI critique of a generated try-on image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticVerdict {
    /// 0-100
    pub identity_match_score: f32,
    /// 0-100
    pub realism_score: f32,
    pub style_advice: String,
    pub color_analysis: String,
}

impl CriticVerdict {
    /// Clamp scores into 0..=100; models occasionally drift outside it
    pub fn normalized(mut self) -> Self {
        self.identity_match_score = self.identity_match_score.clamp(0.0, 100.0);
        self.realism_score = self.realism_score.clamp(0.0, 100.0);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryOnResult {
    pub id: String,
    pub front: ImageData,
    pub side: Option<ImageData>,
    pub back: Option<ImageData>,
    pub verdict: Option<CriticVerdict>,
}

impl TryOnResult {
    pub fn new(front: ImageData) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            front,
            side: None,
            back: None,
            verdict: None,
        }
    }

    pub fn image(&self, angle: Angle) -> Option<&ImageData> {
        match angle {
            Angle::Front => Some(&self.front),
            Angle::Side => self.side.as_ref(),
            Angle::Back => self.back.as_ref(),
        }
    }

    pub fn set_image(&mut self, angle: Angle, image: ImageData) {
        match angle {
            Angle::Front => self.front = image,
            Angle::Side => self.side = Some(image),
            Angle::Back => self.back = Some(image),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error types for wardrobe operations.
/// No variant is fatal: each is scoped to the operation that raised it and
/// leaves existing state untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WardrobeError {
    /// Network, parse or empty-response failure from the AI service
    #[error("AI service error: {0}")]
    Ai(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Onboarding must be completed first")]
    OnboardingRequired,

    #[error("Configuration error: {0}")]
    Config(String),
}
