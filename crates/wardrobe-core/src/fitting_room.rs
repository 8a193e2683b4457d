//! ============================================================================
//! Fitting Room - virtual try-on
//! ============================================================================
//! Top / bottom / shoe slots, one generation request for the front view, an
//! immediate critique of that image, then side and back views generated on
//! demand and cached.
//!
//! ```text
//! Idle ──generate──► Processing ──► Success ──show_angle──► (per angle)
//!   ▲                     │                         NotGenerated → Generating → Generated
//!   └──────retry──── Error ◄──────── any generation failure
//! ```
//! Angle generation has no deadline: a slow network simply keeps the angle
//! in `Generating`.
//! ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ai::{GarmentImage, StylistBackend, TryOnRequest};
use crate::types::{
    Angle, Category, ClothingItem, ImageData, TryOnResult, UserProfile, WardrobeError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum TryOnStatus {
    Idle,
    Processing,
    Success,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleStatus {
    NotGenerated,
    Generating,
    Generated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitSlot {
    Top,
    Bottom,
    Shoe,
}

impl FitSlot {
    pub const ALL: [FitSlot; 3] = [FitSlot::Top, FitSlot::Bottom, FitSlot::Shoe];

    pub fn for_category(category: Category) -> Option<Self> {
        match category {
            Category::Top | Category::Outerwear => Some(FitSlot::Top),
            Category::Bottom => Some(FitSlot::Bottom),
            Category::Shoes => Some(FitSlot::Shoe),
            Category::Accessory | Category::Other => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FittingRoom {
    slots: HashMap<FitSlot, ClothingItem>,
    status: TryOnStatus,
    result: Option<TryOnResult>,
    angles: HashMap<Angle, AngleStatus>,
    current_angle: Angle,
}

impl FittingRoom {
    /// Open the fitting room. When the user arrives with an item, only that
    /// item is preselected; otherwise each slot gets the first wardrobe item
    /// that fits it.
    pub fn new(wardrobe: &[ClothingItem], arrived_with: Option<&ClothingItem>) -> Self {
        let mut slots = HashMap::new();
        match arrived_with {
            Some(item) => {
                if let Some(slot) = FitSlot::for_category(item.category) {
                    slots.insert(slot, item.clone());
                }
            }
            None => {
                for slot in FitSlot::ALL {
                    if let Some(item) = wardrobe
                        .iter()
                        .find(|i| FitSlot::for_category(i.category) == Some(slot))
                    {
                        slots.insert(slot, item.clone());
                    }
                }
            }
        }

        Self {
            slots,
            status: TryOnStatus::Idle,
            result: None,
            angles: HashMap::new(),
            current_angle: Angle::Front,
        }
    }

    pub fn status(&self) -> &TryOnStatus {
        &self.status
    }

    pub fn result(&self) -> Option<&TryOnResult> {
        self.result.as_ref()
    }

    pub fn current_angle(&self) -> Angle {
        self.current_angle
    }

    pub fn angle_status(&self, angle: Angle) -> AngleStatus {
        self.angles
            .get(&angle)
            .copied()
            .unwrap_or(AngleStatus::NotGenerated)
    }

    pub fn slot(&self, slot: FitSlot) -> Option<&ClothingItem> {
        self.slots.get(&slot)
    }

    /// Select an item into its slot, or deselect it if already selected.
    /// Items without a try-on slot (accessories) are ignored.
    pub fn toggle(&mut self, item: &ClothingItem) {
        let Some(slot) = FitSlot::for_category(item.category) else {
            return;
        };
        if self.slots.get(&slot).map(|i| i.id == item.id).unwrap_or(false) {
            self.slots.remove(&slot);
        } else {
            self.slots.insert(slot, item.clone());
        }
    }

    /// Put `item` into `slot` regardless of its category, for callers that
    /// already know where the garment goes
    pub fn set(&mut self, slot: FitSlot, item: ClothingItem) {
        self.slots.insert(slot, item);
    }

    fn garments(&self) -> Vec<GarmentImage> {
        FitSlot::ALL
            .iter()
            .filter_map(|slot| self.slots.get(slot))
            .map(|item| GarmentImage {
                label: item.describe(),
                image: item.image.clone(),
            })
            .collect()
    }

    fn request(&self, profile: &UserProfile, angle: Angle) -> TryOnRequest {
        TryOnRequest {
            angle,
            face: profile.face_photo.clone(),
            garments: self.garments(),
            profile_summary: profile.style_summary(),
            reference: match angle {
                Angle::Front => None,
                _ => self.result.as_ref().map(|r| r.front.clone()),
            },
        }
    }

    fn fail(&mut self, error: &WardrobeError) {
        warn!("Try-on failed: {}", error);
        self.status = TryOnStatus::Error(error.to_string());
    }

    /// Generate the front view, then critique it
    pub async fn generate(
        &mut self,
        backend: &dyn StylistBackend,
        profile: &UserProfile,
    ) -> Result<&TryOnResult, WardrobeError> {
        if self.slots.is_empty() {
            return Err(WardrobeError::Validation(
                "select at least one garment".into(),
            ));
        }
        if self.status == TryOnStatus::Processing {
            return Err(WardrobeError::Validation(
                "a try-on is already being generated".into(),
            ));
        }

        self.status = TryOnStatus::Processing;
        self.result = None;
        self.angles.clear();
        self.current_angle = Angle::Front;
        self.angles.insert(Angle::Front, AngleStatus::Generating);

        let request = self.request(profile, Angle::Front);
        let front = match backend.generate_try_on(&request).await {
            Ok(image) => image,
            Err(e) => {
                self.angles.remove(&Angle::Front);
                self.fail(&e);
                return Err(e);
            }
        };
        self.angles.insert(Angle::Front, AngleStatus::Generated);

        let mut result = TryOnResult::new(front);
        match backend
            .critique(&result.front, profile.face_photo.as_ref())
            .await
        {
            Ok(verdict) => result.verdict = Some(verdict),
            // The image itself is fine; show it without a verdict
            Err(e) => warn!("Critique unavailable: {}", e),
        }

        info!("Try-on {} ready", result.id);
        self.status = TryOnStatus::Success;
        Ok(&*self.result.insert(result))
    }

    /// Switch to `angle`, generating it first if it has never been generated
    pub async fn show_angle(
        &mut self,
        backend: &dyn StylistBackend,
        profile: &UserProfile,
        angle: Angle,
    ) -> Result<&ImageData, WardrobeError> {
        if self.status != TryOnStatus::Success || self.result.is_none() {
            return Err(WardrobeError::Validation(
                "generate the front view first".into(),
            ));
        }
        self.current_angle = angle;

        let cached = self
            .result
            .as_ref()
            .map(|r| r.image(angle).is_some())
            .unwrap_or(false);

        if !cached {
            if self.angle_status(angle) == AngleStatus::Generating {
                return Err(WardrobeError::Validation(format!(
                    "{} view is already being generated",
                    angle.as_str()
                )));
            }
            self.angles.insert(angle, AngleStatus::Generating);
            let request = self.request(profile, angle);
            match backend.generate_try_on(&request).await {
                Ok(image) => {
                    if let Some(result) = self.result.as_mut() {
                        result.set_image(angle, image);
                    }
                    self.angles.insert(angle, AngleStatus::Generated);
                }
                Err(e) => {
                    self.angles.insert(angle, AngleStatus::NotGenerated);
                    self.fail(&e);
                    return Err(e);
                }
            }
        }

        self.result
            .as_ref()
            .and_then(|r| r.image(angle))
            .ok_or_else(|| WardrobeError::NotFound(format!("{} view", angle.as_str())))
    }

    /// Reset after an error (or to start over)
    pub fn retry(&mut self) {
        self.status = TryOnStatus::Idle;
        self.result = None;
        self.angles.clear();
        self.current_angle = Angle::Front;
    }
}
