//! ============================================================================
//! Trip Planner - three-step wizard and AI lookbook generation
//! ============================================================================
//! Logistics -> Event -> Strategy, then one AI request guarded by a
//! cancellable deadline. A failed, cancelled or timed-out request never
//! creates a Trip.
//! ============================================================================

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::{InventoryEntry, StylistBackend, TripPlanRequest};
use crate::ops::CancellableOp;
use crate::state::{Action, AppState};
use crate::types::{ClothingItem, Trip, TripPreferences, UserProfile, WardrobeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Logistics,
    Event,
    Strategy,
}

/// Fields collected by the wizard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripDraft {
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub event_description: String,
    pub preferences: TripPreferences,
}

impl TripDraft {
    fn logistics_complete(&self) -> bool {
        self.validated_dates().is_ok()
    }

    /// Start and end date once destination and range are valid
    pub fn validated_dates(&self) -> Result<(NaiveDate, NaiveDate), WardrobeError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if !self.destination.trim().is_empty() && start <= end => {
                Ok((start, end))
            }
            _ => Err(WardrobeError::Validation(
                "destination and a valid date range are required".into(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TripPlanner {
    step: WizardStep,
    pub draft: TripDraft,
}

impl Default for TripPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl TripPlanner {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Logistics,
            draft: TripDraft::default(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Whether the "next" button is enabled on the current step
    pub fn can_advance(&self) -> bool {
        match self.step {
            WizardStep::Logistics => self.draft.logistics_complete(),
            // Event notes are optional
            WizardStep::Event => true,
            WizardStep::Strategy => false,
        }
    }

    pub fn next(&mut self) -> Result<WizardStep, WardrobeError> {
        if !self.can_advance() {
            return Err(WardrobeError::Validation(match self.step {
                WizardStep::Logistics => "destination and a valid date range are required".into(),
                _ => "already at the last step".into(),
            }));
        }
        self.step = match self.step {
            WizardStep::Logistics => WizardStep::Event,
            WizardStep::Event | WizardStep::Strategy => WizardStep::Strategy,
        };
        Ok(self.step)
    }

    pub fn back(&mut self) -> WizardStep {
        self.step = match self.step {
            WizardStep::Logistics | WizardStep::Event => WizardStep::Logistics,
            WizardStep::Strategy => WizardStep::Event,
        };
        self.step
    }

    /// Whether "generate" is enabled
    pub fn can_generate(&self) -> bool {
        self.step == WizardStep::Strategy && self.draft.logistics_complete()
    }
}

/// Strip the wardrobe down to what the planner needs: no images
pub fn condense_inventory(items: &[ClothingItem]) -> Vec<InventoryEntry> {
    items
        .iter()
        .map(|item| InventoryEntry {
            id: item.id.clone(),
            description: item.describe(),
            category: item.category.as_str().to_string(),
            tags: item.tags.clone(),
        })
        .collect()
}

/// Build the AI request from a finished draft
pub fn build_request(
    draft: &TripDraft,
    items: &[ClothingItem],
    profile: Option<&UserProfile>,
) -> Result<TripPlanRequest, WardrobeError> {
    let (start, end) = draft.validated_dates()?;

    Ok(TripPlanRequest {
        destination: draft.destination.trim().to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
        event_description: draft.event_description.trim().to_string(),
        preferences: draft.preferences,
        inventory: condense_inventory(items),
        profile_summary: profile
            .filter(|p| p.personalization_opt_in)
            .map(|p| p.style_summary()),
    })
}

/// Day references that do not point at a wardrobe item.
/// Strict-closet-only is only a hint to the model, so this is how the app
/// finds out whether it was honoured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanAudit {
    /// (day number, unknown item id)
    pub unknown_references: Vec<(u32, String)>,
}

impl PlanAudit {
    pub fn is_clean(&self) -> bool {
        self.unknown_references.is_empty()
    }
}

pub fn audit_plan(trip: &Trip, items: &[ClothingItem]) -> PlanAudit {
    let known: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
    let known = &known;
    let unknown_references = trip
        .daily_plan
        .iter()
        .flat_map(|day| {
            day.outfit
                .item_ids()
                .filter(move |id| !known.contains(id))
                .map(move |id| (day.day, id.to_string()))
        })
        .collect();
    PlanAudit { unknown_references }
}

/// Run the trip request under `op`'s deadline. On success the trip is
/// committed to state; on any failure state is untouched.
pub async fn generate_trip(
    backend: &dyn StylistBackend,
    state: &mut AppState,
    draft: &TripDraft,
    op: &CancellableOp,
) -> Result<(Trip, PlanAudit), WardrobeError> {
    let (start_date, end_date) = draft.validated_dates()?;
    let request = build_request(draft, state.items(), state.profile())?;
    info!(
        "Generating lookbook for {} ({} to {})",
        request.destination, request.start_date, request.end_date
    );

    let plan = op.run(backend.plan_trip(&request)).await?;

    let trip = Trip {
        id: Uuid::new_v4().to_string(),
        destination: request.destination,
        start_date,
        end_date,
        event_description: request.event_description,
        preferences: request.preferences,
        weather_summary: plan.weather_summary,
        daily_plan: plan.daily_plan,
        packing_list: plan.packing_list,
        created_at: chrono::Utc::now().timestamp(),
    };

    let audit = audit_plan(&trip, state.items());
    if !audit.is_clean() {
        warn!(
            "Lookbook references {} item(s) not in the wardrobe",
            audit.unknown_references.len()
        );
    }

    state.dispatch(Action::AddTrip(trip.clone()))?;
    Ok((trip, audit))
}
