//! ============================================================================
//! Application State - the single in-memory state tree
//! ============================================================================
//! Owned by the composition root (the CLI, or whatever front end embeds the
//! core) and handed to views by reference. All mutation goes through
//! [`AppState::dispatch`]; nothing here is global.
//!
//! State is deliberately ephemeral: `AppState::new` always starts empty, so a
//! restart is a full wipe.
//! ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{ClothingItem, Outfit, ScheduleEntry, Trip, UserProfile, WardrobeError};

/// Top-level views of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Onboarding,
    Closet,
    Studio,
    Calendar,
    Trips,
    FittingRoom,
    Profile,
}

impl View {
    /// Views reachable from the main navigation once onboarding is done
    pub const PRIMARY: [View; 6] = [
        View::Closet,
        View::Studio,
        View::Calendar,
        View::Trips,
        View::FittingRoom,
        View::Profile,
    ];
}

/// Every state transition the app performs
#[derive(Debug, Clone)]
pub enum Action {
    AddItem(ClothingItem),
    UpdateItem(ClothingItem),
    DeleteItem(String),
    /// Insert a new outfit or replace the one with the same id
    SaveOutfit(Outfit),
    DeleteOutfit(String),
    /// Assign an outfit to a day, replacing any previous assignment
    Schedule { date: NaiveDate, outfit_id: String },
    Unschedule(NaiveDate),
    AddTrip(Trip),
    UpdateTrip(Trip),
    DeleteTrip(String),
    SetProfile(UserProfile),
    Navigate(View),
    CompleteTour,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    items: Vec<ClothingItem>,
    outfits: Vec<Outfit>,
    schedule: Vec<ScheduleEntry>,
    trips: Vec<Trip>,
    profile: Option<UserProfile>,
    view: View,
    tour_completed: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Fresh, empty state. The only reachable view is onboarding.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            outfits: Vec::new(),
            schedule: Vec::new(),
            trips: Vec::new(),
            profile: None,
            view: View::Onboarding,
            tour_completed: false,
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn items(&self) -> &[ClothingItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&ClothingItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn outfits(&self) -> &[Outfit] {
        &self.outfits
    }

    pub fn outfit(&self, id: &str) -> Option<&Outfit> {
        self.outfits.iter().find(|o| o.id == id)
    }

    pub fn schedule(&self) -> &[ScheduleEntry] {
        &self.schedule
    }

    /// Outfit scheduled for `date`, if any
    pub fn scheduled_outfit(&self, date: NaiveDate) -> Option<&Outfit> {
        self.schedule
            .iter()
            .find(|e| e.date == date)
            .and_then(|e| self.outfit(&e.outfit_id))
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn trip(&self, id: &str) -> Option<&Trip> {
        self.trips.iter().find(|t| t.id == id)
    }

    /// First trip whose date range covers `date`
    pub fn active_trip(&self, date: NaiveDate) -> Option<&Trip> {
        self.trips.iter().find(|t| t.contains(date))
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_onboarded(&self) -> bool {
        self.profile.as_ref().map(|p| p.is_complete()).unwrap_or(false)
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn tour_completed(&self) -> bool {
        self.tour_completed
    }

    // ========================================================================
    // Reducer
    // ========================================================================

    /// Apply one action. On error the state is left exactly as it was.
    pub fn dispatch(&mut self, action: Action) -> Result<(), WardrobeError> {
        if !self.is_onboarded() && !allowed_before_onboarding(&action) {
            return Err(WardrobeError::OnboardingRequired);
        }

        match action {
            Action::AddItem(item) => {
                debug!("Adding item {} ({})", item.id, item.category.as_str());
                self.items.push(item);
            }
            Action::UpdateItem(item) => {
                let slot = self
                    .items
                    .iter_mut()
                    .find(|i| i.id == item.id)
                    .ok_or_else(|| WardrobeError::NotFound(format!("item {}", item.id)))?;
                *slot = item;
            }
            Action::DeleteItem(id) => {
                let before = self.items.len();
                self.items.retain(|i| i.id != id);
                if self.items.len() == before {
                    return Err(WardrobeError::NotFound(format!("item {}", id)));
                }
                debug!("Deleted item {}", id);
            }
            Action::SaveOutfit(outfit) => {
                validate_outfit(&outfit)?;
                match self.outfits.iter_mut().find(|o| o.id == outfit.id) {
                    Some(existing) => *existing = outfit,
                    None => self.outfits.push(outfit),
                }
            }
            Action::DeleteOutfit(id) => {
                let before = self.outfits.len();
                self.outfits.retain(|o| o.id != id);
                if self.outfits.len() == before {
                    return Err(WardrobeError::NotFound(format!("outfit {}", id)));
                }
                // A deleted outfit can no longer be worn on any day
                self.schedule.retain(|e| e.outfit_id != id);
            }
            Action::Schedule { date, outfit_id } => {
                if self.outfit(&outfit_id).is_none() {
                    return Err(WardrobeError::NotFound(format!("outfit {}", outfit_id)));
                }
                self.schedule.retain(|e| e.date != date);
                self.schedule.push(ScheduleEntry { date, outfit_id });
                debug!("Scheduled outfit for {}", date);
            }
            Action::Unschedule(date) => {
                self.schedule.retain(|e| e.date != date);
            }
            Action::AddTrip(trip) => {
                info!("Adding trip {} to {}", trip.id, trip.destination);
                self.trips.push(trip);
            }
            Action::UpdateTrip(trip) => {
                let slot = self
                    .trips
                    .iter_mut()
                    .find(|t| t.id == trip.id)
                    .ok_or_else(|| WardrobeError::NotFound(format!("trip {}", trip.id)))?;
                *slot = trip;
            }
            Action::DeleteTrip(id) => {
                let before = self.trips.len();
                self.trips.retain(|t| t.id != id);
                if self.trips.len() == before {
                    return Err(WardrobeError::NotFound(format!("trip {}", id)));
                }
            }
            Action::SetProfile(profile) => {
                let finishing_onboarding = !self.is_onboarded() && profile.is_complete();
                self.profile = Some(profile);
                if finishing_onboarding {
                    info!("Onboarding complete");
                    self.view = View::Closet;
                } else if !self.is_onboarded() {
                    self.view = View::Onboarding;
                }
            }
            Action::Navigate(view) => {
                if view == View::Onboarding && self.is_onboarded() {
                    return Err(WardrobeError::Validation(
                        "onboarding has already been completed".into(),
                    ));
                }
                self.view = view;
            }
            Action::CompleteTour => {
                self.tour_completed = true;
            }
        }
        Ok(())
    }
}

/// Before a complete profile exists, only the onboarding flow itself may
/// touch the state.
fn allowed_before_onboarding(action: &Action) -> bool {
    matches!(
        action,
        Action::SetProfile(_) | Action::Navigate(View::Onboarding)
    )
}

fn validate_outfit(outfit: &Outfit) -> Result<(), WardrobeError> {
    if outfit.name.trim().is_empty() {
        return Err(WardrobeError::Validation("outfit name is required".into()));
    }
    if outfit.items.is_empty() {
        return Err(WardrobeError::Validation(
            "an outfit needs at least one item".into(),
        ));
    }
    Ok(())
}
