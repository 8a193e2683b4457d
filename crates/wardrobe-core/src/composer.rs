//! ============================================================================
//! Outfit Composer (the "studio")
//! ============================================================================
//! Four category slots filled from the wardrobe. Saving snapshots the slotted
//! items into an Outfit. In planning mode the composer is bound to a
//! calendar date and saving also schedules the outfit and returns to the
//! calendar.
//! ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::state::{Action, AppState, View};
use crate::types::{Category, ClothingItem, Outfit, WardrobeError};

/// Composer slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    TopOuterwear,
    Bottom,
    Shoe,
    AccessoryOther,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::TopOuterwear, Slot::Bottom, Slot::Shoe, Slot::AccessoryOther];

    /// Slot an item of `category` naturally belongs to
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Top | Category::Outerwear => Slot::TopOuterwear,
            Category::Bottom => Slot::Bottom,
            Category::Shoes => Slot::Shoe,
            Category::Accessory | Category::Other => Slot::AccessoryOther,
        }
    }

    fn index(&self) -> usize {
        match self {
            Slot::TopOuterwear => 0,
            Slot::Bottom => 1,
            Slot::Shoe => 2,
            Slot::AccessoryOther => 3,
        }
    }
}

/// Identity of the outfit being edited, preserved on save
#[derive(Debug, Clone)]
struct Editing {
    id: String,
    created_at: i64,
}

#[derive(Debug, Clone)]
pub struct OutfitComposer {
    slots: [Option<ClothingItem>; 4],
    active: Slot,
    editing: Option<Editing>,
    planning_date: Option<NaiveDate>,
}

impl Default for OutfitComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutfitComposer {
    /// Empty composer creating a new outfit
    pub fn new() -> Self {
        Self {
            slots: Default::default(),
            active: Slot::TopOuterwear,
            editing: None,
            planning_date: None,
        }
    }

    /// Planning mode: saving also schedules the outfit on `date`
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            planning_date: Some(date),
            ..Self::new()
        }
    }

    /// Edit an existing outfit; its items are placed back into their slots
    pub fn edit(outfit: &Outfit) -> Self {
        let mut composer = Self::new();
        for item in &outfit.items {
            let slot = Slot::for_category(item.category);
            composer.slots[slot.index()] = Some(item.clone());
        }
        composer.editing = Some(Editing {
            id: outfit.id.clone(),
            created_at: outfit.created_at,
        });
        composer
    }

    pub fn planning_date(&self) -> Option<NaiveDate> {
        self.planning_date
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn active_slot(&self) -> Slot {
        self.active
    }

    pub fn set_active(&mut self, slot: Slot) {
        self.active = slot;
    }

    pub fn slot(&self, slot: Slot) -> Option<&ClothingItem> {
        self.slots[slot.index()].as_ref()
    }

    /// Put `item` into the active slot
    pub fn select(&mut self, item: &ClothingItem) {
        self.slots[self.active.index()] = Some(item.clone());
    }

    /// Put `item` into the active slot, or clear the slot if `item` is
    /// already there
    pub fn toggle(&mut self, item: &ClothingItem) {
        let slot = &mut self.slots[self.active.index()];
        if slot.as_ref().map(|i| i.id == item.id).unwrap_or(false) {
            *slot = None;
        } else {
            *slot = Some(item.clone());
        }
    }

    pub fn clear(&mut self, slot: Slot) {
        self.slots[slot.index()] = None;
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether the save action should be enabled
    pub fn can_save(&self, name: &str) -> bool {
        self.filled_count() > 0 && !name.trim().is_empty()
    }

    /// Snapshot the slots into an Outfit and commit it. In planning mode the
    /// outfit is also scheduled and the view returns to the calendar.
    pub fn save(&self, name: &str, state: &mut AppState) -> Result<Outfit, WardrobeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WardrobeError::Validation("outfit name is required".into()));
        }
        if self.filled_count() == 0 {
            return Err(WardrobeError::Validation(
                "select at least one item".into(),
            ));
        }

        let (id, created_at) = match &self.editing {
            Some(editing) => (editing.id.clone(), editing.created_at),
            None => (Uuid::new_v4().to_string(), chrono::Utc::now().timestamp()),
        };

        let outfit = Outfit {
            id,
            name: name.to_string(),
            items: self.slots.iter().flatten().cloned().collect(),
            created_at,
        };

        state.dispatch(Action::SaveOutfit(outfit.clone()))?;
        info!("Saved outfit '{}' ({} items)", outfit.name, outfit.items.len());

        if let Some(date) = self.planning_date {
            state.dispatch(Action::Schedule {
                date,
                outfit_id: outfit.id.clone(),
            })?;
            state.dispatch(Action::Navigate(View::Calendar))?;
        }

        Ok(outfit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::{date, item, onboarded};

    #[test]
    fn test_empty_name_rejected() {
        let mut state = onboarded();
        let mut composer = OutfitComposer::new();
        composer.select(&item("Top", 1));
        assert!(!composer.can_save("   "));
        assert!(matches!(
            composer.save("", &mut state),
            Err(WardrobeError::Validation(_))
        ));
        assert!(state.outfits().is_empty());
    }

    #[test]
    fn test_no_items_rejected() {
        let mut state = onboarded();
        let composer = OutfitComposer::new();
        assert!(!composer.can_save("Monday"));
        assert!(composer.save("Monday", &mut state).is_err());
    }

    #[test]
    fn test_edit_preserves_id_and_created_at() {
        let mut state = onboarded();
        let mut composer = OutfitComposer::new();
        composer.select(&item("Top", 1));
        composer.set_active(Slot::Bottom);
        composer.select(&item("Bottom", 2));
        let first = composer.save("Office", &mut state).unwrap();

        let mut editor = OutfitComposer::edit(&first);
        assert!(editor.is_editing());
        assert!(editor.slot(Slot::Bottom).is_some());
        editor.clear(Slot::Bottom);
        editor.set_active(Slot::Shoe);
        editor.select(&item("Shoes", 3));
        let second = editor.save("Office v2", &mut state).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(state.outfits().len(), 1);
        assert_eq!(state.outfit(&first.id).unwrap().name, "Office v2");
        assert_eq!(state.outfit(&first.id).unwrap().items.len(), 2);
    }

    #[test]
    fn test_toggle_clears_same_item() {
        let mut composer = OutfitComposer::new();
        let shirt = item("Top", 1);
        let other = item("Top", 2);
        composer.toggle(&shirt);
        assert_eq!(composer.slot(Slot::TopOuterwear).unwrap().id, shirt.id);
        composer.toggle(&other);
        assert_eq!(composer.slot(Slot::TopOuterwear).unwrap().id, other.id);
        composer.toggle(&other);
        assert!(composer.slot(Slot::TopOuterwear).is_none());
    }

    #[test]
    fn test_planning_mode_schedules_and_returns_to_calendar() {
        let mut state = onboarded();
        let day = date(2026, 12, 24);
        let mut composer = OutfitComposer::for_date(day);
        composer.select(&item("Outerwear", 4));
        let outfit = composer.save("Eve", &mut state).unwrap();

        assert_eq!(state.scheduled_outfit(day).unwrap().id, outfit.id);
        assert_eq!(state.view(), View::Calendar);
    }

    #[test]
    fn test_slot_mapping() {
        assert_eq!(Slot::for_category(Category::Outerwear), Slot::TopOuterwear);
        assert_eq!(Slot::for_category(Category::Other), Slot::AccessoryOther);
        assert_eq!(Slot::for_category(Category::Shoes), Slot::Shoe);
    }
}
