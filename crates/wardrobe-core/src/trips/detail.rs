//! Trip detail: buffered packing-list editing.
//!
//! Edits land in a local copy of the packing list and only reach the trip
//! record on [`PackingListEditor::save`]. The AI lookbook is never touched.

use tracing::debug;

use crate::state::{Action, AppState};
use crate::types::{PackingCategory, PackingList, Trip, WardrobeError};

#[derive(Debug, Clone)]
pub struct PackingListEditor {
    trip_id: String,
    original: PackingList,
    buffer: PackingList,
}

impl PackingListEditor {
    pub fn open(trip: &Trip) -> Self {
        Self {
            trip_id: trip.id.clone(),
            original: trip.packing_list.clone(),
            buffer: trip.packing_list.clone(),
        }
    }

    pub fn trip_id(&self) -> &str {
        &self.trip_id
    }

    pub fn list(&self) -> &PackingList {
        &self.buffer
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer != self.original
    }

    /// Append a free-text line. Blank lines are ignored.
    pub fn add(&mut self, category: PackingCategory, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.buffer.list_mut(category).push(text.to_string());
        true
    }

    pub fn remove(&mut self, category: PackingCategory, index: usize) -> Option<String> {
        let list = self.buffer.list_mut(category);
        if index < list.len() {
            Some(list.remove(index))
        } else {
            None
        }
    }

    /// Throw away unsaved edits
    pub fn discard(&mut self) {
        self.buffer = self.original.clone();
    }

    /// Commit the buffered list to the trip record
    pub fn save(&mut self, state: &mut AppState) -> Result<(), WardrobeError> {
        let mut trip = state
            .trip(&self.trip_id)
            .cloned()
            .ok_or_else(|| WardrobeError::NotFound(format!("trip {}", self.trip_id)))?;
        trip.packing_list = self.buffer.clone();
        state.dispatch(Action::UpdateTrip(trip))?;
        self.original = self.buffer.clone();
        debug!("Saved packing list for trip {}", self.trip_id);
        Ok(())
    }
}
