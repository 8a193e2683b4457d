//! ============================================================================
//! Calendar / Scheduler
//! ============================================================================
//! Week and month grids over the schedule and trips. A day resolves to at most
//! one outfit (by date) and at most one trip (by range). In month view a trip
//! takes precedence over an individually scheduled outfit.
//! ============================================================================

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::composer::OutfitComposer;
use crate::state::{Action, AppState, View};
use crate::types::{Outfit, Trip, WardrobeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarMode {
    Week,
    Month,
}

/// One rendered day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    /// False for leading/trailing days that pad a month grid to whole weeks
    pub in_range: bool,
    pub is_today: bool,
    pub outfit_id: Option<String>,
    pub trip_id: Option<String>,
}

/// What a day cell shows as its main content
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DayContent<'a> {
    Empty,
    Outfit(&'a Outfit),
    Trip(&'a Trip),
}

impl DayCell {
    /// Resolve the headline content for the given mode
    pub fn content<'a>(&self, state: &'a AppState, mode: CalendarMode) -> DayContent<'a> {
        let outfit = self.outfit_id.as_deref().and_then(|id| state.outfit(id));
        let trip = self.trip_id.as_deref().and_then(|id| state.trip(id));
        match (mode, outfit, trip) {
            (CalendarMode::Month, _, Some(trip)) => DayContent::Trip(trip),
            (_, Some(outfit), _) => DayContent::Outfit(outfit),
            (_, None, Some(trip)) => DayContent::Trip(trip),
            _ => DayContent::Empty,
        }
    }
}

fn cell(state: &AppState, date: NaiveDate, today: NaiveDate, in_range: bool) -> DayCell {
    DayCell {
        date,
        in_range,
        is_today: date == today,
        outfit_id: state.scheduled_outfit(date).map(|o| o.id.clone()),
        trip_id: state.active_trip(date).map(|t| t.id.clone()),
    }
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Seven days, Monday first, containing `anchor`
pub fn week_grid(state: &AppState, anchor: NaiveDate, today: NaiveDate) -> Vec<DayCell> {
    let start = monday_of(anchor);
    (0..7)
        .map(|offset| cell(state, start + Duration::days(offset), today, true))
        .collect()
}

/// Whole weeks (Monday first) covering the given month
pub fn month_grid(
    state: &AppState,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<Vec<DayCell>, WardrobeError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| WardrobeError::Validation(format!("invalid month {}-{}", year, month)))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| WardrobeError::Validation(format!("invalid month {}-{}", year, month)))?;
    let last = next_month - Duration::days(1);

    let start = monday_of(first);
    let end = last + Duration::days(6 - last.weekday().num_days_from_monday() as i64);
    debug_assert_eq!(end.weekday(), Weekday::Sun);

    let mut cells = Vec::with_capacity(42);
    let mut date = start;
    while date <= end {
        cells.push(cell(state, date, today, date.month() == month));
        date += Duration::days(1);
    }
    Ok(cells)
}

/// Choice made in the day chooser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayChoice {
    /// Schedule an existing outfit
    Assign(String),
    /// Open the composer in planning mode for this date
    PlanNew,
    /// Remove the current assignment
    Remove,
}

/// Apply a day-chooser choice. `PlanNew` switches to the studio and returns
/// a composer bound to the date.
pub fn choose(
    state: &mut AppState,
    date: NaiveDate,
    choice: DayChoice,
) -> Result<Option<OutfitComposer>, WardrobeError> {
    match choice {
        DayChoice::Assign(outfit_id) => {
            state.dispatch(Action::Schedule { date, outfit_id })?;
            Ok(None)
        }
        DayChoice::PlanNew => {
            state.dispatch(Action::Navigate(View::Studio))?;
            Ok(Some(OutfitComposer::for_date(date)))
        }
        DayChoice::Remove => {
            state.dispatch(Action::Unschedule(date))?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::{date, item, onboarded, outfit, trip};

    fn with_outfit(state: &mut AppState) -> String {
        let look = outfit("Look", vec![item("Top", 1)]);
        let id = look.id.clone();
        state.dispatch(Action::SaveOutfit(look)).unwrap();
        id
    }

    #[test]
    fn test_week_grid_starts_monday() {
        let state = onboarded();
        // 2026-10-22 is a Thursday
        let week = week_grid(&state, date(2026, 10, 22), date(2026, 10, 19));
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, date(2026, 10, 19));
        assert!(week[0].is_today);
        assert_eq!(week[6].date, date(2026, 10, 25));
    }

    #[test]
    fn test_month_grid_pads_to_whole_weeks() {
        let state = onboarded();
        let grid = month_grid(&state, 2026, 2, date(2026, 2, 14)).unwrap();
        assert_eq!(grid.len() % 7, 0);
        assert_eq!(grid[0].date.weekday(), Weekday::Mon);
        assert_eq!(grid.last().unwrap().date.weekday(), Weekday::Sun);
        assert_eq!(grid.iter().filter(|c| c.in_range).count(), 28);
        assert_eq!(grid.iter().filter(|c| c.is_today).count(), 1);

        let december = month_grid(&state, 2026, 12, date(2026, 1, 1)).unwrap();
        assert_eq!(december.iter().filter(|c| c.in_range).count(), 31);
        assert!(month_grid(&state, 2026, 13, date(2026, 1, 1)).is_err());
    }

    #[test]
    fn test_trip_takes_precedence_in_month_view() {
        let mut state = onboarded();
        let outfit_id = with_outfit(&mut state);
        let day = date(2026, 7, 15);
        state
            .dispatch(Action::Schedule { date: day, outfit_id: outfit_id.clone() })
            .unwrap();
        let t = trip(date(2026, 7, 14), date(2026, 7, 16));
        let trip_id = t.id.clone();
        state.dispatch(Action::AddTrip(t)).unwrap();

        let grid = month_grid(&state, 2026, 7, date(2026, 7, 1)).unwrap();
        let cell = grid.iter().find(|c| c.date == day).unwrap();
        match cell.content(&state, CalendarMode::Month) {
            DayContent::Trip(t) => assert_eq!(t.id, trip_id),
            other => panic!("expected trip, got {:?}", other),
        }
        match cell.content(&state, CalendarMode::Week) {
            DayContent::Outfit(o) => assert_eq!(o.id, outfit_id),
            other => panic!("expected outfit, got {:?}", other),
        }

        let quiet = grid.iter().find(|c| c.date == date(2026, 7, 20)).unwrap();
        assert_eq!(quiet.content(&state, CalendarMode::Month), DayContent::Empty);
    }

    #[test]
    fn test_chooser_assign_overwrite_and_remove() {
        let mut state = onboarded();
        let first = with_outfit(&mut state);
        let second = with_outfit(&mut state);
        let day = date(2026, 9, 1);

        choose(&mut state, day, DayChoice::Assign(first)).unwrap();
        choose(&mut state, day, DayChoice::Assign(second.clone())).unwrap();
        assert_eq!(state.schedule().len(), 1);
        assert_eq!(state.scheduled_outfit(day).unwrap().id, second);

        choose(&mut state, day, DayChoice::Remove).unwrap();
        assert!(state.scheduled_outfit(day).is_none());
    }

    #[test]
    fn test_chooser_plan_new_opens_bound_composer() {
        let mut state = onboarded();
        let day = date(2026, 9, 2);
        let composer = choose(&mut state, day, DayChoice::PlanNew)
            .unwrap()
            .unwrap();
        assert_eq!(composer.planning_date(), Some(day));
        assert_eq!(state.view(), View::Studio);
    }
}
