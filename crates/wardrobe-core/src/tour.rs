//! ============================================================================
//! Guided Tour
//! ============================================================================
//! One-time walkthrough of the primary views. Each step switches the view and
//! then waits for that view to report itself ready through a
//! [`ViewReadySignal`]. A view that never reports within the ready timeout is
//! skipped and the tour carries on.
//! ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::state::{Action, AppState, View};
use crate::types::WardrobeError;

/// Broadcast of the most recently mounted view
#[derive(Debug, Clone)]
pub struct ViewReadySignal {
    tx: Arc<watch::Sender<Option<View>>>,
}

impl Default for ViewReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewReadySignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Called by a view once it has finished mounting
    pub fn mark_ready(&self, view: View) {
        self.tx.send_replace(Some(view));
    }

    pub fn reset(&self) {
        self.tx.send_replace(None);
    }

    /// Wait until `view` is ready. Returns false on timeout.
    pub async fn wait_for(&self, view: View, timeout: Duration) -> bool {
        let mut rx = self.tx.subscribe();
        let ready = tokio::time::timeout(timeout, rx.wait_for(|v| *v == Some(view))).await;
        matches!(ready, Ok(Ok(_)))
    }
}

/// Outcome of one tour step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourStep {
    Shown(View),
    Skipped(View),
    Finished,
}

#[derive(Debug, Clone)]
pub struct GuidedTour {
    steps: Vec<View>,
    index: usize,
    ready_timeout: Duration,
}

impl GuidedTour {
    pub fn new(ready_timeout: Duration) -> Self {
        Self {
            steps: View::PRIMARY.to_vec(),
            index: 0,
            ready_timeout,
        }
    }

    /// Offered once, after onboarding
    pub fn should_offer(state: &AppState) -> bool {
        state.is_onboarded() && !state.tour_completed()
    }

    pub fn current(&self) -> Option<View> {
        self.steps.get(self.index).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    /// Move to the next view and wait for it to become ready
    pub async fn advance(
        &mut self,
        state: &mut AppState,
        signal: &ViewReadySignal,
    ) -> Result<TourStep, WardrobeError> {
        let Some(view) = self.current() else {
            state.dispatch(Action::CompleteTour)?;
            info!("Guided tour finished");
            return Ok(TourStep::Finished);
        };

        // A view that is already on screen is not mounted again, so its
        // earlier ready report still counts
        if state.view() != view {
            signal.reset();
        }
        state.dispatch(Action::Navigate(view))?;
        self.index += 1;

        if signal.wait_for(view, self.ready_timeout).await {
            Ok(TourStep::Shown(view))
        } else {
            warn!("{:?} view not ready after {:?}, skipping", view, self.ready_timeout);
            Ok(TourStep::Skipped(view))
        }
    }

    /// Leave the tour early. It is not offered again.
    pub fn dismiss(&mut self, state: &mut AppState) -> Result<(), WardrobeError> {
        self.index = self.steps.len();
        state.dispatch(Action::CompleteTour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::onboarded;

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_times_out() {
        let signal = ViewReadySignal::new();
        signal.mark_ready(View::Closet);
        assert!(signal.wait_for(View::Closet, Duration::from_millis(10)).await);
        assert!(!signal.wait_for(View::Trips, Duration::from_millis(10)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tour_waits_for_views_and_skips_silent_ones() {
        let mut state = onboarded();
        assert!(GuidedTour::should_offer(&state));

        let signal = ViewReadySignal::new();
        let mut tour = GuidedTour::new(Duration::from_millis(3000));
        let mut outcomes = Vec::new();
        loop {
            // Every view mounts shortly after navigation, except the calendar
            if let Some(view) = tour.current().filter(|v| *v != View::Calendar) {
                let mounter = signal.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    mounter.mark_ready(view);
                });
            }
            let step = tour.advance(&mut state, &signal).await.unwrap();
            outcomes.push(step);
            if step == TourStep::Finished {
                break;
            }
        }

        assert_eq!(outcomes.len(), View::PRIMARY.len() + 1);
        assert_eq!(outcomes[0], TourStep::Shown(View::Closet));
        assert_eq!(outcomes[2], TourStep::Skipped(View::Calendar));
        assert_eq!(outcomes[5], TourStep::Shown(View::Profile));
        assert!(tour.is_finished());
        assert!(state.tour_completed());
        assert!(!GuidedTour::should_offer(&state));
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_already_on_screen_is_shown_at_once() {
        let mut state = onboarded();
        assert_eq!(state.view(), View::Closet);
        let signal = ViewReadySignal::new();
        signal.mark_ready(View::Closet);

        let mut tour = GuidedTour::new(Duration::from_millis(3000));
        let started = tokio::time::Instant::now();
        let step = tour.advance(&mut state, &signal).await.unwrap();
        assert_eq!(step, TourStep::Shown(View::Closet));
        assert!(started.elapsed() < Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn test_tour_requires_onboarding() {
        let mut state = AppState::new();
        let signal = ViewReadySignal::new();
        let mut tour = GuidedTour::new(Duration::from_millis(10));
        assert_eq!(
            tour.advance(&mut state, &signal).await,
            Err(WardrobeError::OnboardingRequired)
        );
        assert!(!GuidedTour::should_offer(&state));
    }

    #[test]
    fn test_dismiss_completes_tour() {
        let mut state = onboarded();
        let mut tour = GuidedTour::new(Duration::from_millis(10));
        tour.dismiss(&mut state).unwrap();
        assert!(tour.is_finished());
        assert!(state.tour_completed());
    }
}
