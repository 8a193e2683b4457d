//! ============================================================================
//! WARDROBE-CORE: digital wardrobe and AI stylist
//! ============================================================================
//! Backend logic for the wardrobe app:
//! - Closet intake with AI classification (single and bulk)
//! - Outfit composer and calendar scheduling
//! - Trip planner with an AI lookbook under a cancellable deadline
//! - Virtual fitting room with lazily generated angles and critique
//! - Mandatory onboarding quiz and an optional guided tour
//! ============================================================================

pub mod ai;
pub mod calendar;
pub mod composer;
pub mod config;
pub mod fitting_room;
pub mod onboarding;
pub mod ops;
pub mod state;
pub mod tour;
pub mod trips;
pub mod types;
pub mod upload;

// Re-export main types for convenience
pub use types::*;
pub use ai::{GeminiStylist, StylistBackend};
pub use config::WardrobeConfig;
pub use ops::CancellableOp;
pub use state::{Action, AppState, View};
