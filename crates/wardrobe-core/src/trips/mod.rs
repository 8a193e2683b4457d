//! ============================================================================
//! Trips Module - planner wizard, AI lookbook, packing-list detail view
//! ============================================================================

mod detail;
mod planner;

pub use detail::PackingListEditor;
pub use planner::{
    audit_plan, build_request, condense_inventory, generate_trip, PlanAudit, TripDraft,
    TripPlanner, WizardStep,
};
