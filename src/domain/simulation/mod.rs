pub mod demand_router;
pub mod igp_shortcuts;
pub mod orchestrator;
pub mod rsvp_signaling;
