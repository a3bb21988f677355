//! Berth scheduler: best-fit, first-available vessel-to-berth assignment.
//!
//! Vessels are placed one at a time in arrival order against run-scoped berth
//! state; no earlier placement is ever revisited.

mod core;
mod state;
mod timeline;
mod validation;

pub use core::{BerthScheduler, SchedulerError};
pub use state::BerthRunState;
pub use timeline::OccupancyTimeline;
pub use validation::{validate_plan, PlanViolation};
