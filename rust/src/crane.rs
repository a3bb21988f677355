//! Crane productivity model and plan KPIs.
//!
//! Service time at a berth is driven by the number of container moves and the
//! cranes the berth works with:
//!
//! ```text
//! hours = max(min_berth_hours, moves / (cranes * crane_productivity))
//! mph   = moves / hours
//! ```
//!
//! The floor covers mandatory port-call overhead, so small calls still occupy
//! the berth for `min_berth_hours`.

use chrono::Duration;
use pyo3::prelude::*;
use thiserror::Error;

use crate::config::PlanningConfig;
use crate::models::{Assignment, BerthPlan, PlanKpis};

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

/// Errors raised by collaborator-level crane queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CraneError {
    #[error("Couldn't find vessel '{0}'. Run 'plan' first or check name.")]
    NotFound(String),
}

/// Crane productivity policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CraneModel {
    /// Moves per crane per hour
    pub productivity: f64,
    /// Minimum berthing time in hours
    pub min_hours: f64,
}

impl Default for CraneModel {
    fn default() -> Self {
        Self::from_config(&PlanningConfig::default())
    }
}

impl CraneModel {
    pub fn from_config(config: &PlanningConfig) -> Self {
        Self {
            productivity: config.crane_productivity,
            min_hours: config.min_berth_hours,
        }
    }

    /// Service duration in hours and resulting moves per hour.
    ///
    /// `cranes` must be positive; the scheduler validates this at its boundary.
    pub fn duration_and_throughput(&self, moves: u32, cranes: u32) -> (f64, f64) {
        let working = f64::from(moves) / (f64::from(cranes) * self.productivity);
        let hours = working.max(self.min_hours);
        (hours, f64::from(moves) / hours)
    }

    /// Recover duration and throughput from a committed assignment.
    pub fn recover(assignment: &Assignment) -> (f64, f64) {
        let hours = delta_to_hours(assignment.etd - assignment.etb);
        if hours <= 0.0 {
            return (0.0, 0.0);
        }
        (hours, f64::from(assignment.moves) / hours)
    }
}

/// Duration and throughput under the default crane policy (35 moves/crane/hour, 8 h floor).
pub fn duration_and_throughput(moves: u32, cranes: u32) -> (f64, f64) {
    CraneModel::default().duration_and_throughput(moves, cranes)
}

/// Convert fractional hours to a `Duration`, at microsecond resolution.
pub fn hours_to_delta(hours: f64) -> Duration {
    Duration::microseconds((hours * MICROS_PER_HOUR).round() as i64)
}

pub fn delta_to_hours(delta: Duration) -> f64 {
    match delta.num_microseconds() {
        Some(us) => us as f64 / MICROS_PER_HOUR,
        None => delta.num_milliseconds() as f64 / 3_600_000.0,
    }
}

/// Aggregate KPIs over a set of assignments. All zero for an empty plan.
pub fn plan_kpis(assignments: &[Assignment]) -> PlanKpis {
    if assignments.is_empty() {
        return PlanKpis::default();
    }
    let count = assignments.len();
    let total_moves: u64 = assignments.iter().map(|a| u64::from(a.moves)).sum();
    let throughput_sum: f64 = assignments.iter().map(|a| a.throughput).sum();
    let crane_sum: f64 = assignments.iter().map(|a| f64::from(a.cranes)).sum();

    PlanKpis {
        vessel_count: count,
        total_moves,
        avg_throughput: throughput_sum / count as f64,
        avg_cranes: crane_sum / count as f64,
    }
}

/// Crane recommendation for a single vessel call.
#[pyclass]
#[derive(Clone, Debug)]
pub struct CraneAdvice {
    #[pyo3(get)]
    pub assignment: Assignment,
    #[pyo3(get)]
    pub hours: f64,
    #[pyo3(get)]
    pub throughput: f64,
}

#[pymethods]
impl CraneAdvice {
    /// One-line markdown summary of the recommendation.
    pub fn summary(&self) -> String {
        let a = &self.assignment;
        format!(
            "Assign **{} cranes** to **{}** @ berth **{}** for **{}** moves (~{:.1}h, {:.1} MPH).",
            a.cranes, a.vessel_name, a.berth_id, a.moves, self.hours, a.throughput
        )
    }

    fn __repr__(&self) -> String {
        format!(
            "CraneAdvice(vessel={:?}, cranes={}, hours={:.1})",
            self.assignment.vessel_name, self.assignment.cranes, self.hours
        )
    }
}

/// Look up the crane assignment for a vessel by name (case-insensitive).
pub fn crane_for(plan: &BerthPlan, vessel_name: &str) -> Result<CraneAdvice, CraneError> {
    let wanted = vessel_name.trim().to_lowercase();
    let assignment = plan
        .assignments
        .iter()
        .find(|a| a.vessel_name.to_lowercase() == wanted)
        .ok_or_else(|| CraneError::NotFound(vessel_name.to_string()))?;

    let (hours, throughput) = CraneModel::recover(assignment);
    Ok(CraneAdvice {
        assignment: assignment.clone(),
        hours,
        throughput,
    })
}
