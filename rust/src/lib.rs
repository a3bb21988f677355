//! Rust implementation of the PortOps berth, crane and yard planners.
//!
//! The planners are pure functions over an immutable `ScheduleIndex`:
//! the berth scheduler assigns vessels to berths in arrival order, the crane
//! model derives service time and throughput, and the yard allocator spreads a
//! slot demand over yard blocks. Loading and command routing sit on top.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::prelude::*;

mod config;
pub mod commands;
pub mod crane;
mod index;
pub mod interner;
pub mod loader;
pub mod logging;
mod models;
pub mod scheduler;
pub mod sorting;
pub mod yard;

pub use commands::CommandRouter;
pub use config::{PlanningConfig, YardConfig, POLICY_ERROR, POLICY_SKIP};
pub use crane::{duration_and_throughput, CraneAdvice, CraneError, CraneModel};
pub use index::ScheduleIndex;
pub use loader::{LoaderError, ScheduleLoader};
pub use models::{
    Assignment, Berth, BerthPlan, PlanKpis, UnplannedVessel, Vessel, YardAllocation, YardBlock,
};
pub use scheduler::{BerthScheduler, PlanViolation, SchedulerError};
pub use yard::YardError;

/// Load a snapshot from a directory holding `vessel_schedule.csv`,
/// `berths.csv` and `yard_blocks.csv`.
///
/// # Raises
/// * ValueError if a file is missing or malformed
#[pyfunction]
fn load_snapshot(path: String) -> PyResult<ScheduleIndex> {
    ScheduleLoader::new()
        .from_dir(&path)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// List vessels sorted by arrival, optionally for a single day.
#[pyfunction]
#[pyo3(signature = (snapshot, date=None))]
fn list_vessels(snapshot: ScheduleIndex, date: Option<NaiveDate>) -> Vec<Vessel> {
    snapshot.list_vessels(date)
}

/// Assign every vessel in the snapshot to a berth.
///
/// # Arguments
/// * `snapshot` - Vessels and berths to plan
/// * `config` - Crane productivity, berthing floor and unplannable policy
///
/// # Returns
/// * BerthPlan with assignments in arrival order and any unplanned vessels
///
/// # Raises
/// * ValueError on invalid input, an empty berth list, or an unplannable
///   vessel under the "error" policy
#[pyfunction]
#[pyo3(signature = (snapshot, config=None))]
fn plan_berths(snapshot: ScheduleIndex, config: Option<PlanningConfig>) -> PyResult<BerthPlan> {
    let config = config.unwrap_or_default();
    snapshot
        .plan_berths(&config)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// Spread a slot demand over the snapshot's yard blocks in listing order.
///
/// # Raises
/// * ValueError if demand is negative or no yard blocks are present
#[pyfunction]
#[pyo3(signature = (snapshot, demand, config=None))]
fn allocate_yard(
    snapshot: ScheduleIndex,
    demand: i64,
    config: Option<YardConfig>,
) -> PyResult<Vec<YardAllocation>> {
    let config = config.unwrap_or_default();
    snapshot
        .allocate_yard(demand, &config)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// Slot demand implied by an expected move count under the yard config.
#[pyfunction]
#[pyo3(signature = (total_moves, config=None))]
fn yard_demand(total_moves: u64, config: Option<YardConfig>) -> f64 {
    yard::yard_demand(total_moves, &config.unwrap_or_default())
}

/// Crane recommendation for a vessel in a finished plan.
///
/// # Raises
/// * KeyError if no assignment matches the vessel name
#[pyfunction]
#[pyo3(name = "crane_for")]
fn py_crane_for(plan: BerthPlan, vessel_name: String) -> PyResult<CraneAdvice> {
    crane::crane_for(&plan, &vessel_name)
        .map_err(|e| pyo3::exceptions::PyKeyError::new_err(e.to_string()))
}

#[pyfunction]
fn plan_kpis(plan: BerthPlan) -> PlanKpis {
    crane::plan_kpis(&plan.assignments)
}

/// Check a plan for capacity, duration floor and berth overlap violations.
///
/// # Raises
/// * ValueError describing the first violation found
#[pyfunction]
#[pyo3(signature = (plan, snapshot, min_berth_hours=8.0))]
fn validate_plan(plan: BerthPlan, snapshot: ScheduleIndex, min_berth_hours: f64) -> PyResult<()> {
    scheduler::validate_plan(&plan, &snapshot.vessels, &snapshot.berths, min_berth_hours)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// Answer a text command (`help`, `berth plan`, `crane plan X`, ...) in markdown.
#[pyfunction]
#[pyo3(signature = (message, snapshot, planning=None, yard=None))]
fn route_command(
    message: String,
    snapshot: ScheduleIndex,
    planning: Option<PlanningConfig>,
    yard: Option<YardConfig>,
) -> String {
    CommandRouter::new(
        &snapshot,
        planning.unwrap_or_default(),
        yard.unwrap_or_default(),
    )
    .route(&message)
}

/// The portops.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Vessel>()?;
    m.add_class::<Berth>()?;
    m.add_class::<YardBlock>()?;
    m.add_class::<Assignment>()?;
    m.add_class::<UnplannedVessel>()?;
    m.add_class::<BerthPlan>()?;
    m.add_class::<YardAllocation>()?;
    m.add_class::<PlanKpis>()?;
    m.add_class::<CraneAdvice>()?;
    m.add_class::<ScheduleIndex>()?;

    // Config types
    m.add_class::<PlanningConfig>()?;
    m.add_class::<YardConfig>()?;

    // Operations
    m.add_function(wrap_pyfunction!(load_snapshot, m)?)?;
    m.add_function(wrap_pyfunction!(list_vessels, m)?)?;
    m.add_function(wrap_pyfunction!(plan_berths, m)?)?;
    m.add_function(wrap_pyfunction!(allocate_yard, m)?)?;
    m.add_function(wrap_pyfunction!(yard_demand, m)?)?;
    m.add_function(wrap_pyfunction!(py_crane_for, m)?)?;
    m.add_function(wrap_pyfunction!(plan_kpis, m)?)?;
    m.add_function(wrap_pyfunction!(validate_plan, m)?)?;
    m.add_function(wrap_pyfunction!(route_command, m)?)?;

    Ok(())
}
