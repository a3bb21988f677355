//! Core data types for the port planning system.

use chrono::NaiveDateTime;
use pyo3::prelude::*;
use std::collections::HashMap;

// Note: We use std HashMap here for PyO3 interface compatibility

/// A vessel call to be berthed.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Vessel {
    /// Unique voyage identifier (IMO number in the source data)
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub service: Option<String>,
    /// Length overall in metres
    #[pyo3(get, set)]
    pub length_m: f64,
    #[pyo3(get, set)]
    pub beam_m: Option<f64>,
    #[pyo3(get, set)]
    pub draft_m: Option<f64>,
    #[pyo3(get, set)]
    pub eta: NaiveDateTime,
    /// Containers to handle during the call
    #[pyo3(get, set)]
    pub moves: u32,
}

#[pymethods]
impl Vessel {
    #[new]
    #[pyo3(signature = (
        id,
        name,
        length_m,
        eta,
        moves,
        service=None,
        beam_m=None,
        draft_m=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        id: String,
        name: String,
        length_m: f64,
        eta: NaiveDateTime,
        moves: u32,
        service: Option<String>,
        beam_m: Option<f64>,
        draft_m: Option<f64>,
    ) -> Self {
        Self {
            id,
            name,
            service,
            length_m,
            beam_m,
            draft_m,
            eta,
            moves,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Vessel(id={:?}, name={:?}, length_m={}, eta={}, moves={})",
            self.id, self.name, self.length_m, self.eta, self.moves
        )
    }
}

/// A quay berth with a fixed crane allocation.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Berth {
    #[pyo3(get, set)]
    pub id: String,
    /// Longest vessel the berth can accommodate, in metres
    #[pyo3(get, set)]
    pub max_length_m: f64,
    #[pyo3(get, set)]
    pub cranes: u32,
}

#[pymethods]
impl Berth {
    #[new]
    fn new(id: String, max_length_m: f64, cranes: u32) -> Self {
        Self {
            id,
            max_length_m,
            cranes,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Berth(id={:?}, max_length_m={}, cranes={})",
            self.id, self.max_length_m, self.cranes
        )
    }
}

/// A yard storage block.
#[pyclass]
#[derive(Clone, Debug)]
pub struct YardBlock {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub category: Option<String>,
    #[pyo3(get, set)]
    pub slots: u32,
}

#[pymethods]
impl YardBlock {
    #[new]
    #[pyo3(signature = (id, slots, category=None))]
    fn new(id: String, slots: u32, category: Option<String>) -> Self {
        Self { id, category, slots }
    }

    fn __repr__(&self) -> String {
        format!(
            "YardBlock(id={:?}, slots={}, category={:?})",
            self.id, self.slots, self.category
        )
    }
}

/// A vessel placed at a berth for a computed occupancy window.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    #[pyo3(get)]
    pub vessel_id: String,
    #[pyo3(get)]
    pub vessel_name: String,
    #[pyo3(get)]
    pub berth_id: String,
    /// Estimated time of berthing
    #[pyo3(get)]
    pub etb: NaiveDateTime,
    /// Estimated time of departure
    #[pyo3(get)]
    pub etd: NaiveDateTime,
    #[pyo3(get)]
    pub cranes: u32,
    #[pyo3(get)]
    pub moves: u32,
    /// Moves per crane-hour
    #[pyo3(get)]
    pub throughput: f64,
}

#[pymethods]
impl Assignment {
    fn __repr__(&self) -> String {
        format!(
            "Assignment(vessel={:?}, berth={:?}, etb={}, etd={}, cranes={}, mph={:.1})",
            self.vessel_name, self.berth_id, self.etb, self.etd, self.cranes, self.throughput
        )
    }
}

/// A vessel no berth can physically accommodate.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct UnplannedVessel {
    #[pyo3(get)]
    pub vessel_id: String,
    #[pyo3(get)]
    pub vessel_name: String,
    #[pyo3(get)]
    pub length_m: f64,
    #[pyo3(get)]
    pub reason: String,
}

#[pymethods]
impl UnplannedVessel {
    fn __repr__(&self) -> String {
        format!(
            "UnplannedVessel(vessel={:?}, length_m={}, reason={:?})",
            self.vessel_name, self.length_m, self.reason
        )
    }
}

/// Result of one berth planning run.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct BerthPlan {
    /// Assignments in processing (arrival) order
    #[pyo3(get)]
    pub assignments: Vec<Assignment>,
    #[pyo3(get)]
    pub unplanned: Vec<UnplannedVessel>,
    #[pyo3(get)]
    pub algorithm_metadata: HashMap<String, String>,
}

#[pymethods]
impl BerthPlan {
    /// Assignments made at the given berth, sorted by ETB.
    pub fn assignments_for_berth(&self, berth_id: &str) -> Vec<Assignment> {
        let mut calls: Vec<Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.berth_id == berth_id)
            .cloned()
            .collect();
        calls.sort_by_key(|a| a.etb);
        calls
    }

    fn __len__(&self) -> usize {
        self.assignments.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "BerthPlan(assignments={}, unplanned={})",
            self.assignments.len(),
            self.unplanned.len()
        )
    }
}

/// Slots taken from one yard block (or the overflow sentinel).
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YardAllocation {
    #[pyo3(get)]
    pub block_id: String,
    #[pyo3(get)]
    pub slots: u64,
    #[pyo3(get)]
    pub category: Option<String>,
    #[pyo3(get)]
    pub is_overflow: bool,
}

#[pymethods]
impl YardAllocation {
    fn __repr__(&self) -> String {
        format!(
            "YardAllocation(block={:?}, slots={}, category={:?})",
            self.block_id, self.slots, self.category
        )
    }
}

/// Aggregate indicators over a berth plan.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlanKpis {
    #[pyo3(get)]
    pub vessel_count: usize,
    #[pyo3(get)]
    pub total_moves: u64,
    /// Mean of per-assignment moves per crane-hour
    #[pyo3(get)]
    pub avg_throughput: f64,
    #[pyo3(get)]
    pub avg_cranes: f64,
}

#[pymethods]
impl PlanKpis {
    fn __repr__(&self) -> String {
        format!(
            "PlanKpis(vessels={}, moves={}, avg_mph={:.1}, avg_cranes={:.1})",
            self.vessel_count, self.total_moves, self.avg_throughput, self.avg_cranes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn call(vessel_id: &str, berth_id: &str, hour: u32) -> Assignment {
        let etb = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        Assignment {
            vessel_id: vessel_id.to_string(),
            vessel_name: vessel_id.to_string(),
            berth_id: berth_id.to_string(),
            etb,
            etd: etb + chrono::Duration::hours(8),
            cranes: 2,
            moves: 500,
            throughput: 62.5,
        }
    }

    #[test]
    fn test_assignments_for_berth_sorted_by_etb() {
        // Hand-built plan, not in ETB order
        let plan = BerthPlan {
            assignments: vec![call("c", "B1", 16), call("x", "B2", 0), call("a", "B1", 0)],
            ..BerthPlan::default()
        };
        let ids: Vec<_> = plan
            .assignments_for_berth("B1")
            .into_iter()
            .map(|a| a.vessel_id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(plan.assignments_for_berth("B9").is_empty());
    }
}
