//! Immutable input snapshot for one planning run.

use chrono::NaiveDate;
use pyo3::prelude::*;

use crate::config::{PlanningConfig, YardConfig};
use crate::models::{Berth, BerthPlan, Vessel, YardAllocation, YardBlock};
use crate::scheduler::{BerthScheduler, SchedulerError};
use crate::sorting::arrival_order;
use crate::yard::{self, YardError};

/// Vessels, berths and yard blocks as loaded for a planning run.
///
/// The snapshot is never mutated by planning; every run builds its own berth
/// state from it.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct ScheduleIndex {
    #[pyo3(get)]
    pub vessels: Vec<Vessel>,
    #[pyo3(get)]
    pub berths: Vec<Berth>,
    #[pyo3(get)]
    pub yard_blocks: Vec<YardBlock>,
}

impl ScheduleIndex {
    /// Vessels sorted by arrival, optionally limited to one calendar day.
    pub fn list_vessels(&self, date: Option<NaiveDate>) -> Vec<Vessel> {
        arrival_order(&self.vessels)
            .into_iter()
            .map(|idx| &self.vessels[idx])
            .filter(|v| date.map_or(true, |d| v.eta.date() == d))
            .cloned()
            .collect()
    }

    /// Assign every vessel to a berth.
    pub fn plan_berths(&self, config: &PlanningConfig) -> Result<BerthPlan, SchedulerError> {
        BerthScheduler::new(config.clone())?.plan(&self.vessels, &self.berths)
    }

    /// Spread `demand` slots over the yard blocks.
    pub fn allocate_yard(
        &self,
        demand: i64,
        config: &YardConfig,
    ) -> Result<Vec<YardAllocation>, YardError> {
        yard::allocate(&self.yard_blocks, demand, config)
    }
}

#[pymethods]
impl ScheduleIndex {
    #[new]
    #[pyo3(signature = (vessels, berths, yard_blocks=None))]
    fn py_new(
        vessels: Vec<Vessel>,
        berths: Vec<Berth>,
        yard_blocks: Option<Vec<YardBlock>>,
    ) -> Self {
        Self {
            vessels,
            berths,
            yard_blocks: yard_blocks.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleIndex(vessels={}, berths={}, yard_blocks={})",
            self.vessels.len(),
            self.berths.len(),
            self.yard_blocks.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn vessel(name: &str, eta: NaiveDateTime) -> Vessel {
        Vessel {
            id: name.to_uppercase(),
            name: name.to_string(),
            service: Some("AEX".to_string()),
            length_m: 250.0,
            beam_m: Some(32.0),
            draft_m: None,
            eta,
            moves: 1200,
        }
    }

    fn snapshot() -> ScheduleIndex {
        ScheduleIndex {
            vessels: vec![
                vessel("c", at(11, 23)),
                vessel("a", at(10, 6)),
                vessel("b", at(11, 0)),
            ],
            berths: vec![Berth {
                id: "B1".to_string(),
                max_length_m: 300.0,
                cranes: 3,
            }],
            yard_blocks: vec![YardBlock {
                id: "Y1".to_string(),
                category: None,
                slots: 1000,
            }],
        }
    }

    #[test]
    fn test_list_sorted_by_arrival() {
        let names: Vec<_> = snapshot()
            .list_vessels(None)
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_list_day_window() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let names: Vec<_> = snapshot()
            .list_vessels(Some(day))
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["b", "c"]);

        let empty_day = NaiveDate::from_ymd_opt(2025, 6, 12).unwrap();
        assert!(snapshot().list_vessels(Some(empty_day)).is_empty());
    }

    #[test]
    fn test_plan_does_not_mutate_snapshot() {
        let index = snapshot();
        let first = index.plan_berths(&PlanningConfig::default()).unwrap();
        let second = index.plan_berths(&PlanningConfig::default()).unwrap();
        assert_eq!(first.assignments, second.assignments);
        assert_eq!(index.vessels[0].name, "c");
    }

    #[test]
    fn test_allocate_yard() {
        let out = snapshot()
            .allocate_yard(1500, &YardConfig::default())
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].slots, 500);
    }
}
