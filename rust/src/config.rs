//! Configuration types for the planning system.

use pyo3::prelude::*;

/// Policy names accepted for `PlanningConfig::unplannable_policy`.
pub const POLICY_SKIP: &str = "skip";
pub const POLICY_ERROR: &str = "error";

/// Configuration for berth planning and the crane productivity model.
#[pyclass]
#[derive(Clone, Debug)]
pub struct PlanningConfig {
    /// Nominal crane productivity in moves per crane per hour
    #[pyo3(get, set)]
    pub crane_productivity: f64,
    /// Minimum berthing time in hours, covering port-call overhead
    #[pyo3(get, set)]
    pub min_berth_hours: f64,
    /// What to do with a vessel no berth can accommodate: "skip" or "error"
    #[pyo3(get, set)]
    pub unplannable_policy: String,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            crane_productivity: 35.0,
            min_berth_hours: 8.0,
            unplannable_policy: POLICY_SKIP.to_string(),
            verbosity: 0,
        }
    }
}

#[pymethods]
impl PlanningConfig {
    #[new]
    #[pyo3(signature = (
        crane_productivity=None,
        min_berth_hours=None,
        unplannable_policy=None,
        verbosity=None
    ))]
    fn new(
        crane_productivity: Option<f64>,
        min_berth_hours: Option<f64>,
        unplannable_policy: Option<String>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            crane_productivity: crane_productivity.unwrap_or(defaults.crane_productivity),
            min_berth_hours: min_berth_hours.unwrap_or(defaults.min_berth_hours),
            unplannable_policy: unplannable_policy.unwrap_or(defaults.unplannable_policy),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "PlanningConfig(crane_productivity={}, min_berth_hours={}, unplannable_policy={:?})",
            self.crane_productivity, self.min_berth_hours, self.unplannable_policy
        )
    }
}

/// Configuration for yard demand derivation and overflow reporting.
#[pyclass]
#[derive(Clone, Debug)]
pub struct YardConfig {
    /// Share of expected moves that needs a yard slot (import share)
    #[pyo3(get, set)]
    pub demand_ratio: f64,
    /// Identifier of the sentinel record absorbing unmet demand
    #[pyo3(get, set)]
    pub overflow_block: String,
    /// Category reported on the overflow record
    #[pyo3(get, set)]
    pub overflow_category: String,
    /// Expected moves used when a yard request names no figure
    #[pyo3(get, set)]
    pub default_total_moves: u64,
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for YardConfig {
    fn default() -> Self {
        Self {
            demand_ratio: 0.5,
            overflow_block: "(overflow)".to_string(),
            overflow_category: "IMP".to_string(),
            default_total_moves: 2000,
            verbosity: 0,
        }
    }
}

#[pymethods]
impl YardConfig {
    #[new]
    #[pyo3(signature = (
        demand_ratio=None,
        overflow_block=None,
        overflow_category=None,
        default_total_moves=None,
        verbosity=None
    ))]
    fn new(
        demand_ratio: Option<f64>,
        overflow_block: Option<String>,
        overflow_category: Option<String>,
        default_total_moves: Option<u64>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            demand_ratio: demand_ratio.unwrap_or(defaults.demand_ratio),
            overflow_block: overflow_block.unwrap_or(defaults.overflow_block),
            overflow_category: overflow_category.unwrap_or(defaults.overflow_category),
            default_total_moves: default_total_moves.unwrap_or(defaults.default_total_moves),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "YardConfig(demand_ratio={}, overflow_block={:?})",
            self.demand_ratio, self.overflow_block
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planning_defaults() {
        let config = PlanningConfig::default();
        assert_eq!(config.crane_productivity, 35.0);
        assert_eq!(config.min_berth_hours, 8.0);
        assert_eq!(config.unplannable_policy, POLICY_SKIP);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = PlanningConfig::new(Some(30.0), None, Some("error".to_string()), None);
        assert_eq!(config.crane_productivity, 30.0);
        assert_eq!(config.min_berth_hours, 8.0);
        assert_eq!(config.unplannable_policy, POLICY_ERROR);

        let yard = YardConfig::new(Some(0.4), None, None, None, None);
        assert_eq!(yard.demand_ratio, 0.4);
        assert_eq!(yard.overflow_block, "(overflow)");
        assert_eq!(yard.default_total_moves, 2000);
    }
}
