//! Core berth scheduler implementation.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::{PlanningConfig, POLICY_ERROR, POLICY_SKIP};
use crate::crane::{hours_to_delta, CraneModel};
use crate::models::{Assignment, Berth, BerthPlan, UnplannedVessel, Vessel};
use crate::sorting::{arrival_order, fit_candidates};
use crate::{log_changes, log_checks, log_debug};

use super::state::BerthRunState;

/// Errors that can occur during berth planning.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("Vessel {vessel_id} ({vessel_name}, {length_m} m) fits no berth")]
    UnplannableVessel {
        vessel_id: String,
        vessel_name: String,
        length_m: f64,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No {0} supplied")]
    EmptyResourceSet(&'static str),
    #[error("Duplicate {kind} identifier: {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("Unknown unplannable policy: {0}")]
    UnknownPolicy(String),
    #[error("Service window for vessel {0} exceeds the representable time range")]
    TimeOverflow(String),
}

/// Greedy, non-backtracking berth scheduler.
///
/// Vessels are served in arrival order. Each goes to the smallest berth that is
/// long enough and free at arrival; if every such berth is busy, it queues for
/// the one that frees first. When several berths free at the same instant the
/// first of them in smallest-length order wins.
pub struct BerthScheduler {
    config: PlanningConfig,
    cranes: CraneModel,
}

impl BerthScheduler {
    /// Create a new scheduler.
    pub fn new(config: PlanningConfig) -> Result<Self, SchedulerError> {
        // Validate policy upfront
        let valid_policies = [POLICY_SKIP, POLICY_ERROR];
        if !valid_policies.contains(&config.unplannable_policy.as_str()) {
            return Err(SchedulerError::UnknownPolicy(
                config.unplannable_policy.clone(),
            ));
        }
        if !(config.crane_productivity > 0.0 && config.crane_productivity.is_finite()) {
            return Err(SchedulerError::InvalidInput(format!(
                "crane productivity must be positive, got {}",
                config.crane_productivity
            )));
        }
        if !(config.min_berth_hours >= 0.0 && config.min_berth_hours.is_finite()) {
            return Err(SchedulerError::InvalidInput(format!(
                "minimum berth hours must be non-negative, got {}",
                config.min_berth_hours
            )));
        }

        let cranes = CraneModel::from_config(&config);
        Ok(Self { config, cranes })
    }

    /// Run the planning pass.
    ///
    /// Input is validated before any berth is touched, so a rejected input
    /// never yields a partial plan.
    pub fn plan(&self, vessels: &[Vessel], berths: &[Berth]) -> Result<BerthPlan, SchedulerError> {
        validate_berths(berths)?;
        validate_vessels(vessels)?;

        let mut state = BerthRunState::new(berths).map_err(|id| SchedulerError::DuplicateId {
            kind: "berth",
            id,
        })?;

        let verbosity = self.config.verbosity;
        let mut assignments: Vec<Assignment> = Vec::with_capacity(vessels.len());
        let mut unplanned: Vec<UnplannedVessel> = Vec::new();

        for idx in arrival_order(vessels) {
            let vessel = &vessels[idx];
            match self.place_vessel(vessel, berths, &mut state)? {
                Some(assignment) => assignments.push(assignment),
                None => {
                    let err = SchedulerError::UnplannableVessel {
                        vessel_id: vessel.id.clone(),
                        vessel_name: vessel.name.clone(),
                        length_m: vessel.length_m,
                    };
                    if self.config.unplannable_policy == POLICY_ERROR {
                        return Err(err);
                    }
                    log_checks!(verbosity, "  Skipping {}: {}", vessel.name, err);
                    unplanned.push(UnplannedVessel {
                        vessel_id: vessel.id.clone(),
                        vessel_name: vessel.name.clone(),
                        length_m: vessel.length_m,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let mut metadata = HashMap::new();
        metadata.insert(
            "algorithm".to_string(),
            "best_fit_first_available".to_string(),
        );
        metadata.insert(
            "unplannable_policy".to_string(),
            self.config.unplannable_policy.clone(),
        );
        metadata.insert("vessels".to_string(), assignments.len().to_string());
        metadata.insert("unplanned".to_string(), unplanned.len().to_string());

        Ok(BerthPlan {
            assignments,
            unplanned,
            algorithm_metadata: metadata,
        })
    }

    /// Place one vessel, returning `None` if no berth is long enough.
    fn place_vessel(
        &self,
        vessel: &Vessel,
        berths: &[Berth],
        state: &mut BerthRunState,
    ) -> Result<Option<Assignment>, SchedulerError> {
        let verbosity = self.config.verbosity;
        let candidates = fit_candidates(berths, vessel.length_m);
        if candidates.is_empty() {
            return Ok(None);
        }

        let Some((berth_idx, etb)) = self.choose_berth(vessel, berths, &candidates, state) else {
            return Ok(None);
        };
        let berth = &berths[berth_idx];
        let berth_int = state
            .berth_int(&berth.id)
            .ok_or_else(|| SchedulerError::InvalidInput(format!("unknown berth {}", berth.id)))?;

        let (hours, throughput) = self.cranes.duration_and_throughput(vessel.moves, berth.cranes);
        let etd = etb
            .checked_add_signed(hours_to_delta(hours))
            .ok_or_else(|| SchedulerError::TimeOverflow(vessel.id.clone()))?;

        state
            .commit(berth_int, etb, etd)
            .map_err(|(s, e)| {
                SchedulerError::InvalidInput(format!(
                    "berth {} already occupied {} - {} when placing {}",
                    berth.id, s, e, vessel.id
                ))
            })?;
        log_debug!(verbosity, "    {} next free -> {}", berth.id, etd);

        log_changes!(
            verbosity,
            "  Assigned {} to {} ({} - {}, {} cranes, {:.1}h)",
            vessel.name,
            berth.id,
            etb,
            etd,
            berth.cranes,
            hours
        );

        Ok(Some(Assignment {
            vessel_id: vessel.id.clone(),
            vessel_name: vessel.name.clone(),
            berth_id: berth.id.clone(),
            etb,
            etd,
            cranes: berth.cranes,
            moves: vessel.moves,
            throughput,
        }))
    }

    /// Pick a berth among length-sorted candidates and the vessel's ETB there.
    fn choose_berth(
        &self,
        vessel: &Vessel,
        berths: &[Berth],
        candidates: &[usize],
        state: &BerthRunState,
    ) -> Option<(usize, NaiveDateTime)> {
        let verbosity = self.config.verbosity;
        let eta = vessel.eta;

        // First fit by capacity: smallest berth free at arrival
        let mut earliest: Option<(usize, NaiveDateTime)> = None;
        for &idx in candidates {
            let berth_int = state.berth_int(&berths[idx].id)?;
            let free_at = state.next_free(berth_int);
            log_checks!(
                verbosity,
                "    {} considers {} (max {} m, free {})",
                vessel.name,
                berths[idx].id,
                berths[idx].max_length_m,
                free_at
            );
            if free_at <= eta {
                return Some((idx, eta));
            }
            // Strict comparison keeps the first berth on ties
            if earliest.map_or(true, |(_, best)| free_at < best) {
                earliest = Some((idx, free_at));
            }
        }

        if let Some((idx, free_at)) = earliest {
            log_checks!(
                verbosity,
                "    {} queues for {} until {} (eta {})",
                vessel.name,
                berths[idx].id,
                free_at,
                eta
            );
        }
        earliest
    }
}

fn validate_berths(berths: &[Berth]) -> Result<(), SchedulerError> {
    if berths.is_empty() {
        return Err(SchedulerError::EmptyResourceSet("berths"));
    }
    for berth in berths {
        if !(berth.max_length_m > 0.0 && berth.max_length_m.is_finite()) {
            return Err(SchedulerError::InvalidInput(format!(
                "berth {} max length must be positive, got {}",
                berth.id, berth.max_length_m
            )));
        }
        if berth.cranes == 0 {
            return Err(SchedulerError::InvalidInput(format!(
                "berth {} must have at least one crane",
                berth.id
            )));
        }
    }
    Ok(())
}

fn validate_vessels(vessels: &[Vessel]) -> Result<(), SchedulerError> {
    let mut seen = rustc_hash::FxHashSet::default();
    for vessel in vessels {
        if !(vessel.length_m > 0.0 && vessel.length_m.is_finite()) {
            return Err(SchedulerError::InvalidInput(format!(
                "vessel {} length must be positive, got {}",
                vessel.id, vessel.length_m
            )));
        }
        if vessel.moves == 0 {
            return Err(SchedulerError::InvalidInput(format!(
                "vessel {} must have a positive move count",
                vessel.id
            )));
        }
        if !seen.insert(vessel.id.as_str()) {
            return Err(SchedulerError::DuplicateId {
                kind: "vessel",
                id: vessel.id.clone(),
            });
        }
    }
    Ok(())
}
