//! Feasibility checks for a finished berth plan.

use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::crane::delta_to_hours;
use crate::models::{Berth, BerthPlan, Vessel};

use super::timeline::OccupancyTimeline;

/// Tolerance for the duration floor, absorbing microsecond rounding.
const FLOOR_EPSILON_HOURS: f64 = 1e-6;

/// First rule a plan was found to break.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanViolation {
    #[error("Assignment references unknown berth {0}")]
    UnknownBerth(String),
    #[error("Assignment references unknown vessel {0}")]
    UnknownVessel(String),
    #[error("Vessel {vessel_id} ({length_m} m) exceeds berth {berth_id} ({max_length_m} m)")]
    CapacityExceeded {
        vessel_id: String,
        berth_id: String,
        length_m: f64,
        max_length_m: f64,
    },
    #[error("Vessel {vessel_id} berths for {hours:.3}h, below the {min_hours}h minimum")]
    BelowMinimumDuration {
        vessel_id: String,
        hours: f64,
        min_hours: f64,
    },
    #[error("Vessel {vessel_id} at berth {berth_id} overlaps occupancy {start} - {end}")]
    Overlap {
        vessel_id: String,
        berth_id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Check capacity, the minimum duration floor and per-berth non-overlap.
pub fn validate_plan(
    plan: &BerthPlan,
    vessels: &[Vessel],
    berths: &[Berth],
    min_berth_hours: f64,
) -> Result<(), PlanViolation> {
    let vessel_lengths: FxHashMap<&str, f64> =
        vessels.iter().map(|v| (v.id.as_str(), v.length_m)).collect();
    let berth_by_id: FxHashMap<&str, &Berth> = berths.iter().map(|b| (b.id.as_str(), b)).collect();
    let mut timelines: FxHashMap<&str, OccupancyTimeline> = FxHashMap::default();

    for a in &plan.assignments {
        let berth: &Berth = *berth_by_id
            .get(a.berth_id.as_str())
            .ok_or_else(|| PlanViolation::UnknownBerth(a.berth_id.clone()))?;
        let length_m = *vessel_lengths
            .get(a.vessel_id.as_str())
            .ok_or_else(|| PlanViolation::UnknownVessel(a.vessel_id.clone()))?;

        if length_m > berth.max_length_m {
            return Err(PlanViolation::CapacityExceeded {
                vessel_id: a.vessel_id.clone(),
                berth_id: berth.id.clone(),
                length_m,
                max_length_m: berth.max_length_m,
            });
        }

        let hours = delta_to_hours(a.etd - a.etb);
        if hours + FLOOR_EPSILON_HOURS < min_berth_hours {
            return Err(PlanViolation::BelowMinimumDuration {
                vessel_id: a.vessel_id.clone(),
                hours,
                min_hours: min_berth_hours,
            });
        }

        let timeline = timelines
            .entry(berth.id.as_str())
            .or_insert_with(|| OccupancyTimeline::new(berth.id.clone()));
        timeline
            .add_busy_period(a.etb, a.etd)
            .map_err(|(start, end)| PlanViolation::Overlap {
                vessel_id: a.vessel_id.clone(),
                berth_id: berth.id.clone(),
                start,
                end,
            })?;
    }

    Ok(())
}
