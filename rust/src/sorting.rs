//! Ordering policies used by the berth scheduler.
//!
//! Two orderings drive the plan:
//! - vessels are served in ascending arrival time, ties kept in input order
//! - candidate berths are scanned smallest-sufficient first (best fit), ties
//!   kept in input order
//!
//! Both keys carry the input position so the resulting order is total and
//! deterministic regardless of the sort algorithm.

use chrono::NaiveDateTime;
use std::cmp::Ordering;

use crate::models::{Berth, Vessel};

/// Sort key for vessel processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArrivalKey {
    pub eta: NaiveDateTime,
    pub position: usize,
}

/// Sort key for candidate berth order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitKey {
    pub max_length_m: f64,
    pub position: usize,
}

/// Compare f64 values for sorting, treating incomparable values as equal.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

impl Eq for FitKey {}

impl Ord for FitKey {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_f64(self.max_length_m, other.max_length_m).then(self.position.cmp(&other.position))
    }
}

impl PartialOrd for FitKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Indices of `vessels` in the order they are planned.
pub fn arrival_order(vessels: &[Vessel]) -> Vec<usize> {
    let mut keys: Vec<ArrivalKey> = vessels
        .iter()
        .enumerate()
        .map(|(position, v)| ArrivalKey {
            eta: v.eta,
            position,
        })
        .collect();
    keys.sort();
    keys.into_iter().map(|k| k.position).collect()
}

/// Indices of berths able to take a vessel of `length_m`, smallest first.
///
/// An empty result means no berth can physically accommodate the vessel.
pub fn fit_candidates(berths: &[Berth], length_m: f64) -> Vec<usize> {
    let mut keys: Vec<FitKey> = berths
        .iter()
        .enumerate()
        .filter(|(_, b)| b.max_length_m >= length_m)
        .map(|(position, b)| FitKey {
            max_length_m: b.max_length_m,
            position,
        })
        .collect();
    keys.sort();
    keys.into_iter().map(|k| k.position).collect()
}
