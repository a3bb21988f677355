//! Run-scoped berth state for one planning pass.

use chrono::NaiveDateTime;

use crate::interner::{IdInt, IdInterner};
use crate::models::Berth;

use super::timeline::OccupancyTimeline;

/// Berth occupancy owned by a single `BerthScheduler::plan` call.
///
/// Built fresh from the berth table on every run and dropped when the run
/// ends, so concurrent runs never share next-free times.
#[derive(Clone, Debug)]
pub struct BerthRunState {
    ids: IdInterner,
    /// Indexed by interned berth id
    timelines: Vec<OccupancyTimeline>,
}

impl BerthRunState {
    /// Create state for the given berths.
    ///
    /// Returns the offending identifier if two berths share one.
    pub fn new(berths: &[Berth]) -> Result<Self, String> {
        let mut ids = IdInterner::with_capacity(berths.len());
        let mut timelines = Vec::with_capacity(berths.len());
        for berth in berths {
            if ids.intern_unique(&berth.id).is_none() {
                return Err(berth.id.clone());
            }
            timelines.push(OccupancyTimeline::new(berth.id.clone()));
        }
        Ok(Self { ids, timelines })
    }

    /// Interned id for a berth identifier.
    #[inline]
    pub fn berth_int(&self, berth_id: &str) -> Option<IdInt> {
        self.ids.get(berth_id)
    }

    /// When the berth next becomes free (`NaiveDateTime::MIN` if never used).
    pub fn next_free(&self, berth: IdInt) -> NaiveDateTime {
        self.timelines
            .get(berth as usize)
            .map(|t| t.next_free())
            .unwrap_or(NaiveDateTime::MIN)
    }

    /// Occupy a berth for `[etb, etd)` and advance its next-free time to `etd`.
    ///
    /// Fails with the conflicting period if the window is not free or would
    /// move the berth's next-free time backward.
    pub fn commit(
        &mut self,
        berth: IdInt,
        etb: NaiveDateTime,
        etd: NaiveDateTime,
    ) -> Result<(), (NaiveDateTime, NaiveDateTime)> {
        let Some(timeline) = self.timelines.get_mut(berth as usize) else {
            return Err((etb, etd));
        };
        let previous = timeline.next_free();
        if etd < previous {
            return Err((previous, previous));
        }
        timeline.add_busy_period(etb, etd)
    }
}
