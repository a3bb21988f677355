//! Berth occupancy tracking with sorted, non-overlapping busy periods.

use chrono::NaiveDateTime;

/// Tracks occupancy of one berth as half-open `[start, end)` intervals.
///
/// Maintains the invariant that `busy_periods` is sorted by start and contains
/// no overlapping periods. Back-to-back periods (one ends exactly when the next
/// starts) are kept separate so each vessel call stays visible.
#[derive(Clone, Debug)]
pub struct OccupancyTimeline {
    /// Berth identifier (for diagnostics)
    pub berth_id: String,
    /// Sorted list of (start, end) busy periods
    pub busy_periods: Vec<(NaiveDateTime, NaiveDateTime)>,
}

impl OccupancyTimeline {
    pub fn new(berth_id: String) -> Self {
        Self {
            berth_id,
            busy_periods: Vec::new(),
        }
    }

    /// Earliest instant after every recorded period.
    ///
    /// A berth that has never been occupied is free since `NaiveDateTime::MIN`.
    pub fn next_free(&self) -> NaiveDateTime {
        self.busy_periods
            .last()
            .map(|(_, end)| *end)
            .unwrap_or(NaiveDateTime::MIN)
    }

    /// Find the first busy period overlapping `[start, end)`.
    ///
    /// Uses binary search for O(log n) lookup.
    pub fn find_conflict(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<(NaiveDateTime, NaiveDateTime)> {
        // Leftmost period that ends after our start
        let idx = self.busy_periods.partition_point(|(_, e)| *e <= start);
        match self.busy_periods.get(idx) {
            Some(&(s, e)) if s < end => Some((s, e)),
            _ => None,
        }
    }

    /// Record a busy period.
    ///
    /// Returns the conflicting period if `[start, end)` overlaps an existing one;
    /// the timeline is left unchanged in that case.
    pub fn add_busy_period(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<(), (NaiveDateTime, NaiveDateTime)> {
        if let Some(conflict) = self.find_conflict(start, end) {
            return Err(conflict);
        }
        let idx = self.busy_periods.partition_point(|(s, _)| *s < start);
        self.busy_periods.insert(idx, (start, end));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_empty_timeline_is_always_free() {
        let timeline = OccupancyTimeline::new("B1".to_string());
        assert_eq!(timeline.next_free(), NaiveDateTime::MIN);
        assert_eq!(timeline.find_conflict(t(1, 0), t(2, 0)), None);
    }

    #[test]
    fn test_next_free_is_last_end() {
        let mut timeline = OccupancyTimeline::new("B1".to_string());
        timeline.add_busy_period(t(1, 0), t(1, 8)).unwrap();
        timeline.add_busy_period(t(1, 8), t(1, 20)).unwrap();
        assert_eq!(timeline.next_free(), t(1, 20));
        assert_eq!(timeline.busy_periods.len(), 2);
    }

    #[test]
    fn test_back_to_back_periods_do_not_conflict() {
        let mut timeline = OccupancyTimeline::new("B1".to_string());
        timeline.add_busy_period(t(2, 0), t(2, 8)).unwrap();
        assert_eq!(timeline.find_conflict(t(2, 8), t(2, 12)), None);
        assert_eq!(timeline.find_conflict(t(1, 20), t(2, 0)), None);
    }

    #[test]
    fn test_overlap_is_rejected() {
        let mut timeline = OccupancyTimeline::new("B1".to_string());
        timeline.add_busy_period(t(1, 0), t(1, 8)).unwrap();
        let err = timeline.add_busy_period(t(1, 7), t(1, 10)).unwrap_err();
        assert_eq!(err, (t(1, 0), t(1, 8)));
        assert_eq!(timeline.busy_periods.len(), 1);
    }

    #[test]
    fn test_out_of_order_insert_keeps_sorted() {
        let mut timeline = OccupancyTimeline::new("B1".to_string());
        timeline.add_busy_period(t(3, 0), t(3, 8)).unwrap();
        timeline.add_busy_period(t(1, 0), t(1, 8)).unwrap();
        timeline.add_busy_period(t(2, 0), t(2, 8)).unwrap();
        let starts: Vec<_> = timeline.busy_periods.iter().map(|(s, _)| *s).collect();
        assert_eq!(starts, vec![t(1, 0), t(2, 0), t(3, 0)]);
        assert!(timeline.find_conflict(t(2, 4), t(2, 5)).is_some());
        assert_eq!(timeline.find_conflict(t(2, 8), t(3, 0)), None);
    }
}
