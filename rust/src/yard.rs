//! Greedy yard slot allocation.
//!
//! Demand is poured into blocks in listing order: each block takes as much as it
//! can hold, and whatever is left after the last block lands on a single
//! overflow record. No block type or distance is considered.

use thiserror::Error;

use crate::config::YardConfig;
use crate::log_changes;
use crate::models::{YardAllocation, YardBlock};

/// Errors that can occur during yard allocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum YardError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No yard blocks supplied")]
    EmptyResourceSet,
}

/// Derive a slot demand from an expected move count.
///
/// This is caller policy: the ratio comes from `YardConfig::demand_ratio`.
pub fn yard_demand(total_moves: u64, config: &YardConfig) -> f64 {
    total_moves as f64 * config.demand_ratio
}

/// Allocate a fractional demand, rounding it once before allocation.
///
/// Rounding up front (instead of per block) keeps the allocation total equal to
/// the rounded demand with no drift.
pub fn allocate_demand(
    blocks: &[YardBlock],
    demand: f64,
    config: &YardConfig,
) -> Result<Vec<YardAllocation>, YardError> {
    if !demand.is_finite() || demand < 0.0 {
        return Err(YardError::InvalidInput(format!(
            "demand must be a non-negative number, got {}",
            demand
        )));
    }
    allocate(blocks, demand.round() as i64, config)
}

/// Distribute `demand` slots over `blocks` in listing order.
///
/// The returned records sum to `demand` exactly. The last record is the
/// overflow sentinel whenever total block capacity is short.
pub fn allocate(
    blocks: &[YardBlock],
    demand: i64,
    config: &YardConfig,
) -> Result<Vec<YardAllocation>, YardError> {
    if blocks.is_empty() {
        return Err(YardError::EmptyResourceSet);
    }
    if demand < 0 {
        return Err(YardError::InvalidInput(format!(
            "demand must be non-negative, got {}",
            demand
        )));
    }

    let verbosity = config.verbosity;
    let mut remaining = demand as u64;
    let mut out: Vec<YardAllocation> = Vec::new();

    for block in blocks {
        if remaining == 0 {
            break;
        }
        let take = u64::from(block.slots).min(remaining);
        if take == 0 {
            continue;
        }
        remaining -= take;
        log_changes!(verbosity, "  Yard {} takes {} slots", block.id, take);
        out.push(YardAllocation {
            block_id: block.id.clone(),
            slots: take,
            category: block.category.clone(),
            is_overflow: false,
        });
    }

    if remaining > 0 {
        log_changes!(
            verbosity,
            "  Yard overflow: {} slots unmet after {} blocks",
            remaining,
            blocks.len()
        );
        out.push(YardAllocation {
            block_id: config.overflow_block.clone(),
            slots: remaining,
            category: Some(config.overflow_category.clone()),
            is_overflow: true,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str, slots: u32) -> YardBlock {
        YardBlock {
            id: id.to_string(),
            category: Some("IMP".to_string()),
            slots,
        }
    }

    fn total(allocations: &[YardAllocation]) -> u64 {
        allocations.iter().map(|a| a.slots).sum()
    }

    #[test]
    fn test_overflow_absorbs_remainder() {
        let blocks = vec![block("X", 800), block("Y", 500)];
        let out = allocate(&blocks, 2000, &YardConfig::default()).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!((out[0].block_id.as_str(), out[0].slots), ("X", 800));
        assert_eq!((out[1].block_id.as_str(), out[1].slots), ("Y", 500));
        assert_eq!(out[2].block_id, "(overflow)");
        assert_eq!(out[2].slots, 700);
        assert!(out[2].is_overflow);
        assert_eq!(out[2].category.as_deref(), Some("IMP"));
    }

    #[test]
    fn test_first_listed_blocks_fill_first() {
        let blocks = vec![block("A", 300), block("B", 1000), block("C", 1000)];
        let out = allocate(&blocks, 500, &YardConfig::default()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].slots, 300);
        assert_eq!(out[1].block_id, "B");
        assert_eq!(out[1].slots, 200);
    }

    #[test]
    fn test_zero_capacity_blocks_skipped() {
        let blocks = vec![block("full", 0), block("open", 100)];
        let out = allocate(&blocks, 50, &YardConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].block_id, "open");
    }

    #[test]
    fn test_zero_demand_is_empty_success() {
        let out = allocate(&[block("A", 10)], 0, &YardConfig::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            allocate(&[], 10, &YardConfig::default()).unwrap_err(),
            YardError::EmptyResourceSet
        );
        assert!(matches!(
            allocate(&[block("A", 10)], -1, &YardConfig::default()),
            Err(YardError::InvalidInput(_))
        ));
        assert!(matches!(
            allocate_demand(&[block("A", 10)], f64::NAN, &YardConfig::default()),
            Err(YardError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_demand_conservation() {
        let blocks = vec![block("A", 120), block("B", 0), block("C", 75), block("D", 300)];
        for demand in [0i64, 1, 119, 120, 195, 494, 495, 496, 10_000] {
            let out = allocate(&blocks, demand, &YardConfig::default()).unwrap();
            assert_eq!(total(&out), demand as u64, "demand {}", demand);
            assert!(out.iter().filter(|a| a.is_overflow).count() <= 1);
        }
    }

    #[test]
    fn test_fractional_demand_rounded_once() {
        let config = YardConfig::default();
        let demand = yard_demand(2001, &config);
        assert_eq!(demand, 1000.5);
        let out = allocate_demand(&[block("A", 333), block("B", 333)], demand, &config).unwrap();
        // 1000.5 rounds half away from zero
        assert_eq!(total(&out), 1001);
        assert_eq!(out.last().unwrap().slots, 1001 - 666);
    }

    #[test]
    fn test_custom_overflow_identity() {
        let config = YardConfig {
            overflow_block: "OVF".to_string(),
            overflow_category: "EXP".to_string(),
            ..YardConfig::default()
        };
        let out = allocate(&[block("A", 1)], 3, &config).unwrap();
        assert_eq!(out[1].block_id, "OVF");
        assert_eq!(out[1].category.as_deref(), Some("EXP"));
    }
}
