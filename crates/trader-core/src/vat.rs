//! # VAT Allocator
//!
//! Splits one blended amount (a shipping cost, an order-level discount)
//! across VAT-rate buckets in proportion to each bucket's weight.
//!
//! ## Why Not Round Each Bucket?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shipping 500 over lines: 21% → 2000, 6% → 1000, 12% → 1000            │
//! │                                                                         │
//! │  Naive:     500 × 2/4 = 250.0 → 250                                    │
//! │             500 × 1/4 = 125.0 → 125                                    │
//! │             500 × 1/4 = 125.0 → 125          Σ = 500 ✓ (lucky)         │
//! │                                                                         │
//! │  Shipping 100 over 3 equal buckets:                                     │
//! │  Naive:     33.3 → 33, 33.3 → 33, 33.3 → 33  Σ = 99  ❌ lost a cent    │
//! │                                                                         │
//! │  Allocator: every bucket but one is rounded half-up, the bucket with   │
//! │  the largest weight (ties: highest rate) takes what is left:           │
//! │             33, 33, 34                       Σ = 100 ✓ always          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Edge Cases
//! - Buckets with the same rate are merged before allocating.
//! - Buckets with a zero or negative weight take no part.
//! - No positive weight at all: the whole amount lands on the fallback rate
//!   (the configured standard rate, or 0% for a VAT-exempt order).

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::VatPercentage;

// =============================================================================
// Types
// =============================================================================

/// One input bucket: the weight (pre-discount subtotal) carried by a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationBucket {
    pub vat: VatPercentage,
    pub weight: Money,
}

impl AllocationBucket {
    pub fn new(vat: VatPercentage, weight: Money) -> Self {
        AllocationBucket { vat, weight }
    }
}

/// One output share: the part of the total assigned to a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub vat: VatPercentage,
    pub amount: Money,
}

// =============================================================================
// Allocator
// =============================================================================

/// Sum-preserving proportional allocator.
#[derive(Debug, Clone, Copy)]
pub struct VatAllocator {
    fallback: VatPercentage,
}

impl VatAllocator {
    /// Creates an allocator that falls back to `fallback` when there is no
    /// weight to distribute over.
    pub fn new(fallback: VatPercentage) -> Self {
        VatAllocator { fallback }
    }

    pub fn fallback(&self) -> VatPercentage {
        self.fallback
    }

    /// Distributes `total` over `buckets`.
    ///
    /// The result is sorted by ascending rate and its amounts sum to `total`
    /// exactly.
    ///
    /// ## Errors
    /// `RoundingInvariantViolation` if the shares do not add up, which can
    /// only happen through a bug here.
    pub fn allocate(
        &self,
        total: Money,
        buckets: &[AllocationBucket],
    ) -> CoreResult<Vec<Allocation>> {
        let mut weights: BTreeMap<VatPercentage, Money> = BTreeMap::new();
        for bucket in buckets.iter().filter(|b| b.weight.is_positive()) {
            *weights.entry(bucket.vat).or_default() += bucket.weight;
        }

        if weights.is_empty() {
            return Ok(vec![Allocation {
                vat: self.fallback,
                amount: total,
            }]);
        }

        let total_weight: Money = weights.values().sum();

        // Iterating in ascending rate order with `>=` lets the highest rate
        // win a tie on weight.
        let mut residual_vat = self.fallback;
        let mut max_weight = Money::zero();
        for (vat, weight) in &weights {
            if *weight >= max_weight {
                max_weight = *weight;
                residual_vat = *vat;
            }
        }

        let mut allocations = Vec::with_capacity(weights.len());
        let mut distributed = Money::zero();
        for (vat, weight) in &weights {
            if *vat == residual_vat {
                continue;
            }
            let share = total.proportion_of(*weight, total_weight);
            distributed += share;
            allocations.push(Allocation {
                vat: *vat,
                amount: share,
            });
        }
        allocations.push(Allocation {
            vat: residual_vat,
            amount: total - distributed,
        });
        allocations.sort_by(|a, b| a.vat.cmp(&b.vat));

        let allocated: Money = allocations.iter().map(|a| a.amount).sum();
        if allocated != total {
            tracing::error!(
                expected = total.cents(),
                actual = allocated.cents(),
                "VAT allocation does not add up"
            );
            return Err(CoreError::RoundingInvariantViolation {
                expected: total.cents(),
                actual: allocated.cents(),
            });
        }

        Ok(allocations)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bucket(rate: u32, weight: i64) -> AllocationBucket {
        AllocationBucket::new(VatPercentage::from_whole(rate), Money::from_cents(weight))
    }

    fn amounts(allocations: &[Allocation]) -> Vec<(String, i64)> {
        allocations
            .iter()
            .map(|a| (a.vat.to_string(), a.amount.cents()))
            .collect()
    }

    #[test]
    fn test_two_rates_residual_to_larger_weight() {
        let allocator = VatAllocator::new(VatPercentage::from_whole(21));
        // 21% carries 2000, 6% carries 1000: 500 × 1/3 = 166.67 → 167
        let result = allocator
            .allocate(Money::from_cents(500), &[bucket(21, 2000), bucket(6, 1000)])
            .unwrap();
        assert_eq!(
            amounts(&result),
            vec![("6%".to_string(), 167), ("21%".to_string(), 333)]
        );
    }

    #[test]
    fn test_equal_weights_tie_goes_to_highest_rate() {
        let allocator = VatAllocator::new(VatPercentage::from_whole(21));
        let result = allocator
            .allocate(
                Money::from_cents(100),
                &[bucket(6, 1000), bucket(12, 1000), bucket(21, 1000)],
            )
            .unwrap();
        assert_eq!(
            amounts(&result),
            vec![
                ("6%".to_string(), 33),
                ("12%".to_string(), 33),
                ("21%".to_string(), 34)
            ]
        );
    }

    #[test]
    fn test_same_rate_buckets_are_merged() {
        let allocator = VatAllocator::new(VatPercentage::from_whole(21));
        let result = allocator
            .allocate(Money::from_cents(300), &[bucket(21, 100), bucket(21, 200)])
            .unwrap();
        assert_eq!(amounts(&result), vec![("21%".to_string(), 300)]);
    }

    #[test]
    fn test_zero_weight_uses_fallback_rate() {
        let allocator = VatAllocator::new(VatPercentage::from_whole(21));
        let result = allocator.allocate(Money::from_cents(500), &[]).unwrap();
        assert_eq!(amounts(&result), vec![("21%".to_string(), 500)]);

        let result = allocator
            .allocate(Money::from_cents(500), &[bucket(6, 0)])
            .unwrap();
        assert_eq!(amounts(&result), vec![("21%".to_string(), 500)]);
    }

    #[test]
    fn test_zero_total() {
        let allocator = VatAllocator::new(VatPercentage::from_whole(21));
        let result = allocator
            .allocate(Money::zero(), &[bucket(6, 1000), bucket(21, 500)])
            .unwrap();
        assert!(result.iter().all(|a| a.amount.is_zero()));
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

        #[test]
        fn prop_allocation_sums_to_total(
            total in 0i64..5_000_000,
            weights in prop::collection::vec((0u32..=25, 1i64..1_000_000), 1..8),
        ) {
            let allocator = VatAllocator::new(VatPercentage::from_whole(21));
            let buckets: Vec<AllocationBucket> =
                weights.iter().map(|(rate, weight)| bucket(*rate, *weight)).collect();
            let result = allocator.allocate(Money::from_cents(total), &buckets).unwrap();

            let sum: Money = result.iter().map(|a| a.amount).sum();
            prop_assert_eq!(sum, Money::from_cents(total));

            let rates: Vec<VatPercentage> = result.iter().map(|a| a.vat).collect();
            let mut sorted = rates.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(rates, sorted);
        }
    }
}
