//! Allocation Engine (C9): computes per-shadow-account quantities from an
//! approved locate.
//!
//! Pure decision logic over plain inputs, grounded on the same "testable
//! without a live session" style as [`super::sequence_controller`].

use crate::decimal::floor8;
use rust_decimal::Decimal;

/// A shadow's desired quantity, keyed by an opaque id (the shadow draft's
/// order id) so the caller can map allocations back to drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowDemand {
    pub shadow_id: String,
    pub desired_qty: Decimal,
}

/// One shadow's computed allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowAllocation {
    pub shadow_id: String,
    pub allocated_qty: Decimal,
}

/// Computes `shadow_avail = max(0, approved_qty - primary_qty)` and then
/// distributes it across `demands` in their given (stable insertion) order:
///
/// - if `shadow_avail == 0` or the demands sum to zero, every shadow gets 0.
/// - if `shadow_avail >= sum(demands)`, each shadow gets its desired quantity
///   in full.
/// - otherwise each shadow but the last gets `floor8(shadow_avail * d_i / sum)`;
///   the last shadow absorbs the remainder so the total exactly conserves
///   `shadow_avail` (never going negative).
pub fn allocate(primary_qty: Decimal, approved_qty: Decimal, demands: &[ShadowDemand]) -> Vec<ShadowAllocation> {
    let shadow_avail = (approved_qty - primary_qty).max(Decimal::ZERO);
    let total_demand: Decimal = demands.iter().map(|d| d.desired_qty).sum();

    if demands.is_empty() {
        return Vec::new();
    }

    if shadow_avail == Decimal::ZERO || total_demand == Decimal::ZERO {
        return demands.iter().map(|d| ShadowAllocation { shadow_id: d.shadow_id.clone(), allocated_qty: Decimal::ZERO }).collect();
    }

    if shadow_avail >= total_demand {
        return demands
            .iter()
            .map(|d| ShadowAllocation { shadow_id: d.shadow_id.clone(), allocated_qty: d.desired_qty })
            .collect();
    }

    let mut allocations = Vec::with_capacity(demands.len());
    let mut allocated_so_far = Decimal::ZERO;
    for demand in &demands[..demands.len() - 1] {
        let share = floor8(shadow_avail * demand.desired_qty / total_demand);
        allocated_so_far += share;
        allocations.push(ShadowAllocation { shadow_id: demand.shadow_id.clone(), allocated_qty: share });
    }
    let last = &demands[demands.len() - 1];
    let remainder = (shadow_avail - allocated_so_far).max(Decimal::ZERO);
    allocations.push(ShadowAllocation { shadow_id: last.shadow_id.clone(), allocated_qty: remainder });
    allocations
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn demand(id: &str, qty: Decimal) -> ShadowDemand {
        ShadowDemand { shadow_id: id.to_string(), desired_qty: qty }
    }

    #[test]
    fn no_shadow_avail_yields_zero_for_everyone() {
        let allocations = allocate(dec!(200), dec!(120), &[demand("S1", dec!(100))]);
        assert_eq!(allocations, vec![ShadowAllocation { shadow_id: "S1".to_string(), allocated_qty: Decimal::ZERO }]);
    }

    #[test]
    fn full_coverage_when_shadow_avail_exceeds_total_demand() {
        let demands = vec![demand("S1", dec!(30)), demand("S2", dec!(70))];
        let allocations = allocate(dec!(0), dec!(200), &demands);
        assert_eq!(allocations[0].allocated_qty, dec!(30));
        assert_eq!(allocations[1].allocated_qty, dec!(70));
    }

    #[test]
    fn proportional_allocation_conserves_total_via_last_recipient_carry() {
        let demands = vec![demand("S1", dec!(30)), demand("S2", dec!(70))];
        // shadow_avail = 50, total demand = 100: S1 gets floor8(50*30/100)=15, S2 carries the rest.
        let allocations = allocate(dec!(0), dec!(50), &demands);
        assert_eq!(allocations[0].allocated_qty, dec!(15));
        assert_eq!(allocations[1].allocated_qty, dec!(35));
        let total: Decimal = allocations.iter().map(|a| a.allocated_qty).sum();
        assert_eq!(total, dec!(50));
    }

    #[test]
    fn zero_total_demand_yields_zero_allocations() {
        let demands = vec![demand("S1", Decimal::ZERO)];
        let allocations = allocate(dec!(0), dec!(100), &demands);
        assert_eq!(allocations[0].allocated_qty, Decimal::ZERO);
    }

    #[test]
    fn empty_demands_yields_empty_allocations() {
        assert!(allocate(dec!(0), dec!(100), &[]).is_empty());
    }

    #[test]
    fn allocations_never_exceed_shadow_avail() {
        let demands = vec![demand("S1", dec!(7)), demand("S2", dec!(11)), demand("S3", dec!(13))];
        for approved in [dec!(1), dec!(5), dec!(10), dec!(31), dec!(100)] {
            let allocations = allocate(dec!(0), approved, &demands);
            let total: Decimal = allocations.iter().map(|a| a.allocated_qty).sum();
            assert!(total <= approved.max(Decimal::ZERO));
            assert!(allocations.iter().all(|a| a.allocated_qty >= Decimal::ZERO));
        }
    }
}
