//! Fixed-scale decimal arithmetic and identifier generation shared across components.
//!
//! All monetary/quantity fields in this crate are `rust_decimal::Decimal` at a fixed
//! scale of 8, matching the financial-correctness requirement that allocation and
//! replication math never lose precision to floating point.

use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Canonical scale used for all quantities and prices handled by this engine.
pub const SCALE: u32 = 8;

/// Truncates (never rounds up) `value` to [`SCALE`] decimal places.
///
/// Used by the Allocation Engine so that per-shadow quantities never sum to more
/// than the approved locate size; any remainder is carried by the last recipient.
pub fn floor8(value: Decimal) -> Decimal {
    value.trunc_with_scale(SCALE)
}

/// Rounds `value` to [`SCALE`] decimal places using banker's rounding.
///
/// Used wherever a quantity or price is persisted or emitted but isn't subject to
/// the floor/carry allocation rule.
pub fn round8(value: Decimal) -> Decimal {
    value.round_dp(SCALE)
}

/// Monotonically increasing identifier source, used wherever the spec calls for a
/// "fresh" value (e.g. in-process fallback ids). Backed by an `AtomicU64` rather
/// than a mutex since the only operation is fetch-and-increment.
#[derive(Debug, Default)]
pub struct SequenceId(AtomicU64);

impl SequenceId {
    pub const fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// Maximum length a ClOrdID may have on the wire (invariant 8).
const CL_ORD_ID_MAX_LEN: usize = 19;

/// Builds a mirrored ClOrdID from `shadow`, `source` (the primary order id) and a
/// one-character `action` tag ("N" new, "R" replace, "C" cancel), truncating from
/// the front so the most recent (rightmost) characters survive if the full id
/// would exceed [`CL_ORD_ID_MAX_LEN`].
pub fn generate_mirror_cl_ord_id(prefix: &str, action: &str, shadow: &str, source: &str) -> String {
    let base = format!("{prefix}{action}-{shadow}-{source}");
    if base.len() > CL_ORD_ID_MAX_LEN {
        let start = base.len() - CL_ORD_ID_MAX_LEN;
        base[start..].to_string()
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn floor8_truncates_without_rounding_up() {
        assert_eq!(floor8(dec!(1.123456789)), dec!(1.12345678));
        assert_eq!(floor8(dec!(1.999999999)), dec!(1.99999999));
    }

    #[test]
    fn round8_rounds_to_nearest() {
        assert_eq!(round8(dec!(1.123456785)), dec!(1.12345678));
    }

    #[test]
    fn mirror_cl_ord_id_within_limit_is_returned_whole() {
        let id = generate_mirror_cl_ord_id("MIRROR-", "N", "S1", "O1");
        assert_eq!(id, "MIRROR-N-S1-O1");
        assert!(id.len() <= 19);
    }

    #[test]
    fn mirror_cl_ord_id_over_limit_is_truncated_to_19_from_the_front() {
        let id = generate_mirror_cl_ord_id("MIRROR-", "R", "SHADOW-ACCOUNT-7", "PRIMARY-ORDER-99999");
        assert_eq!(id.len(), 19);
        assert!(id.ends_with("99999"));
    }

    #[test]
    fn mirror_cl_ord_id_is_deterministic() {
        let a = generate_mirror_cl_ord_id("MIRROR-", "N", "S1", "O1");
        let b = generate_mirror_cl_ord_id("MIRROR-", "N", "S1", "O1");
        assert_eq!(a, b);
    }

    #[test]
    fn sequence_id_increments_monotonically() {
        let seq = SequenceId::new();
        let a = seq.next();
        let b = seq.next();
        assert!(b > a);
    }
}
