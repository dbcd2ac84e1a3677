//! Sequence Controller (C5): role-specific sequence-reset and
//! re-synchronisation policy, hooked into the FIX admin callbacks (C11).
//!
//! Kept as pure decision logic operating on plain inputs/outputs rather than a
//! live FIX session, so the scenarios in the spec's testable-properties
//! section can be asserted directly without a socket.

use super::trading_hours::TradingHoursGuard;
use crate::fix::SendDecision;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("sequence number in text could not be parsed: {0}")]
    UnparseableSequenceText(String),
}

/// What the Sequence Controller wants done with the outbound Logon for the
/// order-entry initiator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatorLogonPlan {
    pub decision: SendDecision,
    pub reset_seq_num_flag: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// `toAdmin` for the initiator's outbound Logon: always resets sequence
/// numbers; suppressed entirely while the Trading-Hours Guard disallows
/// connection.
pub fn plan_initiator_logon(
    guard: &TradingHoursGuard,
    username: Option<String>,
    password: Option<String>,
) -> InitiatorLogonPlan {
    let decision = if guard.is_connection_allowed() {
        SendDecision::Send
    } else {
        SendDecision::Suppress("trading hours guard disallows connection".to_string())
    };
    InitiatorLogonPlan { decision, reset_seq_num_flag: true, username, password }
}

/// `fromAdmin` for the initiator's inbound Logon: if the peer's sequence
/// number differs from what we expected, adopt theirs rather than requesting
/// a resend (the drop-copy peer is authoritative; see edge-case policy).
pub fn reconcile_initiator_logon(expected_target_seq: u32, incoming_seq: u32) -> u32 {
    if incoming_seq != expected_target_seq {
        tracing::warn!(expected_target_seq, incoming_seq, "initiator logon sequence mismatch, adopting peer value");
    }
    incoming_seq
}

/// Drop-copy acceptor logon reconciliation (invariant 7): at the first logon
/// of a new calendar day both sides reset to 1; otherwise the peer's incoming
/// sequence number is adopted for both sides since the peer is authoritative.
pub fn reconcile_drop_copy_logon(incoming_seq: u32) -> (u32, u32) {
    if incoming_seq == 1 {
        (1, 1)
    } else {
        (incoming_seq, incoming_seq)
    }
}

/// A SequenceReset admin message with GapFill=false resets both sides to 1.
pub fn apply_sequence_reset(gap_fill_flag: bool) -> Option<(u32, u32)> {
    if gap_fill_flag {
        None
    } else {
        Some((1, 1))
    }
}

/// Whether `now` is the first logon of a new calendar day relative to
/// `last_reset_at`, used by `onCreate` to decide whether to force a
/// new-calendar-day sequence reset on the drop-copy acceptor.
pub fn is_new_trading_day(last_reset_at: Option<DateTime<Utc>>, now: DateTime<Utc>, zone: chrono_tz::Tz) -> bool {
    match last_reset_at {
        None => true,
        Some(last) => last.with_timezone(&zone).date_naive() != now.with_timezone(&zone).date_naive(),
    }
}

/// Case-insensitive detection of a broker's "not a trading day" Logout text.
pub fn is_not_trading_day_text(text: &str) -> bool {
    let lowered = text.to_ascii_lowercase();
    lowered.contains("not trade day") || lowered.contains("not a trading day") || lowered.contains("non-trading day")
}

/// Extracts an explicit sequence number from Logout text such as
/// "resync seq 42" when it mentions "seq"/"sequence" alongside a number.
pub fn extract_sequence_from_text(text: &str) -> Option<u32> {
    let lowered = text.to_ascii_lowercase();
    if !lowered.contains("seq") {
        return None;
    }
    lowered.split(|c: char| !c.is_ascii_digit()).find_map(|tok| tok.parse::<u32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading_hours::TradingHoursConfig;
    use chrono::TimeZone;

    #[test]
    fn drop_copy_logon_with_seq_one_resets_both_sides() {
        assert_eq!(reconcile_drop_copy_logon(1), (1, 1));
    }

    #[test]
    fn drop_copy_logon_with_other_seq_adopts_peer_value() {
        assert_eq!(reconcile_drop_copy_logon(42), (42, 42));
    }

    #[test]
    fn sequence_reset_with_gap_fill_false_resets_to_one() {
        assert_eq!(apply_sequence_reset(false), Some((1, 1)));
    }

    #[test]
    fn sequence_reset_with_gap_fill_true_is_a_noop() {
        assert_eq!(apply_sequence_reset(true), None);
    }

    #[test]
    fn initiator_logon_is_suppressed_outside_trading_hours() {
        let guard = TradingHoursGuard::new(TradingHoursConfig::default());
        let now = chrono_tz::America::New_York
            .with_ymd_and_hms(2026, 1, 2, 2, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        guard.mark_not_trading_day_at(now, "test");
        let plan = plan_initiator_logon(&guard, None, None);
        assert!(matches!(plan.decision, SendDecision::Suppress(_)));
        assert!(plan.reset_seq_num_flag);
    }

    #[test]
    fn not_trading_day_text_detection_is_case_insensitive() {
        assert!(is_not_trading_day_text("Not Trade Day"));
        assert!(is_not_trading_day_text("NOT A TRADING DAY - closed"));
        assert!(!is_not_trading_day_text("session reset"));
    }

    #[test]
    fn extract_sequence_from_text_finds_embedded_number() {
        assert_eq!(extract_sequence_from_text("resync seq 42 please"), Some(42));
        assert_eq!(extract_sequence_from_text("no numbers here"), None);
    }
}
