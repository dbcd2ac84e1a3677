//! Core entities shared across components, per the data model.
//!
//! Cyclic references (Order <-> ExecutionEvent <-> OrderGroup) are resolved with
//! id references rather than intrusive back-pointers: events hold `order_id`,
//! orders hold `order_group_id`, groups hold a list of shadow order ids. Lookups
//! go through the Order Store rather than following pointers directly.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// FIX session role. An Acceptor runs the drop-copy side; an Initiator runs
/// order-entry (and, for the primary alias, the short-locate negotiation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionRole {
    Initiator,
    Acceptor,
}

/// Identity for session lookup: (role, BeginString, SenderCompID, TargetCompID, qualifier?).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub role: SessionRole,
    pub begin_string: String,
    pub sender_comp_id: String,
    pub target_comp_id: String,
    pub qualifier: Option<String>,
}

impl SessionKey {
    pub fn new(
        role: SessionRole,
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
        qualifier: Option<String>,
    ) -> Self {
        Self {
            role,
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            qualifier,
        }
    }

    /// True if `alias` matches this key's sender, target, or qualifier, case-insensitively.
    pub fn matches_alias(&self, alias: &str) -> bool {
        self.sender_comp_id.eq_ignore_ascii_case(alias)
            || self.target_comp_id.eq_ignore_ascii_case(alias)
            || self
                .qualifier
                .as_deref()
                .is_some_and(|q| q.eq_ignore_ascii_case(alias))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Created,
    LoggedOn,
    LoggedOut,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub status: SessionStatus,
    pub next_sender_seq: u32,
    pub next_target_seq: u32,
    pub heartbeat_seconds: u16,
}

impl SessionState {
    pub fn created(heartbeat_seconds: u16) -> Self {
        Self {
            status: SessionStatus::Created,
            next_sender_seq: 1,
            next_target_seq: 1,
            heartbeat_seconds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecType {
    New,
    PartialFill,
    Fill,
    Canceled,
    Replaced,
    /// OrdStatus=B, locate confirmed.
    LocateConfirmed,
    Rejected,
}

impl ExecType {
    /// Maps a FIX tag 150 (ExecType) code; OrdStatus=B (Calculated) is folded in
    /// here as `LocateConfirmed` since that's the only status this engine treats
    /// specially outside the standard fill lifecycle.
    pub fn from_fix_code(exec_type_code: &str, ord_status_code: &str) -> Option<Self> {
        if ord_status_code == "B" {
            return Some(ExecType::LocateConfirmed);
        }
        match exec_type_code {
            "0" => Some(ExecType::New),
            "1" => Some(ExecType::PartialFill),
            "2" => Some(ExecType::Fill),
            "4" => Some(ExecType::Canceled),
            "5" => Some(ExecType::Replaced),
            "8" => Some(ExecType::Rejected),
            _ => None,
        }
    }

    pub fn to_fix_code(self) -> &'static str {
        match self {
            ExecType::New => "0",
            ExecType::PartialFill => "1",
            ExecType::Fill => "2",
            ExecType::Canceled => "4",
            ExecType::Replaced => "5",
            ExecType::Rejected => "8",
            ExecType::LocateConfirmed => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
    SellShort,
    SellShortExempt,
}

impl Side {
    pub fn is_short(self) -> bool {
        matches!(self, Side::SellShort | Side::SellShortExempt)
    }

    pub fn to_fix_code(self) -> &'static str {
        match self {
            Side::Buy => "1",
            Side::Sell => "2",
            Side::SellShort => "5",
            Side::SellShortExempt => "6",
        }
    }

    pub fn from_fix_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Side::Buy),
            "2" => Some(Side::Sell),
            "5" => Some(Side::SellShort),
            "6" => Some(Side::SellShortExempt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrdType {
    Market,
    Limit,
    StopLoss,
    StopLimit,
    Pegged,
    LimitOnClose,
}

impl OrdType {
    /// Whether a Price field should be present on the wire for this order type.
    pub fn carries_price(self) -> bool {
        matches!(
            self,
            OrdType::Limit | OrdType::StopLimit | OrdType::Pegged | OrdType::LimitOnClose
        )
    }

    /// Whether a StopPx field should be present on the wire for this order type.
    pub fn carries_stop_px(self) -> bool {
        matches!(self, OrdType::StopLoss | OrdType::StopLimit)
    }

    pub fn to_fix_code(self) -> &'static str {
        match self {
            OrdType::Market => "1",
            OrdType::Limit => "2",
            OrdType::StopLoss => "3",
            OrdType::StopLimit => "4",
            OrdType::LimitOnClose => "B",
            OrdType::Pegged => "P",
        }
    }

    pub fn from_fix_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(OrdType::Market),
            "2" => Some(OrdType::Limit),
            "3" => Some(OrdType::StopLoss),
            "4" => Some(OrdType::StopLimit),
            "B" => Some(OrdType::LimitOnClose),
            "P" => Some(OrdType::Pegged),
            _ => None,
        }
    }

    /// OrdType resolution when an inbound event lacks an explicit OrdType:
    /// Price set -> Limit; StopPx set -> StopLoss; else Market.
    pub fn resolve(price: Option<Decimal>, stop_px: Option<Decimal>) -> Self {
        if price.is_some() {
            OrdType::Limit
        } else if stop_px.is_some() {
            OrdType::StopLoss
        } else {
            OrdType::Market
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    Day,
    Gtc,
    Ioc,
    Fok,
}

impl TimeInForce {
    pub fn to_fix_code(self) -> &'static str {
        match self {
            TimeInForce::Day => "0",
            TimeInForce::Gtc => "1",
            TimeInForce::Ioc => "3",
            TimeInForce::Fok => "4",
        }
    }

    pub fn from_fix_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(TimeInForce::Day),
            "1" => Some(TimeInForce::Gtc),
            "3" => Some(TimeInForce::Ioc),
            "4" => Some(TimeInForce::Fok),
            _ => None,
        }
    }
}

/// An immutable, append-only execution report. Duplicate delivery (same `exec_id`)
/// is silently ignored by the Order Store (invariant 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionEvent {
    pub exec_id: String,
    pub order_id: String,
    pub cl_ord_id: Option<String>,
    pub orig_cl_ord_id: Option<String>,
    pub exec_type: ExecType,
    pub ord_status: String,
    pub symbol: String,
    pub side: Side,
    pub ord_type: Option<OrdType>,
    pub time_in_force: Option<TimeInForce>,
    pub order_qty: Decimal,
    pub last_qty: Option<Decimal>,
    pub last_px: Option<Decimal>,
    pub cum_qty: Decimal,
    pub leaves_qty: Decimal,
    pub avg_px: Option<Decimal>,
    pub price: Option<Decimal>,
    pub stop_px: Option<Decimal>,
    pub account: Option<String>,
    pub transact_time: DateTime<Utc>,
    pub session_key: SessionKey,
    pub raw_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MirrorState {
    Unmirrored,
    Mirrored,
}

/// Derived order state, rebuilt from the most recent matching `ExecutionEvent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Option<String>,
    pub cl_ord_id: Option<String>,
    pub orig_cl_ord_id: Option<String>,
    pub account: String,
    pub order_group_id: Option<String>,
    pub exec_type: Option<ExecType>,
    pub ord_status: Option<String>,
    pub cum_qty: Decimal,
    pub leaves_qty: Decimal,
    pub avg_px: Option<Decimal>,
    pub last_px: Option<Decimal>,
    pub last_qty: Option<Decimal>,
    pub order_qty: Decimal,
    pub symbol: String,
    pub side: Side,
    pub is_primary: bool,
    pub is_shadow: bool,
    /// Shadow-only: true while a draft order (no ClOrdID assigned yet) awaits a locate.
    pub draft: bool,
    pub mirror_state: MirrorState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new_primary(account: impl Into<String>, symbol: impl Into<String>, side: Side, order_qty: Decimal) -> Self {
        let now = Utc::now();
        Self {
            order_id: None,
            cl_ord_id: None,
            orig_cl_ord_id: None,
            account: account.into(),
            order_group_id: None,
            exec_type: None,
            ord_status: None,
            cum_qty: Decimal::ZERO,
            leaves_qty: order_qty,
            avg_px: None,
            last_px: None,
            last_qty: None,
            order_qty,
            symbol: symbol.into(),
            side,
            is_primary: true,
            is_shadow: false,
            draft: false,
            mirror_state: MirrorState::Unmirrored,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn new_shadow_draft(account: impl Into<String>, symbol: impl Into<String>, side: Side, order_qty: Decimal) -> Self {
        let now = Utc::now();
        Self {
            order_id: None,
            cl_ord_id: None,
            orig_cl_ord_id: None,
            account: account.into(),
            order_group_id: None,
            exec_type: None,
            ord_status: None,
            cum_qty: Decimal::ZERO,
            leaves_qty: order_qty,
            avg_px: None,
            last_px: None,
            last_qty: None,
            order_qty,
            symbol: symbol.into(),
            side,
            is_primary: false,
            is_shadow: true,
            draft: true,
            mirror_state: MirrorState::Unmirrored,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Groups a primary order with its shadow mirrors for operational reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderGroup {
    pub strategy_key: String,
    pub primary_order_id: String,
    pub shadow_order_ids: Vec<String>,
    pub target_qty: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocateStatus {
    Pending,
    ApprovedFull,
    ApprovedPartial,
    Rejected,
    Expired,
    Cancelled,
}

impl LocateStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, LocateStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocateRequest {
    pub id: String,
    pub primary_order_id: String,
    pub account: String,
    pub symbol: String,
    pub quantity: Decimal,
    pub status: LocateStatus,
    pub quote_req_id: String,
    pub locate_route: Option<String>,
    pub offer_px: Option<Decimal>,
    pub offer_size: Option<Decimal>,
    pub approved_qty: Option<Decimal>,
    pub response_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocateRequest {
    pub fn new(
        id: impl Into<String>,
        primary_order_id: impl Into<String>,
        account: impl Into<String>,
        symbol: impl Into<String>,
        quantity: Decimal,
        quote_req_id: impl Into<String>,
        locate_route: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            primary_order_id: primary_order_id.into(),
            account: account.into(),
            symbol: symbol.into(),
            quantity,
            status: LocateStatus::Pending,
            quote_req_id: quote_req_id.into(),
            locate_route,
            offer_px: None,
            offer_size: None,
            approved_qty: None,
            response_text: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Outcome delivered to whoever registered a [`crate::domain::locate_coordinator::PendingLocate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocateOutcome {
    pub approved: bool,
    pub approved_qty: Option<Decimal>,
    pub locate_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderTypeFilter {
    Any,
    LimitOnly,
    MarketOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyRule {
    pub primary_account_id: String,
    pub shadow_account_id: String,
    pub ratio: Decimal,
    pub min_qty: Option<Decimal>,
    pub max_qty: Option<Decimal>,
    pub order_type_filter: OrderTypeFilter,
    pub copy_route: Option<String>,
    pub locate_route: Option<String>,
    pub priority: i32,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Primary,
    Shadow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub number: String,
    pub kind: AccountKind,
    pub strategy_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    pub locate_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_matches_alias_case_insensitively() {
        let key = SessionKey::new(
            SessionRole::Initiator,
            "FIX.4.2",
            "GATEWAY",
            "SHADOW1",
            Some("Q1".to_string()),
        );
        assert!(key.matches_alias("shadow1"));
        assert!(key.matches_alias("q1"));
        assert!(!key.matches_alias("shadow2"));
    }

    #[test]
    fn ord_type_field_policy() {
        assert!(OrdType::Limit.carries_price());
        assert!(!OrdType::Limit.carries_stop_px());
        assert!(OrdType::StopLimit.carries_price());
        assert!(OrdType::StopLimit.carries_stop_px());
        assert!(!OrdType::Market.carries_price());
        assert!(!OrdType::Market.carries_stop_px());
    }

    #[test]
    fn locate_status_terminal_check() {
        assert!(!LocateStatus::Pending.is_terminal());
        assert!(LocateStatus::ApprovedFull.is_terminal());
        assert!(LocateStatus::Expired.is_terminal());
    }
}
