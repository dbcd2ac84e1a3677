//! Trait boundaries between the domain components (C1-C12) and their
//! concrete infrastructure: persistence (`src/persistence`) and the outbound
//! FIX session (`src/session_manager`). Every trait here is `#[automock]`-able
//! so component tests can supply fakes instead of a real `SqlitePool` or live
//! socket, matching the pattern in the port definitions this crate was
//! bootstrapped from.

use crate::domain::models::{Account, CopyRule, ExecutionEvent, LocateRequest, LocateStatus, Order, OrderGroup, Route};
use crate::fix::OutboundMessage;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence for execution events and the derived order/order-group state
/// backing the Order Store (C6).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts the event if `exec_id` hasn't been seen before. Returns `true`
    /// when this call actually inserted a new row (invariant 1).
    async fn insert_event_if_new(&self, event: &ExecutionEvent) -> Result<bool>;
    async fn upsert_order(&self, order: &Order) -> Result<()>;
    async fn find_order_by_order_id(&self, order_id: &str) -> Result<Option<Order>>;
    async fn find_order_by_cl_ord_id(&self, cl_ord_id: &str) -> Result<Option<Order>>;
    async fn find_order_group(&self, strategy_key: &str) -> Result<Option<OrderGroup>>;
    async fn create_order_group(&self, group: &OrderGroup) -> Result<()>;
    async fn add_shadow_to_group(&self, strategy_key: &str, shadow_order_id: &str) -> Result<()>;
}

/// Persistence for short-locate negotiation state (C7/C8).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocateRepository: Send + Sync {
    async fn insert(&self, request: &LocateRequest) -> Result<()>;
    async fn find_by_quote_req_id(&self, quote_req_id: &str) -> Result<Option<LocateRequest>>;
    async fn find_by_primary_order_id(&self, primary_order_id: &str) -> Result<Option<LocateRequest>>;
    async fn update_status(
        &self,
        id: &str,
        status: LocateStatus,
        offer_px: Option<rust_decimal::Decimal>,
        offer_size: Option<rust_decimal::Decimal>,
        approved_qty: Option<rust_decimal::Decimal>,
        response_text: Option<String>,
    ) -> Result<()>;
    /// Returns all requests still `Pending` with `created_at` older than `cutoff`,
    /// for the locate-expiry sweep.
    async fn find_pending_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<LocateRequest>>;
}

/// Read access to copy rules, routes, and accounts (backs the C12 caches'
/// `refresh()` and any cache-miss fallback).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    async fn list_active_copy_rules(&self) -> Result<Vec<CopyRule>>;
    async fn list_accounts(&self) -> Result<Vec<Account>>;
    async fn list_routes(&self) -> Result<Vec<Route>>;
}

/// Per-session sequence number persistence for the drop-copy acceptor
/// (invariant 7: order-entry sequences reset on logon and are never persisted).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionSequenceRepository: Send + Sync {
    async fn load(&self, session_key: &str) -> Result<Option<(u32, u32)>>;
    async fn save(&self, session_key: &str, next_sender_seq: u32, next_target_seq: u32) -> Result<()>;
}

/// Outbound send capability for a logged-on FIX session, as seen by the
/// domain components (C8 locate flow, C10 replication). The concrete sender
/// lives behind the Session Manager so components never touch a live socket
/// directly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FixSender: Send + Sync {
    /// Sends `msg` on the initiator session identified by `session_alias`
    /// (a SenderCompID/TargetCompID/qualifier). Returns `Ok(false)` if no
    /// logged-on session matches the alias (send is skipped, not retried).
    async fn send(&self, session_alias: &str, msg: OutboundMessage) -> Result<bool>;
}
