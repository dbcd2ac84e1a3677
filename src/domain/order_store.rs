//! Order Store (C6): idempotent event ingestion, derived order state, and
//! order-group membership.

use super::models::{ExecutionEvent, MirrorState, Order, OrderGroup};
use crate::ports::OrderRepository;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-order-id mutex guarding the mirrored-flag/currentClOrdId mutation so
/// events for a single `primaryOrderId` are processed in arrival order
/// (concurrency model, "Ordering guarantees").
#[derive(Default)]
struct OrderLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl OrderLocks {
    async fn lock_for(&self, order_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(order_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

pub struct OrderStore<R: OrderRepository + ?Sized> {
    repo: Arc<R>,
    locks: OrderLocks,
}

impl<R: OrderRepository + ?Sized> OrderStore<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo, locks: OrderLocks::default() }
    }

    /// `recordEvent`: idempotent by `exec_id`. On a genuinely new event, derives
    /// the updated `Order` and assigns/joins an `OrderGroup` when the account is
    /// primary and a strategy key resolves. The returned `bool` is `true` only
    /// when this call actually inserted a new event; callers must use it to
    /// short-circuit any action that should not repeat on a duplicate delivery
    /// (e.g. a FIX resend of an already-processed execution).
    pub async fn record_event(&self, event: ExecutionEvent, strategy_key: Option<String>) -> Result<(Order, bool)> {
        let per_order_lock = self.locks.lock_for(&event.order_id).await;
        let _guard = per_order_lock.lock().await;

        let inserted = self.repo.insert_event_if_new(&event).await?;
        let existing = self.repo.find_order_by_order_id(&event.order_id).await?;

        if !inserted {
            // Duplicate delivery: return the order state as it stands, no mutation.
            if let Some(order) = existing {
                return Ok((order, false));
            }
        }

        let mut order = existing.unwrap_or_else(|| {
            Order::new_primary(
                event.account.clone().unwrap_or_default(),
                event.symbol.clone(),
                event.side,
                event.order_qty,
            )
        });

        order.order_id = Some(event.order_id.clone());
        if event.cl_ord_id.is_some() {
            order.cl_ord_id = event.cl_ord_id.clone();
        }
        if event.orig_cl_ord_id.is_some() {
            order.orig_cl_ord_id = event.orig_cl_ord_id.clone();
        }
        order.exec_type = Some(event.exec_type);
        order.ord_status = Some(event.ord_status.clone());
        order.cum_qty = event.cum_qty;
        order.leaves_qty = event.leaves_qty;
        order.avg_px = event.avg_px.or(order.avg_px);
        order.last_px = event.last_px.or(order.last_px);
        order.last_qty = event.last_qty.or(order.last_qty);
        order.updated_at = chrono::Utc::now();

        if let Some(strategy_key) = strategy_key {
            if order.order_group_id.is_none() {
                if self.repo.find_order_group(&strategy_key).await?.is_none() {
                    self.repo
                        .create_order_group(&OrderGroup {
                            strategy_key: strategy_key.clone(),
                            primary_order_id: event.order_id.clone(),
                            shadow_order_ids: Vec::new(),
                            target_qty: event.order_qty,
                            created_at: chrono::Utc::now(),
                        })
                        .await?;
                }
                order.order_group_id = Some(strategy_key);
            }
        }

        self.repo.upsert_order(&order).await?;
        Ok((order, inserted))
    }

    pub async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Order>> {
        self.repo.find_order_by_order_id(order_id).await
    }

    pub async fn find_by_cl_ord_id(&self, cl_ord_id: &str) -> Result<Option<Order>> {
        self.repo.find_order_by_cl_ord_id(cl_ord_id).await
    }

    /// Creates a shadow draft (no ClOrdID yet) linked to the primary's order
    /// group, used while a short-locate is pending.
    pub async fn create_shadow_draft(
        &self,
        account: &str,
        symbol: &str,
        side: super::models::Side,
        qty: rust_decimal::Decimal,
        strategy_key: &str,
    ) -> Result<Order> {
        let mut draft = Order::new_shadow_draft(account, symbol, side, qty);
        draft.order_group_id = Some(strategy_key.to_string());
        self.repo.upsert_order(&draft).await?;
        Ok(draft)
    }

    /// `promoteDraft`: assigns the ClOrdID and marks the order `New`.
    pub async fn promote_draft(&self, mut draft: Order, assigned_cl_ord_id: String) -> Result<Order> {
        draft.cl_ord_id = Some(assigned_cl_ord_id);
        draft.draft = false;
        draft.mirror_state = MirrorState::Mirrored;
        draft.updated_at = chrono::Utc::now();
        self.repo.upsert_order(&draft).await?;
        Ok(draft)
    }

    /// Records a shadow order as a member of its primary's order group, once
    /// its ClOrdID is known (the group's `shadow_order_ids`).
    pub async fn link_shadow_to_group(&self, strategy_key: &str, shadow_order_id: &str) -> Result<()> {
        self.repo.add_shadow_to_group(strategy_key, shadow_order_id).await
    }

    /// `strategyKey = account.strategyKey ?? "PRIMARY_<accountNumber>"`.
    pub fn resolve_strategy_key(account_strategy_key: Option<&str>, account_number: &str) -> String {
        account_strategy_key.map(str::to_string).unwrap_or_else(|| format!("PRIMARY_{account_number}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{SessionKey, SessionRole, Side};
    use crate::ports::MockOrderRepository;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn sample_event(exec_id: &str) -> ExecutionEvent {
        ExecutionEvent {
            exec_id: exec_id.to_string(),
            order_id: "O1".to_string(),
            cl_ord_id: Some("P-1".to_string()),
            orig_cl_ord_id: None,
            exec_type: super::super::models::ExecType::New,
            ord_status: "0".to_string(),
            symbol: "ACME".to_string(),
            side: Side::Buy,
            ord_type: None,
            time_in_force: None,
            order_qty: dec!(100),
            last_qty: None,
            last_px: None,
            cum_qty: dec!(0),
            leaves_qty: dec!(100),
            avg_px: None,
            price: Some(dec!(10.00)),
            stop_px: None,
            account: Some("P".to_string()),
            transact_time: Utc::now(),
            session_key: SessionKey::new(SessionRole::Acceptor, "FIX.4.2", "BROKER", "GATEWAY", None),
            raw_message: String::new(),
        }
    }

    #[tokio::test]
    async fn record_event_is_idempotent_by_exec_id() {
        use std::sync::Mutex as StdMutex;

        let seen_exec_ids = Arc::new(StdMutex::new(Vec::<String>::new()));
        let stored_order = Arc::new(StdMutex::new(None::<Order>));

        let mut repo = MockOrderRepository::new();

        let seen_for_insert = seen_exec_ids.clone();
        repo.expect_insert_event_if_new().returning(move |event| {
            let mut seen = seen_for_insert.lock().unwrap();
            if seen.contains(&event.exec_id) {
                Ok(false)
            } else {
                seen.push(event.exec_id.clone());
                Ok(true)
            }
        });

        let stored_for_find = stored_order.clone();
        repo.expect_find_order_by_order_id().returning(move |_| Ok(stored_for_find.lock().unwrap().clone()));

        repo.expect_find_order_group().returning(|_| Ok(None));
        repo.expect_create_order_group().returning(|_| Ok(()));

        let stored_for_upsert = stored_order.clone();
        repo.expect_upsert_order().times(1).returning(move |order| {
            *stored_for_upsert.lock().unwrap() = Some(order.clone());
            Ok(())
        });

        let store = OrderStore::new(Arc::new(repo));
        let event = sample_event("EXEC1");

        let (order1, inserted1) = store.record_event(event.clone(), Some("PRIMARY_P".to_string())).await.unwrap();
        let (order2, inserted2) = store.record_event(event, Some("PRIMARY_P".to_string())).await.unwrap();

        assert_eq!(order1.order_id, order2.order_id);
        assert!(inserted1);
        assert!(!inserted2);
    }

    #[test]
    fn resolve_strategy_key_falls_back_to_primary_prefix() {
        assert_eq!(OrderStore::<MockOrderRepository>::resolve_strategy_key(None, "12345"), "PRIMARY_12345");
        assert_eq!(
            OrderStore::<MockOrderRepository>::resolve_strategy_key(Some("ALPHA"), "12345"),
            "ALPHA"
        );
    }
}
