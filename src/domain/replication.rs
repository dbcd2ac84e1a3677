//! Replication Engine (C10): applies drop-copy events observed on the primary
//! account to shadow sessions, building and emitting mirrored new/replace/
//! cancel orders with de-duplication and idempotency.

use super::allocation::{allocate, ShadowDemand};
use super::caches::{AccountCache, CopyRuleCache, RouteCache};
use super::locate_coordinator::LocateCoordinator;
use super::locate_machine::LocateStateMachine;
use super::models::{CopyRule, ExecType, ExecutionEvent, Order, OrdType, OrderTypeFilter, Side};
use super::order_store::OrderStore;
use crate::decimal::generate_mirror_cl_ord_id;
use crate::fix::message::{NewOrderSingle, OrderCancelRequest, OrderCancelReplaceRequest};
use crate::fix::OutboundMessage;
use crate::ports::{FixSender, LocateRepository, OrderRepository};
use anyhow::Result;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Per-(primaryOrderId, shadowAccountId) mirror bookkeeping: the Mirrored
/// latch (invariant 2) and the chain of emitted ClOrdIDs (invariant 3).
#[derive(Default)]
struct MirrorState {
    mirrored_primaries: HashSet<String>,
    current_cl_ord_id: HashMap<(String, String), String>,
}

/// Routes a shadow account id to the FIX session alias used to send to it.
/// Kept as a small trait rather than a bare closure so the bootstrap layer
/// can supply whatever resolution it wants (alias == senderCompId by default).
pub trait ShadowAliasResolver: Send + Sync {
    fn alias_for(&self, shadow_account_id: &str) -> String;
}

pub struct IdentityAliasResolver;
impl ShadowAliasResolver for IdentityAliasResolver {
    fn alias_for(&self, shadow_account_id: &str) -> String {
        shadow_account_id.to_string()
    }
}

pub struct ReplicationEngine<OR: OrderRepository + ?Sized, LR: LocateRepository + ?Sized, S: FixSender + ?Sized> {
    order_store: Arc<OrderStore<OR>>,
    locate_machine: Arc<LocateStateMachine<LR, S>>,
    coordinator: LocateCoordinator,
    copy_rules: CopyRuleCache,
    accounts: AccountCache,
    routes: RouteCache,
    sender: Arc<S>,
    alias_resolver: Arc<dyn ShadowAliasResolver>,
    primary_account_number: String,
    cl_ord_id_prefix: String,
    locate_timeout: Duration,
    state: Mutex<MirrorState>,
}

impl<OR: OrderRepository + ?Sized, LR: LocateRepository + ?Sized, S: FixSender + ?Sized> ReplicationEngine<OR, LR, S> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_store: Arc<OrderStore<OR>>,
        locate_machine: Arc<LocateStateMachine<LR, S>>,
        coordinator: LocateCoordinator,
        copy_rules: CopyRuleCache,
        accounts: AccountCache,
        routes: RouteCache,
        sender: Arc<S>,
        alias_resolver: Arc<dyn ShadowAliasResolver>,
        primary_account_number: impl Into<String>,
        cl_ord_id_prefix: impl Into<String>,
        locate_timeout: Duration,
    ) -> Self {
        Self {
            order_store,
            locate_machine,
            coordinator,
            copy_rules,
            accounts,
            routes,
            sender,
            alias_resolver,
            primary_account_number: primary_account_number.into(),
            cl_ord_id_prefix: cl_ord_id_prefix.into(),
            locate_timeout,
            state: Mutex::new(MirrorState::default()),
        }
    }

    /// Entry point: dispatches on `event.exec_type`, applying only to events
    /// observed on the configured primary account (the caller is expected to
    /// have already filtered by drop-copy source session).
    pub async fn apply(&self, event: &ExecutionEvent) -> Result<()> {
        if event.account.as_deref() != Some(self.primary_account_number.as_str()) {
            return Ok(());
        }
        match event.exec_type {
            ExecType::New => self.handle_new(event).await,
            ExecType::Replaced => self.handle_replace(event).await,
            ExecType::Canceled => self.handle_cancel(event).await,
            _ => Ok(()),
        }
    }

    async fn handle_new(&self, event: &ExecutionEvent) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if !state.mirrored_primaries.insert(event.order_id.clone()) {
                // Already mirrored: late duplicate New is silently ignored (invariant 2).
                return Ok(());
            }
        }

        let rules = self.copy_rules.find_for_primary(
            &self.primary_account_number,
            order_type_filter_for(event.ord_type),
            event.order_qty,
        );
        if rules.is_empty() {
            return Ok(());
        }

        if event.side.is_short() {
            self.handle_short_sell_new(event, rules).await
        } else {
            self.handle_plain_new(event, rules).await
        }
    }

    async fn handle_plain_new(&self, event: &ExecutionEvent, rules: Vec<CopyRule>) -> Result<()> {
        let strategy_key = OrderStore::<OR>::resolve_strategy_key(None, &self.primary_account_number);
        for rule in rules {
            if let Err(err) = self.emit_mirrored_new(event, &rule, event.order_qty * rule.ratio, &strategy_key).await {
                tracing::warn!(shadow = %rule.shadow_account_id, error = %err, "failed to send mirrored new order, skipping this shadow");
            }
        }
        Ok(())
    }

    async fn handle_short_sell_new(&self, event: &ExecutionEvent, rules: Vec<CopyRule>) -> Result<()> {
        let strategy_key = OrderStore::<OR>::resolve_strategy_key(None, &self.primary_account_number);
        // Preserves the copy-rule cache's stable priority order (Vec, not a
        // HashMap) so the allocation engine's last-recipient carry is
        // deterministic across calls (spec's allocation ordering invariant).
        let mut draft_by_shadow: Vec<(String, (Order, CopyRule))> = Vec::with_capacity(rules.len());
        for rule in &rules {
            let Some(shadow) = self.accounts.find_by_id(&rule.shadow_account_id) else { continue };
            let desired_qty = event.order_qty * rule.ratio;
            let draft = self
                .order_store
                .create_shadow_draft(&shadow.number, &event.symbol, event.side, desired_qty, &strategy_key)
                .await?;
            draft_by_shadow.push((rule.shadow_account_id.clone(), (draft, rule.clone())));
        }

        let locate_route = rules.first().and_then(|r| r.locate_route.clone());
        let mut outcome_rx = match self
            .locate_machine
            .start(&event.order_id, &self.primary_account_number, &event.symbol, event.order_qty, locate_route)
            .await
        {
            Ok(rx) => rx,
            Err(err) => {
                tracing::warn!(order_id = %event.order_id, error = %err, "short-locate request failed, shadow drafts left unsent");
                return Ok(());
            }
        };

        let Ok(outcome) = (&mut outcome_rx).await else {
            tracing::warn!(order_id = %event.order_id, "locate coordinator dropped without an outcome");
            return Ok(());
        };

        if !outcome.approved {
            tracing::info!(order_id = %event.order_id, message = ?outcome.message, "short-locate not approved, shadow drafts left unsent");
            return Ok(());
        }
        let approved_qty = outcome.approved_qty.unwrap_or_default();

        let demands: Vec<ShadowDemand> = draft_by_shadow
            .iter()
            .map(|(shadow_id, (draft, _))| ShadowDemand { shadow_id: shadow_id.clone(), desired_qty: draft.order_qty })
            .collect();
        let allocations = allocate(event.order_qty, approved_qty, &demands);

        for allocation in allocations {
            if allocation.allocated_qty <= rust_decimal::Decimal::ZERO {
                continue;
            }
            let Some(index) = draft_by_shadow.iter().position(|(id, _)| *id == allocation.shadow_id) else { continue };
            let (_, (draft, rule)) = draft_by_shadow.remove(index);
            let mut promoted = draft.clone();
            promoted.order_qty = allocation.allocated_qty;
            promoted.leaves_qty = allocation.allocated_qty;

            let cl_ord_id = generate_mirror_cl_ord_id(&self.cl_ord_id_prefix, "N", &rule.shadow_account_id, &event.order_id);
            if let Err(err) = self.send_new(event, &rule, &promoted, &cl_ord_id).await {
                tracing::warn!(shadow = %rule.shadow_account_id, error = %err, "failed to send short-sell shadow order, skipping");
                continue;
            }
            self.order_store.promote_draft(promoted, cl_ord_id.clone()).await?;
            self.order_store.link_shadow_to_group(&strategy_key, &cl_ord_id).await?;
            self.remember_current_cl_ord_id(&rule.shadow_account_id, &event.order_id, cl_ord_id).await;
        }
        Ok(())
    }

    async fn emit_mirrored_new(&self, event: &ExecutionEvent, rule: &CopyRule, qty: rust_decimal::Decimal, strategy_key: &str) -> Result<()> {
        let Some(shadow) = self.accounts.find_by_id(&rule.shadow_account_id) else {
            tracing::warn!(shadow = %rule.shadow_account_id, "copy rule references unknown shadow account, skipping");
            return Ok(());
        };
        let draft = self
            .order_store
            .create_shadow_draft(&shadow.number, &event.symbol, event.side, qty, strategy_key)
            .await?;
        let cl_ord_id = generate_mirror_cl_ord_id(&self.cl_ord_id_prefix, "N", &rule.shadow_account_id, &event.order_id);
        self.send_new(event, rule, &draft, &cl_ord_id).await?;
        self.order_store.promote_draft(draft, cl_ord_id.clone()).await?;
        self.order_store.link_shadow_to_group(strategy_key, &cl_ord_id).await?;
        self.remember_current_cl_ord_id(&rule.shadow_account_id, &event.order_id, cl_ord_id).await;
        Ok(())
    }

    async fn send_new(&self, event: &ExecutionEvent, rule: &CopyRule, shadow_order: &Order, cl_ord_id: &str) -> Result<()> {
        let ord_type = event.ord_type.unwrap_or_else(|| OrdType::resolve(event.price, event.stop_px));
        let ex_destination = self.resolve_route(rule.copy_route.as_deref(), None);
        let alias = self.alias_resolver.alias_for(&rule.shadow_account_id);

        let sent = self
            .sender
            .send(
                &alias,
                OutboundMessage::NewOrderSingle(NewOrderSingle {
                    cl_ord_id: cl_ord_id.to_string(),
                    symbol: event.symbol.clone(),
                    side: event.side,
                    transact_time: Utc::now(),
                    ord_type,
                    order_qty: shadow_order.order_qty,
                    price: if ord_type.carries_price() { event.price } else { None },
                    stop_px: if ord_type.carries_stop_px() { event.stop_px } else { None },
                    time_in_force: event.time_in_force.unwrap_or(super::models::TimeInForce::Day),
                    account: shadow_order.account.clone(),
                    ex_destination,
                }),
            )
            .await?;
        if !sent {
            anyhow::bail!("no logged-on session for alias {alias}");
        }
        Ok(())
    }

    async fn handle_replace(&self, event: &ExecutionEvent) -> Result<()> {
        let rules = self.copy_rules.find_for_primary(&self.primary_account_number, OrderTypeFilter::Any, event.order_qty);
        for rule in rules {
            let Some(orig) = self.current_cl_ord_id(&rule.shadow_account_id, &event.order_id).await else {
                tracing::warn!(shadow = %rule.shadow_account_id, order_id = %event.order_id, "no currentClOrdId for replace, skipping");
                continue;
            };
            let Some(shadow) = self.accounts.find_by_id(&rule.shadow_account_id) else { continue };
            let new_cl_ord_id = generate_mirror_cl_ord_id(&self.cl_ord_id_prefix, "R", &rule.shadow_account_id, &event.order_id);
            let ord_type = event.ord_type.unwrap_or_else(|| OrdType::resolve(event.price, event.stop_px));
            let alias = self.alias_resolver.alias_for(&rule.shadow_account_id);

            let sent = self
                .sender
                .send(
                    &alias,
                    OutboundMessage::OrderCancelReplaceRequest(OrderCancelReplaceRequest {
                        orig_cl_ord_id: orig,
                        cl_ord_id: new_cl_ord_id.clone(),
                        symbol: event.symbol.clone(),
                        side: event.side,
                        transact_time: Utc::now(),
                        ord_type,
                        order_qty: event.order_qty * rule.ratio,
                        price: if ord_type.carries_price() { event.price } else { None },
                        stop_px: if ord_type.carries_stop_px() { event.stop_px } else { None },
                        time_in_force: event.time_in_force.unwrap_or(super::models::TimeInForce::Day),
                        account: shadow.number,
                        ex_destination: self.resolve_route(rule.copy_route.as_deref(), None),
                    }),
                )
                .await;
            match sent {
                Ok(true) => self.remember_current_cl_ord_id(&rule.shadow_account_id, &event.order_id, new_cl_ord_id).await,
                Ok(false) => tracing::warn!(shadow = %rule.shadow_account_id, "no logged-on session, skipping replace"),
                Err(err) => tracing::warn!(shadow = %rule.shadow_account_id, error = %err, "replace send failed, skipping"),
            }
        }
        Ok(())
    }

    async fn handle_cancel(&self, event: &ExecutionEvent) -> Result<()> {
        let rules = self.copy_rules.find_for_primary(&self.primary_account_number, OrderTypeFilter::Any, event.order_qty);
        for rule in rules {
            let Some(orig) = self.current_cl_ord_id(&rule.shadow_account_id, &event.order_id).await else {
                tracing::warn!(shadow = %rule.shadow_account_id, order_id = %event.order_id, "no currentClOrdId for cancel, skipping");
                continue;
            };
            let Some(shadow) = self.accounts.find_by_id(&rule.shadow_account_id) else { continue };
            let new_cl_ord_id = generate_mirror_cl_ord_id(&self.cl_ord_id_prefix, "C", &rule.shadow_account_id, &event.order_id);
            let alias = self.alias_resolver.alias_for(&rule.shadow_account_id);

            let sent = self
                .sender
                .send(
                    &alias,
                    OutboundMessage::OrderCancelRequest(OrderCancelRequest {
                        orig_cl_ord_id: orig,
                        cl_ord_id: new_cl_ord_id,
                        symbol: event.symbol.clone(),
                        side: event.side,
                        transact_time: Utc::now(),
                        account: shadow.number,
                    }),
                )
                .await;
            match sent {
                Ok(true) => self.forget_current_cl_ord_id(&rule.shadow_account_id, &event.order_id).await,
                Ok(false) => tracing::warn!(shadow = %rule.shadow_account_id, "no logged-on session, skipping cancel"),
                Err(err) => tracing::warn!(shadow = %rule.shadow_account_id, error = %err, "cancel send failed, skipping"),
            }
        }
        Ok(())
    }

    /// Resolves a configured route name to the `ExDestination` value to send,
    /// validating it against the route cache. An unconfigured name is dropped
    /// (logged, `ExDestination` omitted) rather than forwarded blind, since
    /// sending to a destination nothing configured is worse than sending with
    /// none and routing on the counterparty's default.
    fn resolve_route(&self, copy_route: Option<&str>, fallback: Option<&str>) -> Option<String> {
        let name = copy_route.or(fallback)?;
        match self.routes.find(name) {
            Some(route) => Some(route.name),
            None => {
                tracing::warn!(route = name, "copy rule references unknown route, omitting ExDestination");
                None
            }
        }
    }

    async fn remember_current_cl_ord_id(&self, shadow_account_id: &str, primary_order_id: &str, cl_ord_id: String) {
        let mut state = self.state.lock().await;
        state.current_cl_ord_id.insert((shadow_account_id.to_string(), primary_order_id.to_string()), cl_ord_id);
    }

    async fn current_cl_ord_id(&self, shadow_account_id: &str, primary_order_id: &str) -> Option<String> {
        self.state.lock().await.current_cl_ord_id.get(&(shadow_account_id.to_string(), primary_order_id.to_string())).cloned()
    }

    async fn forget_current_cl_ord_id(&self, shadow_account_id: &str, primary_order_id: &str) {
        self.state.lock().await.current_cl_ord_id.remove(&(shadow_account_id.to_string(), primary_order_id.to_string()));
    }
}

fn order_type_filter_for(ord_type: Option<OrdType>) -> OrderTypeFilter {
    match ord_type {
        Some(OrdType::Limit) => OrderTypeFilter::LimitOnly,
        Some(OrdType::Market) => OrderTypeFilter::MarketOnly,
        _ => OrderTypeFilter::Any,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Account, AccountKind, SessionKey, SessionRole};
    use crate::ports::{MockConfigRepository, MockFixSender, MockLocateRepository, MockOrderRepository};
    use rust_decimal_macros::dec;
    use std::sync::Mutex as StdMutex;

    fn sample_event(order_id: &str, exec_type: ExecType, side: Side) -> ExecutionEvent {
        ExecutionEvent {
            exec_id: format!("EXEC-{order_id}"),
            order_id: order_id.to_string(),
            cl_ord_id: Some("P-1".to_string()),
            orig_cl_ord_id: None,
            exec_type,
            ord_status: "0".to_string(),
            symbol: "ACME".to_string(),
            side,
            ord_type: Some(OrdType::Limit),
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

    fn one_to_one_rule() -> CopyRule {
        CopyRule {
            primary_account_id: "P".to_string(),
            shadow_account_id: "S".to_string(),
            ratio: dec!(1),
            min_qty: None,
            max_qty: None,
            order_type_filter: OrderTypeFilter::Any,
            copy_route: None,
            locate_route: None,
            priority: 1,
            active: true,
        }
    }

    async fn populated_caches() -> (CopyRuleCache, AccountCache, RouteCache) {
        let mut config_repo = MockConfigRepository::new();
        config_repo.expect_list_active_copy_rules().returning(|| Ok(vec![one_to_one_rule()]));
        config_repo.expect_list_accounts().returning(|| {
            Ok(vec![Account { id: "S".to_string(), number: "SHADOW1".to_string(), kind: AccountKind::Shadow, strategy_key: None }])
        });
        config_repo.expect_list_routes().returning(|| Ok(vec![]));

        let copy_rules = CopyRuleCache::new();
        copy_rules.refresh(&config_repo).await.unwrap();
        let accounts = AccountCache::new();
        accounts.refresh(&config_repo).await.unwrap();
        let routes = RouteCache::new();
        routes.refresh(&config_repo).await.unwrap();
        (copy_rules, accounts, routes)
    }

    fn order_store() -> Arc<OrderStore<MockOrderRepository>> {
        let mut repo = MockOrderRepository::new();
        repo.expect_upsert_order().returning(|_| Ok(()));
        repo.expect_add_shadow_to_group().returning(|_, _| Ok(()));
        Arc::new(OrderStore::new(Arc::new(repo)))
    }

    fn locate_machine() -> Arc<LocateStateMachine<MockLocateRepository, MockFixSender>> {
        Arc::new(LocateStateMachine::new(
            Arc::new(MockLocateRepository::new()),
            Arc::new(MockFixSender::new()),
            LocateCoordinator::new(),
            "GATEWAY",
            "MIRROR-",
            Duration::from_secs(30),
        ))
    }

    #[tokio::test]
    async fn new_event_emits_exactly_one_mirrored_order_per_shadow() {
        let (copy_rules, accounts, routes) = populated_caches().await;
        let sent_count = Arc::new(StdMutex::new(0u32));
        let sent_count_clone = sent_count.clone();
        let mut sender = MockFixSender::new();
        sender.expect_send().returning(move |_, _| {
            *sent_count_clone.lock().unwrap() += 1;
            Ok(true)
        });

        let engine = ReplicationEngine::new(
            order_store(),
            locate_machine(),
            LocateCoordinator::new(),
            copy_rules,
            accounts,
            routes,
            Arc::new(sender),
            Arc::new(IdentityAliasResolver),
            "P",
            "MIRROR-",
            Duration::from_secs(30),
        );

        let event = sample_event("O1", ExecType::New, Side::Buy);
        engine.apply(&event).await.unwrap();
        engine.apply(&event).await.unwrap();

        assert_eq!(*sent_count.lock().unwrap(), 1, "duplicate New must not emit a second mirrored order");
    }

    #[tokio::test]
    async fn replace_without_prior_new_is_skipped_not_errored() {
        let (copy_rules, accounts, routes) = populated_caches().await;
        let sender = MockFixSender::new();

        let engine = ReplicationEngine::new(
            order_store(),
            locate_machine(),
            LocateCoordinator::new(),
            copy_rules,
            accounts,
            routes,
            Arc::new(sender),
            Arc::new(IdentityAliasResolver),
            "P",
            "MIRROR-",
            Duration::from_secs(30),
        );

        let event = sample_event("O1", ExecType::Replaced, Side::Buy);
        engine.apply(&event).await.unwrap();
    }

    #[tokio::test]
    async fn replace_cascade_chains_orig_cl_ord_id_to_prior_cl_ord_id() {
        let (copy_rules, accounts, routes) = populated_caches().await;
        let captured = Arc::new(StdMutex::new(Vec::<OutboundMessage>::new()));
        let captured_clone = captured.clone();
        let mut sender = MockFixSender::new();
        sender.expect_send().returning(move |_, msg| {
            captured_clone.lock().unwrap().push(msg);
            Ok(true)
        });

        let engine = ReplicationEngine::new(
            order_store(),
            locate_machine(),
            LocateCoordinator::new(),
            copy_rules,
            accounts,
            routes,
            Arc::new(sender),
            Arc::new(IdentityAliasResolver),
            "P",
            "MIRROR-",
            Duration::from_secs(30),
        );

        engine.apply(&sample_event("O1", ExecType::New, Side::Buy)).await.unwrap();
        let mut replace_event = sample_event("O1", ExecType::Replaced, Side::Buy);
        replace_event.order_qty = dec!(150);
        replace_event.price = Some(dec!(10.25));
        engine.apply(&replace_event).await.unwrap();

        let messages = captured.lock().unwrap();
        assert_eq!(messages.len(), 2);
        let new_cl_ord_id = match &messages[0] {
            OutboundMessage::NewOrderSingle(n) => n.cl_ord_id.clone(),
            _ => panic!("expected NewOrderSingle"),
        };
        match &messages[1] {
            OutboundMessage::OrderCancelReplaceRequest(r) => {
                assert_eq!(r.orig_cl_ord_id, new_cl_ord_id);
                assert_eq!(r.order_qty, dec!(150));
            }
            _ => panic!("expected OrderCancelReplaceRequest"),
        }
    }

    #[tokio::test]
    async fn send_failure_on_one_shadow_does_not_abort_others() {
        let mut config_repo = MockConfigRepository::new();
        config_repo.expect_list_active_copy_rules().returning(|| {
            let mut r2 = one_to_one_rule();
            r2.shadow_account_id = "S2".to_string();
            Ok(vec![one_to_one_rule(), r2])
        });
        config_repo.expect_list_accounts().returning(|| {
            Ok(vec![
                Account { id: "S".to_string(), number: "SHADOW1".to_string(), kind: AccountKind::Shadow, strategy_key: None },
                Account { id: "S2".to_string(), number: "SHADOW2".to_string(), kind: AccountKind::Shadow, strategy_key: None },
            ])
        });
        config_repo.expect_list_routes().returning(|| Ok(vec![]));

        let copy_rules = CopyRuleCache::new();
        copy_rules.refresh(&config_repo).await.unwrap();
        let accounts = AccountCache::new();
        accounts.refresh(&config_repo).await.unwrap();
        let routes = RouteCache::new();
        routes.refresh(&config_repo).await.unwrap();

        let sent = Arc::new(StdMutex::new(Vec::<String>::new()));
        let sent_clone = sent.clone();
        let mut sender = MockFixSender::new();
        sender.expect_send().returning(move |alias, _| {
            if alias == "S" {
                anyhow::bail!("simulated send failure");
            }
            sent_clone.lock().unwrap().push(alias.to_string());
            Ok(true)
        });

        let engine = ReplicationEngine::new(
            order_store(),
            locate_machine(),
            LocateCoordinator::new(),
            copy_rules,
            accounts,
            routes,
            Arc::new(sender),
            Arc::new(IdentityAliasResolver),
            "P",
            "MIRROR-",
            Duration::from_secs(30),
        );

        engine.apply(&sample_event("O1", ExecType::New, Side::Buy)).await.unwrap();
        assert_eq!(*sent.lock().unwrap(), vec!["S2".to_string()]);
    }
}
