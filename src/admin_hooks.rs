//! Admin & Application Hooks (C11): maps FIX engine callbacks onto the
//! domain components, replacing the original per-message-type listener
//! classes with one router matched on `(SessionRole, FixEvent)`.

use crate::domain::locate_coordinator::LocateCoordinator;
use crate::domain::locate_machine::LocateStateMachine;
use crate::domain::models::{ExecType, ExecutionEvent, SessionKey, SessionRole, SessionStatus};
use crate::domain::order_store::OrderStore;
use crate::domain::replication::ReplicationEngine;
use crate::domain::sequence_controller::{
    apply_sequence_reset, extract_sequence_from_text, is_new_trading_day, is_not_trading_day_text,
    plan_initiator_logon, reconcile_drop_copy_logon, reconcile_initiator_logon,
};
use crate::domain::session_registry::SessionRegistry;
use crate::domain::trading_hours::TradingHoursGuard;
use crate::fix::message::{FixEvent, SequenceResetFields};
use crate::fix::SendDecision;
use crate::ports::{FixSender, LocateRepository, OrderRepository, SessionSequenceRepository};
use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Outcome of the `toAdmin` hook for an outbound initiator Logon.
#[derive(Debug, Clone)]
pub struct LogonPlanDecision {
    pub decision: SendDecision,
    pub reset_seq_num_flag: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Pause/resume control the Session Manager (C4) exposes back to the hooks,
/// kept separate from [`FixSender`] so a hook router never needs the whole
/// transport surface to act on a "not a trading day" Logout.
pub trait SessionController: Send + Sync {
    fn pause_initiator(&self, reason: String);
    fn resume_initiator_if_paused(&self);
}

/// The FIX engine's callback surface, implemented once per process and
/// invoked by the Session Manager's connection handlers for every session.
#[async_trait]
pub trait AdminHooks: Send + Sync {
    /// Called once per accepted/connected TCP session, before any frame is
    /// read or written. Returns the outbound `MsgSeqNum` the transport should
    /// seed its counter with: `1` for a freshly reset session (or any
    /// order-entry initiator, which always resets on logon per invariant 7),
    /// or the persisted `next_sender_seq` for a drop-copy acceptor resuming
    /// across a restart.
    async fn on_create(&self, key: &SessionKey) -> u32;
    async fn on_logon(&self, key: &SessionKey, incoming_seq: u32, heartbeat_seconds: u16);
    async fn on_logout(&self, key: &SessionKey, text: Option<String>);
    async fn to_admin_logon(&self, key: &SessionKey) -> LogonPlanDecision;
    async fn from_admin(&self, key: &SessionKey, event: &FixEvent);
    /// Persistence failures are propagated (not swallowed): the Session
    /// Manager logs them at the transport boundary rather than acknowledging
    /// as if the event had been durably recorded. Replication/send failures
    /// are handled internally (logged and skipped per-shadow) and never
    /// surface here as an `Err`.
    async fn from_app(&self, key: &SessionKey, event: FixEvent, raw: &str) -> anyhow::Result<()>;
    /// Nightly drop-copy sequence checkpoint sweep: re-checks `isNewTradingDay`
    /// for every currently-registered acceptor session, even one that has
    /// stayed connected across midnight and so never re-`on_create`s.
    async fn sweep_sequence_checkpoints(&self);
}

/// Routes callbacks to C2 (registry), C3 (trading hours), C5 (sequencing),
/// C6 (order store), C7/C8 (locate negotiation), and C10 (replication), per
/// the role-specific behaviour table.
pub struct AdminHookRouter<OR: OrderRepository + ?Sized, LR: LocateRepository + ?Sized> {
    registry: SessionRegistry,
    trading_hours: Arc<TradingHoursGuard>,
    trading_zone: Tz,
    order_store: Arc<OrderStore<OR>>,
    replication: Arc<ReplicationEngine<OR, LR, dyn FixSender>>,
    locate_machine: Arc<LocateStateMachine<LR, dyn FixSender>>,
    coordinator: LocateCoordinator,
    sequence_repo: Arc<dyn SessionSequenceRepository>,
    session_controller: Arc<dyn SessionController>,
    primary_account_number: String,
    username: Option<String>,
    password: Option<String>,
    last_reset_at: Mutex<HashMap<String, chrono::DateTime<Utc>>>,
    resume_tx: mpsc::Sender<()>,
}

impl<OR, LR> AdminHookRouter<OR, LR>
where
    OR: OrderRepository + ?Sized + 'static,
    LR: LocateRepository + ?Sized + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: SessionRegistry,
        trading_hours: Arc<TradingHoursGuard>,
        trading_zone: Tz,
        order_store: Arc<OrderStore<OR>>,
        replication: Arc<ReplicationEngine<OR, LR, dyn FixSender>>,
        locate_machine: Arc<LocateStateMachine<LR, dyn FixSender>>,
        coordinator: LocateCoordinator,
        sequence_repo: Arc<dyn SessionSequenceRepository>,
        session_controller: Arc<dyn SessionController>,
        primary_account_number: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        let (resume_tx, mut resume_rx) = mpsc::channel(1);
        let controller = session_controller.clone();
        tokio::spawn(async move {
            while resume_rx.recv().await.is_some() {
                controller.resume_initiator_if_paused();
            }
        });

        Self {
            registry,
            trading_hours,
            trading_zone,
            order_store,
            replication,
            locate_machine,
            coordinator,
            sequence_repo,
            session_controller,
            primary_account_number: primary_account_number.into(),
            username,
            password,
            last_reset_at: Mutex::new(HashMap::new()),
            resume_tx,
        }
    }

    fn session_key_string(key: &SessionKey) -> String {
        format!("{}-{}-{}{}", key.begin_string, key.sender_comp_id, key.target_comp_id, key.qualifier.as_deref().unwrap_or(""))
    }

    async fn reset_drop_copy_sequences(&self, key: &SessionKey) {
        self.registry.set_sequence_numbers(key, 1, 1).await;
        let _ = self.sequence_repo.save(&Self::session_key_string(key), 1, 1).await;
    }

    /// Shared by `on_create` (per-connection) and `sweep_sequence_checkpoints`
    /// (per-sweep-tick, for long-lived connections that never re-`on_create`):
    /// resets the acceptor's sequence numbers to `(1, 1)` if `now` falls on a
    /// new trading day relative to the alias's last reset, otherwise leaves
    /// them untouched. Returns `true` if a reset happened.
    async fn maybe_reset_for_new_trading_day(&self, key: &SessionKey, alias: &str, now: chrono::DateTime<Utc>) -> bool {
        let mut last_reset_at = self.last_reset_at.lock().await;
        if !is_new_trading_day(last_reset_at.get(alias).copied(), now, self.trading_zone) {
            return false;
        }
        self.reset_drop_copy_sequences(key).await;
        last_reset_at.insert(alias.to_string(), now);
        true
    }
}

#[async_trait]
impl<OR, LR> AdminHooks for AdminHookRouter<OR, LR>
where
    OR: OrderRepository + ?Sized + 'static,
    LR: LocateRepository + ?Sized + 'static,
{
    async fn on_create(&self, key: &SessionKey) -> u32 {
        if key.role != SessionRole::Acceptor {
            return 1;
        }
        let alias = Self::session_key_string(key);
        if self.maybe_reset_for_new_trading_day(key, &alias, Utc::now()).await {
            return 1;
        }

        match self.sequence_repo.load(&alias).await {
            Ok(Some((next_sender_seq, next_target_seq))) => {
                self.registry.set_sequence_numbers(key, next_sender_seq, next_target_seq).await;
                next_sender_seq
            }
            Ok(None) => 1,
            Err(err) => {
                tracing::warn!(%alias, error = %err, "failed to load persisted sequence checkpoint, starting at 1");
                1
            }
        }
    }

    async fn on_logon(&self, key: &SessionKey, incoming_seq: u32, heartbeat_seconds: u16) {
        self.registry.register(key.clone(), heartbeat_seconds).await;
        self.registry.set_status(key, SessionStatus::LoggedOn).await;

        if key.role == SessionRole::Acceptor {
            let (sender_seq, target_seq) = reconcile_drop_copy_logon(incoming_seq);
            self.registry.set_sequence_numbers(key, sender_seq, target_seq).await;
            let _ = self.sequence_repo.save(&Self::session_key_string(key), sender_seq, target_seq).await;
        }
    }

    async fn on_logout(&self, key: &SessionKey, text: Option<String>) {
        self.registry.unregister(key).await;

        if key.role != SessionRole::Initiator {
            tracing::info!(session = %Self::session_key_string(key), "drop-copy session logged out");
            return;
        }

        let Some(text) = text else { return };
        if is_not_trading_day_text(&text) {
            self.session_controller.pause_initiator(text.clone());
            self.trading_hours.mark_not_trading_day(&text);
            self.trading_hours.schedule_resume(self.resume_tx.clone());
        }
    }

    async fn to_admin_logon(&self, key: &SessionKey) -> LogonPlanDecision {
        if key.role != SessionRole::Initiator {
            return LogonPlanDecision {
                decision: SendDecision::Send,
                reset_seq_num_flag: false,
                username: None,
                password: None,
            };
        }
        let plan = plan_initiator_logon(&self.trading_hours, self.username.clone(), self.password.clone());
        LogonPlanDecision {
            decision: plan.decision,
            reset_seq_num_flag: plan.reset_seq_num_flag,
            username: plan.username,
            password: plan.password,
        }
    }

    async fn from_admin(&self, key: &SessionKey, event: &FixEvent) {
        match event {
            FixEvent::Logon { incoming_seq, .. } => {
                if key.role == SessionRole::Acceptor {
                    let (sender_seq, target_seq) = reconcile_drop_copy_logon(*incoming_seq);
                    self.registry.set_sequence_numbers(key, sender_seq, target_seq).await;
                    let _ = self.sequence_repo.save(&Self::session_key_string(key), sender_seq, target_seq).await;
                } else {
                    let state = self.registry.find_logged_on(key).await;
                    let expected = state.map(|s| s.next_target_seq).unwrap_or(1);
                    let adopted = reconcile_initiator_logon(expected, *incoming_seq);
                    self.registry.set_sequence_numbers(key, 1, adopted).await;
                }
            }
            FixEvent::Logout { text, .. } => {
                if key.role != SessionRole::Acceptor {
                    if let Some(seq) = text.as_deref().and_then(extract_sequence_from_text) {
                        self.registry.set_sequence_numbers(key, seq, seq).await;
                    }
                }
            }
            FixEvent::SequenceReset { fields: SequenceResetFields { gap_fill_flag, .. }, .. } => {
                if let Some((sender_seq, target_seq)) = apply_sequence_reset(*gap_fill_flag) {
                    self.registry.set_sequence_numbers(key, sender_seq, target_seq).await;
                    if key.role == SessionRole::Acceptor {
                        let _ = self.sequence_repo.save(&Self::session_key_string(key), sender_seq, target_seq).await;
                    }
                }
            }
            _ => {}
        }
    }

    /// Persistence failures (`order_store.record_event`) are propagated with
    /// `?` rather than logged-and-swallowed, per spec's drop-copy error
    /// policy: the codec is the one place that can decide whether to
    /// withhold processing on a resend. Replication failures are a distinct,
    /// already-persisted case (the pool logs and skips the affected shadow
    /// with a WARN) and are not re-thrown.
    async fn from_app(&self, key: &SessionKey, event: FixEvent, raw: &str) -> anyhow::Result<()> {
        match (key.role, event) {
            (SessionRole::Acceptor, FixEvent::ExecutionReport { fields, .. }) => {
                let Some(exec_type) = ExecType::from_fix_code(&fields.exec_type, &fields.ord_status) else {
                    tracing::warn!(exec_id = %fields.exec_id, "unrecognised ExecType/OrdStatus combination, dropping event");
                    return Ok(());
                };
                let strategy_key = if fields.account.as_deref() == Some(self.primary_account_number.as_str()) {
                    Some(OrderStore::<OR>::resolve_strategy_key(None, &self.primary_account_number))
                } else {
                    None
                };

                let event = ExecutionEvent {
                    exec_id: fields.exec_id.clone(),
                    order_id: fields.order_id.clone(),
                    cl_ord_id: fields.cl_ord_id.clone(),
                    orig_cl_ord_id: fields.orig_cl_ord_id.clone(),
                    exec_type,
                    ord_status: fields.ord_status.clone(),
                    symbol: fields.symbol.clone(),
                    side: fields.side,
                    ord_type: fields.ord_type,
                    time_in_force: fields.time_in_force,
                    order_qty: fields.order_qty,
                    last_qty: fields.last_qty,
                    last_px: fields.last_px,
                    cum_qty: fields.cum_qty,
                    leaves_qty: fields.leaves_qty,
                    avg_px: fields.avg_px,
                    price: fields.price,
                    stop_px: fields.stop_px,
                    account: fields.account.clone(),
                    transact_time: fields.transact_time,
                    session_key: key.clone(),
                    raw_message: raw.to_string(),
                };

                let (_, inserted) = self.order_store.record_event(event.clone(), strategy_key).await?;
                if !inserted {
                    tracing::debug!(exec_id = %event.exec_id, "duplicate execution event, skipping replication");
                    return Ok(());
                }

                if exec_type == ExecType::LocateConfirmed {
                    if let Some(quote_req_id) = event.cl_ord_id.as_deref() {
                        if let Err(err) = self.locate_machine.process_locate_confirmation(quote_req_id).await {
                            tracing::warn!(quote_req_id, error = %err, "locate confirmation processing failed");
                        }
                    }
                    return Ok(());
                }

                if let Err(err) = self.replication.apply(&event).await {
                    tracing::error!(order_id = %event.order_id, error = %err, "replication failed for execution event");
                }
                Ok(())
            }
            (SessionRole::Initiator, FixEvent::QuoteResponse { fields, .. }) => {
                if let Err(err) = self
                    .locate_machine
                    .process_quote_response(&fields.quote_req_id, fields.offer_px, fields.offer_size, fields.text.clone())
                    .await
                {
                    tracing::warn!(quote_req_id = %fields.quote_req_id, error = %err, "quote response processing failed");
                }
                Ok(())
            }
            (SessionRole::Initiator, FixEvent::ExecutionReport { fields, .. }) => {
                let Some(exec_type) = ExecType::from_fix_code(&fields.exec_type, &fields.ord_status) else { return Ok(()) };
                if exec_type == ExecType::LocateConfirmed {
                    if let Some(quote_req_id) = fields.cl_ord_id.as_deref() {
                        if let Err(err) = self.locate_machine.process_locate_confirmation(quote_req_id).await {
                            tracing::warn!(quote_req_id, error = %err, "locate confirmation processing failed");
                        }
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn sweep_sequence_checkpoints(&self) {
        let now = Utc::now();
        for key in self.registry.acceptor_keys().await {
            let alias = Self::session_key_string(&key);
            self.maybe_reset_for_new_trading_day(&key, &alias, now).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::caches::{AccountCache, CopyRuleCache, RouteCache};
    use crate::domain::replication::IdentityAliasResolver;
    use crate::ports::{MockFixSender, MockLocateRepository, MockOrderRepository, MockSessionSequenceRepository};
    use std::time::Duration;

    struct NoopController;
    impl SessionController for NoopController {
        fn pause_initiator(&self, _reason: String) {}
        fn resume_initiator_if_paused(&self) {}
    }

    fn key(role: SessionRole, sender: &str) -> SessionKey {
        SessionKey::new(role, "FIX.4.2", sender, "PEER", None)
    }

    fn router() -> AdminHookRouter<MockOrderRepository, MockLocateRepository> {
        let mut sequence_repo = MockSessionSequenceRepository::new();
        sequence_repo.expect_save().returning(|_, _, _| Ok(()));
        sequence_repo.expect_load().returning(|_| Ok(None));
        router_with_sequence_repo(sequence_repo)
    }

    fn router_with_sequence_repo(sequence_repo: MockSessionSequenceRepository) -> AdminHookRouter<MockOrderRepository, MockLocateRepository> {
        let mut order_repo = MockOrderRepository::new();
        order_repo.expect_insert_event_if_new().returning(|_| Ok(true));
        order_repo.expect_find_order_by_order_id().returning(|_| Ok(None));
        order_repo.expect_find_order_group().returning(|_| Ok(None));
        order_repo.expect_create_order_group().returning(|_| Ok(()));
        order_repo.expect_upsert_order().returning(|_| Ok(()));
        let order_store = Arc::new(OrderStore::new(Arc::new(order_repo)));

        let locate_repo = MockLocateRepository::new();
        let sender: Arc<dyn FixSender> = Arc::new(MockFixSender::new());
        let locate_machine = Arc::new(LocateStateMachine::new(
            Arc::new(locate_repo),
            sender.clone(),
            LocateCoordinator::new(),
            "GATEWAY",
            "MIRROR-",
            Duration::from_secs(30),
        ));

        let replication = Arc::new(ReplicationEngine::new(
            order_store.clone(),
            Arc::new(LocateStateMachine::new(
                Arc::new(MockLocateRepository::new()),
                sender.clone(),
                LocateCoordinator::new(),
                "GATEWAY",
                "MIRROR-",
                Duration::from_secs(30),
            )),
            LocateCoordinator::new(),
            CopyRuleCache::new(),
            AccountCache::new(),
            RouteCache::new(),
            sender,
            Arc::new(IdentityAliasResolver),
            "P",
            "MIRROR-",
            Duration::from_secs(30),
        ));

        AdminHookRouter::new(
            SessionRegistry::new(),
            Arc::new(TradingHoursGuard::new(crate::domain::trading_hours::TradingHoursConfig::default())),
            chrono_tz::America::New_York,
            order_store,
            replication,
            locate_machine,
            LocateCoordinator::new(),
            Arc::new(sequence_repo),
            Arc::new(NoopController),
            "P",
            None,
            None,
        )
    }

    #[tokio::test]
    async fn on_logon_registers_and_marks_logged_on() {
        let router = router();
        let k = key(SessionRole::Initiator, "GATEWAY");
        router.on_logon(&k, 1, 30).await;
        assert!(router.registry.find_logged_on(&k).await.is_some());
    }

    #[tokio::test]
    async fn drop_copy_logon_with_seq_one_resets_sequences() {
        let router = router();
        let k = key(SessionRole::Acceptor, "BROKER");
        router.on_logon(&k, 1, 30).await;
        let state = router.registry.find_logged_on(&k).await.unwrap();
        assert_eq!(state.next_sender_seq, 1);
        assert_eq!(state.next_target_seq, 1);
    }

    #[tokio::test]
    async fn initiator_to_admin_logon_is_suppressed_outside_trading_hours() {
        let router = router();
        let k = key(SessionRole::Initiator, "GATEWAY");
        let now = chrono_tz::America::New_York.with_ymd_and_hms(2026, 1, 2, 2, 0, 0).unwrap().with_timezone(&Utc);
        router.trading_hours.mark_not_trading_day_at(now, "test");
        let plan = router.to_admin_logon(&k).await;
        assert!(matches!(plan.decision, SendDecision::Suppress(_)));
    }

    #[tokio::test]
    async fn not_trading_day_logout_text_pauses_initiator() {
        let router = router();
        let k = key(SessionRole::Initiator, "GATEWAY");
        router.on_logout(&k, Some("Not Trade Day".to_string())).await;
        assert!(router.trading_hours.next_allowed_logon().is_some());
    }

    #[tokio::test]
    async fn on_create_seeds_next_seq_from_persisted_checkpoint() {
        let mut sequence_repo = MockSessionSequenceRepository::new();
        sequence_repo.expect_save().returning(|_, _, _| Ok(()));
        sequence_repo.expect_load().returning(|_| Ok(Some((42, 17))));
        let router = router_with_sequence_repo(sequence_repo);

        let k = key(SessionRole::Acceptor, "BROKER");
        router.registry.register(k.clone(), 30).await;
        let seeded = router.on_create(&k).await;

        assert_eq!(seeded, 42);
        router.registry.set_status(&k, SessionStatus::LoggedOn).await;
        let state = router.registry.find_logged_on(&k).await.unwrap();
        assert_eq!(state.next_sender_seq, 42);
        assert_eq!(state.next_target_seq, 17);
    }

    #[tokio::test]
    async fn on_create_defaults_to_one_with_no_persisted_checkpoint() {
        let router = router();
        let k = key(SessionRole::Acceptor, "BROKER");
        router.registry.register(k.clone(), 30).await;
        assert_eq!(router.on_create(&k).await, 1);
    }

    #[tokio::test]
    async fn on_create_always_resets_initiator_sequences_to_one() {
        let router = router();
        let k = key(SessionRole::Initiator, "GATEWAY");
        router.registry.register(k.clone(), 30).await;
        assert_eq!(router.on_create(&k).await, 1);
    }

    #[tokio::test]
    async fn sweep_sequence_checkpoints_resets_acceptors_on_a_new_trading_day() {
        let router = router();
        let k = key(SessionRole::Acceptor, "BROKER");
        router.registry.register(k.clone(), 30).await;
        router.registry.set_sequence_numbers(&k, 99, 88).await;
        router.registry.set_status(&k, SessionStatus::LoggedOn).await;

        router.sweep_sequence_checkpoints().await;

        let state = router.registry.find_logged_on(&k).await.unwrap();
        assert_eq!(state.next_sender_seq, 1);
        assert_eq!(state.next_target_seq, 1);
    }

    #[tokio::test]
    async fn sweep_sequence_checkpoints_does_not_reset_twice_on_the_same_day() {
        let router = router();
        let k = key(SessionRole::Acceptor, "BROKER");
        router.registry.register(k.clone(), 30).await;
        router.registry.set_status(&k, SessionStatus::LoggedOn).await;

        router.sweep_sequence_checkpoints().await;
        router.registry.set_sequence_numbers(&k, 5, 5).await;
        router.sweep_sequence_checkpoints().await;

        let state = router.registry.find_logged_on(&k).await.unwrap();
        assert_eq!(state.next_sender_seq, 5);
        assert_eq!(state.next_target_seq, 5);
    }

    #[tokio::test]
    async fn duplicate_execution_event_skips_replication() {
        use crate::fix::message::ExecutionReportFields;
        use crate::domain::models::Side;

        let mut order_repo = MockOrderRepository::new();
        order_repo.expect_insert_event_if_new().returning(|_| Ok(false));
        order_repo.expect_find_order_by_order_id().returning(|_| {
            Ok(Some(crate::domain::models::Order::new_primary("P".to_string(), "ACME".to_string(), Side::Buy, dec!(100))))
        });
        let order_store = Arc::new(OrderStore::new(Arc::new(order_repo)));

        let locate_repo = MockLocateRepository::new();
        let sender: Arc<dyn FixSender> = Arc::new(MockFixSender::new());
        let locate_machine = Arc::new(LocateStateMachine::new(
            Arc::new(locate_repo),
            sender.clone(),
            LocateCoordinator::new(),
            "GATEWAY",
            "MIRROR-",
            Duration::from_secs(30),
        ));

        // No expectations set on this replication's order repo/sender: if
        // `from_app` called through to replication despite the duplicate,
        // any unexpected mock call here would panic.
        let mut replication_order_repo = MockOrderRepository::new();
        replication_order_repo.expect_find_order_by_order_id().times(0).returning(|_| Ok(None));
        let replication = Arc::new(ReplicationEngine::new(
            Arc::new(OrderStore::new(Arc::new(replication_order_repo))),
            Arc::new(LocateStateMachine::new(
                Arc::new(MockLocateRepository::new()),
                sender.clone(),
                LocateCoordinator::new(),
                "GATEWAY",
                "MIRROR-",
                Duration::from_secs(30),
            )),
            LocateCoordinator::new(),
            CopyRuleCache::new(),
            AccountCache::new(),
            RouteCache::new(),
            sender,
            Arc::new(IdentityAliasResolver),
            "P",
            "MIRROR-",
            Duration::from_secs(30),
        ));

        let mut sequence_repo = MockSessionSequenceRepository::new();
        sequence_repo.expect_save().returning(|_, _, _| Ok(()));
        sequence_repo.expect_load().returning(|_| Ok(None));

        let router = AdminHookRouter::new(
            SessionRegistry::new(),
            Arc::new(TradingHoursGuard::new(crate::domain::trading_hours::TradingHoursConfig::default())),
            chrono_tz::America::New_York,
            order_store,
            replication,
            locate_machine,
            LocateCoordinator::new(),
            Arc::new(sequence_repo),
            Arc::new(NoopController),
            "P",
            None,
            None,
        );

        let k = key(SessionRole::Acceptor, "BROKER");
        let event = FixEvent::ExecutionReport {
            header: crate::fix::message::Header {
                sender_comp_id: "BROKER".to_string(),
                target_comp_id: "GATEWAY".to_string(),
                msg_seq_num: 1,
                sending_time: Utc::now(),
            },
            fields: ExecutionReportFields {
                exec_id: "EXEC1".to_string(),
                order_id: "O1".to_string(),
                cl_ord_id: Some("P-1".to_string()),
                orig_cl_ord_id: None,
                exec_type: "0".to_string(),
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
                account: Some("S".to_string()),
                transact_time: Utc::now(),
            },
        };

        router.from_app(&k, event, "raw").await.unwrap();
    }

    use chrono::TimeZone;
    use rust_decimal_macros::dec;
}
