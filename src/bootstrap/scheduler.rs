//! Independent scheduled tasks: the trading-hours pause/resume loop (C3↔C4),
//! the locate-expiry sweep (C7/C8), and the nightly drop-copy sequence
//! checkpoint sweep are each a long-lived `tokio::spawn`ed loop with a steady
//! period, per the design note "model each scheduler as a long-lived task
//! with a steady period... independent; no shared state beyond the
//! components they call."

use crate::admin_hooks::{AdminHooks, SessionController};
use crate::domain::locate_coordinator::LocateCoordinator;
use crate::domain::locate_machine::sweep_expired_locates;
use crate::domain::trading_hours::TradingHoursGuard;
use crate::persistence::Database;
use crate::session_manager::SessionManager;
use std::sync::Arc;
use std::time::Duration;

const LOCATE_SWEEP_INTERVAL: Duration = Duration::from_secs(10);
const TRADING_HOURS_POLL_INTERVAL: Duration = Duration::from_secs(60);
const SEQUENCE_CHECKPOINT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Evaluates `TradingHoursGuard::is_connection_allowed()` at process start
/// and every [`TRADING_HOURS_POLL_INTERVAL`] thereafter, toggling the
/// Session Manager's initiator pause/resume state whenever the answer
/// changes (spec 4.3: "at trading-start and trading-end, and at process
/// start, it evaluates `isConnectionAllowed()` and toggles pause/resume").
pub fn spawn_trading_hours_loop(trading_hours: Arc<TradingHoursGuard>, session_manager: Arc<SessionManager>) {
    tokio::spawn(async move {
        let mut currently_allowed: Option<bool> = None;
        loop {
            let allowed = trading_hours.is_connection_allowed();
            if currently_allowed != Some(allowed) {
                if allowed {
                    session_manager.resume_initiator_if_paused();
                } else {
                    session_manager.pause_initiator("outside configured trading hours".to_string());
                }
                currently_allowed = Some(allowed);
            }
            tokio::time::sleep(TRADING_HOURS_POLL_INTERVAL).await;
        }
    });
}

/// Marks any `Pending` `LocateRequest` older than the configured timeout as
/// `Expired` and completes its coordinator entry with failure, every
/// [`LOCATE_SWEEP_INTERVAL`] (spec 4.7: "this monitor runs every 10 seconds").
pub fn spawn_locate_expiry_sweep(db: Arc<Database>, coordinator: LocateCoordinator, timeout: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(LOCATE_SWEEP_INTERVAL).await;
            match sweep_expired_locates(db.as_ref(), &coordinator, timeout).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(count = n, "expired stale locate requests"),
                Err(err) => tracing::warn!(error = %err, "locate-expiry sweep failed"),
            }
        }
    });
}

/// Nightly drop-copy sequence checkpoint sweep: every
/// [`SEQUENCE_CHECKPOINT_SWEEP_INTERVAL`], re-checks `isNewTradingDay` for
/// every registered acceptor session via [`AdminHooks::sweep_sequence_checkpoints`].
/// Needed because a drop-copy connection that stays up across midnight never
/// re-`on_create`s, so `on_create`'s own day-boundary check never re-fires for it.
pub fn spawn_sequence_checkpoint_sweep(hooks: Arc<dyn AdminHooks>) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(SEQUENCE_CHECKPOINT_SWEEP_INTERVAL).await;
            hooks.sweep_sequence_checkpoints().await;
        }
    });
}
