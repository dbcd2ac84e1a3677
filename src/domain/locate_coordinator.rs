//! Locate Coordinator (C7): tracks in-flight short-locate negotiations and
//! lets any task await their outcome without blocking an I/O thread.
//!
//! The original "future the caller awaits" is modelled with
//! `tokio::sync::oneshot`: registration captures the `Sender` half, and the
//! inbound confirmation handler posts through it rather than invoking the
//! coordinator synchronously across threads (design note: "Locate flow as
//! async chain"). A `primaryOrderId` can have more than one waiter (the
//! `putIfAbsent` caller plus any racing re-registration), so each `Pending`
//! fans a single completion out to every sender registered against it.

use super::models::LocateOutcome;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};

struct Pending {
    senders: Vec<oneshot::Sender<LocateOutcome>>,
}

#[derive(Clone)]
pub struct LocateCoordinator {
    pending: Arc<Mutex<HashMap<String, Pending>>>,
}

impl Default for LocateCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl LocateCoordinator {
    pub fn new() -> Self {
        Self { pending: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// `register`: `putIfAbsent` semantics. Returns a receiver the caller awaits
    /// (with `timeout` applied by the caller) plus whether this call actually
    /// created the entry (`newlyRegistered`). A second `register` for the same
    /// id returns `newlyRegistered = false` and a receiver wired into the same
    /// `Pending` entry, so it observes the exact same completion (or timeout,
    /// guarded by the original registration's timer) as the first waiter.
    pub async fn register(&self, primary_order_id: &str, timeout: Duration) -> (oneshot::Receiver<LocateOutcome>, bool) {
        let mut pending = self.pending.lock().await;
        if let Some(entry) = pending.get_mut(primary_order_id) {
            let (tx, rx) = oneshot::channel();
            entry.senders.push(tx);
            return (rx, false);
        }
        let (tx, rx) = oneshot::channel();
        pending.insert(primary_order_id.to_string(), Pending { senders: vec![tx] });
        drop(pending);
        self.spawn_timeout_guard(primary_order_id.to_string(), timeout);
        (rx, true)
    }

    fn spawn_timeout_guard(&self, primary_order_id: String, timeout: Duration) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            coordinator
                .complete_failure(&primary_order_id, "timeout")
                .await;
        });
    }

    pub async fn complete_success(&self, primary_order_id: &str, approved_qty: rust_decimal::Decimal, locate_id: String, message: Option<String>) {
        self.complete(
            primary_order_id,
            LocateOutcome { approved: true, approved_qty: Some(approved_qty), locate_id: Some(locate_id), message },
        )
        .await;
    }

    pub async fn complete_failure(&self, primary_order_id: &str, message: &str) {
        self.complete(
            primary_order_id,
            LocateOutcome { approved: false, approved_qty: None, locate_id: None, message: Some(message.to_string()) },
        )
        .await;
    }

    async fn complete(&self, primary_order_id: &str, outcome: LocateOutcome) {
        let mut pending = self.pending.lock().await;
        if let Some(entry) = pending.remove(primary_order_id) {
            for sender in entry.senders {
                let _ = sender.send(outcome.clone());
            }
        }
        // No-op if already absent: either delivered or already timed out.
    }

    /// Completes all outstanding waiters with a "shutting down" failure, used
    /// during cooperative shutdown.
    pub async fn complete_all_shutting_down(&self) {
        let mut pending = self.pending.lock().await;
        for (_, entry) in pending.drain() {
            for sender in entry.senders {
                let _ = sender.send(LocateOutcome {
                    approved: false,
                    approved_qty: None,
                    locate_id: None,
                    message: Some("shutting down".to_string()),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn register_second_call_returns_not_newly_registered() {
        let coordinator = LocateCoordinator::new();
        let (_rx1, first) = coordinator.register("O1", Duration::from_secs(30)).await;
        let (_rx2, second) = coordinator.register("O1", Duration::from_secs(30)).await;
        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn register_second_call_observes_the_same_completion_as_the_first() {
        let coordinator = LocateCoordinator::new();
        let (rx1, _) = coordinator.register("O1", Duration::from_secs(30)).await;
        let (rx2, _) = coordinator.register("O1", Duration::from_secs(30)).await;
        coordinator.complete_success("O1", dec!(50), "L2".to_string(), None).await;
        let outcome1 = rx1.await.unwrap();
        let outcome2 = rx2.await.unwrap();
        assert!(outcome1.approved);
        assert!(outcome2.approved);
        assert_eq!(outcome1.locate_id, outcome2.locate_id);
    }

    #[tokio::test]
    async fn register_second_call_times_out_alongside_the_first() {
        let coordinator = LocateCoordinator::new();
        let (rx1, _) = coordinator.register("O1", Duration::from_millis(20)).await;
        let (rx2, _) = coordinator.register("O1", Duration::from_secs(30)).await;
        let outcome1 = rx1.await.unwrap();
        let outcome2 = rx2.await.unwrap();
        assert!(!outcome1.approved);
        assert!(!outcome2.approved);
        assert_eq!(outcome2.message.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn complete_success_resolves_the_waiter() {
        let coordinator = LocateCoordinator::new();
        let (rx, _) = coordinator.register("O1", Duration::from_secs(30)).await;
        coordinator.complete_success("O1", dec!(100), "L1".to_string(), None).await;
        let outcome = rx.await.unwrap();
        assert!(outcome.approved);
        assert_eq!(outcome.approved_qty, Some(dec!(100)));
    }

    #[tokio::test]
    async fn complete_on_absent_id_is_a_noop() {
        let coordinator = LocateCoordinator::new();
        coordinator.complete_failure("does-not-exist", "whatever").await;
    }

    #[tokio::test]
    async fn timeout_completes_waiter_with_failure() {
        let coordinator = LocateCoordinator::new();
        let (rx, _) = coordinator.register("O1", Duration::from_millis(20)).await;
        let outcome = rx.await.unwrap();
        assert!(!outcome.approved);
        assert_eq!(outcome.message.as_deref(), Some("timeout"));
    }
}
