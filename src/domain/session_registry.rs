//! Concurrent index of live FIX sessions, keyed by [`SessionKey`] (C2).
//!
//! Readers never block: the map is guarded by a `tokio::sync::RwLock`, and
//! every lookup is a short-lived read guard, mirroring the teacher's
//! `ConnectionManager` (`Arc<RwLock<HashMap<K, V>>>`) idiom.

use super::models::{SessionKey, SessionState, SessionStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionKey, SessionState>>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Idempotent insert: if `key` is already registered its state is left
    /// untouched, matching the spec's `register` contract.
    pub async fn register(&self, key: SessionKey, heartbeat_seconds: u16) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(key).or_insert_with(|| SessionState::created(heartbeat_seconds));
    }

    /// Removes `key` only if it is still present (no-op otherwise).
    pub async fn unregister(&self, key: &SessionKey) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(key);
    }

    pub async fn set_status(&self, key: &SessionKey, status: SessionStatus) {
        let mut sessions = self.sessions.write().await;
        if let Some(state) = sessions.get_mut(key) {
            state.status = status;
        }
    }

    pub async fn set_sequence_numbers(&self, key: &SessionKey, next_sender_seq: u32, next_target_seq: u32) {
        let mut sessions = self.sessions.write().await;
        if let Some(state) = sessions.get_mut(key) {
            state.next_sender_seq = next_sender_seq;
            state.next_target_seq = next_target_seq;
        }
    }

    /// Returns the session's state only if it is `LoggedOn`.
    pub async fn find_logged_on(&self, key: &SessionKey) -> Option<SessionState> {
        let sessions = self.sessions.read().await;
        sessions.get(key).filter(|s| s.status == SessionStatus::LoggedOn).cloned()
    }

    /// Deterministic scan over logged-on initiator sessions, preferring
    /// `prefer_alias` (typically the configured primary session) when present.
    pub async fn find_any_logged_on_initiator(&self, prefer_alias: Option<&str>) -> Option<SessionKey> {
        use super::models::SessionRole;
        let sessions = self.sessions.read().await;
        let mut candidates: Vec<&SessionKey> = sessions
            .iter()
            .filter(|(k, v)| k.role == SessionRole::Initiator && v.status == SessionStatus::LoggedOn)
            .map(|(k, _)| k)
            .collect();
        candidates.sort_by(|a, b| a.sender_comp_id.cmp(&b.sender_comp_id).then(a.target_comp_id.cmp(&b.target_comp_id)));

        if let Some(alias) = prefer_alias {
            if let Some(preferred) = candidates.iter().find(|k| k.matches_alias(alias)) {
                return Some((*preferred).clone());
            }
        }
        candidates.first().map(|k| (*k).clone())
    }

    /// Matches `alias` case-insensitively against sender/target/qualifier of any
    /// logged-on initiator session.
    pub async fn find_logged_on_initiator_by_alias(&self, alias: &str) -> Option<SessionKey> {
        use super::models::SessionRole;
        let sessions = self.sessions.read().await;
        sessions
            .iter()
            .filter(|(k, v)| k.role == SessionRole::Initiator && v.status == SessionStatus::LoggedOn)
            .find(|(k, _)| k.matches_alias(alias))
            .map(|(k, _)| k.clone())
    }

    /// All currently-registered acceptor (drop-copy) session keys, for the
    /// nightly sequence-reset sweep to re-check against `isNewTradingDay`
    /// even when the connection itself is long-lived and never re-`onCreate`s.
    pub async fn acceptor_keys(&self) -> Vec<SessionKey> {
        use super::models::SessionRole;
        let sessions = self.sessions.read().await;
        sessions.keys().filter(|k| k.role == SessionRole::Acceptor).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SessionRole;

    fn key(sender: &str) -> SessionKey {
        SessionKey::new(SessionRole::Initiator, "FIX.4.2", sender, "GATEWAY", None)
    }

    #[tokio::test]
    async fn register_is_idempotent() {
        let registry = SessionRegistry::new();
        registry.register(key("S1"), 30).await;
        registry.set_status(&key("S1"), SessionStatus::LoggedOn).await;
        registry.register(key("S1"), 30).await;

        let state = registry.find_logged_on(&key("S1")).await;
        assert!(state.is_some(), "re-registering must not clobber existing state");
    }

    #[tokio::test]
    async fn find_logged_on_excludes_non_logged_on_sessions() {
        let registry = SessionRegistry::new();
        registry.register(key("S1"), 30).await;
        assert!(registry.find_logged_on(&key("S1")).await.is_none());
    }

    #[tokio::test]
    async fn unregister_removes_only_if_present() {
        let registry = SessionRegistry::new();
        registry.register(key("S1"), 30).await;
        registry.unregister(&key("S1")).await;
        registry.unregister(&key("S1")).await;
        assert!(registry.find_logged_on(&key("S1")).await.is_none());
    }

    #[tokio::test]
    async fn find_any_logged_on_initiator_prefers_alias() {
        let registry = SessionRegistry::new();
        registry.register(key("A1"), 30).await;
        registry.register(key("B1"), 30).await;
        registry.set_status(&key("A1"), SessionStatus::LoggedOn).await;
        registry.set_status(&key("B1"), SessionStatus::LoggedOn).await;

        let found = registry.find_any_logged_on_initiator(Some("B1")).await.unwrap();
        assert_eq!(found.sender_comp_id, "B1");
    }

    #[tokio::test]
    async fn find_logged_on_initiator_by_alias_matches_qualifier() {
        let registry = SessionRegistry::new();
        let k = SessionKey::new(SessionRole::Initiator, "FIX.4.2", "GATEWAY", "SHADOW1", Some("Q1".to_string()));
        registry.register(k.clone(), 30).await;
        registry.set_status(&k, SessionStatus::LoggedOn).await;

        let found = registry.find_logged_on_initiator_by_alias("q1").await;
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn acceptor_keys_excludes_initiators() {
        let registry = SessionRegistry::new();
        let acceptor = SessionKey::new(SessionRole::Acceptor, "FIX.4.2", "BROKER", "GATEWAY", None);
        registry.register(acceptor.clone(), 30).await;
        registry.register(key("I1"), 30).await;

        let keys = registry.acceptor_keys().await;
        assert_eq!(keys, vec![acceptor]);
    }
}
