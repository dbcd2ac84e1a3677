//! Copy/Route/Account Caches (C12): in-memory resolution of copy rules,
//! routes, and account metadata, refreshed from persistent storage.
//!
//! Single-writer/many-readers via atomic snapshot replacement, grounded on
//! the teacher's `ConnectionManager`/config-cache `Arc<RwLock<...>>` idiom
//! but using `parking_lot::RwLock<Arc<Snapshot>>` so readers clone an `Arc`
//! rather than holding a lock across the call.

use super::models::{Account, AccountKind, CopyRule, OrderTypeFilter, Route};
use crate::ports::ConfigRepository;
use anyhow::Result;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct AccountSnapshot {
    by_number: HashMap<String, Account>,
    by_id: HashMap<String, Account>,
}

/// Eager-loaded, immutable-after-refresh account index (number <-> id <-> type).
#[derive(Clone)]
pub struct AccountCache {
    snapshot: Arc<RwLock<Arc<AccountSnapshot>>>,
}

impl AccountCache {
    pub fn new() -> Self {
        Self { snapshot: Arc::new(RwLock::new(Arc::new(AccountSnapshot::default()))) }
    }

    pub async fn refresh(&self, repo: &(impl ConfigRepository + ?Sized)) -> Result<()> {
        let accounts = repo.list_accounts().await?;
        let mut by_number = HashMap::new();
        let mut by_id = HashMap::new();
        for account in accounts {
            by_number.insert(account.number.clone(), account.clone());
            by_id.insert(account.id.clone(), account);
        }
        *self.snapshot.write() = Arc::new(AccountSnapshot { by_number, by_id });
        Ok(())
    }

    pub fn find_by_number(&self, number: &str) -> Option<Account> {
        self.snapshot.read().by_number.get(number).cloned()
    }

    pub fn find_by_id(&self, id: &str) -> Option<Account> {
        self.snapshot.read().by_id.get(id).cloned()
    }

    pub fn find_active_shadow_accounts(&self) -> Vec<Account> {
        self.snapshot.read().by_id.values().filter(|a| a.kind == AccountKind::Shadow).cloned().collect()
    }

    pub fn find_primary(&self) -> Option<Account> {
        self.snapshot.read().by_id.values().find(|a| a.kind == AccountKind::Primary).cloned()
    }
}

impl Default for AccountCache {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct CopyRuleSnapshot {
    by_primary: HashMap<String, Vec<CopyRule>>,
}

/// `primaryAccountId -> [CopyRule]`, sorted by priority ascending.
#[derive(Clone)]
pub struct CopyRuleCache {
    snapshot: Arc<RwLock<Arc<CopyRuleSnapshot>>>,
}

impl CopyRuleCache {
    pub fn new() -> Self {
        Self { snapshot: Arc::new(RwLock::new(Arc::new(CopyRuleSnapshot::default()))) }
    }

    pub async fn refresh(&self, repo: &(impl ConfigRepository + ?Sized)) -> Result<()> {
        let mut rules = repo.list_active_copy_rules().await?;
        rules.sort_by_key(|r| r.priority);

        let mut by_primary: HashMap<String, Vec<CopyRule>> = HashMap::new();
        for rule in rules {
            by_primary.entry(rule.primary_account_id.clone()).or_default().push(rule);
        }
        *self.snapshot.write() = Arc::new(CopyRuleSnapshot { by_primary });
        Ok(())
    }

    /// All active rules for `primary_account_id`, sorted by ascending priority,
    /// filtered by `order_type` and `qty` against each rule's min/max bounds.
    pub fn find_for_primary(&self, primary_account_id: &str, order_type_filter: OrderTypeFilter, qty: Decimal) -> Vec<CopyRule> {
        self.snapshot
            .read()
            .by_primary
            .get(primary_account_id)
            .map(|rules| {
                rules
                    .iter()
                    .filter(|r| rule_matches(r, order_type_filter, qty))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for CopyRuleCache {
    fn default() -> Self {
        Self::new()
    }
}

fn rule_matches(rule: &CopyRule, order_type_filter: OrderTypeFilter, qty: Decimal) -> bool {
    if rule.order_type_filter != OrderTypeFilter::Any && rule.order_type_filter != order_type_filter {
        return false;
    }
    if let Some(min) = rule.min_qty {
        if qty < min {
            return false;
        }
    }
    if let Some(max) = rule.max_qty {
        if qty > max {
            return false;
        }
    }
    true
}

/// Route name (upper-cased) -> metadata, backing locate-route lookups.
#[derive(Clone)]
pub struct RouteCache {
    snapshot: Arc<RwLock<Arc<HashMap<String, Route>>>>,
}

impl RouteCache {
    pub fn new() -> Self {
        Self { snapshot: Arc::new(RwLock::new(Arc::new(HashMap::new()))) }
    }

    pub async fn refresh(&self, repo: &(impl ConfigRepository + ?Sized)) -> Result<()> {
        let routes = repo.list_routes().await?;
        let map = routes.into_iter().map(|r| (r.name.to_ascii_uppercase(), r)).collect();
        *self.snapshot.write() = Arc::new(map);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<Route> {
        self.snapshot.read().get(&name.to_ascii_uppercase()).cloned()
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockConfigRepository;

    fn rule(primary: &str, shadow: &str, priority: i32) -> CopyRule {
        CopyRule {
            primary_account_id: primary.to_string(),
            shadow_account_id: shadow.to_string(),
            ratio: Decimal::ONE,
            min_qty: None,
            max_qty: None,
            order_type_filter: OrderTypeFilter::Any,
            copy_route: None,
            locate_route: None,
            priority,
            active: true,
        }
    }

    #[tokio::test]
    async fn account_cache_refresh_replaces_snapshot_atomically() {
        let mut repo = MockConfigRepository::new();
        repo.expect_list_accounts().returning(|| {
            Ok(vec![Account { id: "1".to_string(), number: "P1".to_string(), kind: AccountKind::Primary, strategy_key: None }])
        });

        let cache = AccountCache::new();
        cache.refresh(&repo).await.unwrap();
        assert!(cache.find_by_number("P1").is_some());
        assert!(cache.find_primary().is_some());
    }

    #[tokio::test]
    async fn copy_rule_cache_sorts_by_priority_ascending() {
        let mut repo = MockConfigRepository::new();
        repo.expect_list_active_copy_rules().returning(|| Ok(vec![rule("P1", "S2", 5), rule("P1", "S1", 1)]));

        let cache = CopyRuleCache::new();
        cache.refresh(&repo).await.unwrap();
        let rules = cache.find_for_primary("P1", OrderTypeFilter::Any, Decimal::ONE);
        assert_eq!(rules[0].shadow_account_id, "S1");
        assert_eq!(rules[1].shadow_account_id, "S2");
    }

    #[tokio::test]
    async fn copy_rule_cache_filters_by_min_max_qty() {
        let mut repo = MockConfigRepository::new();
        repo.expect_list_active_copy_rules().returning(|| {
            let mut r = rule("P1", "S1", 1);
            r.min_qty = Some(Decimal::from(50));
            Ok(vec![r])
        });

        let cache = CopyRuleCache::new();
        cache.refresh(&repo).await.unwrap();
        assert!(cache.find_for_primary("P1", OrderTypeFilter::Any, Decimal::from(10)).is_empty());
        assert_eq!(cache.find_for_primary("P1", OrderTypeFilter::Any, Decimal::from(100)).len(), 1);
    }

    #[tokio::test]
    async fn route_cache_lookup_is_case_insensitive() {
        let mut repo = MockConfigRepository::new();
        repo.expect_list_routes().returning(|| Ok(vec![Route { name: "nyse".to_string(), locate_type: None }]));

        let cache = RouteCache::new();
        cache.refresh(&repo).await.unwrap();
        assert!(cache.find("NYSE").is_some());
        assert!(cache.find("nyse").is_some());
    }
}
