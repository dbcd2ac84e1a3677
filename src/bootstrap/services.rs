//! Constructs every long-lived component (C2-C12) and wires them into a
//! single [`ServiceRegistry`], mirroring the teacher's `bootstrap::services::setup`
//! (one registry built once at startup, `Arc`s handed to whatever consumes them).

use crate::admin_hooks::{AdminHookRouter, AdminHooks};
use crate::config::Config;
use crate::domain::caches::{AccountCache, CopyRuleCache, RouteCache};
use crate::domain::locate_coordinator::LocateCoordinator;
use crate::domain::locate_machine::LocateStateMachine;
use crate::domain::models::{Account, AccountKind};
use crate::domain::order_store::OrderStore;
use crate::domain::replication::{IdentityAliasResolver, ReplicationEngine};
use crate::domain::session_registry::SessionRegistry;
use crate::domain::trading_hours::TradingHoursGuard;
use crate::fix::settings;
use crate::persistence::Database;
use crate::ports::FixSender;
use crate::session_manager::SessionManager;
use anyhow::{Context, Result};
use std::sync::Arc;

pub struct ServiceRegistry {
    pub db: Arc<Database>,
    pub session_manager: Arc<SessionManager>,
    pub trading_hours: Arc<TradingHoursGuard>,
    pub locate_coordinator: LocateCoordinator,
    pub admin_hooks: Arc<dyn AdminHooks>,
}

/// Seeds `accounts` from `trading.shadow_accounts` (plus a synthetic primary
/// account keyed by `trading.primary_session`) ahead of the first
/// `AccountCache::refresh()`, per the field's doc comment in [`crate::config`].
async fn seed_accounts(db: &Database, config: &Config) -> Result<()> {
    db.seed_account(&Account {
        id: config.trading.primary_session.clone(),
        number: config.trading.primary_session.clone(),
        kind: AccountKind::Primary,
        strategy_key: None,
    })
    .await?;

    for (shadow_id, number) in &config.trading.shadow_accounts {
        db.seed_account(&Account { id: shadow_id.clone(), number: number.clone(), kind: AccountKind::Shadow, strategy_key: None })
            .await?;
    }
    Ok(())
}

pub async fn setup(config: &Config) -> Result<ServiceRegistry> {
    let db = Arc::new(Database::new(&config.database.url).await?);
    seed_accounts(&db, config).await?;

    let copy_rules = CopyRuleCache::new();
    let accounts = AccountCache::new();
    let routes = RouteCache::new();
    copy_rules.refresh(db.as_ref()).await?;
    accounts.refresh(db.as_ref()).await?;
    routes.refresh(db.as_ref()).await?;
    tracing::info!("copy rule / account / route caches primed from storage");

    let registry = SessionRegistry::new();
    let trading_hours = Arc::new(TradingHoursGuard::new(config.initiator.to_guard_config()));
    let coordinator = LocateCoordinator::new();
    let order_store = Arc::new(OrderStore::new(db.clone()));

    let fix_settings = settings::load(&config.trading.config_path).context("failed to load FIX settings file")?;
    let session_manager = SessionManager::new(fix_settings, registry.clone());
    let sender: Arc<dyn FixSender> = session_manager.clone();

    let locate_timeout = config.locate.timeout();
    let locate_machine = Arc::new(LocateStateMachine::new(
        db.clone(),
        sender.clone(),
        coordinator.clone(),
        config.trading.primary_session.clone(),
        config.trading.cl_ord_id_prefix.clone(),
        locate_timeout,
    ));

    let replication = Arc::new(ReplicationEngine::new(
        order_store,
        locate_machine.clone(),
        coordinator.clone(),
        copy_rules,
        accounts,
        routes,
        sender,
        Arc::new(IdentityAliasResolver),
        config.trading.primary_session.clone(),
        config.trading.cl_ord_id_prefix.clone(),
        locate_timeout,
    ));

    let hooks = Arc::new(AdminHookRouter::new(
        registry,
        trading_hours.clone(),
        config.initiator.resolve_zone(),
        Arc::new(OrderStore::new(db.clone())),
        replication,
        locate_machine,
        coordinator.clone(),
        db.clone(),
        session_manager.clone(),
        config.trading.primary_session.clone(),
        None,
        None,
    ));
    session_manager.bind_hooks(hooks.clone());

    Ok(ServiceRegistry { db, session_manager, trading_hours, locate_coordinator: coordinator, admin_hooks: hooks })
}
