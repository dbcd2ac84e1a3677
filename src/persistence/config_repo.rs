//! Read-side for copy rules, accounts, and routes (C12 cache sources).

use super::Database;
use crate::domain::models::{Account, AccountKind, CopyRule, OrderTypeFilter, Route};
use crate::ports::ConfigRepository;
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Row;
use std::str::FromStr;

fn filter_to_text(filter: OrderTypeFilter) -> &'static str {
    match filter {
        OrderTypeFilter::Any => "Any",
        OrderTypeFilter::LimitOnly => "LimitOnly",
        OrderTypeFilter::MarketOnly => "MarketOnly",
    }
}

fn filter_from_text(text: &str) -> Result<OrderTypeFilter> {
    Ok(match text {
        "Any" => OrderTypeFilter::Any,
        "LimitOnly" => OrderTypeFilter::LimitOnly,
        "MarketOnly" => OrderTypeFilter::MarketOnly,
        other => anyhow::bail!("unrecognised order type filter {other}"),
    })
}

fn kind_to_text(kind: AccountKind) -> &'static str {
    match kind {
        AccountKind::Primary => "Primary",
        AccountKind::Shadow => "Shadow",
    }
}

fn kind_from_text(text: &str) -> Result<AccountKind> {
    Ok(match text {
        "Primary" => AccountKind::Primary,
        "Shadow" => AccountKind::Shadow,
        other => anyhow::bail!("unrecognised account kind {other}"),
    })
}

fn opt_decimal_from_text(text: Option<String>) -> Result<Option<Decimal>> {
    text.map(|t| Decimal::from_str(&t)).transpose().map_err(Into::into)
}

#[async_trait]
impl ConfigRepository for Database {
    async fn list_active_copy_rules(&self) -> Result<Vec<CopyRule>> {
        let rows = sqlx::query("SELECT * FROM copy_rules WHERE active = 1 ORDER BY priority ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let filter_text: String = row.get("order_type_filter");
                Ok(CopyRule {
                    primary_account_id: row.get("primary_account_id"),
                    shadow_account_id: row.get("shadow_account_id"),
                    ratio: Decimal::from_str(&row.get::<String, _>("ratio"))?,
                    min_qty: opt_decimal_from_text(row.get("min_qty"))?,
                    max_qty: opt_decimal_from_text(row.get("max_qty"))?,
                    order_type_filter: filter_from_text(&filter_text)?,
                    copy_route: row.get("copy_route"),
                    locate_route: row.get("locate_route"),
                    priority: row.get("priority"),
                    active: row.get::<i64, _>("active") != 0,
                })
            })
            .collect()
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query("SELECT * FROM accounts").fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| {
                let kind_text: String = row.get("kind");
                Ok(Account {
                    id: row.get("id"),
                    number: row.get("number"),
                    kind: kind_from_text(&kind_text)?,
                    strategy_key: row.get("strategy_key"),
                })
            })
            .collect()
    }

    async fn list_routes(&self) -> Result<Vec<Route>> {
        let rows = sqlx::query("SELECT * FROM routes").fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| Route { name: row.get("name"), locate_type: row.get("locate_type") })
            .collect())
    }
}

/// Seeds `copy_rules`/`accounts`/`routes` from static configuration at bootstrap,
/// ahead of the first [`crate::domain::caches`] refresh. Idempotent: re-running
/// with the same rows is a no-op thanks to the primary-key conflict clauses.
impl Database {
    pub async fn seed_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            "INSERT INTO accounts (id, number, kind, strategy_key) VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET number = excluded.number, kind = excluded.kind, strategy_key = excluded.strategy_key",
        )
        .bind(&account.id)
        .bind(&account.number)
        .bind(kind_to_text(account.kind))
        .bind(&account.strategy_key)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn seed_copy_rule(&self, rule: &CopyRule) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO copy_rules
                (primary_account_id, shadow_account_id, ratio, min_qty, max_qty,
                 order_type_filter, copy_route, locate_route, priority, active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(primary_account_id, shadow_account_id) DO UPDATE SET
                ratio = excluded.ratio,
                min_qty = excluded.min_qty,
                max_qty = excluded.max_qty,
                order_type_filter = excluded.order_type_filter,
                copy_route = excluded.copy_route,
                locate_route = excluded.locate_route,
                priority = excluded.priority,
                active = excluded.active
            "#,
        )
        .bind(&rule.primary_account_id)
        .bind(&rule.shadow_account_id)
        .bind(rule.ratio.to_string())
        .bind(rule.min_qty.map(|d| d.to_string()))
        .bind(rule.max_qty.map(|d| d.to_string()))
        .bind(filter_to_text(rule.order_type_filter))
        .bind(&rule.copy_route)
        .bind(&rule.locate_route)
        .bind(rule.priority)
        .bind(rule.active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn seed_route(&self, route: &Route) -> Result<()> {
        sqlx::query(
            "INSERT INTO routes (name, locate_type) VALUES (?, ?)
             ON CONFLICT(name) DO UPDATE SET locate_type = excluded.locate_type",
        )
        .bind(&route.name)
        .bind(&route.locate_type)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
