//! CRUD for execution events, derived orders, and order groups (C6 storage),
//! in the teacher's one-module-per-aggregate style (`db/trade_groups.rs`).

use super::Database;
use crate::domain::models::{ExecutionEvent, MirrorState, Order, OrderGroup, Side};
use crate::ports::OrderRepository;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use std::str::FromStr;

fn enum_to_text<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn enum_from_text<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
    Ok(serde_json::from_str(text)?)
}

fn opt_decimal_to_text(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

fn opt_decimal_from_text(text: Option<String>) -> Result<Option<Decimal>> {
    text.map(|t| Decimal::from_str(&t)).transpose().map_err(Into::into)
}

#[async_trait]
impl OrderRepository for Database {
    async fn insert_event_if_new(&self, event: &ExecutionEvent) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO execution_events
                (exec_id, order_id, cl_ord_id, orig_cl_ord_id, exec_type, ord_status, symbol,
                 side, ord_type, time_in_force, order_qty, last_qty, last_px, cum_qty,
                 leaves_qty, avg_px, price, stop_px, account, transact_time, session_key, raw_message)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.exec_id)
        .bind(&event.order_id)
        .bind(&event.cl_ord_id)
        .bind(&event.orig_cl_ord_id)
        .bind(enum_to_text(&event.exec_type))
        .bind(&event.ord_status)
        .bind(&event.symbol)
        .bind(enum_to_text(&event.side))
        .bind(event.ord_type.map(|t| enum_to_text(&t)))
        .bind(event.time_in_force.map(|t| enum_to_text(&t)))
        .bind(event.order_qty.to_string())
        .bind(opt_decimal_to_text(event.last_qty))
        .bind(opt_decimal_to_text(event.last_px))
        .bind(event.cum_qty.to_string())
        .bind(event.leaves_qty.to_string())
        .bind(opt_decimal_to_text(event.avg_px))
        .bind(opt_decimal_to_text(event.price))
        .bind(opt_decimal_to_text(event.stop_px))
        .bind(&event.account)
        .bind(event.transact_time.to_rfc3339())
        .bind(enum_to_text(&event.session_key))
        .bind(&event.raw_message)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders
                (order_id, cl_ord_id, orig_cl_ord_id, account, order_group_id, exec_type,
                 ord_status, cum_qty, leaves_qty, avg_px, last_px, last_qty, order_qty, symbol,
                 side, is_primary, is_shadow, draft, mirror_state, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(cl_ord_id) DO UPDATE SET
                order_id = excluded.order_id,
                orig_cl_ord_id = excluded.orig_cl_ord_id,
                order_group_id = excluded.order_group_id,
                exec_type = excluded.exec_type,
                ord_status = excluded.ord_status,
                cum_qty = excluded.cum_qty,
                leaves_qty = excluded.leaves_qty,
                avg_px = excluded.avg_px,
                last_px = excluded.last_px,
                last_qty = excluded.last_qty,
                order_qty = excluded.order_qty,
                draft = excluded.draft,
                mirror_state = excluded.mirror_state,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&order.order_id)
        .bind(&order.cl_ord_id)
        .bind(&order.orig_cl_ord_id)
        .bind(&order.account)
        .bind(&order.order_group_id)
        .bind(order.exec_type.map(|t| enum_to_text(&t)))
        .bind(&order.ord_status)
        .bind(order.cum_qty.to_string())
        .bind(order.leaves_qty.to_string())
        .bind(opt_decimal_to_text(order.avg_px))
        .bind(opt_decimal_to_text(order.last_px))
        .bind(opt_decimal_to_text(order.last_qty))
        .bind(order.order_qty.to_string())
        .bind(&order.symbol)
        .bind(enum_to_text(&order.side))
        .bind(order.is_primary)
        .bind(order.is_shadow)
        .bind(order.draft)
        .bind(enum_to_text(&order.mirror_state))
        .bind(order.created_at.to_rfc3339())
        .bind(order.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_order_by_order_id(&self, order_id: &str) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_order).transpose()
    }

    async fn find_order_by_cl_ord_id(&self, cl_ord_id: &str) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE cl_ord_id = ?")
            .bind(cl_ord_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_order).transpose()
    }

    async fn find_order_group(&self, strategy_key: &str) -> Result<Option<OrderGroup>> {
        let row = sqlx::query("SELECT * FROM order_groups WHERE strategy_key = ?")
            .bind(strategy_key)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else { return Ok(None) };

        let members = sqlx::query("SELECT shadow_order_id FROM order_group_members WHERE strategy_key = ?")
            .bind(strategy_key)
            .fetch_all(&self.pool)
            .await?;
        let shadow_order_ids = members.iter().map(|m| m.get::<String, _>("shadow_order_id")).collect();

        let created_at: String = row.get("created_at");
        Ok(Some(OrderGroup {
            strategy_key: row.get("strategy_key"),
            primary_order_id: row.get("primary_order_id"),
            shadow_order_ids,
            target_qty: Decimal::from_str(&row.get::<String, _>("target_qty"))?,
            created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
        }))
    }

    async fn create_order_group(&self, group: &OrderGroup) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO order_groups (strategy_key, primary_order_id, target_qty, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&group.strategy_key)
        .bind(&group.primary_order_id)
        .bind(group.target_qty.to_string())
        .bind(group.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_shadow_to_group(&self, strategy_key: &str, shadow_order_id: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO order_group_members (strategy_key, shadow_order_id) VALUES (?, ?)")
            .bind(strategy_key)
            .bind(shadow_order_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn row_to_order(row: sqlx::sqlite::SqliteRow) -> Result<Order> {
    let side_text: String = row.get("side");
    let side: Side = enum_from_text(&side_text)?;
    let mirror_state_text: String = row.get("mirror_state");
    let mirror_state: MirrorState = enum_from_text(&mirror_state_text)?;
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Order {
        order_id: row.get("order_id"),
        cl_ord_id: row.get("cl_ord_id"),
        orig_cl_ord_id: row.get("orig_cl_ord_id"),
        account: row.get("account"),
        order_group_id: row.get("order_group_id"),
        exec_type: row.get::<Option<String>, _>("exec_type").map(|t| enum_from_text(&t)).transpose()?,
        ord_status: row.get("ord_status"),
        cum_qty: Decimal::from_str(&row.get::<String, _>("cum_qty"))?,
        leaves_qty: Decimal::from_str(&row.get::<String, _>("leaves_qty"))?,
        avg_px: opt_decimal_from_text(row.get("avg_px"))?,
        last_px: opt_decimal_from_text(row.get("last_px"))?,
        last_qty: opt_decimal_from_text(row.get("last_qty"))?,
        order_qty: Decimal::from_str(&row.get::<String, _>("order_qty"))?,
        symbol: row.get("symbol"),
        side,
        is_primary: row.get("is_primary"),
        is_shadow: row.get("is_shadow"),
        draft: row.get("draft"),
        mirror_state,
        created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(&updated_at)?.with_timezone(&Utc),
    })
}
