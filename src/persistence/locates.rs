//! CRUD for short-locate negotiation state (C7/C8 storage).

use super::Database;
use crate::domain::models::{LocateRequest, LocateStatus};
use crate::ports::LocateRepository;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use std::str::FromStr;

fn status_to_text(status: LocateStatus) -> &'static str {
    match status {
        LocateStatus::Pending => "Pending",
        LocateStatus::ApprovedFull => "ApprovedFull",
        LocateStatus::ApprovedPartial => "ApprovedPartial",
        LocateStatus::Rejected => "Rejected",
        LocateStatus::Expired => "Expired",
        LocateStatus::Cancelled => "Cancelled",
    }
}

fn status_from_text(text: &str) -> Result<LocateStatus> {
    Ok(match text {
        "Pending" => LocateStatus::Pending,
        "ApprovedFull" => LocateStatus::ApprovedFull,
        "ApprovedPartial" => LocateStatus::ApprovedPartial,
        "Rejected" => LocateStatus::Rejected,
        "Expired" => LocateStatus::Expired,
        "Cancelled" => LocateStatus::Cancelled,
        other => anyhow::bail!("unrecognised locate status {other}"),
    })
}

fn opt_decimal_to_text(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

fn opt_decimal_from_text(text: Option<String>) -> Result<Option<Decimal>> {
    text.map(|t| Decimal::from_str(&t)).transpose().map_err(Into::into)
}

fn row_to_locate(row: sqlx::sqlite::SqliteRow) -> Result<LocateRequest> {
    let status_text: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(LocateRequest {
        id: row.get("id"),
        primary_order_id: row.get("primary_order_id"),
        account: row.get("account"),
        symbol: row.get("symbol"),
        quantity: Decimal::from_str(&row.get::<String, _>("quantity"))?,
        status: status_from_text(&status_text)?,
        quote_req_id: row.get("quote_req_id"),
        locate_route: row.get("locate_route"),
        offer_px: opt_decimal_from_text(row.get("offer_px"))?,
        offer_size: opt_decimal_from_text(row.get("offer_size"))?,
        approved_qty: opt_decimal_from_text(row.get("approved_qty"))?,
        response_text: row.get("response_text"),
        created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(&updated_at)?.with_timezone(&Utc),
    })
}

#[async_trait]
impl LocateRepository for Database {
    async fn insert(&self, request: &LocateRequest) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO locate_requests
                (id, primary_order_id, account, symbol, quantity, status, quote_req_id,
                 locate_route, offer_px, offer_size, approved_qty, response_text,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.id)
        .bind(&request.primary_order_id)
        .bind(&request.account)
        .bind(&request.symbol)
        .bind(request.quantity.to_string())
        .bind(status_to_text(request.status))
        .bind(&request.quote_req_id)
        .bind(&request.locate_route)
        .bind(opt_decimal_to_text(request.offer_px))
        .bind(opt_decimal_to_text(request.offer_size))
        .bind(opt_decimal_to_text(request.approved_qty))
        .bind(&request.response_text)
        .bind(request.created_at.to_rfc3339())
        .bind(request.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_quote_req_id(&self, quote_req_id: &str) -> Result<Option<LocateRequest>> {
        let row = sqlx::query("SELECT * FROM locate_requests WHERE quote_req_id = ?")
            .bind(quote_req_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_locate).transpose()
    }

    async fn find_by_primary_order_id(&self, primary_order_id: &str) -> Result<Option<LocateRequest>> {
        let row = sqlx::query(
            "SELECT * FROM locate_requests WHERE primary_order_id = ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(primary_order_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_locate).transpose()
    }

    async fn update_status(
        &self,
        id: &str,
        status: LocateStatus,
        offer_px: Option<Decimal>,
        offer_size: Option<Decimal>,
        approved_qty: Option<Decimal>,
        response_text: Option<String>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE locate_requests
            SET status = ?, offer_px = ?, offer_size = ?, approved_qty = ?, response_text = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status_to_text(status))
        .bind(opt_decimal_to_text(offer_px))
        .bind(opt_decimal_to_text(offer_size))
        .bind(opt_decimal_to_text(approved_qty))
        .bind(response_text)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_pending_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<LocateRequest>> {
        let rows = sqlx::query("SELECT * FROM locate_requests WHERE status = ? AND created_at < ?")
            .bind(status_to_text(LocateStatus::Pending))
            .bind(cutoff.to_rfc3339())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_locate).collect()
    }
}
