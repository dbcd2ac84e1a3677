//! Locate State Machine (C8): drives the short-locate negotiation — quote
//! request, quote response, accept, confirmation — for a primary drop-copy
//! execution event with `side in {SellShort, SellShortExempt}`.

use super::locate_coordinator::LocateCoordinator;
use super::models::{LocateRequest, LocateStatus, OrdType, Side, TimeInForce};
use crate::fix::message::{NewOrderSingle, QuoteRequest};
use crate::fix::OutboundMessage;
use crate::ports::{FixSender, LocateRepository};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("locate rejected: {0}")]
    Rejected(String),
    #[error("locate timed out")]
    Timeout,
    #[error("no logged-on session for alias {0}")]
    NoSession(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub struct LocateStateMachine<R: LocateRepository + ?Sized, S: FixSender + ?Sized> {
    repo: Arc<R>,
    sender: Arc<S>,
    coordinator: LocateCoordinator,
    order_entry_alias: String,
    cl_ord_id_prefix: String,
    timeout: Duration,
}

impl<R: LocateRepository + ?Sized, S: FixSender + ?Sized> LocateStateMachine<R, S> {
    pub fn new(
        repo: Arc<R>,
        sender: Arc<S>,
        coordinator: LocateCoordinator,
        order_entry_alias: impl Into<String>,
        cl_ord_id_prefix: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            repo,
            sender,
            coordinator,
            order_entry_alias: order_entry_alias.into(),
            cl_ord_id_prefix: cl_ord_id_prefix.into(),
            timeout,
        }
    }

    /// Step 1-3: persists a `Pending` LocateRequest, sends the Quote Request
    /// (MsgType=R), and registers the primary order with the Locate
    /// Coordinator so the caller can await the eventual outcome.
    pub async fn start(
        &self,
        primary_order_id: &str,
        account: &str,
        symbol: &str,
        requested_qty: Decimal,
        locate_route: Option<String>,
    ) -> Result<tokio::sync::oneshot::Receiver<super::models::LocateOutcome>, LocateError> {
        let quote_req_id = Uuid::new_v4().to_string();
        let request = LocateRequest::new(
            Uuid::new_v4().to_string(),
            primary_order_id,
            account,
            symbol,
            requested_qty,
            quote_req_id.clone(),
            locate_route.clone(),
        );
        self.repo.insert(&request).await?;

        let (rx, _newly_registered) = self.coordinator.register(primary_order_id, self.timeout).await;

        let sent = self
            .sender
            .send(
                &self.order_entry_alias,
                OutboundMessage::QuoteRequest(QuoteRequest {
                    quote_req_id,
                    symbol: symbol.to_string(),
                    order_qty: requested_qty,
                    account: account.to_string(),
                    ex_destination: locate_route,
                }),
            )
            .await?;

        if !sent {
            let message = format!("no logged-on order-entry session for alias {}", self.order_entry_alias);
            self.repo
                .update_status(&request.id, LocateStatus::Rejected, None, None, None, Some(message.clone()))
                .await?;
            self.coordinator.complete_failure(primary_order_id, &message).await;
            return Err(LocateError::NoSession(self.order_entry_alias.clone()));
        }

        Ok(rx)
    }

    /// Step 4: processes the inbound quote response. Resolves the terminal
    /// status per the boundary rules and, on approval, sends the locate
    /// accept (MsgType=D, Side=Buy, ClOrdID=quoteReqId).
    pub async fn process_quote_response(
        &self,
        quote_req_id: &str,
        offer_px: Option<Decimal>,
        offer_size: Option<Decimal>,
        text: Option<String>,
    ) -> Result<(), LocateError> {
        let Some(request) = self.repo.find_by_quote_req_id(quote_req_id).await? else {
            return Ok(());
        };

        match offer_size {
            None => {
                self.reject(&request, "no offer size in quote response").await?;
                return Err(LocateError::Rejected("no offer size in quote response".to_string()));
            }
            Some(size) if size <= Decimal::ZERO => {
                self.reject(&request, "offer size is zero").await?;
                return Err(LocateError::Rejected("offer size is zero".to_string()));
            }
            Some(size) => {
                let (status, approved_qty) = if size >= request.quantity {
                    (LocateStatus::ApprovedFull, request.quantity)
                } else {
                    (LocateStatus::ApprovedPartial, size)
                };
                self.repo
                    .update_status(&request.id, status, offer_px, offer_size, Some(approved_qty), text)
                    .await?;

                let accept_sent = self
                    .sender
                    .send(
                        &self.order_entry_alias,
                        OutboundMessage::NewOrderSingle(NewOrderSingle {
                            cl_ord_id: quote_req_id.to_string(),
                            symbol: request.symbol.clone(),
                            side: Side::Buy,
                            transact_time: Utc::now(),
                            ord_type: OrdType::Market,
                            order_qty: approved_qty,
                            price: None,
                            stop_px: None,
                            time_in_force: TimeInForce::Day,
                            account: request.account.clone(),
                            ex_destination: request.locate_route.clone(),
                        }),
                    )
                    .await?;

                if !accept_sent {
                    let message = "no logged-on order-entry session to send locate accept";
                    self.reject(&request, message).await?;
                    return Err(LocateError::NoSession(self.order_entry_alias.clone()));
                }
                Ok(())
            }
        }
    }

    /// Step 6: an ExecutionReport with OrdStatus=B whose ClOrdID (or QuoteReqID)
    /// matches fulfils the coordinator entry with success.
    pub async fn process_locate_confirmation(&self, quote_req_id: &str) -> Result<(), LocateError> {
        let Some(request) = self.repo.find_by_quote_req_id(quote_req_id).await? else {
            return Ok(());
        };
        let Some(approved_qty) = request.approved_qty else {
            // A confirmation without a prior approval is unexpected; surface it
            // as a rejection rather than completing with an unknown quantity.
            self.reject(&request, "locate confirmation received before approval").await?;
            return Err(LocateError::Rejected("locate confirmation received before approval".to_string()));
        };
        self.coordinator.complete_success(&request.primary_order_id, approved_qty, request.id.clone(), None).await;
        Ok(())
    }

    async fn reject(&self, request: &LocateRequest, message: &str) -> Result<(), LocateError> {
        self.repo
            .update_status(&request.id, LocateStatus::Rejected, None, None, None, Some(message.to_string()))
            .await?;
        self.coordinator.complete_failure(&request.primary_order_id, message).await;
        Ok(())
    }

    pub fn cl_ord_id_prefix(&self) -> &str {
        &self.cl_ord_id_prefix
    }
}

/// The scheduled locate-expiry sweep: any `Pending` request older than
/// `timeout` is marked `Expired` and its coordinator entry completed with
/// failure `"timeout"`. Runs independently of the coordinator's own
/// per-registration timeout guard so a request is never left `Pending`
/// forever even if the in-process coordinator entry was somehow lost (e.g.
/// process restart with persisted-but-unregistered requests).
pub async fn sweep_expired_locates(
    repo: &(impl LocateRepository + ?Sized),
    coordinator: &LocateCoordinator,
    timeout: Duration,
) -> anyhow::Result<usize> {
    let cutoff = Utc::now() - chrono::Duration::from_std(timeout).unwrap_or(chrono::Duration::seconds(30));
    let expired = repo.find_pending_older_than(cutoff).await?;
    for request in &expired {
        repo.update_status(&request.id, LocateStatus::Expired, None, None, None, Some("timeout".to_string())).await?;
        coordinator.complete_failure(&request.primary_order_id, "timeout").await;
    }
    Ok(expired.len())
}
