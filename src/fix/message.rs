//! FIX 4.2 message shapes for exactly the MsgTypes this engine produces and
//! consumes. Ingress dispatch is a tagged enum matched once (no reflection),
//! per the redesign of the original class-per-message-type dispatch.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub const BEGIN_STRING: &str = "FIX.4.2";

/// Standard FIX tag numbers used by this crate's codec.
pub mod tags {
    pub const BEGIN_STRING: u32 = 8;
    pub const BODY_LENGTH: u32 = 9;
    pub const MSG_TYPE: u32 = 35;
    pub const SENDER_COMP_ID: u32 = 49;
    pub const TARGET_COMP_ID: u32 = 56;
    pub const MSG_SEQ_NUM: u32 = 34;
    pub const SENDING_TIME: u32 = 52;
    pub const CHECKSUM: u32 = 10;

    pub const ENCRYPT_METHOD: u32 = 98;
    pub const HEART_BT_INT: u32 = 108;
    pub const RESET_SEQ_NUM_FLAG: u32 = 141;
    pub const USERNAME: u32 = 553;
    pub const PASSWORD: u32 = 554;
    pub const TEXT: u32 = 58;
    pub const TEST_REQ_ID: u32 = 112;
    pub const GAP_FILL_FLAG: u32 = 123;
    pub const NEW_SEQ_NO: u32 = 36;

    pub const CL_ORD_ID: u32 = 11;
    pub const ORIG_CL_ORD_ID: u32 = 41;
    pub const ORDER_ID: u32 = 37;
    pub const EXEC_ID: u32 = 17;
    pub const EXEC_TYPE: u32 = 150;
    pub const ORD_STATUS: u32 = 39;
    pub const SYMBOL: u32 = 55;
    pub const SIDE: u32 = 54;
    pub const ORD_TYPE: u32 = 40;
    pub const TIME_IN_FORCE: u32 = 59;
    pub const ORDER_QTY: u32 = 38;
    pub const LAST_QTY: u32 = 32;
    pub const LAST_PX: u32 = 31;
    pub const CUM_QTY: u32 = 14;
    pub const LEAVES_QTY: u32 = 151;
    pub const AVG_PX: u32 = 6;
    pub const PRICE: u32 = 44;
    pub const STOP_PX: u32 = 99;
    pub const ACCOUNT: u32 = 1;
    pub const TRANSACT_TIME: u32 = 60;
    pub const HANDL_INST: u32 = 21;
    pub const EX_DESTINATION: u32 = 100;

    pub const QUOTE_REQ_ID: u32 = 131;
    pub const OFFER_PX: u32 = 134;
    pub const OFFER_SIZE: u32 = 135;
}

/// FIX MsgType (tag 35) values this engine produces or consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgType {
    Logon,
    Logout,
    Heartbeat,
    TestRequest,
    ResendRequest,
    Reject,
    SequenceReset,
    ExecutionReport,
    NewOrderSingle,
    OrderCancelRequest,
    OrderCancelReplaceRequest,
    QuoteRequest,
    QuoteResponse,
    Other(String),
}

impl MsgType {
    pub fn code(&self) -> &str {
        match self {
            MsgType::Logon => "A",
            MsgType::Logout => "5",
            MsgType::Heartbeat => "0",
            MsgType::TestRequest => "1",
            MsgType::ResendRequest => "2",
            MsgType::Reject => "3",
            MsgType::SequenceReset => "4",
            MsgType::ExecutionReport => "8",
            MsgType::NewOrderSingle => "D",
            MsgType::OrderCancelRequest => "F",
            MsgType::OrderCancelReplaceRequest => "G",
            MsgType::QuoteRequest => "R",
            MsgType::QuoteResponse => "S",
            MsgType::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "A" => MsgType::Logon,
            "5" => MsgType::Logout,
            "0" => MsgType::Heartbeat,
            "1" => MsgType::TestRequest,
            "2" => MsgType::ResendRequest,
            "3" => MsgType::Reject,
            "4" => MsgType::SequenceReset,
            "8" => MsgType::ExecutionReport,
            "D" => MsgType::NewOrderSingle,
            "F" => MsgType::OrderCancelRequest,
            "G" => MsgType::OrderCancelReplaceRequest,
            "R" => MsgType::QuoteRequest,
            "S" => MsgType::QuoteResponse,
            other => MsgType::Other(other.to_string()),
        }
    }
}

/// Header fields common to every outbound message.
#[derive(Debug, Clone)]
pub struct Header {
    pub sender_comp_id: String,
    pub target_comp_id: String,
    pub msg_seq_num: u32,
    pub sending_time: DateTime<Utc>,
}

/// Outbound Logon (MsgType=A) fields.
#[derive(Debug, Clone)]
pub struct LogonRequest {
    pub heart_bt_int: u16,
    pub reset_seq_num_flag: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LogoutRequest {
    pub text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrderSingle {
    pub cl_ord_id: String,
    pub symbol: String,
    pub side: crate::domain::models::Side,
    pub transact_time: DateTime<Utc>,
    pub ord_type: crate::domain::models::OrdType,
    pub order_qty: Decimal,
    pub price: Option<Decimal>,
    pub stop_px: Option<Decimal>,
    pub time_in_force: crate::domain::models::TimeInForce,
    pub account: String,
    pub ex_destination: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderCancelReplaceRequest {
    pub orig_cl_ord_id: String,
    pub cl_ord_id: String,
    pub symbol: String,
    pub side: crate::domain::models::Side,
    pub transact_time: DateTime<Utc>,
    pub ord_type: crate::domain::models::OrdType,
    pub order_qty: Decimal,
    pub price: Option<Decimal>,
    pub stop_px: Option<Decimal>,
    pub time_in_force: crate::domain::models::TimeInForce,
    pub account: String,
    pub ex_destination: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderCancelRequest {
    pub orig_cl_ord_id: String,
    pub cl_ord_id: String,
    pub symbol: String,
    pub side: crate::domain::models::Side,
    pub transact_time: DateTime<Utc>,
    pub account: String,
}

#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub quote_req_id: String,
    pub symbol: String,
    pub order_qty: Decimal,
    pub account: String,
    pub ex_destination: Option<String>,
}

/// Union of everything this engine can send. The codec is responsible for
/// attaching the session header, sequence number, and checksum.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    Logon(LogonRequest),
    Logout(LogoutRequest),
    Heartbeat { test_req_id: Option<String> },
    TestRequest { test_req_id: String },
    NewOrderSingle(NewOrderSingle),
    OrderCancelRequest(OrderCancelRequest),
    OrderCancelReplaceRequest(OrderCancelReplaceRequest),
    QuoteRequest(QuoteRequest),
}

impl OutboundMessage {
    pub fn msg_type(&self) -> MsgType {
        match self {
            OutboundMessage::Logon(_) => MsgType::Logon,
            OutboundMessage::Logout(_) => MsgType::Logout,
            OutboundMessage::Heartbeat { .. } => MsgType::Heartbeat,
            OutboundMessage::TestRequest { .. } => MsgType::TestRequest,
            OutboundMessage::NewOrderSingle(_) => MsgType::NewOrderSingle,
            OutboundMessage::OrderCancelRequest(_) => MsgType::OrderCancelRequest,
            OutboundMessage::OrderCancelReplaceRequest(_) => MsgType::OrderCancelReplaceRequest,
            OutboundMessage::QuoteRequest(_) => MsgType::QuoteRequest,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionReportFields {
    pub exec_id: String,
    pub order_id: String,
    pub cl_ord_id: Option<String>,
    pub orig_cl_ord_id: Option<String>,
    pub exec_type: String,
    pub ord_status: String,
    pub symbol: String,
    pub side: crate::domain::models::Side,
    pub ord_type: Option<crate::domain::models::OrdType>,
    pub time_in_force: Option<crate::domain::models::TimeInForce>,
    pub order_qty: Decimal,
    pub last_qty: Option<Decimal>,
    pub last_px: Option<Decimal>,
    pub cum_qty: Decimal,
    pub leaves_qty: Decimal,
    pub avg_px: Option<Decimal>,
    pub price: Option<Decimal>,
    pub stop_px: Option<Decimal>,
    pub account: Option<String>,
    pub transact_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct QuoteResponseFields {
    pub quote_req_id: String,
    pub offer_px: Option<Decimal>,
    pub offer_size: Option<Decimal>,
    pub text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SequenceResetFields {
    pub new_seq_no: u32,
    pub gap_fill_flag: bool,
}

/// Inbound message dispatch, extracted once from the header and matched by
/// pattern rather than runtime type inspection. `Other` carries the raw MsgType
/// code for anything the engine doesn't otherwise need.
#[derive(Debug, Clone)]
pub enum FixEvent {
    Logon { header: Header, incoming_seq: u32 },
    Logout { header: Header, text: Option<String> },
    Heartbeat { header: Header },
    TestRequest { header: Header, test_req_id: String },
    ExecutionReport { header: Header, fields: ExecutionReportFields },
    QuoteResponse { header: Header, fields: QuoteResponseFields },
    SequenceReset { header: Header, fields: SequenceResetFields },
    Other { header: Header, code: String },
}

impl FixEvent {
    pub fn header(&self) -> &Header {
        match self {
            FixEvent::Logon { header, .. }
            | FixEvent::Logout { header, .. }
            | FixEvent::Heartbeat { header }
            | FixEvent::TestRequest { header, .. }
            | FixEvent::ExecutionReport { header, .. }
            | FixEvent::QuoteResponse { header, .. }
            | FixEvent::SequenceReset { header, .. }
            | FixEvent::Other { header, .. } => header,
        }
    }
}

/// Decision returned by the `toAdmin` hook, replacing the original exception-based
/// `DoNotSend` control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendDecision {
    Send,
    Suppress(String),
}
