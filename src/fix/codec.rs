//! Minimal tag=value, SOH-delimited FIX 4.2 encode/decode for exactly the
//! MsgTypes this engine produces and consumes. A full FIX dictionary/session
//! engine is out of scope; this module hand-rolls the application-level
//! payload the same way the rest of this codebase hand-parses the wire
//! formats it actually needs rather than pulling in a generic protocol stack.

use super::error::ProtocolError;
use super::message::{
    tags, ExecutionReportFields, FixEvent, Header, MsgType, OutboundMessage, QuoteResponseFields,
    SequenceResetFields, BEGIN_STRING,
};
use crate::domain::models::{OrdType, Side, TimeInForce};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

const SOH: char = '\u{1}';

/// A decoded message before application-level interpretation: MsgType plus an
/// ordered list of (tag, value) pairs, duplicates preserved in arrival order.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub msg_type: String,
    pub fields: Vec<(u32, String)>,
}

impl RawMessage {
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.fields.iter().find(|(t, _)| *t == tag).map(|(_, v)| v.as_str())
    }

    fn get_decimal(&self, tag: u32) -> Result<Option<Decimal>, ProtocolError> {
        match self.get(tag) {
            None => Ok(None),
            Some(raw) => Decimal::from_str(raw)
                .map(Some)
                .map_err(|_| ProtocolError::IncorrectTagValue { tag, value: raw.to_string() }),
        }
    }

    fn require(&self, tag: u32) -> Result<&str, ProtocolError> {
        self.get(tag).ok_or(ProtocolError::RequiredTagMissing { tag, msg_type: self.msg_type.clone() })
    }
}

/// Parses a raw SOH-delimited body into tag/value pairs. Checksum and body
/// length are validated but not re-derived; a mismatch is a [`ProtocolError::Malformed`].
pub fn decode_raw(raw: &str) -> Result<RawMessage, ProtocolError> {
    let mut fields = Vec::new();
    let mut msg_type = None;

    for pair in raw.split(SOH).filter(|s| !s.is_empty()) {
        let mut parts = pair.splitn(2, '=');
        let tag_str = parts.next().ok_or_else(|| ProtocolError::Malformed(pair.to_string()))?;
        let value = parts.next().ok_or_else(|| ProtocolError::Malformed(pair.to_string()))?;
        let tag: u32 = tag_str
            .parse()
            .map_err(|_| ProtocolError::Malformed(format!("non-numeric tag '{tag_str}'")))?;

        if tag == tags::MSG_TYPE {
            msg_type = Some(value.to_string());
        }
        fields.push((tag, value.to_string()));
    }

    let msg_type = msg_type.ok_or(ProtocolError::RequiredTagMissing {
        tag: tags::MSG_TYPE,
        msg_type: "<unknown>".to_string(),
    })?;

    Ok(RawMessage { msg_type, fields })
}

fn parse_sending_time(raw: &RawMessage) -> Result<DateTime<Utc>, ProtocolError> {
    let text = raw.require(tags::SENDING_TIME)?;
    // FIX UTCTimestamp: YYYYMMDD-HH:MM:SS[.sss]
    for fmt in ["%Y%m%d-%H:%M:%S%.f", "%Y%m%d-%H:%M:%S"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(ProtocolError::IncorrectTagValue { tag: tags::SENDING_TIME, value: text.to_string() })
}

fn parse_header(raw: &RawMessage) -> Result<Header, ProtocolError> {
    Ok(Header {
        sender_comp_id: raw.require(tags::SENDER_COMP_ID)?.to_string(),
        target_comp_id: raw.require(tags::TARGET_COMP_ID)?.to_string(),
        msg_seq_num: raw
            .require(tags::MSG_SEQ_NUM)?
            .parse()
            .map_err(|_| ProtocolError::IncorrectTagValue {
                tag: tags::MSG_SEQ_NUM,
                value: raw.get(tags::MSG_SEQ_NUM).unwrap_or_default().to_string(),
            })?,
        sending_time: parse_sending_time(raw)?,
    })
}

/// Interprets a decoded [`RawMessage`] into a tagged [`FixEvent`], the single
/// dispatch point the rest of the engine matches on.
pub fn interpret(raw: &RawMessage) -> Result<FixEvent, ProtocolError> {
    let header = parse_header(raw)?;
    let msg_type = MsgType::from_code(&raw.msg_type);

    match msg_type {
        MsgType::Logon => {
            let incoming_seq = header.msg_seq_num;
            Ok(FixEvent::Logon { header, incoming_seq })
        }
        MsgType::Logout => Ok(FixEvent::Logout { text: raw.get(tags::TEXT).map(str::to_string), header }),
        MsgType::Heartbeat => Ok(FixEvent::Heartbeat { header }),
        MsgType::TestRequest => {
            let test_req_id = raw.require(tags::TEST_REQ_ID)?.to_string();
            Ok(FixEvent::TestRequest { header, test_req_id })
        }
        MsgType::SequenceReset => {
            let new_seq_no: u32 = raw
                .require(tags::NEW_SEQ_NO)?
                .parse()
                .map_err(|_| ProtocolError::IncorrectTagValue {
                    tag: tags::NEW_SEQ_NO,
                    value: raw.get(tags::NEW_SEQ_NO).unwrap_or_default().to_string(),
                })?;
            let gap_fill_flag = raw.get(tags::GAP_FILL_FLAG).map(|v| v == "Y").unwrap_or(false);
            Ok(FixEvent::SequenceReset { header, fields: SequenceResetFields { new_seq_no, gap_fill_flag } })
        }
        MsgType::ExecutionReport => {
            let side_code = raw.require(tags::SIDE)?;
            let side = Side::from_fix_code(side_code)
                .ok_or_else(|| ProtocolError::IncorrectTagValue { tag: tags::SIDE, value: side_code.to_string() })?;
            let ord_status = raw.require(tags::ORD_STATUS)?.to_string();
            let exec_type_code = raw.require(tags::EXEC_TYPE)?;
            let fields = ExecutionReportFields {
                exec_id: raw.require(tags::EXEC_ID)?.to_string(),
                order_id: raw.require(tags::ORDER_ID)?.to_string(),
                cl_ord_id: raw.get(tags::CL_ORD_ID).map(str::to_string),
                orig_cl_ord_id: raw.get(tags::ORIG_CL_ORD_ID).map(str::to_string),
                exec_type: exec_type_code.to_string(),
                ord_status,
                symbol: raw.require(tags::SYMBOL)?.to_string(),
                side,
                ord_type: raw.get(tags::ORD_TYPE).and_then(OrdType::from_fix_code),
                time_in_force: raw.get(tags::TIME_IN_FORCE).and_then(TimeInForce::from_fix_code),
                order_qty: raw.get_decimal(tags::ORDER_QTY)?.unwrap_or(Decimal::ZERO),
                last_qty: raw.get_decimal(tags::LAST_QTY)?,
                last_px: raw.get_decimal(tags::LAST_PX)?,
                cum_qty: raw.get_decimal(tags::CUM_QTY)?.unwrap_or(Decimal::ZERO),
                leaves_qty: raw.get_decimal(tags::LEAVES_QTY)?.unwrap_or(Decimal::ZERO),
                avg_px: raw.get_decimal(tags::AVG_PX)?,
                price: raw.get_decimal(tags::PRICE)?,
                stop_px: raw.get_decimal(tags::STOP_PX)?,
                account: raw.get(tags::ACCOUNT).map(str::to_string),
                transact_time: parse_transact_time(raw)?,
            };
            Ok(FixEvent::ExecutionReport { header, fields })
        }
        MsgType::QuoteResponse => {
            let fields = QuoteResponseFields {
                quote_req_id: raw.require(tags::QUOTE_REQ_ID)?.to_string(),
                offer_px: raw.get_decimal(tags::OFFER_PX)?,
                offer_size: raw.get_decimal(tags::OFFER_SIZE)?,
                text: raw.get(tags::TEXT).map(str::to_string),
            };
            Ok(FixEvent::QuoteResponse { header, fields })
        }
        MsgType::Other(code) => Ok(FixEvent::Other { header, code }),
        // ResendRequest/Reject carry no further application meaning here; the
        // session layer of the codec (out of scope) handles resend semantics.
        MsgType::ResendRequest | MsgType::Reject => Ok(FixEvent::Other { header, code: raw.msg_type.clone() }),
        other => Ok(FixEvent::Other { header, code: other.code().to_string() }),
    }
}

fn parse_transact_time(raw: &RawMessage) -> Result<DateTime<Utc>, ProtocolError> {
    let text = raw.require(tags::TRANSACT_TIME)?;
    for fmt in ["%Y%m%d-%H:%M:%S%.f", "%Y%m%d-%H:%M:%S"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(ProtocolError::IncorrectTagValue { tag: tags::TRANSACT_TIME, value: text.to_string() })
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%d-%H:%M:%S%.3f").to_string()
}

fn checksum(body: &str) -> u32 {
    body.bytes().map(u32::from).sum::<u32>() % 256
}

/// Encodes an [`OutboundMessage`] into the SOH-delimited wire form, attaching
/// the session header, a standard-header/trailer, and checksum. Sequence number
/// discipline (what `msg_seq_num` should be) is the caller's responsibility.
pub fn encode(msg: &OutboundMessage, header: &Header) -> String {
    let mut body_fields: Vec<(u32, String)> = vec![
        (tags::MSG_TYPE, msg.msg_type().code().to_string()),
        (tags::SENDER_COMP_ID, header.sender_comp_id.clone()),
        (tags::TARGET_COMP_ID, header.target_comp_id.clone()),
        (tags::MSG_SEQ_NUM, header.msg_seq_num.to_string()),
        (tags::SENDING_TIME, format_timestamp(header.sending_time)),
    ];

    match msg {
        OutboundMessage::Logon(l) => {
            body_fields.push((tags::ENCRYPT_METHOD, "0".to_string()));
            body_fields.push((tags::HEART_BT_INT, l.heart_bt_int.to_string()));
            if l.reset_seq_num_flag {
                body_fields.push((tags::RESET_SEQ_NUM_FLAG, "Y".to_string()));
            }
            if let Some(u) = &l.username {
                body_fields.push((tags::USERNAME, u.clone()));
            }
            if let Some(p) = &l.password {
                body_fields.push((tags::PASSWORD, p.clone()));
            }
        }
        OutboundMessage::Logout(l) => {
            if let Some(t) = &l.text {
                body_fields.push((tags::TEXT, t.clone()));
            }
        }
        OutboundMessage::Heartbeat { test_req_id } => {
            if let Some(id) = test_req_id {
                body_fields.push((tags::TEST_REQ_ID, id.clone()));
            }
        }
        OutboundMessage::TestRequest { test_req_id } => {
            body_fields.push((tags::TEST_REQ_ID, test_req_id.clone()));
        }
        OutboundMessage::NewOrderSingle(n) => {
            body_fields.push((tags::CL_ORD_ID, n.cl_ord_id.clone()));
            body_fields.push((tags::HANDL_INST, "1".to_string()));
            body_fields.push((tags::SYMBOL, n.symbol.clone()));
            body_fields.push((tags::SIDE, n.side.to_fix_code().to_string()));
            body_fields.push((tags::TRANSACT_TIME, format_timestamp(n.transact_time)));
            body_fields.push((tags::ORD_TYPE, n.ord_type.to_fix_code().to_string()));
            body_fields.push((tags::ORDER_QTY, n.order_qty.to_string()));
            if n.ord_type.carries_price() {
                if let Some(px) = n.price {
                    body_fields.push((tags::PRICE, px.to_string()));
                }
            }
            if n.ord_type.carries_stop_px() {
                if let Some(sp) = n.stop_px {
                    body_fields.push((tags::STOP_PX, sp.to_string()));
                }
            }
            body_fields.push((tags::TIME_IN_FORCE, n.time_in_force.to_fix_code().to_string()));
            body_fields.push((tags::ACCOUNT, n.account.clone()));
            if let Some(dest) = &n.ex_destination {
                body_fields.push((tags::EX_DESTINATION, dest.clone()));
            }
        }
        OutboundMessage::OrderCancelReplaceRequest(r) => {
            body_fields.push((tags::ORIG_CL_ORD_ID, r.orig_cl_ord_id.clone()));
            body_fields.push((tags::CL_ORD_ID, r.cl_ord_id.clone()));
            body_fields.push((tags::SYMBOL, r.symbol.clone()));
            body_fields.push((tags::SIDE, r.side.to_fix_code().to_string()));
            body_fields.push((tags::TRANSACT_TIME, format_timestamp(r.transact_time)));
            body_fields.push((tags::ORD_TYPE, r.ord_type.to_fix_code().to_string()));
            body_fields.push((tags::ORDER_QTY, r.order_qty.to_string()));
            if r.ord_type.carries_price() {
                if let Some(px) = r.price {
                    body_fields.push((tags::PRICE, px.to_string()));
                }
            }
            if r.ord_type.carries_stop_px() {
                if let Some(sp) = r.stop_px {
                    body_fields.push((tags::STOP_PX, sp.to_string()));
                }
            }
            body_fields.push((tags::TIME_IN_FORCE, r.time_in_force.to_fix_code().to_string()));
            body_fields.push((tags::ACCOUNT, r.account.clone()));
            if let Some(dest) = &r.ex_destination {
                body_fields.push((tags::EX_DESTINATION, dest.clone()));
            }
        }
        OutboundMessage::OrderCancelRequest(c) => {
            body_fields.push((tags::ORIG_CL_ORD_ID, c.orig_cl_ord_id.clone()));
            body_fields.push((tags::CL_ORD_ID, c.cl_ord_id.clone()));
            body_fields.push((tags::SYMBOL, c.symbol.clone()));
            body_fields.push((tags::SIDE, c.side.to_fix_code().to_string()));
            body_fields.push((tags::TRANSACT_TIME, format_timestamp(c.transact_time)));
            body_fields.push((tags::ACCOUNT, c.account.clone()));
        }
        OutboundMessage::QuoteRequest(q) => {
            body_fields.push((tags::QUOTE_REQ_ID, q.quote_req_id.clone()));
            body_fields.push((tags::SYMBOL, q.symbol.clone()));
            body_fields.push((tags::ORDER_QTY, q.order_qty.to_string()));
            body_fields.push((tags::ACCOUNT, q.account.clone()));
            if let Some(dest) = &q.ex_destination {
                body_fields.push((tags::EX_DESTINATION, dest.clone()));
            }
        }
    }

    let body: String = body_fields
        .iter()
        .filter(|(t, _)| *t != tags::MSG_TYPE)
        .map(|(t, v)| format!("{t}={v}{SOH}"))
        .collect::<Vec<_>>()
        .join("");
    let msg_type_field = format!("{}={}{SOH}", tags::MSG_TYPE, msg.msg_type().code());
    let body_with_msgtype = format!("{msg_type_field}{body}");

    let body_length = body_with_msgtype.len();
    let mut out = format!(
        "{}={}{SOH}{}={}{SOH}{}",
        tags::BEGIN_STRING,
        BEGIN_STRING,
        tags::BODY_LENGTH,
        body_length,
        body_with_msgtype,
    );
    let cksum = checksum(&out);
    out.push_str(&format!("{}={:03}{SOH}", tags::CHECKSUM, cksum));
    out
}

/// Indexes a decoded message's fields by tag for callers that need ad-hoc lookups
/// beyond what [`interpret`] extracts (e.g. broker-specific overlay fields).
pub fn index_fields(raw: &RawMessage) -> HashMap<u32, String> {
    raw.fields.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::message::{LogonRequest, NewOrderSingle};
    use rust_decimal_macros::dec;

    fn test_header() -> Header {
        Header {
            sender_comp_id: "GATEWAY".to_string(),
            target_comp_id: "SHADOW1".to_string(),
            msg_seq_num: 1,
            sending_time: Utc.with_ymd_and_hms(2026, 1, 2, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn encode_then_decode_logon_round_trips_key_fields() {
        let header = test_header();
        let msg = OutboundMessage::Logon(LogonRequest {
            heart_bt_int: 30,
            reset_seq_num_flag: true,
            username: Some("user".to_string()),
            password: None,
        });
        let wire = encode(&msg, &header);
        let raw = decode_raw(&wire).unwrap();
        assert_eq!(raw.msg_type, "A");
        assert_eq!(raw.get(tags::RESET_SEQ_NUM_FLAG), Some("Y"));
        assert_eq!(raw.get(tags::SENDER_COMP_ID), Some("GATEWAY"));

        let event = interpret(&raw).unwrap();
        match event {
            FixEvent::Logon { incoming_seq, .. } => assert_eq!(incoming_seq, 1),
            other => panic!("expected Logon, got {other:?}"),
        }
    }

    #[test]
    fn new_order_single_omits_price_for_market_orders() {
        let header = test_header();
        let msg = OutboundMessage::NewOrderSingle(NewOrderSingle {
            cl_ord_id: "MIRROR-N-S-O1".to_string(),
            symbol: "ACME".to_string(),
            side: Side::Buy,
            transact_time: header.sending_time,
            ord_type: OrdType::Market,
            order_qty: dec!(100),
            price: Some(dec!(10.00)),
            stop_px: None,
            time_in_force: TimeInForce::Day,
            account: "SHADOW1".to_string(),
            ex_destination: None,
        });
        let wire = encode(&msg, &header);
        let raw = decode_raw(&wire).unwrap();
        assert!(raw.get(tags::PRICE).is_none());
        assert_eq!(raw.get(tags::ORDER_QTY), Some("100"));
    }

    #[test]
    fn decode_rejects_malformed_pair() {
        let err = decode_raw("8=FIX.4.2\u{1}garbage\u{1}").unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn execution_report_round_trip_parses_decimals() {
        let raw_str = [
            "8=FIX.4.2",
            "9=0",
            "35=8",
            "49=BROKER",
            "56=GATEWAY",
            "34=5",
            "52=20260102-10:00:00.000",
            "17=EXEC1",
            "37=O1",
            "11=P-1",
            "150=0",
            "39=0",
            "55=ACME",
            "54=1",
            "38=100",
            "14=0",
            "151=100",
            "60=20260102-10:00:00.000",
            "10=000",
        ]
        .join("\u{1}")
            + "\u{1}";
        let raw = decode_raw(&raw_str).unwrap();
        let event = interpret(&raw).unwrap();
        match event {
            FixEvent::ExecutionReport { fields, .. } => {
                assert_eq!(fields.exec_id, "EXEC1");
                assert_eq!(fields.order_qty, dec!(100));
                assert_eq!(fields.side, Side::Buy);
            }
            other => panic!("expected ExecutionReport, got {other:?}"),
        }
    }
}
