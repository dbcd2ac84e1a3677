//! Minimal FIX 4.2 wire layer: just enough tag=value encode/decode to produce
//! and consume the MsgTypes this engine actually uses. Not a general-purpose
//! FIX dictionary or session engine — sequence-number handling and transport
//! are owned by [`crate::domain::sequence_controller`] and
//! [`crate::session_manager`] respectively.

pub mod codec;
pub mod error;
pub mod message;
pub mod settings;

pub use codec::{decode_raw, encode, interpret, RawMessage};
pub use message::{FixEvent, Header, MsgType, OutboundMessage, SendDecision};
