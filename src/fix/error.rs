use thiserror::Error;

/// Transport-level failures: connection refused, session drop. Recoverable
/// by the Session Manager's own reconnect-loop/pause-resume policy; these
/// exist to give the log lines a typed, greppable shape rather than raw
/// `std::io::Error` text (no heartbeat-timeout watchdog exists in this
/// hand-rolled transport, so there is no `HeartbeatLost` variant).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection refused to {endpoint}")]
    ConnectionRefused { endpoint: String },
    #[error("session {session} closed")]
    SessionClosed { session: String },
}

/// Protocol-level failures surfaced as a Reject by the codec. These are scoped to
/// a single inbound message and never propagate to adjacent events.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown MsgType {0}")]
    UnknownMsgType(String),
    #[error("required tag {tag} missing for MsgType {msg_type}")]
    RequiredTagMissing { tag: u32, msg_type: String },
    #[error("incorrect value for tag {tag}: {value}")]
    IncorrectTagValue { tag: u32, value: String },
    #[error("malformed message: {0}")]
    Malformed(String),
}
