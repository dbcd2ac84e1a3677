//! Parser for the line-oriented FIX settings file format: a `[DEFAULT]` section
//! followed by per-session `[SESSION]` sections, each a flat `Key=Value` list.
//! This is a distinct file format from the engine's own TOML configuration (see
//! [`crate::config`]) and is parsed separately rather than folded into it.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read FIX settings file {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("session at line {line} is missing ConnectionType")]
    MissingConnectionType { line: usize },
    #[error("unrecognised ConnectionType '{0}'")]
    UnknownConnectionType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    Initiator,
    Acceptor,
}

impl ConnectionType {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "initiator" => Some(ConnectionType::Initiator),
            "acceptor" => Some(ConnectionType::Acceptor),
            _ => None,
        }
    }
}

/// One `[SESSION]` block, with defaults already merged in.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub connection_type: ConnectionType,
    pub begin_string: String,
    pub sender_comp_id: String,
    pub target_comp_id: String,
    pub session_qualifier: Option<String>,
    pub heart_bt_int: u16,
    pub socket_connect_host: Option<String>,
    pub socket_connect_port: Option<u16>,
    pub socket_accept_port: Option<u16>,
    pub file_store_path: Option<String>,
}

/// The fully parsed settings file: sessions partitioned by role, as required
/// by the Session Manager.
#[derive(Debug, Clone, Default)]
pub struct FixSettings {
    pub sessions: Vec<SessionSettings>,
}

impl FixSettings {
    pub fn initiators(&self) -> impl Iterator<Item = &SessionSettings> {
        self.sessions.iter().filter(|s| s.connection_type == ConnectionType::Initiator)
    }

    pub fn acceptors(&self) -> impl Iterator<Item = &SessionSettings> {
        self.sessions.iter().filter(|s| s.connection_type == ConnectionType::Acceptor)
    }
}

/// Parses the contents of a settings file already read into memory.
pub fn parse(content: &str) -> Result<FixSettings, SettingsError> {
    let mut defaults: HashMap<String, String> = HashMap::new();
    let mut sessions_raw: Vec<HashMap<String, String>> = Vec::new();
    let mut current: Option<HashMap<String, String>> = None;
    let mut in_default = false;

    for (line_no, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.eq_ignore_ascii_case("[default]") {
            if let Some(section) = current.take() {
                sessions_raw.push(section);
            }
            in_default = true;
            continue;
        }
        if line.eq_ignore_ascii_case("[session]") {
            if let Some(section) = current.take() {
                sessions_raw.push(section);
            }
            in_default = false;
            current = Some(HashMap::new());
            continue;
        }

        let Some((key, value)) = line.split_once('=') else { continue };
        let key = key.trim().to_string();
        let value = value.trim().to_string();

        if in_default {
            defaults.insert(key, value);
        } else if let Some(section) = current.as_mut() {
            section.insert(key, value);
        } else {
            // A bare key before any [SESSION] header is treated as a default.
            let _ = line_no;
            defaults.insert(key, value);
        }
    }
    if let Some(section) = current.take() {
        sessions_raw.push(section);
    }

    let mut sessions = Vec::with_capacity(sessions_raw.len());
    for (idx, raw) in sessions_raw.into_iter().enumerate() {
        let lookup = |key: &str| raw.get(key).or_else(|| defaults.get(key)).cloned();

        let connection_type_raw =
            lookup("ConnectionType").ok_or(SettingsError::MissingConnectionType { line: idx })?;
        let connection_type = ConnectionType::parse(&connection_type_raw)
            .ok_or_else(|| SettingsError::UnknownConnectionType(connection_type_raw.clone()))?;

        sessions.push(SessionSettings {
            connection_type,
            begin_string: lookup("BeginString").unwrap_or_else(|| "FIX.4.2".to_string()),
            sender_comp_id: lookup("SenderCompID").unwrap_or_default(),
            target_comp_id: lookup("TargetCompID").unwrap_or_default(),
            session_qualifier: lookup("SessionQualifier"),
            heart_bt_int: lookup("HeartBtInt").and_then(|v| v.parse().ok()).unwrap_or(30),
            socket_connect_host: lookup("SocketConnectHost"),
            socket_connect_port: lookup("SocketConnectPort").and_then(|v| v.parse().ok()),
            socket_accept_port: lookup("SocketAcceptPort").and_then(|v| v.parse().ok()),
            file_store_path: lookup("FileStorePath"),
        });
    }

    Ok(FixSettings { sessions })
}

/// Reads and parses a settings file from disk.
pub fn load(path: &str) -> Result<FixSettings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read { path: path.to_string(), source })?;
    parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[DEFAULT]
BeginString=FIX.4.2
HeartBtInt=30
FileStorePath=store/

[SESSION]
ConnectionType=acceptor
SenderCompID=BROKER
TargetCompID=GATEWAY
SocketAcceptPort=9876

[SESSION]
ConnectionType=initiator
SenderCompID=GATEWAY
TargetCompID=SHADOW1
SessionQualifier=Q1
SocketConnectHost=127.0.0.1
SocketConnectPort=9877
"#;

    #[test]
    fn parses_default_and_session_sections() {
        let settings = parse(SAMPLE).unwrap();
        assert_eq!(settings.sessions.len(), 2);
        assert_eq!(settings.acceptors().count(), 1);
        assert_eq!(settings.initiators().count(), 1);
    }

    #[test]
    fn defaults_are_inherited_when_not_overridden() {
        let settings = parse(SAMPLE).unwrap();
        let acceptor = settings.acceptors().next().unwrap();
        assert_eq!(acceptor.heart_bt_int, 30);
        assert_eq!(acceptor.file_store_path.as_deref(), Some("store/"));
    }

    #[test]
    fn session_qualifier_disambiguates_initiator_aliases() {
        let settings = parse(SAMPLE).unwrap();
        let initiator = settings.initiators().next().unwrap();
        assert_eq!(initiator.session_qualifier.as_deref(), Some("Q1"));
    }

    #[test]
    fn missing_connection_type_is_an_error() {
        let bad = "[SESSION]\nSenderCompID=X\n";
        assert!(matches!(parse(bad), Err(SettingsError::MissingConnectionType { .. })));
    }
}
