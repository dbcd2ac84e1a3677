//! Persistence error type wrapping `sqlx::Error`, grounded on the teacher's
//! one-error-type-per-layer convention (`fix::error::ProtocolError`,
//! `fix::settings::SettingsError`) rather than letting `sqlx::Error` leak
//! through `anyhow` at every call site untyped.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to decode stored value: {0}")]
    Decode(String),
}
