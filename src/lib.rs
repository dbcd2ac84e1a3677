//! FIX 4.2 mirror-trading order replication engine: ingests drop-copy
//! executions on a primary account, negotiates short-sell locates, and
//! mirrors the resulting orders onto configured shadow order-entry sessions.
//!
//! See `DESIGN.md` for the module-by-module grounding ledger.

pub mod admin_hooks;
pub mod bootstrap;
pub mod config;
pub mod decimal;
pub mod domain;
pub mod fix;
pub mod persistence;
pub mod ports;
pub mod session_manager;
