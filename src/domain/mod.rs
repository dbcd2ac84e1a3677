pub mod allocation;
pub mod caches;
pub mod locate_coordinator;
pub mod locate_machine;
pub mod models;
pub mod order_store;
pub mod replication;
pub mod sequence_controller;
pub mod session_registry;
pub mod trading_hours;
