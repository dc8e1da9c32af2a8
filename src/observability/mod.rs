//! Observability subsystem.
//!
//! Every pipeline step emits `tracing` events with structured fields
//! (nonce, tx hash, contract address); `logging.rs` decides where they go.
//! Logs go to stderr so stdout carries only query results.

pub mod logging;
