//! Mimic Transport Layer - UDP pose ingestion
//!
//! This crate provides:
//! - A background UDP receive loop feeding a bounded, lock-guarded queue
//! - Cooperative shutdown of that loop
//! - A UDP sender for trackers

pub mod ingest;
pub mod queue;
pub mod sender;

pub use ingest::*;
pub use queue::*;
pub use sender::*;
