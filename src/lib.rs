//! Transferwisely: pending-transfer rate watcher and rebooker.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod alerts;
pub mod config;
pub mod engine;
pub mod provider;
pub mod strategy;
pub mod types;
