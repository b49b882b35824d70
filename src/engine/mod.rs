//! Core engine: the per-run compare → rebook → remind pipeline.

pub mod cycle;
pub mod expiry;
pub mod rebooker;
