//! fuel-risk — Fuel transaction risk scoring
//!
//! Library crate exposing all modules for use by integration tests
//! and the two binaries (scoring service and offline trainer).

pub mod config;
pub mod types;
pub mod features;
pub mod dataset;
pub mod model;
pub mod scoring;
pub mod evaluation;
pub mod storage;
pub mod lifecycle;
pub mod logging;
pub mod server;
