//! FearLab Core — fear-spike monitor for an equity index and its volatility index.
//!
//! This crate contains everything between the network and the caller:
//! - Domain types (samples, combined samples, signal events, result sets)
//! - Relay-chain retrieval with per-attempt timeouts and diagnostics
//! - Yahoo chart payload parsing and inner-join date alignment
//! - Fear-spike-then-decline detection and forward-return measurement
//! - The query pipeline that ties them together for one display window

pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod query;

pub use config::{ConfigError, FearlabConfig};
pub use query::{QueryEngine, QueryError, QueryReport};
