//! Forwarding proxy server.
//!
//! ## Structure
//!
//! - [`config`] - CLI arguments and the JSON configuration file.
//! - [`pool`] - Worker connections and round-robin selection.
//! - [`service`] - The `Math` gRPC handler that forwards calls.
//! - [`serve`] - Wires the handler, reflection and health into a tonic server.
//! - [`telemetry`] - Logging and optional metrics.

pub mod config;
pub mod pool;
pub mod serve;
pub mod service;
pub mod telemetry;
