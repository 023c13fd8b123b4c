//! gRPC-facing side of the proxy.
//!
//! - [`handler`] - [`ProxyService`](handler::ProxyService), the `Math`
//!   implementation that forwards each call to one pooled worker.
//! - [`upstream`] - How a pooled connection issues the forwarded call.

pub mod handler;
pub mod upstream;
