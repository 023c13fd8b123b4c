//! Fixed pool of worker connections with round-robin selection.
//!
//! - [`manager`] - [`WorkerPool`](manager::WorkerPool) and its shared cursor.
//! - [`dial`] - Best-effort startup dialing that builds the pool.

pub mod dial;
pub mod manager;
