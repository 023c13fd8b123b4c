use crate::server::pool::manager::{Worker, WorkerPool};
use core::fmt::Display;
use core::time::Duration;
use std::future::Future;
use tonic::transport::{Channel, Endpoint};

/// Dials every address in order and pools the connections that succeed.
///
/// A failed dial is logged and that address is left out of the pool; it is
/// never retried. The pool keeps the relative order of the survivors, so with
/// workers `a, b, c` and `b` unreachable, selection alternates `a, c`.
///
/// If every dial fails the returned pool is empty and each forwarded call
/// fails with [`EmptyPool`](mathlb_core::Error::EmptyPool).
pub async fn build_pool<C, E, F, Fut>(addresses: &[String], mut dial: F) -> WorkerPool<C>
where
    E: Display,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<C, E>>,
{
    let mut workers = Vec::with_capacity(addresses.len());

    for address in addresses {
        match dial(address.clone()).await {
            Ok(connection) => {
                tracing::debug!("Connected to worker {address}");
                workers.push(Worker::new(address.clone(), connection));
            }
            Err(e) => {
                tracing::warn!("Cannot establish a connection with {address}: {e}");
            }
        }
    }

    if workers.is_empty() {
        tracing::error!("No worker could be reached; every call will fail");
    } else {
        tracing::info!(
            "Worker pool ready with {} of {} workers",
            workers.len(),
            addresses.len()
        );
    }

    WorkerPool::new(workers)
}

/// Opens a plaintext gRPC [`Channel`] to `uri`, giving up after
/// `connect_timeout`.
pub async fn dial_worker(
    uri: String,
    connect_timeout: Duration,
) -> Result<Channel, tonic::transport::Error> {
    Endpoint::from_shared(uri)?
        .connect_timeout(connect_timeout)
        .connect()
        .await
}

/// Dials each worker URI over gRPC and returns the resulting pool.
pub async fn connect_workers(uris: &[String], connect_timeout: Duration) -> WorkerPool<Channel> {
    build_pool(uris, |uri| dial_worker(uri, connect_timeout)).await
}
