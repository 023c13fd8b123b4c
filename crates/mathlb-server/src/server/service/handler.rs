//! `Math` service implementation that forwards to pooled workers.
//!
//! Every inbound `GetFactors` call takes the next worker from the
//! [`WorkerPool`], sends it the same payload and returns whatever the worker
//! answers. Errors from the worker (including transport failures) reach the
//! caller unchanged; the call is never retried elsewhere and the worker stays
//! in rotation.

use crate::server::{
    pool::manager::WorkerPool,
    service::upstream::Upstream,
    telemetry::{increment_forward_errors, increment_requests, record_forward_duration},
};
use mathlb_core::proto::{IntList, IntValue, math_server::Math};
use std::sync::Arc;
use std::time::Instant;
use tonic::transport::Channel;
use tonic::{Request, Response, Status};

/// Forwarding proxy for the `math.Math` service.
///
/// Cloning is cheap: clones share the same pool and therefore the same
/// round-robin cursor.
#[derive(Debug)]
pub struct ProxyService<U = Channel> {
    pool: Arc<WorkerPool<U>>,
}

impl<U> Clone for ProxyService<U> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
        }
    }
}

impl<U: Upstream> ProxyService<U> {
    pub fn new(pool: WorkerPool<U>) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &WorkerPool<U> {
        &self.pool
    }
}

#[tonic::async_trait]
impl<U: Upstream> Math for ProxyService<U> {
    /// Forwards `GetFactors` to the next worker in rotation.
    ///
    /// Fails with `UNAVAILABLE` only when the pool is empty; every other
    /// error is the worker's own status.
    #[tracing::instrument(
        skip_all,
        fields(value = req.get_ref().value, worker = tracing::field::Empty)
    )]
    async fn get_factors(&self, req: Request<IntValue>) -> Result<Response<IntList>, Status> {
        increment_requests();

        let worker = self.pool.next().inspect_err(|e| {
            increment_forward_errors();
            tracing::error!("Cannot forward call: {e}");
        })?;
        tracing::Span::current().record("worker", worker.address());

        let start = Instant::now();
        let result = worker.connection().get_factors(req.into_inner()).await;
        record_forward_duration(start.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(list) => Ok(Response::new(list)),
            Err(status) => {
                increment_forward_errors();
                tracing::debug!("Worker returned {:?}: {}", status.code(), status.message());
                Err(status)
            }
        }
    }
}
