//! The call a pooled connection makes on behalf of the proxy.
//!
//! [`Upstream`] is the seam between the handler and the transport. The server
//! uses tonic [`Channel`]s; tests plug in scripted workers.

use mathlb_core::proto::{IntList, IntValue, math_client::MathClient};
use tonic::transport::Channel;
use tonic::{Request, Status};

/// A connection able to run `GetFactors` on a worker.
#[tonic::async_trait]
pub trait Upstream: Clone + Send + Sync + 'static {
    /// Issues `GetFactors` with `request` and returns the worker's reply or
    /// its status, untouched.
    async fn get_factors(&self, request: IntValue) -> Result<IntList, Status>;
}

#[tonic::async_trait]
impl Upstream for Channel {
    async fn get_factors(&self, request: IntValue) -> Result<IntList, Status> {
        // `Channel` clones share the underlying HTTP/2 connection.
        let mut client = MathClient::new(self.clone());
        let response = client.get_factors(Request::new(request)).await?;
        Ok(response.into_inner())
    }
}
