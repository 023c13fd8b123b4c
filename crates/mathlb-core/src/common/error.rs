//! Error types for the forwarding proxy.
//!
//! [`Error`] covers the failures a forwarded call can hit inside the proxy
//! itself. Errors returned by a worker are *not* represented here: they are
//! surfaced to the caller as the worker's own [`Status`].

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Per-call error raised by the proxy before any worker is contacted.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The pool holds no workers, so there is nothing to forward to.
    #[error("Worker pool is empty")]
    EmptyPool,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::EmptyPool => Status::unavailable("No workers available"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn empty_pool_maps_to_unavailable() {
        let status = Status::from(Error::EmptyPool);
        assert_eq!(status.code(), Code::Unavailable);
        assert_eq!(status.message(), "No workers available");
    }
}
