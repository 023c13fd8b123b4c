//! Shared definitions used by the proxy server and its tests.
//!
//! ## Submodules
//!
//! - [`error`] - Per-call proxy error and its `tonic::Status` mapping.
//! - [`proto`] - Generated bindings for `proto/math.proto`.

pub mod error;

pub use error::{Error, Result};

/// gRPC service and message definitions generated from `proto/math.proto`.
///
/// ## Service
///
/// - `Math/GetFactors` - takes an [`IntValue`](proto::IntValue) and returns an
///   [`IntList`](proto::IntList). The numeric operation is entirely the
///   worker's concern.
pub mod proto {
    tonic::include_proto!("math");

    /// Encoded descriptor set for `math.proto`, registered with the
    /// reflection service.
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("math_descriptor");
}
