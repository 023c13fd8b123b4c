/// Builds the gRPC client and server code for `proto/math.proto` using
/// `tonic-prost-build`.
///
/// Besides the message and service bindings, the build emits an encoded
/// `FileDescriptorSet` (`math_descriptor.bin`) into `OUT_DIR`. The server
/// registers it with the reflection service so tools like `grpcurl` can
/// discover `math.Math` without a local copy of the proto.
///
/// # Panics
///
/// Panics if code generation fails, which aborts the build with the protoc
/// diagnostic.
///
/// # Output
///
/// ```rust,ignore
/// pub mod proto {
///     tonic::include_proto!("math");
/// }
/// ```
use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("math_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/math.proto"], &["proto"])
        .unwrap();
}
