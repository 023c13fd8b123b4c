use crate::server::{pool::manager::WorkerPool, service::handler::ProxyService};
use mathlb_core::proto::{FILE_DESCRIPTOR_SET, math_server::MathServer};
use std::future::Future;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_stream::Stream;
use tonic::codec::CompressionEncoding;
use tonic::transport::{Channel, Server, server::Connected};
use tonic_reflection::server::Builder;

/// Serves the forwarding proxy on `incoming` until `shutdown` resolves.
///
/// Alongside `math.Math` the server exposes gRPC reflection (v1) and the
/// standard health service. Health reports the proxy itself, not its
/// workers, and flips to `NOT_SERVING` as soon as shutdown begins.
pub async fn serve_with_incoming<I, IO, IE, F>(
    pool: WorkerPool<Channel>,
    incoming: I,
    shutdown: F,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
    F: Future<Output = ()>,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<MathServer<ProxyService>>()
        .await;

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let service = ProxyService::new(pool);

    let shutdown = async move {
        shutdown.await;
        health_reporter
            .set_not_serving::<MathServer<ProxyService>>()
            .await;
        tracing::info!("Draining in-flight calls");
    };

    Server::builder()
        .add_service(health_service)
        .add_service(reflection)
        .add_service(build_math_service(service))
        .serve_with_incoming_shutdown(incoming, shutdown)
        .await?;

    Ok(())
}

fn build_math_service(service: ProxyService) -> MathServer<ProxyService> {
    MathServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}
