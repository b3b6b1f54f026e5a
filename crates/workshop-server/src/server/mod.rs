//! Wiring of the workshop processes.
//!
//! [`Services`] builds the facades a [`ServerConfig`] asks for. [`run`] serves
//! them over gRPC (with health, reflection and gRPC-Web) and, unless
//! disabled, over the REST mapping, until the shutdown token is cancelled.

pub mod config;
pub mod controller;
pub mod gateway;
pub mod peer;
pub mod service;
pub mod telemetry;

use config::ServerConfig;
use controller::{SubWorkshopController, WorkshopController};
use futures::Stream;
use peer::grpc::{GrpcCompletionNotifier, GrpcPaintDispatcher};
use service::{SubWorkshopService, WorkshopService};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tonic::transport::server::Connected;
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use workshop_core::proto::{
    FILE_DESCRIPTOR_SET, sub_workshop_server::SubWorkshopServer, workshop_server::WorkshopServer,
};
use workshop_core::store::InMemoryCarStore;

/// The facades served by one process. Shared by the gRPC server and the REST
/// mapping.
#[derive(Clone)]
pub struct Services {
    pub workshop: Option<WorkshopService>,
    pub sub_workshop: Option<SubWorkshopService>,
}

impl Services {
    /// Must be called from within a Tokio runtime.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let workshop = if config.role.serves_workshop() {
            let painter =
                GrpcPaintDispatcher::new(&config.sub_workshop_endpoint, config.connect_timeout)?;
            Some(WorkshopService::new(WorkshopController::new(
                Arc::new(InMemoryCarStore::new()),
                Arc::new(painter),
                config.callback_address.clone(),
            )))
        } else {
            None
        };

        let sub_workshop = config.role.serves_sub_workshop().then(|| {
            SubWorkshopService::new(SubWorkshopController::new(Arc::new(
                GrpcCompletionNotifier::new(config.connect_timeout),
            )))
        });

        Ok(Self {
            workshop,
            sub_workshop,
        })
    }
}

/// Serves `services` on the given listeners until `shutdown` is cancelled.
/// Either server failing cancels the other.
pub async fn run(
    services: Services,
    grpc: TcpListener,
    rest: Option<TcpListener>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let grpc_server = {
        let shutdown = shutdown.clone();
        let services = services.clone();
        async move {
            let result = serve_grpc(
                services,
                TcpListenerStream::new(grpc),
                shutdown.clone().cancelled_owned(),
            )
            .await;
            shutdown.cancel();
            result
        }
    };

    let rest_server = async move {
        let Some(listener) = rest else {
            return Ok(());
        };
        let router = gateway::router(services.workshop, services.sub_workshop);
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.clone().cancelled_owned())
            .await
            .map_err(anyhow::Error::from);
        shutdown.cancel();
        result
    };

    tokio::try_join!(grpc_server, rest_server)?;
    Ok(())
}

pub async fn serve_grpc<I, IO, IE>(
    services: Services,
    incoming: I,
    shutdown: impl Future<Output = ()> + Send,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    if services.workshop.is_some() {
        health_reporter
            .set_serving::<WorkshopServer<WorkshopService>>()
            .await;
    }
    if services.sub_workshop.is_some() {
        health_reporter
            .set_serving::<SubWorkshopServer<SubWorkshopService>>()
            .await;
    }

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let serves_workshop = services.workshop.is_some();
    let serves_sub_workshop = services.sub_workshop.is_some();
    let signal = async move {
        shutdown.await;
        tracing::info!("Shutdown signal received, terminating gracefully...");
        if serves_workshop {
            health_reporter
                .set_not_serving::<WorkshopServer<WorkshopService>>()
                .await;
        }
        if serves_sub_workshop {
            health_reporter
                .set_not_serving::<SubWorkshopServer<SubWorkshopService>>()
                .await;
        }
    };

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(GrpcWebLayer::new()),
        )
        .add_service(health_service)
        .add_service(reflection)
        .add_optional_service(services.workshop.map(build_workshop_service))
        .add_optional_service(services.sub_workshop.map(build_sub_workshop_service))
        .serve_with_incoming_shutdown(incoming, signal)
        .await?;

    tracing::info!("gRPC server shut down");
    Ok(())
}

fn build_workshop_service(service: WorkshopService) -> WorkshopServer<WorkshopService> {
    WorkshopServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

fn build_sub_workshop_service(
    service: SubWorkshopService,
) -> SubWorkshopServer<SubWorkshopService> {
    SubWorkshopServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }
}
