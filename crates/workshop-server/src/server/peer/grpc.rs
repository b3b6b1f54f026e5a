//! gRPC implementations of the peer traits.

use super::{CompletionNotifier, PaintDispatcher, normalize_callback_address, remaining_budget};
use crate::server::telemetry::{increment_peer_call_failures, record_peer_call_duration};
use core::time::Duration;
use std::time::Instant;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request, Status};
use workshop_core::proto::{
    PaintFinishedRequest, SubPaintCarRequest, sub_workshop_client::SubWorkshopClient,
    workshop_client::WorkshopClient,
};
use workshop_core::{Error, Result};

const SUB_WORKSHOP: &str = "sub workshop";

/// Sends paint jobs to a sub workshop over a lazily connected channel.
///
/// The channel reconnects on its own, so one dispatcher serves the whole
/// process.
#[derive(Clone, Debug)]
pub struct GrpcPaintDispatcher {
    endpoint: String,
    client: SubWorkshopClient<Channel>,
}

impl GrpcPaintDispatcher {
    /// Must be called from within a Tokio runtime.
    pub fn new(endpoint: &str, connect_timeout: Duration) -> Result<Self> {
        let channel = Endpoint::from_shared(endpoint.to_owned())
            .map_err(|e| Error::PeerUnavailable {
                peer: SUB_WORKSHOP.to_owned(),
                reason: format!("invalid endpoint {endpoint}: {e}"),
            })?
            .connect_timeout(connect_timeout)
            .connect_lazy();

        Ok(Self {
            endpoint: endpoint.to_owned(),
            client: SubWorkshopClient::new(channel),
        })
    }

    fn map_status(&self, status: Status) -> Error {
        match status.code() {
            Code::Unavailable => Error::PeerUnavailable {
                peer: format!("{SUB_WORKSHOP} at {}", self.endpoint),
                reason: status.message().to_owned(),
            },
            code => Error::PeerRejected {
                peer: SUB_WORKSHOP.to_owned(),
                code,
                message: status.message().to_owned(),
            },
        }
    }
}

#[tonic::async_trait]
impl PaintDispatcher for GrpcPaintDispatcher {
    async fn dispatch(
        &self,
        request: SubPaintCarRequest,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let mut request = Request::new(request);
        if let Some(timeout) = timeout {
            request.set_timeout(timeout);
        }

        let start = Instant::now();
        let result = self.client.clone().paint_car(request).await;
        record_peer_call_duration(start.elapsed().as_secs_f64() * 1000.0);

        result.map(|_| ()).map_err(|status| {
            increment_peer_call_failures();
            tracing::warn!(
                endpoint = %self.endpoint,
                code = ?status.code(),
                "calling sub workshop failed: {}",
                status.message()
            );
            self.map_status(status)
        })
    }
}

/// Dials the callback address carried by each paint job.
///
/// Every callback opens its own connection since the address comes from the
/// request.
#[derive(Clone, Debug)]
pub struct GrpcCompletionNotifier {
    connect_timeout: Duration,
}

impl GrpcCompletionNotifier {
    pub const fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    async fn connect(
        &self,
        callback_address: &str,
        connect_timeout: Duration,
    ) -> Result<WorkshopClient<Channel>> {
        let unreachable = |reason: String| Error::PeerUnavailable {
            peer: format!("workshop at {callback_address}"),
            reason: format!("car painted but we can't callback to {callback_address}, {reason}"),
        };

        let channel = Endpoint::from_shared(normalize_callback_address(callback_address))
            .map_err(|e| unreachable(e.to_string()))?
            .connect_timeout(connect_timeout)
            .connect()
            .await
            .map_err(|e| unreachable(e.to_string()))?;

        Ok(WorkshopClient::new(channel))
    }
}

#[tonic::async_trait]
impl CompletionNotifier for GrpcCompletionNotifier {
    async fn car_painted(
        &self,
        callback_address: &str,
        request: PaintFinishedRequest,
        timeout: Option<Duration>,
    ) -> Result<()> {
        // Connecting spends from the caller's budget too.
        let started = Instant::now();
        let connect_timeout = timeout.map_or(self.connect_timeout, |budget| {
            budget.min(self.connect_timeout)
        });
        let mut client = match self.connect(callback_address, connect_timeout).await {
            Ok(client) => client,
            Err(e) => {
                increment_peer_call_failures();
                return Err(e);
            }
        };

        let mut request = Request::new(request);
        if let Some(timeout) = remaining_budget(timeout, started) {
            request.set_timeout(timeout);
        }

        let start = Instant::now();
        let result = client.car_painted(request).await;
        record_peer_call_duration(start.elapsed().as_secs_f64() * 1000.0);

        result.map(|_| ()).map_err(|status| {
            increment_peer_call_failures();
            Error::CallbackFailed {
                address: callback_address.to_owned(),
                code: status.code(),
                message: status.message().to_owned(),
            }
        })
    }
}
