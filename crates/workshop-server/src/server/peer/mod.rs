//! Outbound calls between the two services.
//!
//! The workshop hands paint jobs to the sub workshop through a
//! [`PaintDispatcher`]; the sub workshop reports finished jobs through a
//! [`CompletionNotifier`]. Controllers only see these traits, the gRPC
//! implementations live in [`grpc`].
//!
//! Both calls are single attempts. No retries, no compensation when the
//! callback fails after a car has been painted.

pub mod grpc;

use core::time::Duration;
use std::time::Instant;
use workshop_core::Result;
use workshop_core::proto::{PaintFinishedRequest, SubPaintCarRequest};

/// Sends a paint job to the sub workshop.
#[tonic::async_trait]
pub trait PaintDispatcher: Send + Sync {
    /// Resolves once the sub workshop has painted the car and its callback
    /// to the workshop has returned.
    async fn dispatch(&self, request: SubPaintCarRequest, timeout: Option<Duration>)
    -> Result<()>;
}

/// Reports a finished paint job back to the workshop that ordered it.
#[tonic::async_trait]
pub trait CompletionNotifier: Send + Sync {
    async fn car_painted(
        &self,
        callback_address: &str,
        request: PaintFinishedRequest,
        timeout: Option<Duration>,
    ) -> Result<()>;
}

/// What is left of a caller's deadline budget `timeout` that started running
/// at `started`. `None` means no deadline.
pub fn remaining_budget(timeout: Option<Duration>, started: Instant) -> Option<Duration> {
    timeout.map(|timeout| timeout.saturating_sub(started.elapsed()))
}

/// Turns a callback address into something a channel can dial.
///
/// - `:5380` dials the local host
/// - `host:port` gets an `http://` scheme
/// - anything with a scheme is kept as is
pub fn normalize_callback_address(address: &str) -> String {
    let address = address.trim();
    if address.contains("://") {
        address.to_owned()
    } else if address.starts_with(':') {
        format!("http://127.0.0.1{address}")
    } else {
        format!("http://{address}")
    }
}
