//! gRPC service facades.
//!
//! Each facade implements a generated tonic service trait: it validates the
//! request, logs it, hands it to its controller and turns the outcome into a
//! tonic response. The REST gateway calls the same facades.
//!
//! ## Structure
//!
//! - [`workshop`] - `workshop.v1.Workshop` ([`WorkshopService`]).
//! - [`subworkshop`] - `workshop.v1.SubWorkshop` ([`SubWorkshopService`]).

pub mod subworkshop;
pub mod workshop;

pub use subworkshop::SubWorkshopService;
pub use workshop::WorkshopService;

use crate::server::telemetry::increment_request_errors;
use core::time::Duration;
use tonic::metadata::MetadataMap;
use tonic::{Response, Status};

/// Deadline the caller attached to the request through the `grpc-timeout`
/// header, if any. What is left of it is forwarded to outbound peer calls.
///
/// The header value is up to 8 digits followed by a unit: `H`, `M`, `S`, `m`
/// (milliseconds), `u` (microseconds) or `n` (nanoseconds).
pub fn grpc_timeout(metadata: &MetadataMap) -> Option<Duration> {
    let raw = metadata.get("grpc-timeout")?.to_str().ok()?;
    if !raw.is_ascii() || raw.len() < 2 {
        return None;
    }

    let (digits, unit) = raw.split_at(raw.len() - 1);
    if digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u64 = digits.parse().ok()?;

    match unit {
        "H" => Some(Duration::from_secs(value * 60 * 60)),
        "M" => Some(Duration::from_secs(value * 60)),
        "S" => Some(Duration::from_secs(value)),
        "m" => Some(Duration::from_millis(value)),
        "u" => Some(Duration::from_micros(value)),
        "n" => Some(Duration::from_nanos(value)),
        _ => None,
    }
}

fn rejected(operation: &'static str, err: workshop_core::Error) -> Status {
    increment_request_errors(operation);
    tracing::debug!(operation, %err, "invalid request");
    err.into()
}

fn respond<T>(
    operation: &'static str,
    result: workshop_core::Result<T>,
) -> Result<Response<T>, Status> {
    match result {
        Ok(value) => Ok(Response::new(value)),
        Err(err) => {
            increment_request_errors(operation);
            tracing::debug!(operation, %err, "request failed");
            Err(err.into())
        }
    }
}
