//! Error types for the workshop services.
//!
//! This module defines the central `Error` enum reported by the store, the
//! validation rules, the controllers and the peer clients. It implements
//! `From<Error>` for `tonic::Status` so every failure reaches the caller with
//! the matching gRPC status code.
//!
//! ## Error Cases
//! - `InvalidArgument`: bad car id shape, unsupported color or a missing
//!   required field.
//! - `NotFound`: the car id is not in the store.
//! - `AlreadyExists`: a car with the same id was already accepted.
//! - `NotPainted`: a retrieve arrived before the paint completion callback.
//! - `AlreadyPainted`: a second completion callback arrived for a car.
//! - `PeerUnavailable`: a peer service could not be reached.
//! - `PeerRejected`: the sub workshop answered the paint request with an
//!   error.
//! - `CallbackFailed`: the workshop answered the completion callback with an
//!   error.

use tonic::{Code, Status};

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the workshop services.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The request failed validation.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// No car is stored under this id.
    #[error("unknown car ID {car_id}")]
    NotFound { car_id: String },

    /// A car is already stored under this id.
    #[error("car {car_id} already exists")]
    AlreadyExists { car_id: String },

    /// The car is stored but the paint job has not been confirmed yet.
    #[error("car {car_id} is not painted")]
    NotPainted { car_id: String },

    /// The paint job for this car has already been confirmed.
    #[error("car {car_id} is already painted")]
    AlreadyPainted { car_id: String },

    /// The connection to a peer service could not be established or broke
    /// before an answer came back.
    #[error("{peer} is unavailable: {reason}")]
    PeerUnavailable { peer: String, reason: String },

    /// The sub workshop replied to a paint request with a non-OK status.
    #[error("painting failed with status {code:?}: {message}")]
    PeerRejected {
        peer: String,
        code: Code,
        message: String,
    },

    /// The workshop replied to the completion callback with a non-OK status.
    /// The car has been painted at this point.
    #[error("car painted but callback to {address} failed with status {code:?}: {message}")]
    CallbackFailed {
        address: String,
        code: Code,
        message: String,
    },
}

impl Error {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn not_found(car_id: impl Into<String>) -> Self {
        Self::NotFound {
            car_id: car_id.into(),
        }
    }

    /// The gRPC status code this error is reported with.
    pub fn code(&self) -> Code {
        match self {
            Self::InvalidArgument { .. } => Code::InvalidArgument,
            Self::NotFound { .. } => Code::NotFound,
            Self::AlreadyExists { .. } => Code::AlreadyExists,
            Self::NotPainted { .. } | Self::AlreadyPainted { .. } => Code::FailedPrecondition,
            Self::PeerUnavailable { .. } => Code::Unavailable,
            Self::PeerRejected { .. } => Code::Internal,
            Self::CallbackFailed { code, .. } => *code,
        }
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidArgument { reason } => Status::invalid_argument(reason),
            other => Status::new(other.code(), other.to_string()),
        }
    }
}
