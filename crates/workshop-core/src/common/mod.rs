//! Types shared by every workshop crate: the generated protocol, the car
//! entity and the error type.

mod error;
pub mod types;

pub use error::{Error, Result};

/// gRPC service and message definitions generated from
/// `proto/workshop.proto`.
///
/// ## Services
///
/// - `Workshop` - accepts, paints, retrieves cars and receives the
///   `CarPainted` completion callback.
/// - `SubWorkshop` - paints a car and calls the workshop back.
///
/// `google.protobuf.Empty` responses are generated as `()`.
pub mod proto {
    tonic::include_proto!("workshop.v1");

    /// Encoded file descriptor set of `workshop.proto`, registered with the
    /// reflection service.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("workshop_descriptor");
}
