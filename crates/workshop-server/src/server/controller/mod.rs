//! Business logic of both services.
//!
//! Controllers work on validated input and report [`workshop_core::Error`]s.
//! They know nothing about tonic requests or responses; the facades in
//! [`crate::server::service`] do the translation.

pub mod subworkshop;
pub mod workshop;

pub use subworkshop::SubWorkshopController;
pub use workshop::WorkshopController;

#[cfg(test)]
pub(crate) mod testing;
