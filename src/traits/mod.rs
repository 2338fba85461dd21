//! Capability traits implemented by provider clients

pub mod handler;
pub mod model_listing;

pub use handler::{ApiHandler, ResolvedModel};
pub use model_listing::ModelListingCapability;
