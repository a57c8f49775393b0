//! Key authorization and registration

pub mod registry;

pub use registry::{KeyRegistry, RegistryError};
