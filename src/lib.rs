//! Destination Resolver - named destinations for outbound HTTP calls
//!
//! Loosely-typed destination records are looked up by name through a chain
//! of loaders and turned into immutable HTTP destinations. Credentials,
//! proxy settings and static headers are derived once when a destination
//! is built; dynamic headers are computed per request by header providers.

pub mod config;
pub mod destination;
pub mod domain;
pub mod error;
pub mod headers;
pub mod loader;
pub mod service_binding;

pub use destination::{Destination, DestinationProperties, HttpDestination, RfcDestination};
pub use error::{ConfigurationError, DestinationError, DestinationResult, PropertyError};
pub use loader::{DestinationAccessor, DestinationLoader, DestinationLoaderChain};
