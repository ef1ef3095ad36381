//! Value types the destination model is built from
//!
//! Property bags and keys, identifier enumerations, credentials, headers,
//! certificate material and the request context.

pub mod context;
pub mod credentials;
pub mod header;
pub mod identifiers;
pub mod keys;
pub mod keystore;
pub mod property;
pub mod types;

pub use context::{InboundHeaders, RequestContext, StaticToken, TokenSource};
pub use credentials::{BasicCredentials, BearerCredentials, Credentials, ProxyConfiguration};
pub use header::Header;
pub use identifiers::{DestinationName, ServiceIdentifier};
pub use keystore::{Certificate, KeyStore};
pub use property::{Properties, PropertyKey, PropertyValue, TypedProperty};
pub use types::{
    AuthenticationType, DestinationType, Identifiable, OnBehalfOf, PrincipalPropagationMode,
    ProxyType,
};
