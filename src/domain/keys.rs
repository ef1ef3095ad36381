//! Well-known destination property keys
//!
//! Names are matched case-insensitively, so `url` and `URL` address the
//! same property.

use crate::domain::property::{PropertyKey, PropertyValue};
use crate::domain::types::{AuthenticationType, DestinationType, PrincipalPropagationMode, ProxyType};
use http::Uri;

pub const NAME: PropertyKey<String> = PropertyKey::string("Name");
pub const TYPE: PropertyKey<DestinationType> = PropertyKey::enumeration("Type");
pub const URI: PropertyKey<Uri> = PropertyKey::uri("URL");

pub const AUTH_TYPE: PropertyKey<AuthenticationType> = PropertyKey::enumeration("Authentication");
pub const AUTH_TYPE_FALLBACK: PropertyKey<AuthenticationType> =
    PropertyKey::enumeration("authType");

pub const BASIC_AUTH_USERNAME: PropertyKey<String> = PropertyKey::string("User");
pub const BASIC_AUTH_USERNAME_FALLBACK: PropertyKey<String> = PropertyKey::string("Username");
pub const BASIC_AUTH_PASSWORD: PropertyKey<String> = PropertyKey::string("Password");

pub const FORWARD_AUTH_TOKEN: PropertyKey<bool> = PropertyKey::boolean("forwardAuthToken");
pub const FORWARD_AUTH_TOKEN_ALTERNATE: PropertyKey<bool> =
    PropertyKey::boolean("HTML5.ForwardAuthToken");

pub const PROXY_TYPE: PropertyKey<ProxyType> = PropertyKey::enumeration("ProxyType");
pub const PROXY_URI: PropertyKey<Uri> = PropertyKey::uri("Proxy");
pub const PROXY_HOST: PropertyKey<String> = PropertyKey::string("ProxyHost");
pub const PROXY_PORT: PropertyKey<i64> = PropertyKey::integer("ProxyPort");

/// Raw proxy credentials: a typed `Credentials` value or a `Basic ...` /
/// `Bearer ...` string; read by the derivation functions
pub const PROXY_AUTH: &str = "ProxyAuth";

pub const TRUST_ALL: PropertyKey<bool> = PropertyKey::boolean("TrustAll");
pub const TLS_VERSION: PropertyKey<String> = PropertyKey::string("TLSVersion");
pub const KEY_STORE_LOCATION: PropertyKey<String> = PropertyKey::string("KeyStoreLocation");
pub const KEY_STORE_PASSWORD: PropertyKey<String> = PropertyKey::string("KeyStorePassword");
pub const TRUST_STORE_LOCATION: PropertyKey<String> = PropertyKey::string("TrustStoreLocation");
pub const TRUST_STORE_PASSWORD: PropertyKey<String> = PropertyKey::string("TrustStorePassword");

pub const CLOUD_CONNECTOR_LOCATION_ID: PropertyKey<String> =
    PropertyKey::string("CloudConnectorLocationId");
pub const TENANT_ID: PropertyKey<String> = PropertyKey::string("TenantId");
pub const PRINCIPAL_PROPAGATION_MODE: PropertyKey<PrincipalPropagationMode> =
    PropertyKey::enumeration("PrincipalPropagationMode");

pub const TAGS: PropertyKey<Vec<PropertyValue>> = PropertyKey::list("Tags");

/// Properties with this prefix become request headers
pub const HEADER_PREFIX: &str = "URL.headers.";

/// Properties with this prefix become query parameters
pub const QUERY_PREFIX: &str = "URL.queries.";
